use log::{debug, warn};
use std::ops::{Deref, DerefMut};

use crate::connections::errors::ConnectionError;
use crate::core::connection_manager::ConnectionManager;

/// A connected manager borrowed for the length of a scope.
///
/// Created by [`ConnectionManager::session`]. Derefs to the manager, and
/// disconnects it when dropped, whether the scope ends normally, through `?`
/// or by unwinding.
pub struct SessionGuard<'a> {
    manager: &'a mut ConnectionManager,
}

impl ConnectionManager {
    /// Connect and hand back a guard that disconnects on drop.
    pub fn session(&mut self) -> Result<SessionGuard<'_>, ConnectionError> {
        self.connect()?;
        debug!("Session scope entered (instance {})", self.instance());
        Ok(SessionGuard { manager: self })
    }

    /// Run `f` inside a session; the manager is disconnected afterwards no
    /// matter how `f` returns.
    pub fn with_session<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut ConnectionManager) -> Result<T, E>,
        E: From<ConnectionError>,
    {
        let mut session = self.session()?;
        f(&mut *session)
    }
}

impl SessionGuard<'_> {
    /// End the session now and report a failing close instead of only logging it.
    pub fn close(self) -> Result<(), ConnectionError> {
        // Drop still runs afterwards; a second disconnect is a no-op.
        self.manager.disconnect()
    }
}

impl Deref for SessionGuard<'_> {
    type Target = ConnectionManager;

    fn deref(&self) -> &ConnectionManager {
        &*self.manager
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut ConnectionManager {
        &mut *self.manager
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        debug!("Session scope exited (instance {})", self.manager.instance());
        if let Err(e) = self.manager.disconnect() {
            warn!("Disconnect on scope exit failed: {}", e);
        }
    }
}
