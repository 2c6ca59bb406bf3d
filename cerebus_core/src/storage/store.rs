use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use log::warn;
use serde_json::Error as SerdeError;

use super::profile::ConnectionProfile;

#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// `~/.config/cerebus_rs/profiles` on Linux, `%APPDATA%\cerebus_rs\profiles` on Windows, etc.
    pub fn new() -> io::Result<Self> {
        let proj = ProjectDirs::from("", "", "cerebus_rs")
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Unable to locate config dir"))?;
        Self::with_dir(proj.config_dir().join("profiles"))
    }

    /// A store rooted at `dir`, created if missing.
    pub fn with_dir(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Returns every stored profile (skips malformed files with a warning).
    pub fn list(&self) -> io::Result<Vec<ConnectionProfile>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed: io::Result<ConnectionProfile> = fs::File::open(&path)
                .and_then(|f| serde_json::from_reader(f).map_err(SerdeError::into));
            match parsed {
                Ok(profile) => out.push(profile),
                Err(e) => warn!("could not read {:?}: {e}", path),
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Load a single profile; `Ok(None)` if it doesn't exist.
    pub fn load(&self, name: &str) -> io::Result<Option<ConnectionProfile>> {
        match fs::File::open(self.file_for(name)) {
            Ok(file) => Ok(Some(serde_json::from_reader(file).map_err(io::Error::from)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create or overwrite a profile.
    pub fn save(&self, profile: &ConnectionProfile) -> io::Result<()> {
        let file = fs::File::create(self.file_for(profile.name()))?;
        serde_json::to_writer_pretty(file, profile).map_err(SerdeError::into)
    }

    /// Delete a preset (`Ok(true)` if removed, `Ok(false)` if it didn’t exist).
    pub fn delete(&self, name: &str) -> io::Result<bool> {
        match fs::remove_file(self.file_for(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
