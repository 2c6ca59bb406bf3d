pub mod config;
pub mod connection_manager;
pub mod session;

// Re-export the modules here for easy import elsewhere.
pub use config::*;
pub use connection_manager::*;
pub use session::*;
