pub mod connections;
pub mod core;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use connections::errors::ConnectionError;
pub use connections::simulated::SimulatedSdk;
pub use connections::types::{ConParams, Rgba, SdkData, SdkStatus, SysConfig};
pub use core::config::SdkConfig;
pub use core::connection_manager::{ConnectionManager, ConnectionState};
pub use core::session::SessionGuard;
