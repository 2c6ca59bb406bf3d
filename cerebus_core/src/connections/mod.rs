pub mod errors;
pub mod sdk;
pub mod simulated;
pub mod types;

// Re-export the modules here for easy import elsewhere.
pub use errors::*;
pub use sdk::*;
pub use types::*;
