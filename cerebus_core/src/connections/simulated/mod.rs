pub mod simulated_sdk;

pub use simulated_sdk::SimulatedSdk;
