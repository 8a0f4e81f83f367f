pub mod constants;
pub mod params;

pub use params::{ExceptionPolicy, NetworkConfig, NetworkParams};
