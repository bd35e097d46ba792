pub mod contracts;
pub mod deposits;
pub mod env;
pub mod sinks;
pub mod state;
