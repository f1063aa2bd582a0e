//! Command implementations for park-simtest
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod rate;
mod run;
mod status;

pub use rate::Rate;
pub use run::Run;
pub use status::Status;
