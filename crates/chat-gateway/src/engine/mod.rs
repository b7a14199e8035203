//! Realtime session engine
//!
//! A single task (the [`LifecycleController`]) owns every state transition.
//! Transport tasks talk to it through an [`EngineHandle`]; commands are applied
//! strictly one at a time, so a transition's store mutation and its broadcasts
//! never interleave with another's.

mod command;
mod controller;
mod error;
mod handle;

pub use command::{Command, Reply};
pub use controller::LifecycleController;
pub use error::EngineError;
pub use handle::EngineHandle;
