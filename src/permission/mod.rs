// ABOUTME: Permission module - approval policies, handlers, and the engine
// ABOUTME: that decides whether each tool call may run.

mod engine;
mod handler;
mod policy;

pub use engine::*;
pub use handler::*;
pub use policy::*;
