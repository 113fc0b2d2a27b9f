// ABOUTME: Security validators consulted by the approval engine.
// ABOUTME: Command classification, path sandboxing, and rate limiting.

mod command;
mod path;
mod rate_limiter;

pub use command::{
    Classification, CommandClass, CommandClassifier, DEFAULT_BLOCKED, DEFAULT_SAFE,
};
pub use path::PathSandbox;
pub use rate_limiter::{RateLimit, RateLimiter};
