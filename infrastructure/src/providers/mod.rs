//! Capability providers shipped with the binary
//!
//! - [`BuiltinProvider`]: local calculator, clock and echo tools
//! - [`CommandProvider`]: shell command templates declared in config
//! - [`SimulatedProvider`]: canned Slack, Google and GitHub services for demos

pub mod builtin;
pub mod command;
mod expression;
pub mod simulated;

pub use builtin::{BUILTIN_PROVIDER, BuiltinProvider};
pub use command::CommandProvider;
pub use expression::ExpressionError;
pub use simulated::SimulatedProvider;
