pub mod command;
pub mod context;
pub mod continuation;
pub mod factory;
pub mod middleware;
pub mod normalize;
pub mod pipeline;
#[cfg(test)]
pub mod integration_tests;

pub use command::Command;
pub use context::ExecutionContext;
pub use continuation::Completion;
pub use factory::CommandFactory;
pub use middleware::{Handler, Middleware, MiddlewareFactory};
pub use normalize::normalize;
pub use pipeline::Pipeline;
