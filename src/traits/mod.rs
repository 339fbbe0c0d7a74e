pub mod handler;

pub use handler::{AsyncHandler, CallbackHandler, HandlerResult, SyncHandler};
