/// Handler module
mod handler_trait;
mod handler_wrapper;

pub use handler_trait::Handler;
pub use handler_wrapper::HandlerWrapper;
