/// The `silent-ssg` library.
mod client;
pub mod cli;
mod core;
mod error;
mod handler;
pub mod i18n;
mod log;
pub mod prelude;
pub mod route;
pub mod serve;
pub mod ssg;

pub use crate::client::{Client, Transport};
pub use crate::core::{
    path_param::{Params, PathParam, params},
    request::Request,
    res_body::{ResBody, full, stream_body},
    response::Response,
    template::{DeferredRender, TemplateView},
};
pub use error::{BoxedError, SsgError, SsgResult};
pub use handler::{Handler, HandlerWrapper};
pub use headers;
pub use hyper::{Method, StatusCode, header};
pub use tera;
