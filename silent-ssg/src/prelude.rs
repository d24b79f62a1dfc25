pub use crate::cli::{Site, run};
pub use crate::core::{
    path_param::{Params, PathParam, params},
    request::Request,
    res_body::{ResBody, full, stream_body},
    response::Response,
    template::{DeferredRender, TemplateView},
};
pub use crate::error::{BoxedError, SsgError, SsgResult};
pub use crate::handler::{Handler, HandlerWrapper};
pub use crate::log::*;
pub use crate::route::{Group, LocaleContext, Leaf, RouteSettings, RouteTable};
pub use crate::ssg::{BuildOptions, RedirectContext, StaticFiles};
pub use crate::{Client, Method, StatusCode};
