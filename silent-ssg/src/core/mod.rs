pub(crate) mod path_param;
pub(crate) mod request;
pub(crate) mod res_body;
pub(crate) mod response;
pub(crate) mod template;
