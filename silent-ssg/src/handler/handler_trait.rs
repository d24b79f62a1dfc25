use crate::{Request, Response, SsgResult};
use async_trait::async_trait;

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, _req: Request) -> SsgResult<Response>;
}
