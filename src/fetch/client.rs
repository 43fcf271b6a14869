use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Auth decorators such as
/// [`ApiKey`](crate::fetch::auth::ApiKey) wrap another `HttpClient` and
/// amend the request before delegating.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
