use crate::query::builder::StructuredQuery;
use crate::service::error::DataFetchError;
use std::future::Future;

/// The external generative content service.
///
/// One call is one round trip: implementations must not cache, retry or
/// deduplicate. The returned text is the raw payload, expected to be a JSON
/// array conforming to `query.response_schema`.
pub trait ContentGenerator: Send + Sync {
    fn generate(
        &self,
        query: &StructuredQuery,
    ) -> impl Future<Output = Result<String, DataFetchError>> + Send;
}
