use crate::domain::model::{Credential, LookupResult, Progress, ResultSet};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}

/// Resolves one identifier against the lookup service.
///
/// Implementations never fail: every problem is folded into the returned
/// [`LookupResult`].
#[async_trait]
pub trait GstinLookup: Send + Sync {
    async fn fetch(&self, credential: &Credential, gstin: &str) -> LookupResult;
}

pub trait ProgressReporter: Send + Sync {
    /// Called before the lookup of the `position`-th (1-based) identifier.
    fn on_lookup_started(&self, gstin: &str, position: usize, total: usize);

    /// Called after each completed lookup.
    fn on_progress(&self, progress: Progress);

    fn on_finished(&self, _results: &ResultSet) {}
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Unique identifiers read from the input file, in first-appearance order.
    async fn extract(&self) -> Result<Vec<String>>;
    async fn transform(&self, gstins: Vec<String>) -> Result<ResultSet>;
    /// Writes the report and returns where it was saved.
    async fn load(&self, results: &ResultSet) -> Result<String>;
}
