use crate::core::batch::{unique_identifiers, BatchRunner, TracingReporter};
use crate::core::input::read_gstin_column;
use crate::core::lookup::GstinCheckClient;
use crate::core::report::{render_report, report_file_name};
use crate::core::{
    ConfigProvider, Credential, GstinLookup, Pipeline, ProgressReporter, ResultSet, Storage,
};
use crate::utils::error::Result;
use chrono::Local;

/// Reads the input file and returns its unique GSTINs without calling the API.
pub async fn read_unique_gstins<S: Storage>(storage: &S, input_path: &str) -> Result<Vec<String>> {
    tracing::debug!("Reading input file: {}", input_path);
    let data = storage.read_file(input_path).await?;
    let raw = read_gstin_column(&data, input_path)?;
    Ok(unique_identifiers(raw))
}

/// Input file → one lookup per GSTIN → Excel report.
pub struct GstinPipeline<S: Storage, C: ConfigProvider, L: GstinLookup = GstinCheckClient> {
    storage: S,
    config: C,
    lookup: L,
    credential: Credential,
    reporter: Box<dyn ProgressReporter>,
}

impl<S: Storage, C: ConfigProvider> GstinPipeline<S, C, GstinCheckClient> {
    /// Fails with `MissingCredential` when the config carries no API key.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let lookup = GstinCheckClient::from_config(&config);
        Self::with_lookup(storage, config, lookup)
    }
}

impl<S: Storage, C: ConfigProvider, L: GstinLookup> GstinPipeline<S, C, L> {
    pub fn with_lookup(storage: S, config: C, lookup: L) -> Result<Self> {
        let credential = Credential::from_option(config.api_key())?;
        Ok(Self {
            storage,
            config,
            lookup,
            credential,
            reporter: Box::new(TracingReporter),
        })
    }

    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    fn report_path(&self, file_name: &str) -> String {
        let output_path = self.config.output_path().trim_end_matches('/');
        if output_path.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", output_path, file_name)
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: GstinLookup> Pipeline for GstinPipeline<S, C, L> {
    async fn extract(&self) -> Result<Vec<String>> {
        read_unique_gstins(&self.storage, self.config.input_path()).await
    }

    async fn transform(&self, gstins: Vec<String>) -> Result<ResultSet> {
        let runner = BatchRunner::new(&self.lookup, self.reporter.as_ref());
        Ok(runner.run(&self.credential, gstins).await)
    }

    async fn load(&self, results: &ResultSet) -> Result<String> {
        let report = render_report(results)?;
        let path = self.report_path(&report_file_name(Local::now().naive_local()));

        tracing::debug!("Writing report ({} bytes) to storage", report.len());
        self.storage.write_file(&path, &report).await?;

        Ok(path)
    }
}
