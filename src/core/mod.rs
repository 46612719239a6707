pub mod batch;
pub mod etl;
pub mod input;
pub mod lookup;
pub mod report;

pub use crate::domain::model::{Credential, LookupOutcome, LookupResult, Record, ResultSet};
pub use crate::domain::ports::{ConfigProvider, GstinLookup, Pipeline, ProgressReporter, Storage};
pub use crate::utils::error::Result;
