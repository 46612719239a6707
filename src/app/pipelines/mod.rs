pub mod gstin_pipeline;

pub use gstin_pipeline::{read_unique_gstins, GstinPipeline};
