use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("Report rendering error: {0}")]
    ReportError(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input file has no column named '{column}'")]
    MissingColumn { column: String },

    #[error("API key is missing")]
    MissingCredential,

    #[error("Unsupported input file: {path}")]
    UnsupportedInput { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SpreadsheetError(_)
            | EtlError::MissingColumn { .. }
            | EtlError::UnsupportedInput { .. } => ErrorCategory::Input,
            EtlError::ReportError(_) | EtlError::IoError(_) => ErrorCategory::Output,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::MissingCredential => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingColumn { column } => format!(
                "Add a header cell named '{}' to the first row of the first sheet",
                column
            ),
            EtlError::MissingCredential => {
                "Pass --api-key or set the GSTIN_API_KEY environment variable".to_string()
            }
            EtlError::UnsupportedInput { .. } => {
                "Use an .xlsx, .xls, .xlsm, .ods or .csv file".to_string()
            }
            EtlError::SpreadsheetError(_) | EtlError::CsvError(_) => {
                "Check that the input file is not corrupted or password protected".to_string()
            }
            EtlError::ApiError(_) => {
                "Check the network connection and the lookup endpoint".to_string()
            }
            EtlError::IoError(_) | EtlError::ReportError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the command line arguments and the TOML configuration file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingColumn { column } => {
                format!("The uploaded file must have a column named '{}'.", column)
            }
            EtlError::MissingCredential => {
                "Please enter your API key before starting validation.".to_string()
            }
            EtlError::SpreadsheetError(e) => format!("Error reading Excel: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
