use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const GSTIN: &str = "GSTIN";
pub const STATUS: &str = "Status";

/// 報表欄位的固定順序；成功的查詢結果包含全部欄位，失敗只有前兩欄
pub const REPORT_COLUMNS: [&str; 13] = [
    GSTIN,
    STATUS,
    "Legal_Name",
    "Trade_Name",
    "Constitution",
    "Center_Jurisdiction",
    "State_Jurisdiction",
    "Principal_Place",
    "Registration_Date",
    "Cancellation_Date",
    "Nature_of_Business",
    "State_Code",
    "Last_Updated",
];

pub const NOT_FOUND_STATUS: &str = "Invalid / Not Found";

/// A flat, sparse row as it appears in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.data.get(field).map(String::as_str)
    }
}

/// Registration details for an identifier the lookup service recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstinDetails {
    pub status: String,
    pub legal_name: String,
    pub trade_name: String,
    pub constitution: String,
    pub center_jurisdiction: String,
    pub state_jurisdiction: String,
    pub principal_place: String,
    pub registration_date: String,
    pub cancellation_date: String,
    pub nature_of_business: String,
    pub state_code: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupOutcome {
    Success(GstinDetails),
    /// The service answered 200 but its `flag` was falsy or absent.
    NotFound,
    /// Any HTTP status other than 200.
    ApiError(u16),
    /// Timeout, connection failure, unreadable body.
    TransportError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub gstin: String,
    pub outcome: LookupOutcome,
}

impl LookupResult {
    pub fn new(gstin: impl Into<String>, outcome: LookupOutcome) -> Self {
        Self {
            gstin: gstin.into(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Success(_))
    }

    pub fn status(&self) -> String {
        match &self.outcome {
            LookupOutcome::Success(details) => details.status.clone(),
            LookupOutcome::NotFound => NOT_FOUND_STATUS.to_string(),
            LookupOutcome::ApiError(code) => format!("API Error {}", code),
            LookupOutcome::TransportError(message) => format!("Error: {}", message),
        }
    }

    /// Flattens the result into (column, value) pairs in report order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![(GSTIN, self.gstin.clone()), (STATUS, self.status())];

        if let LookupOutcome::Success(d) = &self.outcome {
            let values = [
                &d.legal_name,
                &d.trade_name,
                &d.constitution,
                &d.center_jurisdiction,
                &d.state_jurisdiction,
                &d.principal_place,
                &d.registration_date,
                &d.cancellation_date,
                &d.nature_of_business,
                &d.state_code,
                &d.last_updated,
            ];
            fields.extend(
                REPORT_COLUMNS[2..]
                    .iter()
                    .zip(values)
                    .map(|(column, value)| (*column, value.clone())),
            );
        }

        fields
    }

    pub fn to_record(&self) -> Record {
        Record {
            data: self
                .fields()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// Ordered lookup results, one per unique identifier, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    results: Vec<LookupResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, result: LookupResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookupResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[LookupResult] {
        &self.results
    }

    /// Union of the fields present across all results, in report order.
    pub fn columns(&self) -> Vec<&'static str> {
        if self.results.is_empty() {
            return Vec::new();
        }
        if self.results.iter().any(LookupResult::is_success) {
            REPORT_COLUMNS.to_vec()
        } else {
            REPORT_COLUMNS[..2].to_vec()
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.results.iter().map(LookupResult::to_record).collect()
    }

    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary {
            total: self.results.len(),
            ..ResultSummary::default()
        };
        for result in &self.results {
            match result.outcome {
                LookupOutcome::Success(_) => summary.found += 1,
                LookupOutcome::NotFound => summary.not_found += 1,
                LookupOutcome::ApiError(_) => summary.api_errors += 1,
                LookupOutcome::TransportError(_) => summary.transport_errors += 1,
            }
        }
        summary
    }
}

impl FromIterator<LookupResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = LookupResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = LookupResult;
    type IntoIter = std::vec::IntoIter<LookupResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a LookupResult;
    type IntoIter = std::slice::Iter<'a, LookupResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultSummary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub api_errors: usize,
    pub transport_errors: usize,
}

impl ResultSummary {
    pub fn failed(&self) -> usize {
        self.not_found + self.api_errors + self.transport_errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    /// `floor(completed / total * 100)`, computed in integers.
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (completed.min(total) * 100 / total) as u8
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// API key for the lookup service. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(EtlError::MissingCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_option(key: Option<&str>) -> Result<Self> {
        key.map(Self::new).unwrap_or(Err(EtlError::MissingCredential))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
