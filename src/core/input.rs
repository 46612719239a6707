use crate::domain::model::GSTIN;
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;

pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "ods", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("xlsx" | "xlsm" | "xls" | "ods") => Ok(InputFormat::Workbook),
            _ => Err(EtlError::UnsupportedInput {
                path: path.to_string(),
            }),
        }
    }
}

/// Reads the non-empty cells of the `GSTIN` column from the first sheet.
///
/// The first row is the header. Values are returned as found; trimming and
/// deduplication happen in the batch runner.
pub fn read_gstin_column(data: &[u8], path: &str) -> Result<Vec<String>> {
    let rows = match InputFormat::from_path(path)? {
        InputFormat::Csv => read_csv_rows(data)?,
        InputFormat::Workbook => read_workbook_rows(data)?,
    };

    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();
    let column = header
        .iter()
        .position(|cell| cell.as_deref() == Some(GSTIN))
        .ok_or_else(|| EtlError::MissingColumn {
            column: GSTIN.to_string(),
        })?;

    let values: Vec<String> = rows
        .filter_map(|mut row| row.get_mut(column).and_then(Option::take))
        .collect();

    tracing::debug!("Read {} GSTIN cells from {}", values.len(), path);
    Ok(values)
}

fn read_csv_rows(data: &[u8]) -> Result<Vec<Vec<Option<String>>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

fn read_workbook_rows(data: &[u8]) -> Result<Vec<Vec<Option<String>>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;

    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let range = range?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(InputFormat::from_path("a.xlsx").unwrap(), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path("A.XLS").unwrap(), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path("a.csv").unwrap(), InputFormat::Csv);
        assert!(matches!(
            InputFormat::from_path("a.pdf"),
            Err(EtlError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn test_read_csv_column() {
        let csv = "Name,GSTIN\nAcme, 27AAPFU0939F1ZV \nBlank,\nBeta,29ABCDE1234F1Z5\n";
        let values = read_gstin_column(csv.as_bytes(), "input.csv").unwrap();
        assert_eq!(values, vec![" 27AAPFU0939F1ZV ", "29ABCDE1234F1Z5"]);
    }

    #[test]
    fn test_read_csv_missing_column() {
        let csv = "Name,GST Number\nAcme,27AAPFU0939F1ZV\n";
        let err = read_gstin_column(csv.as_bytes(), "input.csv").unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { column } if column == "GSTIN"));
    }

    #[test]
    fn test_read_workbook_first_sheet() {
        let bytes = workbook_bytes(&[
            &["GSTIN", "Vendor"],
            &["27AAPFU0939F1ZV", "Acme"],
            &["", "No id"],
            &["29ABCDE1234F1Z5", "Beta"],
        ]);

        let values = read_gstin_column(&bytes, "vendors.xlsx").unwrap();
        assert_eq!(values, vec!["27AAPFU0939F1ZV", "29ABCDE1234F1Z5"]);
    }

    #[test]
    fn test_read_workbook_missing_column() {
        let bytes = workbook_bytes(&[&["Vendor"], &["Acme"]]);
        let err = read_gstin_column(&bytes, "vendors.xlsx").unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { .. }));
    }

    #[test]
    fn test_read_empty_csv_is_missing_column() {
        let err = read_gstin_column(b"", "empty.csv").unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { .. }));
    }
}
