use crate::domain::model::ResultSet;
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook};

pub const SHEET_NAME: &str = "GSTIN_Details";
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const HEADER_FILL: u32 = 0x305496;
const WIDTH_PADDING: usize = 2;

/// `GSTIN_Validation_Report_<YYYYMMDD_HHMMSS>.xlsx`
pub fn report_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "GSTIN_Validation_Report_{}.xlsx",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Longest value per column (header included, blank cells count as 0) plus padding.
pub fn column_widths(results: &ResultSet) -> Vec<usize> {
    let columns = results.columns();
    let records = results.records();

    columns
        .iter()
        .map(|column| {
            let longest_cell = records
                .iter()
                .filter_map(|record| record.get(column))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0);
            longest_cell.max(column.chars().count()) + WIDTH_PADDING
        })
        .collect()
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

/// Renders the results as a single-sheet `.xlsx` workbook held in memory.
pub fn render_report(results: &ResultSet) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = header_format();
    let columns = results.columns();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (index, record) in results.records().iter().enumerate() {
        let row = index as u32 + 1;
        for (col, name) in columns.iter().enumerate() {
            // 空值留白
            match record.get(name) {
                Some(value) if !value.is_empty() => {
                    worksheet.write_string(row, col as u16, value)?;
                }
                _ => {}
            }
        }
    }

    for (col, width) in column_widths(results).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    tracing::debug!(
        "Rendered {} rows x {} columns into '{}'",
        results.len(),
        columns.len(),
        SHEET_NAME
    );

    Ok(workbook.save_to_buffer()?)
}
