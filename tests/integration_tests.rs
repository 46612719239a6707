use anyhow::Result;
use calamine::{open_workbook_from_rs, Reader, Xlsx};
use gstin_check::core::batch::SilentReporter;
use gstin_check::core::report::SHEET_NAME;
use gstin_check::{EtlEngine, EtlError, GstinConfig, GstinPipeline, LocalStorage};
use httpmock::prelude::*;
use std::io::Cursor;
use tempfile::TempDir;

fn config_for(server: &MockServer, input: &str) -> GstinConfig {
    let mut config = GstinConfig::default();
    config.source.endpoint = server.base_url();
    config.source.api_key = Some("integration-key".to_string());
    config.input.path = Some(input.to_string());
    config.load.output_path = "reports".to_string();
    config
}

fn write_input_workbook(dir: &TempDir, name: &str, gstins: &[&str]) -> Result<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "GSTIN")?;
    sheet.write_string(0, 1, "Vendor")?;
    for (i, gstin) in gstins.iter().enumerate() {
        let row = i as u32 + 1;
        if !gstin.is_empty() {
            sheet.write_string(row, 0, *gstin)?;
        }
        sheet.write_string(row, 1, format!("Vendor {}", row))?;
    }
    workbook.save(dir.path().join(name))?;
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_validation_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_input_workbook(
        &temp_dir,
        "vendors.xlsx",
        &[
            "27AAPFU0939F1ZV",
            "29ABCDE1234F1Z5",
            " 27aapfu0939f1zv",
            "",
            "07AAACB1234C1Z9",
        ],
    )?;

    let server = MockServer::start();
    let active = server.mock(|when, then| {
        when.method(GET)
            .path("/check/integration-key/27AAPFU0939F1ZV");
        then.status(200).json_body(serde_json::json!({
            "flag": true,
            "data": {
                "sts": "Active",
                "lgnm": "ACME PVT LTD",
                "nba": ["Retail", "Wholesale"],
                "pradr": {"addr": "123 Main St"}
            }
        }));
    });
    let not_found = server.mock(|when, then| {
        when.method(GET)
            .path("/check/integration-key/29ABCDE1234F1Z5");
        then.status(200).json_body(serde_json::json!({"flag": false}));
    });
    let server_error = server.mock(|when, then| {
        when.method(GET)
            .path("/check/integration-key/07AAACB1234C1Z9");
        then.status(500);
    });

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = GstinPipeline::new(storage, config_for(&server, "vendors.xlsx"))?
        .with_reporter(SilentReporter);
    let engine = EtlEngine::new(pipeline);

    let report = engine.run().await?;

    // 重複的 GSTIN 只查詢一次
    active.assert_hits(1);
    not_found.assert_hits(1);
    server_error.assert_hits(1);

    assert_eq!(report.unique_gstins, 3);
    assert_eq!(report.found, 1);
    assert_eq!(report.failed, 2);

    let output_path = report.output_path.expect("report should be written");
    let bytes = std::fs::read(temp_dir.path().join(&output_path))?;
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(SHEET_NAME)?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "GSTIN");
    assert_eq!(rows[0][12], "Last_Updated");
    assert_eq!(rows[1][0], "27AAPFU0939F1ZV");
    assert_eq!(rows[1][1], "Active");
    assert_eq!(rows[1][2], "ACME PVT LTD");
    assert_eq!(rows[1][7], "123 Main St");
    assert_eq!(rows[1][10], "Retail, Wholesale");
    assert_eq!(rows[2][1], "Invalid / Not Found");
    assert_eq!(rows[2][2], "");
    assert_eq!(rows[3][1], "API Error 500");

    Ok(())
}

#[tokio::test]
async fn test_empty_input_makes_no_calls_and_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("empty.csv"), "GSTIN,Vendor\n,Acme\n  ,Beta\n")?;

    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = GstinPipeline::new(storage, config_for(&server, "empty.csv"))?;
    let report = EtlEngine::new(pipeline).run().await?;

    any_call.assert_hits(0);
    assert_eq!(report.unique_gstins, 0);
    assert!(report.output_path.is_none());
    assert!(report.results.is_empty());
    assert!(!temp_dir.path().join("reports").exists());

    Ok(())
}

#[tokio::test]
async fn test_missing_column_aborts_before_network() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("bad.csv"), "GST Number\n27AAPFU0939F1ZV\n")?;

    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.method(GET);
        then.status(200);
    });

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = GstinPipeline::new(storage, config_for(&server, "bad.csv"))?;
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, EtlError::MissingColumn { .. }));
    any_call.assert_hits(0);

    Ok(())
}

#[tokio::test]
async fn test_transport_failures_are_recorded_not_raised() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("in.csv"),
        "GSTIN\n27AAPFU0939F1ZV\n29ABCDE1234F1Z5\n",
    )?;

    let mut config = GstinConfig::default();
    config.source.endpoint = "http://127.0.0.1:1".to_string();
    config.source.api_key = Some("integration-key".to_string());
    config.input.path = Some("in.csv".to_string());
    config.load.output_path = "out".to_string();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = GstinPipeline::new(storage, config)?.with_reporter(SilentReporter);
    let report = EtlEngine::new(pipeline).run().await?;

    assert_eq!(report.unique_gstins, 2);
    assert_eq!(report.failed, 2);
    assert!(report
        .results
        .iter()
        .all(|result| result.status().starts_with("Error:")));
    assert!(report.output_path.is_some());

    Ok(())
}
