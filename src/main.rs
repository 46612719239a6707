use clap::Parser;
use gstin_check::core::report::XLSX_MIME_TYPE;
use gstin_check::core::ConfigProvider;
use gstin_check::domain::model::REPORT_COLUMNS;
use gstin_check::utils::error::ErrorSeverity;
use gstin_check::utils::{logger, validation::Validate};
use gstin_check::{
    read_unique_gstins, CliConfig, EtlEngine, EtlError, GstinConfig, GstinPipeline, LocalStorage,
    ResultSet,
};

#[tokio::main]
async fn main() {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🧾 Starting GSTIN validation tool");

    if let Err(e) = run(&args).await {
        tracing::error!(
            "❌ GSTIN validation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(args: &CliConfig) -> Result<(), EtlError> {
    let config = args.resolve()?;

    // 驗證配置
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, args);

    let storage = LocalStorage::default();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No API calls will be made");
        let gstins = read_unique_gstins(&storage, config.input_path()).await?;
        println!("Found {} unique GSTINs for validation.", gstins.len());
        for gstin in gstins.iter().take(args.preview_rows) {
            println!("  {}", gstin);
        }
        return Ok(());
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = GstinPipeline::new(storage, config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    let report = engine.run().await?;

    match &report.output_path {
        Some(path) => {
            print_preview(&report.results, args.preview_rows);
            println!(
                "✅ Validated {} GSTINs ({} found, {} failed)",
                report.unique_gstins, report.found, report.failed
            );
            println!("📥 Report saved to: {} ({})", path, XLSX_MIME_TYPE);
        }
        None => println!("⚠️ No GSTINs found in the input file."),
    }

    Ok(())
}

fn display_config_summary(config: &GstinConfig, args: &CliConfig) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Endpoint: {}", config.api_endpoint());
    println!("  Timeout: {:?}", config.request_timeout());
    println!("  Output: {}", config.output_path());
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

/// 預覽前幾筆結果 (GSTIN / Status / Legal_Name)
fn print_preview(results: &ResultSet, rows: usize) {
    if rows == 0 || results.is_empty() {
        return;
    }

    let columns = &REPORT_COLUMNS[..3];
    println!("📊 GSTIN Validation Results");
    println!("{:<17} {:<22} {}", columns[0], columns[1], columns[2]);
    for record in results.records().iter().take(rows) {
        println!(
            "{:<17} {:<22} {}",
            record.get(columns[0]).unwrap_or_default(),
            record.get(columns[1]).unwrap_or_default(),
            record.get(columns[2]).unwrap_or_default()
        );
    }
    if results.len() > rows {
        println!("... and {} more", results.len() - rows);
    }
    println!();
}
