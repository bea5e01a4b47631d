use ciz_roster::utils::error::{CizError, ErrorSeverity};
use ciz_roster::utils::{logger, validation::Validate};
use ciz_roster::{AppConfig, CliConfig, CsvImportPipeline, ImportEngine, LocalStorage, RestBackend};
use clap::Parser;
use std::sync::Arc;

fn exit_code(e: &CizError) -> i32 {
    match e.severity() {
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 資料錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn report(e: &CizError) {
    tracing::error!(
        "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 対処方法: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting ciz-roster import");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    // 載入並驗證配置
    let mut config = match AppConfig::from_file(&cli.config).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Some(batch_size) = cli.batch_size {
        tracing::info!("Overriding batch size: {}", batch_size);
        config.import.batch_size = batch_size.max(1);
    }

    let backend = match RestBackend::new(config.backend_settings()) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            report(&e);
            std::process::exit(exit_code(&e));
        }
    };

    // 創建存儲和管道
    let (dir, file_name) = cli.split_file_path();
    let storage = LocalStorage::new(dir);
    let pipeline = CsvImportPipeline::new(storage, config.import_settings(), backend, file_name)
        .with_dry_run(cli.dry_run);

    let engine = ImportEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) if summary.dry_run => {
            let preview = summary.preview_path.unwrap_or_default();
            tracing::info!("✅ Dry run completed: {} rows validated", summary.total_rows);
            println!("✅ {} 件の検証が完了しました (登録は行っていません)", summary.total_rows);
            println!("📁 プレビュー: {}", preview);
        }
        Ok(summary) => {
            tracing::info!(
                "✅ Import completed: {}/{} employees in {} batches",
                summary.submitted,
                summary.total_rows,
                summary.batches
            );
            println!("✅ {} 件の社員を登録しました", summary.submitted);
        }
        Err(e) => {
            report(&e);
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}
