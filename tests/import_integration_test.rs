use ciz_roster::adapters::BackendSettings;
use ciz_roster::utils::error::{CizError, RowErrorKind};
use ciz_roster::{CsvImportPipeline, ImportEngine, ImportSettings, LocalStorage, RestBackend};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const CSV: &str = "社員番号,氏名,メールアドレス,性別\n\
                   1001,山田 太郎,taro.yamada@example.jp,男性\n\
                   1002,佐藤 花子,hanako.sato@example.jp,女性\n\
                   1003,鈴木 一郎,ichiro.suzuki@example.jp,男性\n";

fn backend(server: &MockServer) -> Arc<RestBackend> {
    let settings = BackendSettings {
        url: server.base_url(),
        anon_key: "anon-key".to_string(),
        service_key: Some("service-key".to_string()),
        timeout: Duration::from_secs(5),
        import_rpc: "import_employees".to_string(),
    };
    Arc::new(RestBackend::new(settings).unwrap())
}

fn settings(batch_size: usize) -> ImportSettings {
    ImportSettings {
        batch_size,
        ..ImportSettings::default()
    }
}

fn write_input(dir: &TempDir, name: &str, data: &[u8]) -> String {
    std::fs::write(dir.path().join(name), data).unwrap();
    dir.path().to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_csv_import_submits_batches_to_rpc() {
    let temp_dir = TempDir::new().unwrap();
    let base = write_input(&temp_dir, "employees.csv", CSV.as_bytes());

    let server = MockServer::start();
    let first_batch = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/rpc/import_employees")
            .header("apikey", "anon-key")
            .header("authorization", "Bearer service-key")
            .body_contains("\"employee_number\":1001");
        then.status(200).json_body(serde_json::json!(2));
    });
    let second_batch = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/rpc/import_employees")
            .body_contains("\"employee_number\":1003");
        then.status(200).json_body(serde_json::json!(1));
    });

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(base),
        settings(2),
        backend(&server),
        "employees.csv",
    );
    let summary = ImportEngine::new(pipeline).run().await.unwrap();

    first_batch.assert();
    second_batch.assert();
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.submitted, 3);
    assert_eq!(summary.batches, 2);
    assert!(!summary.dry_run);
}

#[tokio::test]
async fn test_shift_jis_file_is_decoded_before_submission() {
    let temp_dir = TempDir::new().unwrap();
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(CSV);
    let base = write_input(&temp_dir, "sjis.csv", &bytes);

    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/rpc/import_employees")
            .body_contains("\"last_name\":\"鈴木\"");
        then.status(200).json_body(serde_json::json!(3));
    });

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(base),
        settings(500),
        backend(&server),
        "sjis.csv",
    );
    let summary = ImportEngine::new(pipeline).run().await.unwrap();

    rpc.assert();
    assert_eq!(summary.submitted, 3);
}

#[tokio::test]
async fn test_dry_run_writes_preview_next_to_input() {
    let temp_dir = TempDir::new().unwrap();
    let base = write_input(&temp_dir, "employees.csv", CSV.as_bytes());

    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/rpc/import_employees");
        then.status(200);
    });

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(base),
        settings(500),
        backend(&server),
        "employees.csv",
    )
    .with_dry_run(true);
    let summary = ImportEngine::new(pipeline).run().await.unwrap();

    rpc.assert_hits(0);
    assert!(summary.dry_run);
    assert_eq!(summary.preview_path.as_deref(), Some("employees.preview.json"));

    let preview = std::fs::read_to_string(temp_dir.path().join("employees.preview.json")).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&preview).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["display_name"], "Taro Yamada");
    assert_eq!(rows[2]["employee_number"], 1003);
}

#[tokio::test]
async fn test_invalid_row_stops_before_any_submission() {
    let temp_dir = TempDir::new().unwrap();
    let csv = "社員番号,氏名,メールアドレス,性別\n\
               1001,山田 太郎,taro.yamada@example.jp,男性\n\
               1002,佐藤 花子,hanako.sato,女性\n";
    let base = write_input(&temp_dir, "employees.csv", csv.as_bytes());

    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/rpc/import_employees");
        then.status(200);
    });

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(base),
        settings(500),
        backend(&server),
        "employees.csv",
    );
    let err = ImportEngine::new(pipeline).run().await.unwrap_err();

    rpc.assert_hits(0);
    match err {
        CizError::RowError { line, kind } => {
            assert_eq!(line, 3);
            assert_eq!(kind, RowErrorKind::InvalidEmail("hanako.sato".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_batch_reports_accepted_rows() {
    let temp_dir = TempDir::new().unwrap();
    let base = write_input(&temp_dir, "employees.csv", CSV.as_bytes());

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/rpc/import_employees")
            .body_contains("\"employee_number\":1001");
        then.status(200).json_body(serde_json::json!(2));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/rpc/import_employees")
            .body_contains("\"employee_number\":1003");
        then.status(409).json_body(serde_json::json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"employees_email_key\""
        }));
    });

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(base),
        settings(2),
        backend(&server),
        "employees.csv",
    );
    let err = ImportEngine::new(pipeline).run().await.unwrap_err();

    match err {
        CizError::SubmissionError { accepted, source } => {
            assert_eq!(accepted, 2);
            match *source {
                CizError::BackendError { status, message } => {
                    assert_eq!(status, 409);
                    assert!(message.contains("duplicate key"));
                }
                other => panic!("unexpected source: {:?}", other),
            }
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(temp_dir.path().to_str().unwrap().to_string()),
        settings(500),
        backend(&server),
        "missing.csv",
    );
    let err = ImportEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, CizError::IoError(_)));
}
