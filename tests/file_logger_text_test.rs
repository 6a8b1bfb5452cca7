use sgx_fetch::domain::model::FetchEvent;
use sgx_fetch::domain::ports::FetchObserver;
use sgx_fetch::utils::logger::{init_cli_logger, LogFormat, TracingObserver};
use std::io::Write;
use tempfile::TempDir;

const EARLIER_RUN: &str = "10:02:11.004 INFO sgx_fetch: TC_structure.dat downloaded and saved successfully\n";

#[test]
fn test_text_log_appends_plain_error_lines() {
    std::env::remove_var("RUST_LOG");
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("sgx_files.log");
    std::fs::File::create(&log_path)
        .unwrap()
        .write_all(EARLIER_RUN.as_bytes())
        .unwrap();

    init_cli_logger(false, &log_path, LogFormat::Text).unwrap();
    TracingObserver.on_event(&FetchEvent::Failed {
        file_name: "WEBPXTICK_DT-20230705.zip".to_string(),
        attempts: 4,
        error: "HTTP 503".to_string(),
    });

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.starts_with(EARLIER_RUN));

    let appended = &contents[EARLIER_RUN.len()..];
    let line = appended
        .lines()
        .find(|l| l.contains("WEBPXTICK_DT-20230705.zip"))
        .unwrap();
    assert!(line.contains("ERROR"));
    assert!(line.contains("after 4 attempt(s)"));
    assert!(!contents.contains("\x1b["));
}
