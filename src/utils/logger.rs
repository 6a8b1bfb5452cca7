use crate::domain::model::FetchEvent;
use crate::domain::ports::FetchObserver;
use crate::utils::error::Result;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn timer() -> ChronoLocal {
    ChronoLocal::new("%H:%M:%S%.3f".to_string())
}

fn stderr_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Everything from debug up goes to the (appended) log file; stderr only
/// shows warnings and errors unless `verbose` is set.
pub fn init_cli_logger(verbose: bool, log_file: &Path, format: LogFormat) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sgx_fetch=debug,info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(timer());
    let file_layer = match format {
        LogFormat::Text => file_layer.with_filter(file_filter).boxed(),
        LogFormat::Json => file_layer.json().with_filter(file_filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(timer())
                .compact()
                .with_filter(stderr_level(verbose)),
        )
        .init();

    Ok(())
}

/// Fallback when the log file cannot be opened.
pub fn init_stderr_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(timer())
                .compact()
                .with_filter(stderr_level(verbose)),
        )
        .init();
}

/// Maps run events onto `tracing` levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_event(&self, event: &FetchEvent) {
        match event {
            FetchEvent::DateRolledBack { today, resolved } => tracing::info!(
                "{} is a Monday, there is no data from the day before; downloading last Friday's files ({})",
                today,
                resolved
            ),
            FetchEvent::FutureDate { date, today } => tracing::error!(
                "The date you wish to download ({}) is too far into the future, today is {}",
                date,
                today
            ),
            FetchEvent::KeyResolved { date, key } => {
                tracing::info!("Resolved key {} for {}", key, date)
            }
            FetchEvent::AttemptFailed {
                file_name,
                attempt,
                max_attempts,
                error,
                retry_in,
            } => tracing::warn!(
                "Download of {} failed (attempt {}/{}): {}; retrying in {:?}",
                file_name,
                attempt,
                max_attempts,
                error,
                retry_in
            ),
            FetchEvent::Downloaded {
                file_name,
                destination_path,
                bytes,
                attempts,
            } => tracing::info!(
                "{} downloaded and saved successfully to {} ({} bytes, {} attempt(s))",
                file_name,
                destination_path.display(),
                bytes,
                attempts
            ),
            FetchEvent::Failed {
                file_name,
                attempts,
                error,
            } => tracing::error!(
                "The download failed for {} with the error: {} after {} attempt(s). Please manually download the file another time.",
                file_name,
                error,
                attempts
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(event: FetchEvent) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || TracingObserver.on_event(&event));
        buf.contents()
    }

    #[test]
    fn test_failed_download_is_logged_as_error() {
        let output = capture(FetchEvent::Failed {
            file_name: "TC_20230704.txt".to_string(),
            attempts: 4,
            error: "HTTP 500 for https://links.sgx.com/1.0.0/derivatives-historical/5455/TC.txt"
                .to_string(),
        });

        assert!(output.contains("ERROR"));
        assert!(output.contains("TC_20230704.txt"));
        assert!(output.contains("after 4 attempt(s)"));
    }

    #[test]
    fn test_retry_is_logged_as_warning() {
        let output = capture(FetchEvent::AttemptFailed {
            file_name: "TC_structure.dat".to_string(),
            attempt: 1,
            max_attempts: 4,
            error: "HTTP 503".to_string(),
            retry_in: std::time::Duration::from_secs(1),
        });

        assert!(output.contains("WARN"));
        assert!(output.contains("attempt 1/4"));
    }

    #[test]
    fn test_log_format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Holder {
            format: LogFormat,
        }
        let holder: Holder = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(holder.format, LogFormat::Json);
    }
}
