use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use zia::config::LoggingConfig;
use zia::error::Result;
use zia::ml::InferenceEngine;

/// Install the global subscriber.
///
/// Console output goes to stderr so stdout only carries region text. The
/// returned guard flushes the file appender and must live until exit.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},zia={}", config.level, config.level)));

    let mut guard = None;
    let file_layer = config.dir.as_deref().and_then(|log_dir| {
        // `tracing_appender::rolling::daily` panics if it can't create the
        // initial log file, so preflight writability.
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Could not create log directory {} ({}), file logging disabled",
                log_dir, e
            );
            return None;
        }
        let test_path = std::path::Path::new(log_dir).join(".zia_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);
                let file_appender = tracing_appender::rolling::daily(log_dir, "zia.log");
                let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
                guard = Some(file_guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false) // No color codes in file
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    });

    let console_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });
    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init();

    guard
}

#[cfg(feature = "onnx")]
pub fn build_engine() -> Result<Arc<dyn InferenceEngine>> {
    Ok(Arc::new(zia::ml::TractEngine::new()))
}

#[cfg(not(feature = "onnx"))]
pub fn build_engine() -> Result<Arc<dyn InferenceEngine>> {
    Err(zia::error::ZiaError::Validation(
        "binary is built without --features onnx; no inference engine available".to_string(),
    ))
}
