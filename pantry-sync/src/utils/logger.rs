//! Logging Infrastructure
//!
//! 控制台输出 + 可选的按天滚动文件 (`pantry-sync.YYYY-MM-DD`)。

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Log file prefix inside `LOG_DIR`
pub const LOG_FILE_PREFIX: &str = "pantry-sync";

/// Initialize the logger with console output only
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level` when set. A missing `log_dir` is created;
/// if that fails, logging stays on the console.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        match std::fs::create_dir_all(log_path) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_path, LOG_FILE_PREFIX);
                // try_init: tests may initialise more than once
                let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
                return;
            }
            Err(e) => {
                eprintln!("Failed to create log dir {}: {}", dir, e);
            }
        }
    }

    let _ = subscriber.try_init();
}
