use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

const LOG_BASENAME: &str = "tally";
const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const LOG_KEEP_FILES: usize = 5;

/// Start file logging under `<data-dir>/logs/`.
///
/// The filter spec comes from `TALLY_LOG`, then `RUST_LOG`, then a quiet
/// default that keeps dependency noise at warn. Nothing is ever written to
/// stdout; that channel belongs to command output.
pub fn init_logging(data_dir: &Path) -> Result<LoggerHandle, String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| format!("could not create {}: {}", log_dir.display(), e))?;

    let default_spec = if cfg!(debug_assertions) {
        "warn,tally=debug"
    } else {
        "warn,tally=info"
    };
    let spec = std::env::var("TALLY_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
        })
        .unwrap_or_else(|| default_spec.to_string());

    let handle = Logger::try_with_str(&spec)
        .map_err(|e| format!("bad log spec '{}': {}", spec, e))?
        .log_to_file(
            FileSpec::default()
                .directory(&log_dir)
                .basename(LOG_BASENAME)
                .suffix("log"),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::detailed_format)
        .append()
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_KEEP_FILES),
        )
        .start()
        .map_err(|e| format!("could not start logger: {}", e))?;

    log::debug!("logging to {}", log_dir.display());
    Ok(handle)
}
