use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ScriptableConfig;

const MAX_LOG_SIZE: u64 = 1024 * 1024; // 1MB

/// Filter used when `RUST_LOG` is not set: `info`, or `debug` once `-d` is given
fn default_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    })
}

/// Initialize logging for a binary.
///
/// - `component_name`: Name of the binary, used for the log file name
/// - `file_enabled`: If true, also log to a file. If false, only console logging.
/// - `verbosity`: Number of `-d` flags given
///
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init_logging(
    component_name: &str,
    file_enabled: bool,
    verbosity: u8,
) -> io::Result<Option<WorkerGuard>> {
    if file_enabled {
        let log_dir = get_log_directory()?;
        fs::create_dir_all(&log_dir)?;

        let log_path = log_dir.join(format!("{}.log", component_name));
        truncate_if_needed(&log_path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let (non_blocking_file, guard) = tracing_appender::non_blocking(BufWriter::new(file));

        tracing_subscriber::registry()
            .with(default_filter(verbosity))
            .with(fmt::layer().with_writer(io::stderr).with_ansi(true))
            .with(
                fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_target(true),
            )
            .init();

        tracing::info!("Logging to file: {}", log_path.display());

        Ok(Some(guard))
    } else {
        // Console-only logging
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(default_filter(verbosity))
            .init();

        Ok(None)
    }
}

fn get_log_directory() -> io::Result<PathBuf> {
    ScriptableConfig::data_dir()
        .map(|dir| dir.join("logs"))
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Failed to find home directory"))
}

/// Truncate log file if it exceeds MAX_LOG_SIZE.
fn truncate_if_needed(log_path: &Path) -> io::Result<()> {
    if log_path.exists() {
        let metadata = fs::metadata(log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            let file = File::create(log_path)?;
            file.set_len(0)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_truncate_large_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![b'x'; (MAX_LOG_SIZE + 1) as usize])
            .unwrap();
        drop(file);

        truncate_if_needed(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_small_log_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.log");
        fs::write(&path, "line\n").unwrap();

        truncate_if_needed(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line\n");
    }
}
