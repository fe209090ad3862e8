use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Error opening log file '{}': {error}", .path.display())]
    ErrorOpeningFile {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Logger already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the log file writer alive; pending lines are flushed on drop.
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Opens `path` for appending, creating it owner-readable only.
pub fn open_log_file(path: &Path) -> Result<File, LogError> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path).map_err(|e| LogError::ErrorOpeningFile {
        path: path.to_path_buf(),
        error: e,
    })
}

/// Installs the global subscriber.
///
/// Every event goes to `log_file` as a JSON line. Unless `disable_stdout`
/// is set, a plain-text copy is echoed on stdout. The level comes from
/// `RUST_LOG` and defaults to `info`.
pub fn init(disable_stdout: bool, log_file: &Path) -> Result<LogGuard, LogError> {
    let file = open_log_file(log_file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = (!disable_stdout).then(|| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(std::io::stdout)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(writer))
        .with(stdout)
        .try_init()?;

    Ok(LogGuard { _file: guard })
}
