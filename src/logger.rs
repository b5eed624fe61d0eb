use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Routes `tracing` output to `log.txt` next to the executable, or stderr if
/// the file can't be opened. `RUST_LOG` overrides the default `info` level.
pub fn init() {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let path = exe_dir().join("log.txt");
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(f))
                .try_init();
        }
        Err(e) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .try_init();
            tracing::warn!("cannot open {}: {}; logging to stderr", path.display(), e);
        }
    }
    tracing::info!("===== warning-translator start =====");
}
