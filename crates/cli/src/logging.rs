use anyhow::Context;
use scanshelf_core::config::LoggingConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub enum LogTarget {
    /// Interactive modes own the terminal, so logs go to the configured file.
    File,
    Stderr,
}

/// `RUST_LOG` wins over the configured level.
pub fn filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level))
}

pub fn init(cfg: &LoggingConfig, target: LogTarget) -> anyhow::Result<()> {
    match target {
        LogTarget::File => {
            if let Some(parent) = cfg.file.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create log dir {}", parent.display()))?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&cfg.file)
                .with_context(|| format!("open log file {}", cfg.file.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(cfg))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(cfg))
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
