use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scan: ScanConfig,
    pub preview: PreviewConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Watched directory holding the scans.
    pub dir: PathBuf,
    /// File name globs that count as documents, matched case-insensitively.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file used by the interactive modes.
    pub file: PathBuf,
}

fn default_patterns() -> Vec<String> {
    vec!["*.pdf".to_string()]
}

/// Platform file-preview command: Quick Look on macOS, the desktop opener elsewhere.
pub fn default_preview_command() -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("qlmanage", vec!["-p".to_string()])
    } else if cfg!(target_os = "windows") {
        ("explorer", Vec::new())
    } else {
        ("xdg-open", Vec::new())
    }
}

/// Layered load: built-in defaults, then the config file (explicit path or
/// optional `config/default`), then `SCANSHELF__SECTION__KEY` variables.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let (preview_command, preview_args) = default_preview_command();
    let mut settings = config::Config::builder()
        .set_default("database.path", "documents.db")?
        .set_default("scan.dir", "scans")?
        .set_default("scan.patterns", default_patterns())?
        .set_default("scan.include_hidden", false)?
        .set_default("preview.command", preview_command)?
        .set_default("preview.args", preview_args)?
        .set_default("logging.level", "info")?
        .set_default("logging.file", "scanshelf.log")?;
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("SCANSHELF").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
