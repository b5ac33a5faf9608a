//! Quicklook: hand a cataloged file to the platform previewer.

use crate::config::PreviewConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Previewer {
    program: String,
    args: Vec<String>,
}

impl Previewer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &PreviewConfig) -> Self {
        Self::new(cfg.command.clone(), cfg.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The preview command for `path`, with all standard streams detached.
    pub fn command_for(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// Spawn the previewer for `dir/filename` without waiting for it.
    pub fn quicklook(&self, dir: &Path, filename: &str) -> io::Result<PathBuf> {
        let path = dir.join(filename);
        self.spawn_reaped(&path)?;
        Ok(path)
    }

    /// Launch the previewer and wait on it from a background thread so the
    /// exited child is reaped. The handle yields its exit status.
    pub fn spawn_reaped(&self, path: &Path) -> io::Result<JoinHandle<Option<ExitStatus>>> {
        let mut child = match self.command_for(path).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(path = %path.display(), program = %self.program, "preview failed: {e}");
                return Err(e);
            }
        };
        let pid = child.id();
        debug!(path = %path.display(), pid, "preview launched");
        thread::Builder::new()
            .name(format!("preview-{pid}"))
            .spawn(move || match child.wait() {
                Ok(status) => {
                    debug!(pid, %status, "preview exited");
                    Some(status)
                }
                Err(e) => {
                    warn!(pid, "waiting on preview failed: {e}");
                    None
                }
            })
    }
}
