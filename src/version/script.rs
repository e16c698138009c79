// src/version/script.rs

//! Execution of per-package `check-version.sh` scripts
//!
//! Scripts run under `bash -e` in their package directory with the
//! repository's `.env` values added to the environment. Only stdout is
//! captured as the result; stderr is kept for error reporting. A script
//! that outlives the timeout is killed.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Name of the version-check script inside a package directory
pub const CHECK_SCRIPT: &str = "check-version.sh";

/// Default timeout for a version-check script (30 seconds)
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs version-check scripts with a shared environment and timeout
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: PathBuf,
    env: BTreeMap<String, String>,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(env: BTreeMap<String, String>) -> Self {
        Self {
            interpreter: PathBuf::from("bash"),
            env,
            timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the check script for `package_dir`, if it has one
    pub fn script_for(package_dir: &Path) -> Option<PathBuf> {
        let script = package_dir.join(CHECK_SCRIPT);
        script.is_file().then_some(script)
    }

    /// Run `script` and return its trimmed stdout
    pub fn run(&self, script: &Path) -> Result<String> {
        let workdir = script.parent().unwrap_or_else(|| Path::new("."));
        debug!("Running {}", script.display());

        let mut child = Command::new(&self.interpreter)
            .arg("-e")
            .arg(script)
            .current_dir(workdir)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Script(format!("failed to spawn {}: {}", CHECK_SCRIPT, e)))?;

        // Drain both pipes concurrently so a chatty script cannot block on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Script(format!(
                    "{} timed out after {} seconds",
                    CHECK_SCRIPT,
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = stdout.map(collect).unwrap_or_default();
        let stderr = stderr.map(collect).unwrap_or_default();

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            let detail = stderr.trim();
            return Err(Error::Script(if detail.is_empty() {
                format!("exit status {}", code)
            } else {
                format!("exit status {}: {}", code, detail)
            }));
        }

        Ok(stdout.trim().to_string())
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn collect(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
