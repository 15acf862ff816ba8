// src/job/shell.rs

//! Job that runs a shell command.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::job::{Job, JobBase};
use crate::types::JobType;

/// Runs `cmd` through the platform shell and captures its combined output.
///
/// A non-zero exit status becomes the job's terminal error.
#[derive(Debug)]
pub struct ShellJob {
    base: JobBase,
    cmd: String,
    working_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    output: String,
    exit_code: Option<i32>,
}

impl ShellJob {
    pub fn new(id: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            base: JobBase::new(id, JobType::new("shell", 1)),
            cmd: cmd.into(),
            working_dir: None,
            env: Vec::new(),
            output: String::new(),
            exit_code: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Captured stdout followed by stderr.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    fn execute(&mut self) -> Result<()> {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        info!(job = %self.base.id(), cmd = %self.cmd, "starting shell job");

        let output = cmd
            .output()
            .with_context(|| format!("spawning process for job '{}'", self.base.id()))?;

        self.output = String::from_utf8_lossy(&output.stdout).into_owned();
        self.output.push_str(&String::from_utf8_lossy(&output.stderr));
        self.exit_code = output.status.code();

        debug!(
            job = %self.base.id(),
            exit_code = ?self.exit_code,
            success = output.status.success(),
            "shell job exited"
        );

        if !output.status.success() {
            bail!(
                "command '{}' exited with status {}",
                self.cmd,
                self.exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string())
            );
        }

        Ok(())
    }
}

impl Job for ShellJob {
    fn base(&self) -> &JobBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut JobBase {
        &mut self.base
    }

    fn run(&mut self) {
        if self.base.completed() {
            return;
        }

        if let Err(err) = self.execute() {
            self.base.add_error(err.into());
        }
        self.base.mark_complete();
    }
}
