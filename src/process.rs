//! External tool invocation with captured output.
//!
//! Every build tool (`sbt`, `npm`, `git`, `docker`, `aws`) is run to
//! completion with stdout and stderr captured, so the last output can be
//! reported when a run fails.

use crate::error::ToolError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A fully described external command
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl ToolCommand {
    /// Start describing an invocation of `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the current directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Command line as it would be typed, for logs and errors
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run to completion and return combined stdout and stderr.
    ///
    /// A non-zero exit status is an error carrying the captured output.
    pub async fn run(&self) -> Result<String, ToolError> {
        let command_line = self.display();
        log::debug!("Running: {}", command_line);

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|source| ToolError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ToolError::Failed {
                command: command_line,
                code: output.status.code().unwrap_or(-1),
                output: captured,
            });
        }

        Ok(captured)
    }
}
