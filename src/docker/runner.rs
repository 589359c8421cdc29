use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

use super::types::ProcessOutput;

/// Runs one engine subcommand to completion.
///
/// A binary that cannot be launched is reported as [`Error::Spawn`]; a
/// non-zero exit is *not* an error at this layer and is left to the caller
/// to interpret via [`ProcessOutput::success`].
pub trait ProcessRunner {
    /// Engine name used in log lines and error messages.
    fn program(&self) -> &str;

    fn run(&self, args: &[&str]) -> Result<ProcessOutput>;
}

/// Runs the real engine CLI, blocking until it exits.
#[derive(Debug, Clone)]
pub struct CliRunner {
    program: String,
    prefix: Vec<String>,
}

impl CliRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    /// Build a runner from a command line such as `sudo docker` or
    /// `podman --remote`. The first word is the program; the rest are
    /// prepended to every invocation.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut words = shell_words::split(line)
            .map_err(|e| Error::Config(format!("invalid engine command `{line}`: {e}")))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| Error::Config("engine command is empty".into()))?;
        Ok(Self {
            program,
            prefix: words.collect(),
        })
    }
}

impl ProcessRunner for CliRunner {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[&str]) -> Result<ProcessOutput> {
        debug!(program = %self.program, ?args, "invoking engine");
        let output = Command::new(&self.program)
            .args(&self.prefix)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
