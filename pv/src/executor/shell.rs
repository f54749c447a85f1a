//! Shell executor - runs configured command lines for named actions

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::process::Command;

use colored::Colorize;
use tracing::{debug, info};

use super::{ActionError, ActionFlags, StepContext};

/// Runs each action as `sh -c <command line>` in a working directory
///
/// The command line comes from the action table; every `true` flag is
/// appended as `--<name>`. Child processes inherit stdio so prompts and
/// progress output reach the user directly.
pub struct ShellExecutor<W: Write = Stdout> {
    actions: BTreeMap<String, String>,
    workdir: PathBuf,
    dry_run: bool,
    out: W,
}

impl ShellExecutor<Stdout> {
    /// Create an executor writing status lines to stdout
    pub fn new(actions: BTreeMap<String, String>, workdir: impl Into<PathBuf>) -> Self {
        Self::with_writer(actions, workdir, io::stdout())
    }
}

impl<W: Write> ShellExecutor<W> {
    /// Create an executor writing status lines to `out`
    pub fn with_writer(actions: BTreeMap<String, String>, workdir: impl Into<PathBuf>, out: W) -> Self {
        let workdir = workdir.into();
        debug!(action_count = actions.len(), ?workdir, "ShellExecutor::with_writer: called");
        Self {
            actions,
            workdir,
            dry_run: false,
            out,
        }
    }

    /// Print command lines instead of running them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Consume the executor and hand back its writer
    pub fn into_writer(self) -> W {
        self.out
    }

    /// Resolve the full command line for an action
    pub fn command_line(&self, action: &str, flags: &ActionFlags) -> Result<String, ActionError> {
        let base = self.actions.get(action).ok_or_else(|| ActionError::UnknownAction {
            action: action.to_string(),
        })?;

        let mut line = base.trim().to_string();
        for (flag, _) in flags.iter().filter(|(_, enabled)| **enabled) {
            line.push_str(" --");
            line.push_str(flag);
        }
        Ok(line)
    }
}

impl<W: Write> ShellExecutor<W> {
    /// Status output is best effort; a broken writer never fails an action
    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", args) {
            debug!(error = %e, "ShellExecutor::emit: failed to write status output");
        }
    }
}

impl<W: Write> StepContext for ShellExecutor<W> {
    fn call(&mut self, action: &str, flags: &ActionFlags) -> Result<(), ActionError> {
        debug!(%action, ?flags, "ShellExecutor::call: called");
        let line = self.command_line(action, flags)?;

        if self.dry_run {
            debug!(%line, "ShellExecutor::call: dry run");
            self.emit(format_args!("{} {}", "would run:".dimmed(), line));
            return Ok(());
        }

        if let Err(e) = self.out.flush() {
            debug!(error = %e, "ShellExecutor::call: failed to flush status output");
        }
        info!(%action, %line, "Running action");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&line)
            .current_dir(&self.workdir)
            .status()
            .map_err(|source| {
                debug!(%source, "ShellExecutor::call: failed to spawn");
                ActionError::Spawn {
                    action: action.to_string(),
                    source,
                }
            })?;

        if status.success() {
            debug!(%action, "ShellExecutor::call: action succeeded");
            Ok(())
        } else {
            debug!(exit_code = ?status.code(), "ShellExecutor::call: action failed");
            Err(ActionError::Failed {
                action: action.to_string(),
                exit_code: status.code().unwrap_or(-1),
            })
        }
    }

    fn line(&mut self, text: &str) {
        self.emit(format_args!("{}", text));
    }

    fn info(&mut self, text: &str) {
        self.emit(format_args!("{}", text.green()));
    }
}
