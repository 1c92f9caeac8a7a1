//! Diff input acquisition: inline text, a file on disk, or the stdout of
//! an external version-control command.

use std::path::{Path, PathBuf};
use std::process::Command;

use tia_core::errors::DiffError;
use tracing::debug;

/// Where a diff comes from.
#[derive(Debug, Clone)]
pub enum DiffSource {
    /// The diff text itself.
    Text(String),
    /// Path to a diff file.
    File(PathBuf),
    /// External command (program, args) whose stdout is the diff,
    /// typically `git diff ...` run at the solution root.
    Command {
        program: String,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
    },
}

impl DiffSource {
    /// Resolve the source into diff text.
    pub fn read(&self) -> Result<String, DiffError> {
        match self {
            DiffSource::Text(text) => Ok(text.clone()),
            DiffSource::File(path) => read_diff_file(path),
            DiffSource::Command {
                program,
                args,
                working_dir,
            } => run_diff_command(program, args, working_dir.as_deref()),
        }
    }
}

fn read_diff_file(path: &Path) -> Result<String, DiffError> {
    if !path.exists() {
        return Err(DiffError::NotFound {
            path: path.display().to_string(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

fn run_diff_command(
    program: &str,
    args: &[String],
    working_dir: Option<&Path>,
) -> Result<String, DiffError> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    debug!(program, ?args, "running diff command");
    let output = command.output().map_err(|e| DiffError::Command {
        command: program.to_string(),
        message: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(DiffError::Command {
            command: program.to_string(),
            message: format!(
                "exit status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
