//! Blocking external-process runner shared by the svn and git clients.

use std::process::Command;

use svnreplay_core::VcsError;

/// Run `cmd` to completion and return its stdout.
///
/// Non-zero exit becomes [`VcsError::CommandFailed`] carrying trimmed stderr.
pub(crate) fn run_for_stdout(cmd: &mut Command) -> Result<String, VcsError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let args = describe_args(cmd);
    tracing::debug!(%program, %args, "running");

    let output = cmd.output().map_err(|source| VcsError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            program,
            args,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Space-joined argument list with the value after `--password` masked.
pub(crate) fn describe_args(cmd: &Command) -> String {
    let mut out = Vec::new();
    let mut mask_next = false;
    for arg in cmd.get_args() {
        let arg = arg.to_string_lossy();
        if mask_next {
            out.push("***".to_string());
            mask_next = false;
            continue;
        }
        mask_next = arg == "--password";
        out.push(arg.into_owned());
    }
    out.join(" ")
}
