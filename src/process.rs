//! Cancellable subprocess execution
//!
//! Every collaborator that shells out goes through [`run`]. The child is
//! killed if the cancellation token fires before it exits.

use crate::error::{SuitemapError, SuitemapResult};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Run `program` with `args` in `dir` and capture its output
///
/// Fails with [`SuitemapError::CommandExecution`] on a non-zero exit and
/// [`SuitemapError::Cancelled`] if `cancel` fires first.
pub async fn run<I, S>(
    program: &str,
    args: I,
    dir: &Path,
    cancel: &CancellationToken,
) -> SuitemapResult<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let command = display_command(program, &args);

    if cancel.is_cancelled() {
        return Err(SuitemapError::Cancelled);
    }
    debug!("Executing: {} (in {})", command, dir.display());

    let child = Command::new(program)
        .args(&args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SuitemapError::command_failed(&command, e))?;

    let output = tokio::select! {
        output = child.wait_with_output() => {
            output.map_err(|e| SuitemapError::command_failed(&command, e))?
        }
        _ = cancel.cancelled() => {
            debug!("Cancelled: {}", command);
            return Err(SuitemapError::Cancelled);
        }
    };

    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(SuitemapError::command_exec(command, stderr.trim()))
    }
}

/// Run `program` and return its trimmed stdout
pub async fn run_stdout<I, S>(
    program: &str,
    args: I,
    dir: &Path,
    cancel: &CancellationToken,
) -> SuitemapResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run(program, args, dir, cancel).await?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn display_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut out = program.to_string();
    for arg in args {
        out.push(' ');
        out.push_str(&arg.as_ref().to_string_lossy());
    }
    out
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn command_line_for_messages() {
        assert_eq!(
            display_command("git", &["ls-remote", "--heads", "origin"]),
            "git ls-remote --heads origin"
        );
    }

    #[tokio::test]
    async fn runs_with_debug_logging() {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_test_writer()
                .finish(),
        );
        let dir = TempDir::new().unwrap();
        let out = run_stdout("echo", ["logged"], dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, "logged");
    }

    #[tokio::test]
    async fn captures_stdout() {
        let dir = TempDir::new().unwrap();
        let out = run_stdout("echo", ["hello"], dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn nonzero_exit_is_error() {
        let dir = TempDir::new().unwrap();
        let err = run("false", Vec::<String>::new(), dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SuitemapError::CommandExecution { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_error() {
        let dir = TempDir::new().unwrap();
        let err = run(
            "suitemap-definitely-missing",
            ["x"],
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SuitemapError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn cancellation_kills_child() {
        let dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = run("sleep", ["30"], dir.path(), &cancel).await.unwrap_err();

        assert!(matches!(err, SuitemapError::Cancelled));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn already_cancelled_does_not_spawn() {
        let dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run("echo", ["x"], dir.path(), &cancel).await.unwrap_err();
        assert!(matches!(err, SuitemapError::Cancelled));
    }
}
