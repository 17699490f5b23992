use std::fmt;
use std::io::ErrorKind;
use std::process::Output;

use async_process::{Command, Stdio};
use async_trait::async_trait;
use futures::io::AsyncWriteExt;
use refresher_ui::CancelSignal;

use crate::error::{Result, SessionError};

/// An external command to run: program, arguments, and optionally bytes to
/// feed on its standard input.
///
/// Secrets only ever travel through `stdin`, which is left out of both the
/// `Debug` and `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("stdin", &self.stdin.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Runs external commands on behalf of the orchestrator.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion and returns its standard output.
    ///
    /// Non-zero exits become [`SessionError::CommandFailed`]. If `cancel`
    /// fires first, the process is killed and [`SessionError::Cancelled`] is
    /// returned.
    async fn run(&self, command: &CommandSpec, cancel: &CancelSignal) -> Result<Vec<u8>>;
}

/// [`CommandRunner`] that spawns real child processes.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec, cancel: &CancelSignal) -> Result<Vec<u8>> {
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        tracing::debug!("Running `{command}`");
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SessionError::SpawnError {
                program: command.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let work = async move {
            if let (Some(input), Some(mut stdin)) = (&command.stdin, stdin) {
                // A client that exits early closes its end of the pipe; its
                // exit status says more than the broken pipe does.
                match stdin.write_all(input).await {
                    Err(err) if err.kind() != ErrorKind::BrokenPipe => return Err(err),
                    _ => {}
                }
                stdin.close().await.ok();
            }
            child.output().await
        };

        // Dropping `work` drops the child, which kills it.
        let output = cancel
            .run(work)
            .await
            .ok_or(SessionError::Cancelled)?
            .map_err(|source| SessionError::ProcessError {
                program: command.program.clone(),
                source,
            })?;
        check_status(command, output)
    }
}

fn check_status(command: &CommandSpec, output: Output) -> Result<Vec<u8>> {
    if output.status.success() {
        tracing::trace!("`{}` exited successfully", command.program);
        return Ok(output.stdout);
    }
    let status = match output.status.code() {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by a signal)".into(),
    };
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    Err(SessionError::CommandFailed {
        command: command.to_string(),
        status,
        stderr: if stderr.is_empty() { None } else { Some(stderr) },
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;

    #[test]
    fn display_and_debug_hide_stdin() {
        let spec = CommandSpec::new("docker")
            .args(["login", "--password-stdin", "example.com"])
            .stdin("s3cret");
        assert_eq!(spec.to_string(), "docker login --password-stdin example.com");
        assert!(!format!("{spec:?}").contains("s3cret"));
    }

    #[async_std::test]
    async fn captures_stdout() -> miette::Result<()> {
        let out = ProcessRunner::new()
            .run(
                &CommandSpec::new("sh").args(["-c", "printf hello"]),
                &CancelSignal::new(),
            )
            .await?;
        assert_eq!(out, b"hello");
        Ok(())
    }

    #[async_std::test]
    async fn feeds_stdin() -> miette::Result<()> {
        let out = ProcessRunner::new()
            .run(&CommandSpec::new("cat").stdin("tok"), &CancelSignal::new())
            .await?;
        assert_eq!(out, b"tok");
        Ok(())
    }

    #[async_std::test]
    async fn reports_failures() {
        let err = ProcessRunner::new()
            .run(
                &CommandSpec::new("sh").args(["-c", "echo nope >&2; exit 3"]),
                &CancelSignal::new(),
            )
            .await
            .unwrap_err();
        match err {
            SessionError::CommandFailed { status, stderr, .. } => {
                assert_eq!(status, "code 3");
                assert_eq!(stderr.as_deref(), Some("nope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[async_std::test]
    async fn missing_program() {
        let err = ProcessRunner::new()
            .run(
                &CommandSpec::new("definitely-not-a-real-binary-4242"),
                &CancelSignal::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SpawnError { .. }));
    }

    #[async_std::test]
    async fn cancellation_kills_the_process() {
        let cancel = CancelSignal::new();
        let remote = cancel.clone();
        async_std::task::spawn(async move {
            async_std::task::sleep(Duration::from_millis(50)).await;
            remote.cancel();
        });
        let start = Instant::now();
        let err = ProcessRunner::new()
            .run(&CommandSpec::new("sleep").arg("30"), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
