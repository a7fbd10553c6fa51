//! External program execution.
//!
//! Every bioinformatics binary is launched through [`ToolRunner`], which
//! optionally wraps the call in `conda run -n <env>` and turns non-zero exit
//! codes into [`ToolError::ExternalProcess`] carrying the captured stderr.
//! A configured tool directory is searched before `PATH`.

use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

use crate::ToolError;

/// A program invocation with a fixed argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Start a command for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments after the program name.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Label used in logs and errors, e.g. `samtools sort`.
    pub fn label(&self) -> String {
        match self.args.first().and_then(|a| a.to_str()) {
            Some(sub) if !sub.starts_with('-') && !sub.contains('/') && !sub.contains('.') => {
                format!("{} {}", self.program, sub)
            }
            _ => self.program.clone(),
        }
    }
}

/// Launches [`ToolCommand`]s, optionally inside a conda environment.
#[derive(Debug, Clone, Default)]
pub struct ToolRunner {
    conda_env: Option<String>,
    tool_dir: Option<PathBuf>,
}

impl ToolRunner {
    /// Create a runner. With `Some(env)` every program runs via
    /// `conda run -n <env>`.
    pub fn new(conda_env: Option<String>) -> Self {
        Self {
            conda_env,
            tool_dir: None,
        }
    }

    /// Resolve programs in `dir` first when present there.
    pub fn with_tool_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.tool_dir = dir;
        self
    }

    /// Program path handed to the launcher: `<tool_dir>/<program>` when that
    /// file exists, otherwise the bare name for a `PATH` lookup.
    pub fn resolve(&self, program: &str) -> OsString {
        match &self.tool_dir {
            Some(dir) if dir.join(program).is_file() => dir.join(program).into_os_string(),
            _ => OsString::from(program),
        }
    }

    /// Build the concrete `std::process::Command` for a tool invocation.
    pub fn command(&self, tool: &ToolCommand) -> Command {
        let program = self.resolve(tool.program());
        let mut cmd = match &self.conda_env {
            Some(env) => {
                let mut cmd = Command::new("conda");
                cmd.args(["run", "-n", env.as_str()]).arg(program);
                cmd
            }
            None => Command::new(program),
        };
        cmd.args(tool.arguments());
        cmd
    }

    /// Run to completion, capturing stdout and stderr.
    pub fn run(&self, tool: &ToolCommand) -> Result<Output, ToolError> {
        tracing::debug!(command = %tool.label(), args = ?tool.arguments(), "running external tool");
        let output = self
            .command(tool)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| spawn_error(tool, source))?;
        check_status(tool, output.status, &output.stderr)?;
        Ok(output)
    }

    /// Run to completion with stdout redirected into `destination`.
    pub fn run_to_file(&self, tool: &ToolCommand, destination: &Path) -> Result<(), ToolError> {
        tracing::debug!(
            command = %tool.label(),
            args = ?tool.arguments(),
            stdout = %destination.display(),
            "running external tool"
        );
        let sink = File::create(destination)?;
        let output = self
            .command(tool)
            .stdin(Stdio::null())
            .stdout(Stdio::from(sink))
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| spawn_error(tool, source))?;
        check_status(tool, output.status, &output.stderr)
    }

    /// Run `producer | consumer`, checking the exit status of both stages.
    ///
    /// A consumer failure is reported first since it usually explains a
    /// producer killed by a closed pipe.
    pub fn run_piped(&self, producer: &ToolCommand, consumer: &ToolCommand) -> Result<(), ToolError> {
        tracing::debug!(
            producer = %producer.label(),
            consumer = %consumer.label(),
            "running piped external tools"
        );
        let mut upstream = self
            .command(producer)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| spawn_error(producer, source))?;

        let pipe = upstream
            .stdout
            .take()
            .ok_or_else(|| spawn_error(producer, std::io::Error::other("stdout was not captured")))?;

        // Drain producer stderr concurrently so a chatty producer cannot block.
        let stderr_drain = upstream.stderr.take().map(|mut stream| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stream.read_to_end(&mut buf);
                buf
            })
        });

        let downstream = self
            .command(consumer)
            .stdin(Stdio::from(pipe))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        // Reap the producer even when the consumer could not be launched.
        let upstream_status = upstream
            .wait()
            .map_err(|source| spawn_error(producer, source))?;
        let upstream_stderr = stderr_drain
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        let downstream = downstream.map_err(|source| spawn_error(consumer, source))?;

        check_status(consumer, downstream.status, &downstream.stderr)?;
        check_status(producer, upstream_status, &upstream_stderr)
    }
}

fn spawn_error(tool: &ToolCommand, source: std::io::Error) -> ToolError {
    ToolError::Spawn {
        tool: tool.label(),
        source,
    }
}

fn check_status(tool: &ToolCommand, status: ExitStatus, stderr: &[u8]) -> Result<(), ToolError> {
    if status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    tracing::error!(command = %tool.label(), %status, "external tool failed");
    Err(ToolError::ExternalProcess {
        tool: tool.label(),
        status: status.to_string(),
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_include_subcommand() {
        let cmd = ToolCommand::new("samtools").args(["sort", "in.bam"]);
        assert_eq!(cmd.label(), "samtools sort");
        let cmd = ToolCommand::new("wgsim").args(["-N", "10"]);
        assert_eq!(cmd.label(), "wgsim");
    }

    #[test]
    fn conda_prefix_wraps_program() {
        let runner = ToolRunner::new(Some("bio_agent_env".into()));
        let cmd = runner.command(&ToolCommand::new("bwa").args(["index", "ref.fa"]));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "conda");
        assert_eq!(args, ["run", "-n", "bio_agent_env", "bwa", "index", "ref.fa"]);
    }

    #[test]
    fn tool_dir_takes_precedence_when_program_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bwa"), "").unwrap();
        let runner = ToolRunner::default().with_tool_dir(Some(dir.path().to_path_buf()));
        assert_eq!(runner.resolve("bwa"), dir.path().join("bwa").into_os_string());
        assert_eq!(runner.resolve("samtools"), OsString::from("samtools"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_stderr() {
        let runner = ToolRunner::default();
        let cmd = ToolCommand::new("sh").args(["-c", "echo boom >&2; exit 3"]);
        match runner.run(&cmd) {
            Err(ToolError::ExternalProcess { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected external process failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn piped_run_reports_producer_failure() {
        let runner = ToolRunner::default();
        let producer = ToolCommand::new("sh").args(["-c", "echo upstream >&2; exit 2"]);
        let consumer = ToolCommand::new("cat");
        match runner.run_piped(&producer, &consumer) {
            Err(ToolError::ExternalProcess { stderr, .. }) => assert_eq!(stderr, "upstream"),
            other => panic!("expected producer failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_redirected_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let runner = ToolRunner::default();
        runner
            .run_to_file(&ToolCommand::new("sh").args(["-c", "echo hello"]), &out)
            .unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "hello\n");
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let runner = ToolRunner::default();
        let err = runner
            .run(&ToolCommand::new("definitely-not-a-real-binary-xyz"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
