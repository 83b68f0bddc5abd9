//! Building and running a program
//!
//! The source is written to a fresh temporary directory, compiled with
//! rustc, and the resulting binary run with the caller's stdin and
//! stdout. The directory is removed once the run is over, whatever the
//! outcome.

use std::io::Write;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Result, RunError};
use crate::filter::relay_build_output;

/// File name the program source is written to.
pub const SOURCE_NAME: &str = "snippet.rs";

const CRATE_NAME: &str = "snippet";
const TEMP_PREFIX: &str = "rsnip_";

/// Options for building a program.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Compiler to invoke
    pub rustc: PathBuf,

    /// Rust edition to build with
    pub edition: String,

    /// Build with optimizations
    pub optimize: bool,

    /// Where per-run directories are created, the system temp dir if unset
    pub temp_root: Option<PathBuf>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self {
            rustc: PathBuf::from("rustc"),
            edition: "2021".to_string(),
            optimize: false,
            temp_root: None,
        }
    }

    pub fn rustc(mut self, rustc: impl Into<PathBuf>) -> Self {
        self.rustc = rustc.into();
        self
    }

    pub fn edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds and runs complete programs.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    options: RunOptions,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Build and run `source`.
    ///
    /// The program reads from `stdin` and writes to `stdout` directly.
    /// Compiler diagnostics and the program's own stderr go to `stderr`.
    pub async fn run<W>(&self, source: &str, stdin: Stdio, stdout: Stdio, stderr: &mut W) -> Result<()>
    where
        W: Write + ?Sized,
    {
        self.run_with_cancel(source, stdin, stdout, stderr, &CancellationToken::new())
            .await
    }

    /// Like [`Runner::run`], but stops early once `cancel` fires. Whichever
    /// process is running at that point is killed and reaped before
    /// [`RunError::Cancelled`] is returned.
    pub async fn run_with_cancel<W>(
        &self,
        source: &str,
        stdin: Stdio,
        stdout: Stdio,
        stderr: &mut W,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        W: Write + ?Sized,
    {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match &self.options.temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let source_path = dir.path().join(SOURCE_NAME);
        let binary_path = dir
            .path()
            .join(format!("{}{}", CRATE_NAME, std::env::consts::EXE_SUFFIX));
        std::fs::write(&source_path, source)?;
        debug!(path = %source_path.display(), "wrote program source");

        let mut build = Command::new(&self.options.rustc);
        build
            .arg("--edition")
            .arg(&self.options.edition)
            .args(["--crate-name", CRATE_NAME, "--crate-type", "bin"])
            .args(["--error-format=short", "--cap-lints", "allow"]);
        if self.options.optimize {
            build.args(["-C", "opt-level=3"]);
        }
        build
            .arg("-o")
            .arg(&binary_path)
            .arg(&source_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let program = self.options.rustc.display().to_string();
        info!(rustc = %program, edition = %self.options.edition, optimize = self.options.optimize, "building");
        let (status, diagnostics) = run_captured(build, &program, cancel).await?;
        if !status.success() {
            debug!(%status, "build failed");
            relay_build_output(&diagnostics, SOURCE_NAME, stderr)?;
            return Err(RunError::Build { status });
        }
        // anything a successful build prints is passed on as is
        stderr.write_all(&diagnostics)?;

        let mut run = Command::new(&binary_path);
        run.stdin(stdin).stdout(stdout).stderr(Stdio::piped());

        info!(binary = %binary_path.display(), "running");
        let program = binary_path.display().to_string();
        let (status, errors) = run_captured(run, &program, cancel).await?;
        stderr.write_all(&errors)?;
        stderr.flush()?;
        if !status.success() {
            debug!(%status, "program failed");
            return Err(RunError::Runtime { status });
        }

        Ok(())
    }
}

/// Run `command` to completion, collecting everything it writes to stderr.
async fn run_captured(
    mut command: Command,
    program: &str,
    cancel: &CancellationToken,
) -> Result<(ExitStatus, Vec<u8>)> {
    command.kill_on_drop(true);
    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let mut pipe = child.stderr.take();
    let capture = async move {
        let mut captured = Vec::new();
        if let Some(pipe) = pipe.as_mut() {
            pipe.read_to_end(&mut captured).await?;
        }
        Ok::<_, std::io::Error>(captured)
    };

    let finished = tokio::select! {
        (status, captured) = async { tokio::join!(child.wait(), capture) } => Some((status, captured)),
        _ = cancel.cancelled() => None,
    };

    match finished {
        Some((status, captured)) => Ok((status?, captured?)),
        None => {
            debug!(program, "cancelled, killing process");
            if let Err(err) = child.kill().await {
                debug!(program, %err, "kill failed");
            }
            Err(RunError::Cancelled)
        }
    }
}
