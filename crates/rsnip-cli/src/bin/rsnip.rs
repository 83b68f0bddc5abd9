//! rsnip - run Rust statements from the command line.
//!
//! The statements are wrapped in `fn main`, the imports they need are
//! worked out from the standard library (or given with `-i`), and the
//! result is built with rustc and run:
//!
//! ```text
//! $ rsnip 'println!("{:?}", Instant::now())'
//! $ rsnip -i std::sync::atomic::Ordering 'let o = Ordering::SeqCst' 'println!("{:?}", o)'
//! ```

use std::path::PathBuf;
use std::process::{ExitCode, Stdio};

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rsnip_runner::{RunError, RunOptions, Runner};
use tokio_util::sync::CancellationToken;

/// Exit code used when the run is interrupted with Ctrl-C.
const INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "rsnip")]
#[command(about = "Run Rust statements without writing the boilerplate around them")]
#[command(version)]
struct Args {
    /// Statements to run, in order
    #[arg(value_name = "STATEMENT", required = true)]
    statements: Vec<String>,

    /// Import a path explicitly; may be repeated
    #[arg(short, long = "import", value_name = "PATH")]
    imports: Vec<String>,

    /// Print the full program to stderr before running it
    #[arg(short, long)]
    debug: bool,

    /// Compiler to build with
    #[arg(long, env = "RUSTC", default_value = "rustc", value_name = "PATH")]
    rustc: PathBuf,

    /// Rust edition to build with
    #[arg(long, default_value = "2021", value_parser = ["2015", "2018", "2021", "2024"])]
    edition: String,

    /// Build with optimizations
    #[arg(short = 'O', long)]
    release: bool,

    /// Directory to build in instead of the system temp dir
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,
}

impl Args {
    fn run_options(&self) -> RunOptions {
        let options = RunOptions::new()
            .rustc(self.rustc.clone())
            .edition(self.edition.clone())
            .optimize(self.release);
        match &self.temp_dir {
            Some(dir) => options.temp_root(dir.clone()),
            None => options,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("rsnip: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<u8> {
    let source = match rsnip_synth::to_program(args.statements.as_slice(), args.imports.as_slice()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(1);
        }
    };
    if args.debug {
        eprint!("{}", source);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted");
            interrupt.cancel();
        }
    });

    let runner = Runner::new(args.run_options());
    let mut stderr = std::io::stderr();
    let result = runner
        .run_with_cancel(&source, Stdio::inherit(), Stdio::inherit(), &mut stderr, &cancel)
        .await;

    match result {
        Ok(()) => Ok(0),
        Err(e) => match failure_code(&e) {
            Some(code) => {
                if let RunError::Runtime { status } = &e {
                    if status.code().is_none() {
                        eprintln!("rsnip: program terminated by {}", status);
                    }
                }
                Ok(code)
            }
            None => Err(e).context("failed to run program"),
        },
    }
}

/// Process exit code for a failed run, or `None` if the failure is the
/// tool's own rather than the program's.
fn failure_code(err: &RunError) -> Option<u8> {
    match err {
        RunError::Build { .. } => Some(1),
        RunError::Runtime { .. } => Some(
            err.exit_code()
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(1),
        ),
        RunError::Cancelled => Some(INTERRUPTED),
        RunError::Io(_) | RunError::Spawn { .. } => None,
    }
}
