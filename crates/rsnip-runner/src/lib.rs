//! Builds and runs synthesized Rust programs.
//!
//! Each run gets its own temporary directory holding the source and the
//! compiled binary. Build failures are reported with the temporary paths
//! stripped from the compiler's diagnostics.

pub mod error;
pub mod filter;
pub mod runner;

pub use error::{Result, RunError};
pub use filter::{filter_build_output, BUILD_FAILURE_MARKER};
pub use runner::{RunOptions, Runner, SOURCE_NAME};
pub use tokio_util::sync::CancellationToken;
