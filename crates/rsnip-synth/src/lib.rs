//! Snippet synthesizer
//!
//! Turns free-standing Rust statements into a complete program: the
//! statements are wrapped in `fn main`, the names they use without
//! defining are resolved against explicit imports and an index of the
//! standard library, and the result is printed with `use` declarations.

pub mod error;
pub mod scope;
pub mod stdlib;
pub mod synth;

pub use error::{Result, SynthError};
pub use stdlib::StdlibIndex;
pub use synth::{to_program, ImportHints, Synthesizer};
