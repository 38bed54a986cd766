//! Command line surface: `serve`, `migrate`, `export` and `probe`.

pub mod runtime;

pub use runtime::{Cli, Commands};
