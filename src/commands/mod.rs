//! Subcommand implementations.

mod run;
mod serve;

pub use run::{run, RunOptions};
pub use serve::{serve, ServeOptions};
