pub mod cli;
pub mod output;

pub use cli::{CalcArgs, ViewArgs};
pub use output::{OutputError, read_run, read_run_from, write_run, write_run_to};
