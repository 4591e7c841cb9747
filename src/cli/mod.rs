pub mod commands;
pub mod context;
pub mod output;
mod shell;

pub use shell::run_cli;
