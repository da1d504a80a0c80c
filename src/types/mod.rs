//! Shared result types for the command-line front end.

mod compiled;

pub use compiled::CompileResult;
