//! n1ql_compiler library - object query to N1QL statement compiler
//!
//! Compiles predicate trees and derived repository method names into N1QL
//! statement text with positionally or named bound parameters, plus the
//! configuration, command and output layers behind the `n1ql_compiler` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod mapping;
pub mod output;
pub mod query;
pub mod types;

pub use error::CompileError;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;
