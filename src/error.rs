//! Error types for query compilation.
//!
//! Every failure is synchronous and final for the compile call that raised it:
//! no partial statement text is ever returned alongside an error.

use thiserror::Error;

/// Errors raised while compiling a predicate tree or a derived part sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unsupported operator {operator} with operands {operands}")]
    UnsupportedOperator { operator: String, operands: String },

    #[error("No property '{path}' found in mapping")]
    PropertyNotFound { path: String },

    #[error("Illegal argument: {message}")]
    IllegalArgument { message: String },

    #[error("Placeholder count {placeholders} does not match bound value count {values}")]
    BindingCountMismatch { placeholders: usize, values: usize },

    #[error("Criteria still holds an unresolved argument operand")]
    UnresolvedOperand,
}

impl CompileError {
    pub(crate) fn unsupported(operator: impl Into<String>, operands: impl Into<String>) -> Self {
        CompileError::UnsupportedOperator {
            operator: operator.into(),
            operands: operands.into(),
        }
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        CompileError::IllegalArgument {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        CompileError::PropertyNotFound { path: path.into() }
    }
}
