//! Error types and handling for the exp-rpn crate.
//!
//! Every failure in the pipeline, from building a custom function to evaluating a
//! compiled program, is reported through [`ExprError`]. Errors are returned
//! synchronously and are never recovered from internally.

use thiserror::Error;

/// Result type used throughout the crate.
///
/// This is a convenience type alias that uses the `ExprError` type for the error variant.
pub type Result<T> = core::result::Result<T, ExprError>;

/// Error type for expression compilation and evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// An identifier followed by `(` is not in the function table.
    ///
    /// Register the function with `ExpressionBuilder::with_function` before building.
    #[error("Unknown function '{name}' at position {position}")]
    UnknownFunction { name: String, position: usize },

    /// A caller-supplied function definition was rejected at construction.
    ///
    /// Names must match `[A-Za-z_][A-Za-z0-9_]*` and the arity must be between 1 and
    /// `EXP_RPN_MAX_ARITY`.
    #[error("Invalid custom function: {0}")]
    InvalidCustomFunction(String),

    /// A caller-supplied operator definition was rejected at construction.
    ///
    /// Operator symbols may not be characters the tokenizer already gives a meaning to:
    /// digits, letters, `_`, `.`, whitespace, parentheses or the argument separator.
    #[error("Invalid custom operator: {0}")]
    InvalidCustomOperator(String),

    /// The expression could not be compiled or evaluated.
    ///
    /// Covers unknown characters, malformed numbers, unknown or unbound variables,
    /// mismatched parentheses, misplaced separators, name collisions, arity
    /// mismatches and a residual operand stack that does not hold exactly one value.
    #[error("Unparsable expression: {0}")]
    Unparsable(String),

    /// A bounded symbol table is full.
    ///
    /// The string names the table that overflowed.
    #[error("Capacity exceeded for {0}")]
    CapacityExceeded(&'static str),

    /// A name is longer than `EXP_RPN_MAX_NAME_LEN` bytes.
    #[error("String too long for heapless buffer")]
    StringTooLong,
}

impl ExprError {
    pub(crate) fn unparsable(msg: impl Into<String>) -> Self {
        ExprError::Unparsable(msg.into())
    }

    /// Returns true for the errors the tokenizer, converter and evaluator raise for
    /// malformed input.
    pub fn is_unparsable(&self) -> bool {
        matches!(self, ExprError::Unparsable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_cites_position() {
        let err = ExprError::UnknownFunction {
            name: "foo".to_string(),
            position: 4,
        };
        assert_eq!(err.to_string(), "Unknown function 'foo' at position 4");
    }

    #[test]
    fn test_unparsable_helper() {
        let err = ExprError::unparsable("unknown character '$' at position 2");
        assert!(err.is_unparsable());
        assert_eq!(
            err.to_string(),
            "Unparsable expression: unknown character '$' at position 2"
        );
        assert!(!ExprError::StringTooLong.is_unparsable());
    }
}
