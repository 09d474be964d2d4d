//! Bounded storage types shared by the symbol tables, compiler and evaluator.
//!
//! Names, variable maps and argument vectors live in fixed-capacity `heapless`
//! containers. The capacities below are the hard limits of a single expression.

use crate::Real;
use crate::error::{ExprError, Result};

/// Maximum length in bytes of a variable or function name.
pub const EXP_RPN_MAX_NAME_LEN: usize = 32;
/// Maximum number of declared variables per expression (power of two).
pub const EXP_RPN_MAX_VARIABLES: usize = 64;
/// Maximum number of functions in a function table (power of two).
pub const EXP_RPN_MAX_FUNCTIONS: usize = 64;
/// Maximum number of operators per arity class (power of two).
pub const EXP_RPN_MAX_OPERATORS: usize = 16;
/// Maximum declared arity of a function.
pub const EXP_RPN_MAX_ARITY: usize = 16;

/// Heapless string used for variable and function names.
pub type HString = heapless::String<EXP_RPN_MAX_NAME_LEN>;

/// Insertion-ordered variable binding; `None` marks a declared but unset variable.
pub type VariableMap = heapless::FnvIndexMap<HString, Option<Real>, EXP_RPN_MAX_VARIABLES>;

/// Fixed-size argument vector handed to operator and function implementations.
pub type ArgBuffer = heapless::Vec<Real, EXP_RPN_MAX_ARITY>;

/// Conversion of borrowed names into [`HString`].
pub trait TryIntoHeaplessString {
    fn try_into_heapless(self) -> Result<HString>;
}

impl TryIntoHeaplessString for &str {
    fn try_into_heapless(self) -> Result<HString> {
        let mut s = HString::new();
        s.push_str(self).map_err(|_| ExprError::StringTooLong)?;
        Ok(s)
    }
}

impl TryIntoHeaplessString for &String {
    fn try_into_heapless(self) -> Result<HString> {
        self.as_str().try_into_heapless()
    }
}

/// Returns true if `c` may start an identifier.
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true if `c` may continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continue),
        _ => false,
    }
}

/// Inserts or rebinds `name`, mapping a full table to `CapacityExceeded`.
///
/// Rebinding an existing name keeps its position in the map.
pub fn bind_variable(vars: &mut VariableMap, name: &str, value: Option<Real>) -> Result<()> {
    let key = name.try_into_heapless()?;
    vars.insert(key, value)
        .map(|_| ())
        .map_err(|_| ExprError::CapacityExceeded("variables"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("x"));
        assert!(is_identifier("_tmp1"));
        assert!(is_identifier("Alpha_2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier("a b"));
    }

    #[test]
    fn test_name_too_long() {
        let long = "a".repeat(EXP_RPN_MAX_NAME_LEN + 1);
        assert_eq!(long.as_str().try_into_heapless(), Err(ExprError::StringTooLong));
        let exact = "b".repeat(EXP_RPN_MAX_NAME_LEN);
        assert_eq!(exact.as_str().try_into_heapless().unwrap().len(), EXP_RPN_MAX_NAME_LEN);
    }

    #[test]
    fn test_bind_variable_keeps_order() {
        let mut vars = VariableMap::new();
        bind_variable(&mut vars, "b", None).unwrap();
        bind_variable(&mut vars, "a", Some(1.0)).unwrap();
        bind_variable(&mut vars, "b", Some(2.0)).unwrap();
        let names: Vec<&str> = vars.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(vars.values().copied().collect::<Vec<_>>(), [Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_bind_variable_capacity() {
        let mut vars = VariableMap::new();
        for i in 0..EXP_RPN_MAX_VARIABLES {
            bind_variable(&mut vars, &format!("v{}", i), None).unwrap();
        }
        assert_eq!(
            bind_variable(&mut vars, "overflow", None),
            Err(ExprError::CapacityExceeded("variables"))
        );
    }
}
