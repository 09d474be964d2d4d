//! Recognition of the `name(arg1, arg2, ...) = body` declaration form.

use log::debug;

use crate::error::Result;
use crate::types::{TryIntoHeaplessString, VariableMap, bind_variable, is_identifier};

/// Strips a leading `name(args)=` header and declares each listed argument as an
/// unset variable.
///
/// The header is honored only when `=` appears after position 0 and the text before
/// it is an identifier followed by a parenthesized, comma-separated list of
/// identifiers (possibly empty). Otherwise the input is returned unchanged and the
/// `=` is left for the tokenizer to reject, so `a=1+2` is never an assignment.
/// Arguments already present in `variables` keep their value.
pub fn normalize<'a>(expression: &'a str, variables: &mut VariableMap) -> Result<&'a str> {
    let Some(eq) = expression.find('=').filter(|&i| i > 0) else {
        return Ok(expression);
    };
    let (header, body) = (&expression[..eq], &expression[eq + 1..]);
    let Some(params) = parse_header(header) else {
        return Ok(expression);
    };
    for &param in &params {
        if !variables.contains_key(&param.try_into_heapless()?) {
            bind_variable(variables, param, None)?;
        }
    }
    debug!("header '{}' declares {:?}", header.trim(), params);
    Ok(body)
}

/// Parses `name(a, b, ...)`, returning the argument names.
fn parse_header(header: &str) -> Option<Vec<&str>> {
    let header = header.trim();
    let open = header.find('(')?;
    let inner = header.strip_suffix(')')?.get(open + 1..)?;
    if !is_identifier(header[..open].trim()) {
        return None;
    }
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    let params: Vec<&str> = inner.split(',').map(str::trim).collect();
    params.iter().all(|p| is_identifier(p)).then_some(params)
}
