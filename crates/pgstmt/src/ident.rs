//! Identifier checks and quoting.
//!
//! Table, column and join-alias names are spliced into statement text, so they
//! are checked when a statement is constructed:
//!
//! - each dotted part must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - output aliases and ORDER BY keys are always emitted double-quoted, with
//!   any embedded `"` doubled
//!
//! # Example
//! ```ignore
//! use pgstmt::ident::{check_ident, quote_ident};
//!
//! check_ident("table", "public.t_users")?;
//! assert_eq!(quote_ident("t_users.c_email"), r#""t_users.c_email""#);
//! # Ok::<(), pgstmt::OrmError>(())
//! ```

use crate::error::{OrmError, OrmResult};

/// Check that `name` is a plain (optionally dotted) SQL identifier.
///
/// `what` names the role of the identifier in the error message
/// (e.g. "table", "column", "join alias").
pub fn check_ident(what: &str, name: &str) -> OrmResult<()> {
    if name.is_empty() {
        return Err(OrmError::validation(format!("{what} name cannot be empty")));
    }

    for part in name.split('.') {
        let mut chars = part.chars();
        match chars.next() {
            None => {
                return Err(OrmError::validation(format!(
                    "Empty segment in {what} name '{name}'"
                )));
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
            Some(c) => {
                return Err(OrmError::validation(format!(
                    "Invalid start character '{c}' in {what} name '{name}'"
                )));
            }
        }
        if let Some(c) = chars.find(|c| !(*c == '_' || *c == '$' || c.is_ascii_alphanumeric())) {
            return Err(OrmError::validation(format!(
                "Invalid character '{c}' in {what} name '{name}'"
            )));
        }
    }

    Ok(())
}

/// Render `name` as a double-quoted identifier.
///
/// Dots stay inside the quotes, so `t.c` becomes the single identifier `"t.c"`.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name);
    out
}

pub(crate) fn write_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_and_dotted() {
        assert!(check_ident("table", "t_sys_users").is_ok());
        assert!(check_ident("table", "public.t_sys_users").is_ok());
        assert!(check_ident("column", "my_var$1").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(check_ident("table", "").is_err());
    }

    #[test]
    fn rejects_start_digit() {
        assert!(check_ident("table", "1table").is_err());
    }

    #[test]
    fn rejects_injection_attempt() {
        let err = check_ident("column", "c_email; DROP TABLE t").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_double_and_trailing_dot() {
        assert!(check_ident("table", "schema..table").is_err());
        assert!(check_ident("table", "schema.").is_err());
    }

    #[test]
    fn quoting_keeps_dots_and_doubles_quotes() {
        assert_eq!(quote_ident("t_users.c_email"), r#""t_users.c_email""#);
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }
}
