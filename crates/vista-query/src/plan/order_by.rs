//! Separating a base query from its trailing top-level ORDER BY.
//!
//! A byte scanner tracks parenthesis depth, quoted regions and comments, so
//! an `ORDER BY` nested in a subquery, a string literal, a quoted identifier
//! or a comment is never mistaken for the outer one. Comments trailing
//! either half are dropped.

use crate::error::BuildError;

/// A base query split at its last top-level `ORDER BY`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitQuery<'a> {
    /// Query without terminator or outer ordering
    pub base: &'a str,
    /// Ordering expressions, without the `ORDER BY` keywords
    pub order_by: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

/// Trim a trailing terminator and split off the outer `ORDER BY`
pub fn split_order_by(query: &str) -> Result<SplitQuery<'_>, BuildError> {
    let trimmed = query
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if trimmed.is_empty() {
        return Err(BuildError::EmptyQuery);
    }

    let bytes = trimmed.as_bytes();
    let mut state = Scan::Code;
    let mut depth: usize = 0;
    // End of the last byte that is neither whitespace, comment nor terminator
    let mut last_code: usize = 0;
    // (end of the base query, start of the ordering expressions)
    let mut found: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        let next = bytes.get(i + 1).copied();
        // Position after which an ORDER keyword may start
        let mut boundary = false;

        match state {
            Scan::SingleQuoted => {
                if byte == b'\'' {
                    state = Scan::Code;
                    last_code = i + 1;
                }
            }
            Scan::DoubleQuoted => {
                if byte == b'"' {
                    state = Scan::Code;
                    last_code = i + 1;
                }
            }
            Scan::LineComment => {
                if byte == b'\n' {
                    state = Scan::Code;
                    boundary = true;
                }
            }
            Scan::BlockComment => {
                if byte == b'*' && next == Some(b'/') {
                    state = Scan::Code;
                    i += 1;
                    boundary = true;
                }
            }
            Scan::Code => match byte {
                b'-' if next == Some(b'-') => {
                    state = Scan::LineComment;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    state = Scan::BlockComment;
                    i += 1;
                }
                b'\'' => state = Scan::SingleQuoted,
                b'"' => state = Scan::DoubleQuoted,
                b'(' => {
                    depth += 1;
                    last_code = i + 1;
                }
                b')' => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        BuildError::MalformedQuery("unbalanced ')'".to_string())
                    })?;
                    last_code = i + 1;
                }
                b';' => {}
                _ if byte.is_ascii_whitespace() => boundary = true,
                _ => last_code = i + 1,
            },
        }

        if boundary && depth == 0 && state == Scan::Code {
            if let Some(len) = order_by_keywords(&bytes[i + 1..]) {
                found = Some((last_code, i + 1 + len));
            }
        }
        i += 1;
    }

    match state {
        Scan::Code | Scan::LineComment => {}
        Scan::BlockComment => {
            return Err(BuildError::MalformedQuery(
                "unterminated comment".to_string(),
            ))
        }
        Scan::SingleQuoted | Scan::DoubleQuoted => {
            return Err(BuildError::MalformedQuery(
                "unterminated quoted literal".to_string(),
            ))
        }
    }
    if depth != 0 {
        return Err(BuildError::MalformedQuery("unbalanced '('".to_string()));
    }

    let split = match found {
        Some((base_end, clause_at)) if clause_at < last_code => SplitQuery {
            base: &trimmed[..base_end],
            order_by: Some(&trimmed[clause_at..last_code]),
        },
        _ => SplitQuery {
            base: &trimmed[..last_code],
            order_by: None,
        },
    };
    if split.base.is_empty() {
        return Err(BuildError::EmptyQuery);
    }
    Ok(split)
}

/// Length of `ORDER<ws>BY<ws>` at the start of `rest`, if present
fn order_by_keywords(rest: &[u8]) -> Option<usize> {
    let pos = keyword(rest, 0, b"order")?;
    let pos = whitespace(rest, pos)?;
    let pos = keyword(rest, pos, b"by")?;
    whitespace(rest, pos)
}

fn keyword(rest: &[u8], pos: usize, word: &[u8]) -> Option<usize> {
    let end = pos + word.len();
    (rest.len() >= end && rest[pos..end].eq_ignore_ascii_case(word)).then_some(end)
}

fn whitespace(rest: &[u8], pos: usize) -> Option<usize> {
    let run = rest[pos..]
        .iter()
        .take_while(|byte| byte.is_ascii_whitespace())
        .count();
    (run > 0).then_some(pos + run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(
        "SELECT id, name FROM users ORDER BY id ASC",
        "SELECT id, name FROM users",
        Some("id ASC")
        ; "simple trailing order"
    )]
    #[test_case(
        "SELECT id FROM users order   by\n id DESC, name;",
        "SELECT id FROM users",
        Some("id DESC, name")
        ; "lower case with odd whitespace and terminator"
    )]
    #[test_case(
        "SELECT * FROM (SELECT id FROM t ORDER BY id) x",
        "SELECT * FROM (SELECT id FROM t ORDER BY id) x",
        None
        ; "nested order is ignored"
    )]
    #[test_case(
        "SELECT * FROM (SELECT id FROM t ORDER BY id) x ORDER BY x.id DESC",
        "SELECT * FROM (SELECT id FROM t ORDER BY id) x",
        Some("x.id DESC")
        ; "outer order after nested order"
    )]
    #[test_case(
        "SELECT 'a ORDER BY b' AS s FROM t",
        "SELECT 'a ORDER BY b' AS s FROM t",
        None
        ; "order inside string literal is ignored"
    )]
    #[test_case(
        "SELECT \"weird ORDER BY col\" FROM t",
        "SELECT \"weird ORDER BY col\" FROM t",
        None
        ; "order inside quoted identifier is ignored"
    )]
    #[test_case(
        "WITH c AS (SELECT 1 AS n) SELECT n FROM c ORDER BY n",
        "WITH c AS (SELECT 1 AS n) SELECT n FROM c",
        Some("n")
        ; "cte"
    )]
    #[test_case(
        "SELECT border_by FROM t",
        "SELECT border_by FROM t",
        None
        ; "identifier containing keywords"
    )]
    #[test_case(
        "SELECT 'it''s' FROM t ORDER BY 1",
        "SELECT 'it''s' FROM t",
        Some("1")
        ; "escaped quote inside literal"
    )]
    #[test_case(
        "SELECT id FROM t -- don't touch\nORDER BY id",
        "SELECT id FROM t",
        Some("id")
        ; "line comment with apostrophe"
    )]
    #[test_case(
        "SELECT id /* (unbalanced */ FROM t ORDER BY id DESC",
        "SELECT id /* (unbalanced */ FROM t",
        Some("id DESC")
        ; "block comment with paren"
    )]
    #[test_case(
        "SELECT id FROM t -- ORDER BY name",
        "SELECT id FROM t",
        None
        ; "order inside line comment is ignored"
    )]
    #[test_case(
        "SELECT id FROM t /* ORDER BY name */",
        "SELECT id FROM t",
        None
        ; "order inside block comment is ignored"
    )]
    #[test_case(
        "SELECT id FROM t ORDER BY id -- newest last\n;",
        "SELECT id FROM t",
        Some("id")
        ; "trailing comment after order"
    )]
    #[test_case(
        "SELECT id FROM t /* note */\nORDER BY\n  id, -- primary\n  name",
        "SELECT id FROM t",
        Some("id, -- primary\n  name")
        ; "comment inside order list"
    )]
    #[test_case(
        "SELECT '--not a comment' AS s FROM t ORDER BY s",
        "SELECT '--not a comment' AS s FROM t",
        Some("s")
        ; "dashes inside literal"
    )]
    #[test_case(
        "SELECT 10-1 AS n FROM t /*x*/ORDER BY n",
        "SELECT 10-1 AS n FROM t",
        Some("n")
        ; "order right after comment"
    )]
    fn test_split(query: &str, base: &str, order_by: Option<&str>) {
        let split = split_order_by(query).unwrap();
        assert_eq!(split.base, base);
        assert_eq!(split.order_by, order_by);
    }

    #[test_case("" ; "empty")]
    #[test_case("  ;  " ; "only terminator")]
    #[test_case("-- nothing here" ; "only comment")]
    fn test_empty_query(query: &str) {
        assert_eq!(split_order_by(query), Err(BuildError::EmptyQuery));
    }

    #[test_case("SELECT (1 FROM t" ; "unclosed paren")]
    #[test_case("SELECT 1) FROM t" ; "stray close paren")]
    #[test_case("SELECT 'abc FROM t" ; "unterminated literal")]
    #[test_case("SELECT 1 /* never closed" ; "unterminated block comment")]
    fn test_malformed_query(query: &str) {
        assert!(matches!(
            split_order_by(query),
            Err(BuildError::MalformedQuery(_))
        ));
    }
}
