//! Statement rendering.
//!
//! Wraps an order-free base query as a subquery and appends predicates,
//! ordering and a row limit, numbering parameters for the dialect.

use crate::compile::Predicate;
use crate::dialect::Dialect;
use serde_json::Value;

/// Alias given to the wrapped base query
pub const SOURCE_ALIAS: &str = "src";

/// Output from rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    /// The generated statement
    pub sql: String,
    /// Positional parameters in emission order
    pub args: Vec<Value>,
}

/// `SELECT * FROM (<base>) AS src [WHERE ..] [ORDER BY ..] [LIMIT ..]`
#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    base: String,
    predicates: Vec<Predicate>,
    order_by: Option<String>,
    limit: Option<u64>,
}

impl SelectStatement {
    /// Start from an order-free base query
    pub fn wrap(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Default::default()
        }
    }

    /// Add a predicate, conjunctively
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_sql(&self, dialect: &Dialect) -> RenderedQuery {
        let mut sql = format!("SELECT * FROM ({}) AS {}", self.base, SOURCE_ALIAS);
        let mut args = Vec::new();

        if !self.predicates.is_empty() {
            let conditions: Vec<String> = self
                .predicates
                .iter()
                .map(|predicate| {
                    let fragment = number_markers(
                        &predicate.sql,
                        dialect,
                        args.len(),
                        predicate.args.len(),
                    );
                    args.extend(predicate.args.iter().cloned());
                    fragment
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        RenderedQuery { sql, args }
    }
}

/// Replace the last `count` markers of a generated fragment with the
/// dialect placeholder, continuing the numbering after `bound` earlier
/// arguments.
///
/// Compiled fragments put every marker after the column expression, so any
/// earlier `?` belongs to the expression itself (a jsonb operator, say) and
/// is left alone.
fn number_markers(fragment: &str, dialect: &Dialect, bound: usize, count: usize) -> String {
    let literal = fragment.matches('?').count().saturating_sub(count);
    let mut out = String::with_capacity(fragment.len());
    let mut seen = 0;
    let mut index = bound;
    for ch in fragment.chars() {
        if ch == '?' {
            seen += 1;
            if seen > literal {
                index += 1;
                out.push_str(&dialect.placeholder.render(index));
                continue;
            }
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn predicate(sql: &str, args: Vec<Value>) -> Predicate {
        Predicate::new(sql, args)
    }

    #[test]
    fn test_render_bare_wrap() {
        let result = SelectStatement::wrap("SELECT id FROM users").to_sql(&Dialect::SQLITE);

        assert_eq!(result.sql, "SELECT * FROM (SELECT id FROM users) AS src");
        assert!(result.args.is_empty());
    }

    #[test]
    fn test_render_full_statement() {
        let result = SelectStatement::wrap("SELECT id, name FROM users")
            .and_where(predicate("name LIKE ?", vec![json!("%bob%")]))
            .and_where(predicate("id > ?", vec![json!("7")]))
            .order_by("id ASC")
            .limit(11)
            .to_sql(&Dialect::SQLITE);

        insta::assert_snapshot!(
            result.sql,
            @"SELECT * FROM (SELECT id, name FROM users) AS src WHERE name LIKE ? AND id > ? ORDER BY id ASC LIMIT 11"
        );
        assert_eq!(result.args, vec![json!("%bob%"), json!("7")]);
    }

    #[test]
    fn test_render_dollar_numbering_spans_predicates() {
        let result = SelectStatement::wrap("SELECT * FROM t WHERE note = '?'")
            .and_where(predicate("a BETWEEN ? AND ?", vec![json!(1), json!(2)]))
            .and_where(predicate("b IN (?,?)", vec![json!("x"), json!("y")]))
            .to_sql(&Dialect::POSTGRES);

        assert_eq!(
            result.sql,
            "SELECT * FROM (SELECT * FROM t WHERE note = '?') AS src \
             WHERE a BETWEEN $1 AND $2 AND b IN ($3,$4)"
        );
        assert_eq!(result.args.len(), 4);
    }

    #[test]
    fn test_render_dollar_keeps_question_in_expressions() {
        let result = SelectStatement::wrap("SELECT * FROM docs")
            .and_where(predicate("(meta ? 'owner') = ?", vec![json!(true)]))
            .and_where(predicate("meta ?| array['a'] AND id > ?", vec![json!(7)]))
            .to_sql(&Dialect::POSTGRES);

        assert_eq!(
            result.sql,
            "SELECT * FROM (SELECT * FROM docs) AS src \
             WHERE (meta ? 'owner') = $1 AND meta ?| array['a'] AND id > $2"
        );

        let result = SelectStatement::wrap("SELECT * FROM docs")
            .and_where(predicate("(meta ? 'owner') = ?", vec![json!(true)]))
            .to_sql(&Dialect::SQLITE);
        assert_eq!(
            result.sql,
            "SELECT * FROM (SELECT * FROM docs) AS src WHERE (meta ? 'owner') = ?"
        );
    }
}
