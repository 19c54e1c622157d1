//! Boolean condition tree compiled to a parameterized SQL expression
//!
//! Clause builders never concatenate SQL for each other: they produce
//! [`Condition`] nodes, and [`Condition::compile`] is the single place that
//! turns a tree into text plus an ordered parameter list. Placeholders are
//! plain positional `?`s, so parameter order always follows textual order.

use super::value::SqlValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A leaf fragment. The number of `?` placeholders in `sql` must equal `params.len()`.
    Raw { sql: String, params: Vec<SqlValue> },
    /// Conjunction; an empty list is "no condition".
    All(Vec<Condition>),
    /// Disjunction; an empty list never matches.
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn raw(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        let sql = sql.into();
        debug_assert_eq!(
            sql.matches('?').count(),
            params.len(),
            "placeholder count mismatch in `{sql}`"
        );
        Condition::Raw { sql, params }
    }

    /// A fragment without bound parameters
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::raw(sql, Vec::new())
    }

    pub fn not(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    /// Compile into `(sql, params)`. Returns `None` when the tree imposes no
    /// restriction (an empty conjunction), so callers can omit the clause.
    pub fn compile(&self) -> Option<(String, Vec<SqlValue>)> {
        let mut params = Vec::new();
        let sql = self.write(&mut params)?;
        Some((sql, params))
    }

    fn write(&self, params: &mut Vec<SqlValue>) -> Option<String> {
        match self {
            Condition::Raw { sql, params: own } => {
                params.extend(own.iter().cloned());
                Some(sql.clone())
            }
            Condition::All(children) => {
                let parts: Vec<String> = children.iter().filter_map(|c| c.write(params)).collect();
                match parts.len() {
                    0 => None,
                    1 => parts.into_iter().next(),
                    _ => Some(join_group(&parts, " AND ")),
                }
            }
            Condition::Any(children) => {
                let mut parts = Vec::with_capacity(children.len());
                let mut own = Vec::new();
                for child in children {
                    // one unrestricted branch makes the whole disjunction unrestricted
                    parts.push(child.write(&mut own)?);
                }
                params.extend(own);
                match parts.len() {
                    0 => Some("1=0".to_string()),
                    1 => parts.into_iter().next(),
                    _ => Some(join_group(&parts, " OR ")),
                }
            }
            Condition::Not(inner) => {
                // NOT of "no restriction" never matches
                let inner = inner.write(params).unwrap_or_else(|| "1=1".to_string());
                Some(format!("NOT ({inner})"))
            }
        }
    }
}

fn join_group(parts: &[String], separator: &str) -> String {
    let wrapped: Vec<String> = parts.iter().map(|p| format!("({p})")).collect();
    wrapped.join(separator)
}
