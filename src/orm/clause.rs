//! Clause builders: one filter criterion in, one SQL fragment out
//!
//! Each builder returns a [`Clause`] that says where the fragment belongs
//! (WHERE or HAVING), the bound values in placeholder order, and the joins the
//! fragment relies on. The query assembler adds those joins to the body, so a
//! fragment is never used without the tables it references.

use crate::error::{CatalogError, Result};
use crate::models::{Combinator, CriterionModifier, MultiCriterion};
use crate::orm::entity::{EntityDef, RelationLink};
use crate::orm::{Condition, SqlValue};

use crate::db::sqlite_helpers::in_binding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Row-level predicate
    Where,
    /// Predicate over the rows grouped per entity id
    Having,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub scope: Scope,
    pub condition: Condition,
    /// Joins that must be present in the query body
    pub joins: Vec<String>,
}

impl Clause {
    pub fn filter(condition: Condition) -> Self {
        Self {
            scope: Scope::Where,
            condition,
            joins: Vec::new(),
        }
    }

    pub fn having(condition: Condition) -> Self {
        Self {
            scope: Scope::Having,
            condition,
            joins: Vec::new(),
        }
    }

    pub fn requires(mut self, join: impl Into<String>) -> Self {
        self.joins.push(join.into());
        self
    }
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive "contains" match of `term` against any of `columns`.
///
/// Produces `(c1 LIKE ? ESCAPE '\') OR ...` with the same pattern bound once
/// per column. The term is bound as typed: SQLite's LIKE folds ASCII case on
/// both sides and compares everything else exactly. A blank term or an empty
/// column list yields no clause.
pub fn search_clause(columns: &[&str], term: &str) -> Option<Clause> {
    let term = term.trim();
    if term.is_empty() || columns.is_empty() {
        return None;
    }

    let pattern = format!("%{}%", escape_like(term));
    let matches = columns
        .iter()
        .map(|column| {
            Condition::raw(
                format!("{column} LIKE ? ESCAPE '\\'"),
                vec![SqlValue::Text(pattern.clone())],
            )
        })
        .collect();

    Some(Clause::filter(Condition::Any(matches)))
}

/// Multi-valued criterion against a relation of `entity`.
///
/// * includes + or: HAVING at least one joined row matches
/// * includes + and: HAVING every distinct value matches (requires the relation join)
/// * excludes + or: WHERE NOT EXISTS / NOT IN, so an excluded id never matches through the join
/// * excludes + and: WHERE the entity does not have all of the values
///
/// An empty value list yields no clause. An unknown relation fails here,
/// before any SQL runs.
pub fn multi_criterion_clause(entity: &EntityDef, criterion: &MultiCriterion) -> Result<Option<Clause>> {
    let relation = entity.relation(&criterion.relation)?;
    let values = criterion.distinct_values();
    if values.is_empty() {
        return Ok(None);
    }

    let params: Vec<SqlValue> = values.iter().copied().map(SqlValue::Int).collect();
    let in_list = in_binding(values.len());
    let n = values.len();

    let clause = match criterion.modifier {
        CriterionModifier::Includes => {
            let matched = format!(
                "COUNT(DISTINCT CASE WHEN {key} IN {in_list} THEN {key} END)",
                key = relation.key
            );
            let sql = match criterion.combinator {
                Combinator::Or => format!("{matched} >= 1"),
                Combinator::And => format!("{matched} = {n}"),
            };
            Clause::having(Condition::raw(sql, params)).requires(relation.join)
        }
        CriterionModifier::Excludes => {
            let condition = match (criterion.combinator, relation.link) {
                (Combinator::Or, RelationLink::Column(column)) => {
                    let column = entity.qualified(column);
                    Condition::Any(vec![
                        Condition::sql(format!("{column} IS NULL")),
                        Condition::raw(format!("{column} NOT IN {in_list}"), params),
                    ])
                }
                (Combinator::Or, RelationLink::JoinTable { table, owner_column, target_column }) => {
                    Condition::not(Condition::raw(
                        format!(
                            "EXISTS (SELECT 1 FROM {table} AS linked \
                             WHERE linked.{owner_column} = {owner} \
                             AND linked.{target_column} IN {in_list})",
                            owner = entity.qualified("id"),
                        ),
                        params,
                    ))
                }
                (Combinator::And, link) => Condition::raw(
                    format!("({}) < {n}", matched_count_subquery(entity, link, &in_list)),
                    params,
                ),
            };
            Clause::filter(condition)
        }
    };

    Ok(Some(clause))
}

/// Correlated subquery counting how many of the listed related ids an entity row has
fn matched_count_subquery(entity: &EntityDef, link: RelationLink, in_list: &str) -> String {
    let owner = entity.qualified("id");
    match link {
        RelationLink::Column(column) => format!(
            "SELECT COUNT(DISTINCT own.{column}) FROM {table} AS own \
             WHERE own.id = {owner} AND own.{column} IN {in_list}",
            table = entity.table,
        ),
        RelationLink::JoinTable {
            table,
            owner_column,
            target_column,
        } => format!(
            "SELECT COUNT(DISTINCT linked.{target_column}) FROM {table} AS linked \
             WHERE linked.{owner_column} = {owner} AND linked.{target_column} IN {in_list}"
        ),
    }
}

/// "Field is missing" predicate.
///
/// Well-known derived fields (attachments, child rows) map to a LEFT JOIN plus
/// `<column> IS NULL`; any other name must be a column of the entity table and
/// becomes `<table>.<field> IS NULL`. Names that are neither are rejected.
pub fn is_missing_clause(entity: &EntityDef, field: &str) -> Result<Clause> {
    if let Some(missing) = entity.missing_field(field) {
        let clause = Clause::filter(Condition::sql(format!("{} IS NULL", missing.column)))
            .requires(missing.join);
        return Ok(clause);
    }

    match entity.column(field) {
        Some(column) => Ok(Clause::filter(Condition::sql(format!(
            "{} IS NULL",
            entity.qualified(column)
        )))),
        None => Err(CatalogError::configuration(format!(
            "unknown is_missing field `{field}` for {}",
            entity.entity_name
        ))),
    }
}
