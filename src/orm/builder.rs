//! Query assembler
//!
//! Turns a set of [`Clause`]s plus sort and pagination into the two statements
//! a filtered listing needs: one selecting the ids of the requested page, and
//! one counting every match. Both share the same body (joins, WHERE, GROUP BY,
//! HAVING) and therefore the same parameters, so the count always describes the
//! rows the ids query pages over.

use crate::db::collation::NATURAL_COLLATION;
use crate::db::sqlite_helpers::{build_count_query, pagination_clause, select_ids};
use crate::models::{FindFilter, Pagination, SortDirection};
use crate::orm::clause::{Clause, Scope};
use crate::orm::entity::EntityDef;
use crate::orm::{Condition, SqlValue};

/// SQL text with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledQuery {
    /// Ids of the requested page, in sort order
    pub ids: Statement,
    /// Number of matching ids, ignoring pagination
    pub count: Statement,
}

/// Builder for an id-selecting query over one entity table
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: &'static str,
    joins: Vec<String>,
    filters: Vec<Condition>,
    havings: Vec<Condition>,
    order_by: Option<String>,
    pagination: Option<Pagination>,
}

impl SelectQuery {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            joins: Vec::new(),
            filters: Vec::new(),
            havings: Vec::new(),
            order_by: None,
            pagination: None,
        }
    }

    /// Add a join to the body; identical joins are only emitted once
    pub fn join(mut self, join: impl Into<String>) -> Self {
        let join = join.into();
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
        self
    }

    pub fn clause(self, clause: Clause) -> Self {
        let Clause {
            scope,
            condition,
            joins,
        } = clause;
        let mut query = joins.into_iter().fold(self, |q, join| q.join(join));
        match scope {
            Scope::Where => query.filters.push(condition),
            Scope::Having => query.havings.push(condition),
        }
        query
    }

    pub fn clauses(self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        clauses.into_iter().fold(self, Self::clause)
    }

    /// ORDER BY expression list, without the keyword
    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order_by = Some(order.into());
        self
    }

    pub fn paginate(mut self, pagination: Option<Pagination>) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn assemble(self) -> AssembledQuery {
        let mut body = select_ids(self.table);
        for join in &self.joins {
            body.push(' ');
            body.push_str(join);
        }

        let mut params = Vec::new();
        if let Some((sql, values)) = Condition::All(self.filters).compile() {
            body.push_str(" WHERE ");
            body.push_str(&sql);
            params.extend(values);
        }

        body.push_str(&format!(" GROUP BY {}.id", self.table));

        if let Some((sql, values)) = Condition::All(self.havings).compile() {
            body.push_str(" HAVING ");
            body.push_str(&sql);
            params.extend(values);
        }

        let count = Statement {
            sql: build_count_query(&body),
            params: params.clone(),
        };

        let mut ids_sql = body;
        if let Some(order) = &self.order_by {
            ids_sql.push_str(" ORDER BY ");
            ids_sql.push_str(order);
        }
        ids_sql.push_str(&pagination_clause(self.pagination));

        AssembledQuery {
            ids: Statement {
                sql: ids_sql,
                params,
            },
            count,
        }
    }
}

/// ORDER BY list for `find`, resolved against the entity's sortable columns.
///
/// Unknown keys fall back to the entity default. Natural-sort columns use the
/// registered collation, and the id is always appended so equal keys page
/// deterministically.
pub fn sort_clause(entity: &EntityDef, find: &FindFilter) -> String {
    let requested = find.sort_or(entity.default_sort).trim();
    let key = entity
        .sortable
        .iter()
        .copied()
        .find(|s| *s == requested)
        .unwrap_or(entity.default_sort);
    let direction = find.direction();

    sort_expression(entity, key, direction)
}

fn sort_expression(entity: &EntityDef, key: &str, direction: SortDirection) -> String {
    let dir = direction.to_sql();
    let column = entity.qualified(key);
    let id = entity.qualified("id");
    if entity.natural_sort.contains(&key) {
        format!("{column} COLLATE {NATURAL_COLLATION} {dir}, {id} {dir}")
    } else {
        format!("{column} {dir}, {id} {dir}")
    }
}
