//! Filter, search, sort and pagination inputs

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 25;

/// Sort direction for ORDER BY clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9, oldest-newest)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest-oldest)
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Lenient parse used by the CLI; anything but "desc" is ascending.
    pub fn from_arg(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Generic find options shared by every entity query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindFilter {
    /// Free-text search term
    pub q: Option<String>,
    /// 1-based page number
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
}

/// Resolved LIMIT/OFFSET for a paginated query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl FindFilter {
    pub fn search(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    pub fn page(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Default::default()
        }
    }

    /// Every matching row, no LIMIT
    pub fn unpaginated() -> Self {
        Self::page(0, 0)
    }

    pub fn sorted(mut self, sort: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(sort.into());
        self.direction = Some(direction);
        self
    }

    /// The requested sort key, or `default` when none was given
    pub fn sort_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.sort.as_deref() {
            Some(sort) if !sort.trim().is_empty() => sort,
            _ => default,
        }
    }

    pub fn direction(&self) -> SortDirection {
        self.direction.unwrap_or_default()
    }

    /// Search term with surrounding whitespace removed; `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Page size and number, normalized. A non-positive page or page size means
    /// "no pagination" rather than an error.
    pub fn pagination(&self) -> Option<Pagination> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page <= 0 || per_page <= 0 {
            return None;
        }
        Some(Pagination {
            limit: per_page,
            offset: (page - 1).saturating_mul(per_page),
        })
    }
}

/// How the values of a multi-valued criterion combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Any of the values
    #[default]
    Or,
    /// All of the values
    And,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionModifier {
    #[default]
    Includes,
    Excludes,
}

/// A multi-valued criterion against a related entity, e.g. "has any of these studios"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiCriterion {
    /// Relation name, e.g. `studios` or `scenes`
    pub relation: String,
    pub values: Vec<i64>,
    #[serde(default)]
    pub combinator: Combinator,
    #[serde(default)]
    pub modifier: CriterionModifier,
}

impl MultiCriterion {
    pub fn new(
        relation: impl Into<String>,
        values: Vec<i64>,
        combinator: Combinator,
        modifier: CriterionModifier,
    ) -> Self {
        Self {
            relation: relation.into(),
            values,
            combinator,
            modifier,
        }
    }

    /// Values with duplicates removed, first occurrence kept
    pub fn distinct_values(&self) -> Vec<i64> {
        let mut seen = Vec::with_capacity(self.values.len());
        for v in &self.values {
            if !seen.contains(v) {
                seen.push(*v);
            }
        }
        seen
    }
}

/// Movie-specific filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieFilter {
    pub criteria: Vec<MultiCriterion>,
    /// Field or derived condition that must be missing, e.g. `front_image` or `scenes`
    pub is_missing: Option<String>,
}

impl MovieFilter {
    pub fn with_criterion(mut self, criterion: MultiCriterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            is_missing: Some(field.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let find = FindFilter::default();
        assert_eq!(
            find.pagination(),
            Some(Pagination {
                limit: DEFAULT_PER_PAGE,
                offset: 0
            })
        );
    }

    #[test]
    fn test_non_positive_page_disables_pagination() {
        assert_eq!(FindFilter::page(0, 10).pagination(), None);
        assert_eq!(FindFilter::page(3, -1).pagination(), None);
        assert_eq!(FindFilter::page(-2, 10).pagination(), None);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(
            FindFilter::page(3, 10).pagination(),
            Some(Pagination {
                limit: 10,
                offset: 20
            })
        );
    }

    #[test]
    fn test_blank_search_term_is_ignored() {
        assert_eq!(FindFilter::search("   ").search_term(), None);
        assert_eq!(FindFilter::search(" alien ").search_term(), Some("alien"));
    }

    #[test]
    fn test_filter_deserializes_with_defaults() {
        let filter: MovieFilter = serde_json::from_value(serde_json::json!({
            "criteria": [{ "relation": "studios", "values": [1, 2, 2] }]
        }))
        .unwrap();
        let criterion = &filter.criteria[0];
        assert_eq!(criterion.combinator, Combinator::Or);
        assert_eq!(criterion.modifier, CriterionModifier::Includes);
        assert_eq!(criterion.distinct_values(), vec![1, 2]);
    }
}
