//! Minimal CLI parsing for listing queries.

use std::env;

use crate::models::{
    Combinator, CriterionModifier, FindFilter, MovieFilter, MultiCriterion, SortDirection,
};

const VALUE_FLAGS: &[&str] = &[
    "--q",
    "--page",
    "--per-page",
    "--sort",
    "--direction",
    "--missing",
    "--studio",
];

#[derive(Debug, Default, PartialEq)]
pub struct CliOptions {
    pub find: FindFilter,
    pub filter: MovieFilter,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    /// Parse `--flag value` and `--flag=value` pairs.
    ///
    /// Unknown arguments are skipped on their own and never consume the
    /// argument after them.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = CliOptions::default();
        let mut studios = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            if !VALUE_FLAGS.contains(&flag.as_str()) {
                continue;
            }
            let Some(value) = inline.or_else(|| args.next()) else {
                break;
            };

            match flag.as_str() {
                "--q" => options.find.q = Some(value),
                "--page" => options.find.page = value.parse().ok(),
                "--per-page" => options.find.per_page = value.parse().ok(),
                "--sort" => options.find.sort = Some(value),
                "--direction" => options.find.direction = Some(SortDirection::from_arg(&value)),
                "--missing" => options.filter.is_missing = Some(value),
                "--studio" => studios.extend(value.split(',').filter_map(|v| v.trim().parse::<i64>().ok())),
                _ => {}
            }
        }

        if !studios.is_empty() {
            options.filter.criteria.push(MultiCriterion::new(
                "studios",
                studios,
                Combinator::Or,
                CriterionModifier::Includes,
            ));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_flags() {
        let options = parse(&[
            "--q",
            "alien",
            "--page=2",
            "--per-page",
            "10",
            "--sort",
            "rating",
            "--direction",
            "desc",
            "--missing",
            "front_image",
            "--studio",
            "1,2",
        ]);
        assert_eq!(options.find.q.as_deref(), Some("alien"));
        assert_eq!(options.find.page, Some(2));
        assert_eq!(options.find.per_page, Some(10));
        assert_eq!(options.find.sort.as_deref(), Some("rating"));
        assert_eq!(options.find.direction, Some(SortDirection::Desc));
        assert_eq!(options.filter.is_missing.as_deref(), Some("front_image"));
        assert_eq!(options.filter.criteria[0].values, vec![1, 2]);
    }

    #[test]
    fn test_unknown_flags_do_not_swallow_values() {
        let options = parse(&["--verbose", "--q", "alien", "--dry-run=yes", "--page", "3"]);
        assert_eq!(options.find.q.as_deref(), Some("alien"));
        assert_eq!(options.find.page, Some(3));
    }

    #[test]
    fn test_no_flags() {
        assert_eq!(parse(&[]), CliOptions::default());
    }
}
