//! Natural ordering for display names
//!
//! Registered on every pooled connection as the `NATURAL_CI` collation so
//! `ORDER BY movies.name COLLATE NATURAL_CI` sorts "Episode 2" before
//! "Episode 10".

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

pub const NATURAL_COLLATION: &str = "NATURAL_CI";

/// Compare two strings treating runs of ASCII digits as numbers and
/// everything else case-insensitively. Strings that are equal under those
/// rules fall back to byte order so the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_digits(&mut left);
                let rn = take_digits(&mut right);
                let ord = cmp_digit_runs(&ln, &rn);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Numeric comparison of two digit runs of any length
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "007" after "7"
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut names: Vec<&str>) -> Vec<&str> {
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(
            sorted(vec!["Episode 2", "Episode 10", "Episode 1"]),
            vec!["Episode 1", "Episode 2", "Episode 10"]
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            sorted(vec!["beta", "Alpha", "alpha 2", "Gamma"]),
            vec!["Alpha", "alpha 2", "beta", "Gamma"]
        );
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("Alien", "Alien 3"), Ordering::Less);
    }

    #[test]
    fn test_total_order_on_case_ties() {
        assert_eq!(natural_cmp("ALIEN", "alien"), "ALIEN".cmp("alien"));
        assert_eq!(natural_cmp("x", "x"), Ordering::Equal);
    }

    #[test]
    fn test_leading_zeros_and_long_numbers() {
        assert_eq!(natural_cmp("Part 007", "Part 7"), Ordering::Greater);
        assert_eq!(
            natural_cmp("Take 99999999999999999999", "Take 100000000000000000000"),
            Ordering::Less
        );
    }
}
