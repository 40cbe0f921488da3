//! Safe-Regex Oracle - a conservative predicate over a regex source string
//! reporting whether the pattern is free of catastrophic-backtracking
//! constructs. This crate is the sole implementation of the oracle contract
//! the Argument Validator depends on; no external crate in reach detects
//! ReDoS patterns, so the heuristic below stands in for it.
//!
//! The heuristic rejects rather than proves: it scans the pattern's own
//! source text for the shapes that dominate real-world ReDoS reports -
//! a quantified group whose body itself ends in a quantified atom
//! (`(a+)+`, `(a*)*`, `(\d+)*`), and two adjacent identical quantified
//! atoms with no separator (`a+a+`). A pattern it accepts can still be
//! slow; a pattern it rejects is not necessarily exploitable. That
//! asymmetry is the point: this is a denylist for known-bad constructs,
//! not a full backtracking-complexity analysis.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a parenthesized group whose body ends in `+`/`*`/`{m,n}`,
/// immediately followed by another `+`/`*`/`{m,n}` outside the group.
static NESTED_QUANTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([^()]*[+*](\}|\)*)?\)[+*]|\([^()]*\{\d+,?\d*\}\)[+*{]").unwrap()
});

/// Matches two adjacent occurrences of the same quantified single-char
/// class with no separator, e.g. `a+a+`, `\d+\d+`, `\w*\w*`.
static ADJACENT_OVERLAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\\?.)[+*](\1)[+*]").unwrap()
});

/// Returns `true` if `pattern` does not contain a recognized
/// catastrophic-backtracking shape.
pub fn is_safe_regex(pattern: &str) -> bool {
    !NESTED_QUANTIFIER.is_match(pattern) && !ADJACENT_OVERLAP.is_match(pattern)
}
