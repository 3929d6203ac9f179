//! Collision-free category names via deterministic suffixing.

use std::collections::HashSet;

use crate::preprocess::clean_text;

/// Substitute when sanitizing leaves nothing.
const DEFAULT_BASE: &str = "Generic Category";

/// Reduce a proposed name to letters and spaces.
fn sanitize(name: &str) -> String {
    let letters: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    clean_text(&letters)
}

/// Return a name that does not collide (case-insensitively) with `used`.
/// Collisions are resolved with suffixes `A`..`Z`, then `A1`..`Z1`,
/// `A2`...; every probe is distinct, so the loop always terminates.
/// The caller records the returned name in `used`.
pub fn unique_name(proposed: &str, used: &HashSet<String>) -> String {
    let mut base = sanitize(proposed);
    if base.is_empty() {
        base = DEFAULT_BASE.to_string();
    }

    if !used.contains(&base.to_lowercase()) {
        return base;
    }

    for round in 0u32.. {
        for letter in 'A'..='Z' {
            let candidate = if round == 0 {
                format!("{} {}", base, letter)
            } else {
                format!("{} {}{}", base, letter, round)
            };
            if !used.contains(&candidate.to_lowercase()) {
                return candidate;
            }
        }
    }
    unreachable!("suffix space is unbounded")
}
