#![forbid(unsafe_code)]

//! String selection policies.
//!
//! Decides which string a cycle shows next: uniformly random, ascending
//! through the list, or descending. Wrap-around is inclusive of every
//! index; a descending walk restarts at the last index, never one past it.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::rng::Rng;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// How the next string index is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Uniformly random pick each cycle.
    #[default]
    Random,
    /// Walk the list forward, wrapping to the first entry.
    Ascending,
    /// Walk the list backward, wrapping to the last entry.
    Descending,
}

impl Selection {
    /// Index for the very first cycle.
    ///
    /// `count` must be at least 1; a zero count returns 0.
    pub fn initial(self, count: usize, rng: &mut Rng) -> usize {
        if count == 0 {
            return 0;
        }
        match self {
            Self::Random => rng.below(count),
            Self::Ascending => 0,
            Self::Descending => count - 1,
        }
    }

    /// Index for the cycle after the one at `current`.
    ///
    /// `count` must be at least 1; a zero count returns 0.
    pub fn next(self, current: usize, count: usize, rng: &mut Rng) -> usize {
        if count == 0 {
            return 0;
        }
        match self {
            Self::Random => rng.below(count),
            Self::Ascending => (current + 1) % count,
            Self::Descending => {
                if current == 0 {
                    count - 1
                } else {
                    current - 1
                }
            }
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Random => "random",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        };
        f.write_str(name)
    }
}

impl FromStr for Selection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            other => Err(ConfigError::InvalidSelection(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_tour_visits_every_index_once() {
        let mut rng = Rng::new(1);
        let count = 7;
        let mut seen = vec![false; count];
        let mut idx = Selection::Ascending.initial(count, &mut rng);
        for _ in 0..count {
            assert!(!seen[idx], "index {idx} visited twice");
            seen[idx] = true;
            idx = Selection::Ascending.next(idx, count, &mut rng);
        }
        assert!(seen.iter().all(|&s| s));
        // And back to the start.
        assert_eq!(idx, 0);
    }

    #[test]
    fn descending_is_strictly_decreasing_until_wrap() {
        let mut rng = Rng::new(1);
        let count = 5;
        let mut idx = Selection::Descending.initial(count, &mut rng);
        assert_eq!(idx, count - 1);
        for expected in (0..count - 1).rev() {
            idx = Selection::Descending.next(idx, count, &mut rng);
            assert_eq!(idx, expected);
        }
    }

    #[test]
    fn descending_wraps_to_last_valid_index() {
        let mut rng = Rng::new(1);
        // From 0, the walk restarts at count - 1, an index that exists.
        assert_eq!(Selection::Descending.next(0, 5, &mut rng), 4);
    }

    #[test]
    fn descending_tour_visits_every_index_once() {
        let mut rng = Rng::new(1);
        let count = 6;
        let mut seen = vec![false; count];
        let mut idx = Selection::Descending.initial(count, &mut rng);
        for _ in 0..count {
            assert!(!seen[idx]);
            seen[idx] = true;
            idx = Selection::Descending.next(idx, count, &mut rng);
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn random_stays_in_bounds() {
        let mut rng = Rng::new(42);
        let mut idx = Selection::Random.initial(9, &mut rng);
        for _ in 0..1000 {
            assert!(idx < 9);
            idx = Selection::Random.next(idx, 9, &mut rng);
        }
    }

    #[test]
    fn random_is_deterministic_per_seed() {
        let mut a = Rng::new(11);
        let mut b = Rng::new(11);
        for _ in 0..50 {
            assert_eq!(
                Selection::Random.next(0, 13, &mut a),
                Selection::Random.next(0, 13, &mut b)
            );
        }
    }

    #[test]
    fn initial_indices_per_policy() {
        let mut rng = Rng::new(1);
        assert_eq!(Selection::Ascending.initial(4, &mut rng), 0);
        assert_eq!(Selection::Descending.initial(4, &mut rng), 3);
        assert!(Selection::Random.initial(4, &mut rng) < 4);
    }

    #[test]
    fn single_string_always_index_zero() {
        let mut rng = Rng::new(1);
        for policy in [Selection::Random, Selection::Ascending, Selection::Descending] {
            assert_eq!(policy.initial(1, &mut rng), 0);
            assert_eq!(policy.next(0, 1, &mut rng), 0);
        }
    }

    #[test]
    fn zero_count_returns_zero() {
        let mut rng = Rng::new(1);
        assert_eq!(Selection::Ascending.next(0, 0, &mut rng), 0);
        assert_eq!(Selection::Descending.initial(0, &mut rng), 0);
    }

    #[test]
    fn parses_known_names() {
        assert_eq!("random".parse::<Selection>().unwrap(), Selection::Random);
        assert_eq!("ascending".parse::<Selection>().unwrap(), Selection::Ascending);
        assert_eq!("descending".parse::<Selection>().unwrap(), Selection::Descending);
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "sideways".parse::<Selection>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSelection(ref s) if s == "sideways"));
    }

    #[test]
    fn display_round_trips() {
        for policy in [Selection::Random, Selection::Ascending, Selection::Descending] {
            assert_eq!(policy.to_string().parse::<Selection>().unwrap(), policy);
        }
    }
}
