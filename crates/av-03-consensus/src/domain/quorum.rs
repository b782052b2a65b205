//! # Quorum Arithmetic
//!
//! Quorum is reached when `for_weight >= threshold * total_possible`, with
//! `total_possible` the snapshot weight of the round's non-Byzantine
//! participants. Unreachable agents never enter that snapshot.
//!
//! Before a round starts, the service also checks feasibility against the
//! whole pool: if the usable agents' weight cannot reach the threshold of
//! the pool's total weight (unreachable agents included), the round ends
//! immediately as `InsufficientParticipants`.
//!
//! The comparison allows a `1e-9` slack so that, for instance, three agents
//! of weight 1.0 against a total of 3.0 meet a threshold of 2/3 despite
//! rounding in `2.0 / 3.0 * 3.0`.

use serde::{Deserialize, Serialize};

/// Standard BFT bound tolerating `f` faulty agents out of `3f + 1`.
pub const DEFAULT_QUORUM_THRESHOLD: f64 = 2.0 / 3.0;

const WEIGHT_EPSILON: f64 = 1e-9;

/// Weighted vote sums for one phase, relative to one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub for_weight: f64,
    pub against_weight: f64,
    /// Weight of all counted votes in the phase.
    pub total_weight: f64,
}

/// Weight required for quorum.
pub fn quorum_weight(total_possible_weight: f64, threshold: f64) -> f64 {
    threshold * total_possible_weight
}

/// Whether `tally.for_weight` reaches the threshold.
pub fn has_quorum(tally: &Tally, total_possible_weight: f64, threshold: f64) -> bool {
    total_possible_weight > 0.0
        && tally.for_weight + WEIGHT_EPSILON >= quorum_weight(total_possible_weight, threshold)
}

/// Whether `weight` is strictly more than `fraction` of the total.
pub fn exceeds_fraction(weight: f64, total_possible_weight: f64, fraction: f64) -> bool {
    total_possible_weight > 0.0 && weight > fraction * total_possible_weight + WEIGHT_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tally(for_weight: f64) -> Tally {
        Tally {
            for_weight,
            against_weight: 0.0,
            total_weight: for_weight,
        }
    }

    #[test]
    fn test_four_equal_agents_need_three() {
        let threshold = DEFAULT_QUORUM_THRESHOLD;
        assert!((quorum_weight(4.0, threshold) - 2.6667).abs() < 1e-3);
        assert!(!has_quorum(&tally(2.0), 4.0, threshold));
        assert!(has_quorum(&tally(3.0), 4.0, threshold));
    }

    #[test]
    fn test_exact_two_thirds_meets_quorum() {
        assert!(has_quorum(&tally(2.0), 3.0, DEFAULT_QUORUM_THRESHOLD));
        assert!(has_quorum(&tally(3.0), 3.0, DEFAULT_QUORUM_THRESHOLD));
    }

    #[test]
    fn test_zero_total_never_quorum() {
        assert!(!has_quorum(&tally(0.0), 0.0, DEFAULT_QUORUM_THRESHOLD));
    }

    #[test]
    fn test_exceeds_fraction_is_strict() {
        assert!(!exceeds_fraction(1.0, 3.0, 1.0 / 3.0));
        assert!(exceeds_fraction(2.0, 4.0, 1.0 / 3.0));
        assert!(!exceeds_fraction(1.0, 4.0, 1.0 / 3.0));
    }

    proptest! {
        #[test]
        fn prop_two_values_cannot_both_reach_quorum(
            a in 0.0f64..100.0,
            b in 0.0f64..100.0,
            slack in 0.0f64..100.0,
        ) {
            // Disjoint vote sets within one total.
            let total = a + b + slack;
            let both = has_quorum(&tally(a), total, DEFAULT_QUORUM_THRESHOLD)
                && has_quorum(&tally(b), total, DEFAULT_QUORUM_THRESHOLD);
            prop_assert!(!both || total == 0.0 || (a + b) < 1e-6);
        }
    }
}
