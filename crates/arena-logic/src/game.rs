//! Match execution engine

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::interpreter::Decider;
use crate::payoff;
use crate::random::MatchRng;
use crate::strategy::Move;

/// Rounds per match; not user-configurable.
pub const DEFAULT_ROUNDS: u16 = 20;

/// Result of a complete match
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub moves_a: Vec<Move>,
    pub moves_b: Vec<Move>,
    pub score_a: u32,
    pub score_b: u32,
}

/// Run a complete match between two compiled strategies.
///
/// Each round both sides decide from the histories as they stood before the
/// round (simultaneous moves; neither sees the other's current choice), the
/// payoff matrix scores the pair, and both moves are appended. Runs exactly
/// `rounds` rounds with no early termination. Deterministic unless a
/// strategy plays the random action, and reproducible even then when `rng`
/// is seeded.
pub fn run_match(a: &Decider<'_>, b: &Decider<'_>, rounds: u16, rng: &mut MatchRng) -> MatchResult {
    let mut moves_a: Vec<Move> = Vec::with_capacity(rounds as usize);
    let mut moves_b: Vec<Move> = Vec::with_capacity(rounds as usize);
    let mut score_a = 0u32;
    let mut score_b = 0u32;

    for round in 0..rounds {
        let move_a = a.decide(&moves_a, &moves_b, rng);
        let move_b = b.decide(&moves_b, &moves_a, rng);

        let (round_a, round_b) = payoff(move_a, move_b);
        score_a += round_a;
        score_b += round_b;

        trace!(round, ?move_a, ?move_b, score_a, score_b, "round resolved");

        moves_a.push(move_a);
        moves_b.push(move_b);
    }

    MatchResult {
        moves_a,
        moves_b,
        score_a,
        score_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::LogicTree;
    use proptest::prelude::*;

    fn rng() -> MatchRng {
        MatchRng::seeded(42)
    }

    #[test]
    fn test_match_length_invariant() {
        let t1 = LogicTree::tit_for_tat();
        let t2 = LogicTree::coin_flip();
        let result = run_match(&t1.decider(), &t2.decider(), DEFAULT_ROUNDS, &mut rng());
        assert_eq!(result.moves_a.len(), 20);
        assert_eq!(result.moves_b.len(), 20);
    }

    #[test]
    fn test_scores_are_sums_of_round_payoffs() {
        let t1 = LogicTree::coin_flip();
        let t2 = LogicTree::coin_flip();
        let result = run_match(&t1.decider(), &t2.decider(), DEFAULT_ROUNDS, &mut rng());

        let mut expected_a = 0u32;
        let mut expected_b = 0u32;
        for (ma, mb) in result.moves_a.iter().zip(result.moves_b.iter()) {
            let (pa, pb) = payoff(*ma, *mb);
            expected_a += pa;
            expected_b += pb;
        }
        assert_eq!(result.score_a, expected_a);
        assert_eq!(result.score_b, expected_b);
    }

    #[test]
    fn test_match_determinism_with_seeded_rng() {
        let t1 = LogicTree::coin_flip();
        let t2 = LogicTree::tit_for_tat();

        let r1 = run_match(&t1.decider(), &t2.decider(), DEFAULT_ROUNDS, &mut rng());
        let r2 = run_match(&t1.decider(), &t2.decider(), DEFAULT_ROUNDS, &mut rng());

        assert_eq!(r1.moves_a, r2.moves_a);
        assert_eq!(r1.moves_b, r2.moves_b);
        assert_eq!(r1.score_a, r2.score_a);
        assert_eq!(r1.score_b, r2.score_b);
    }

    #[test]
    fn test_cooperator_vs_betrayer() {
        let ac = LogicTree::always_cooperate();
        let ab = LogicTree::always_betray();
        let result = run_match(&ac.decider(), &ab.decider(), DEFAULT_ROUNDS, &mut rng());

        // Every round is (cooperate, betray) -> (0, 2).
        assert!(result.moves_a.iter().all(|m| *m == Move::Cooperate));
        assert!(result.moves_b.iter().all(|m| *m == Move::Betray));
        assert_eq!(result.score_a, 0);
        assert_eq!(result.score_b, 40);
    }

    #[test]
    fn test_tit_for_tat_vs_betrayer() {
        let tft = LogicTree::tit_for_tat();
        let ab = LogicTree::always_betray();
        let result = run_match(&tft.decider(), &ab.decider(), DEFAULT_ROUNDS, &mut rng());

        // Round 1: (cooperate, betray) -> (0, 2). After that both betray.
        assert_eq!(result.moves_a[0], Move::Cooperate);
        assert_eq!(result.moves_b[0], Move::Betray);
        for (ma, mb) in result.moves_a.iter().zip(result.moves_b.iter()).skip(1) {
            assert_eq!(*ma, Move::Betray);
            assert_eq!(*mb, Move::Betray);
        }
        assert_eq!(result.score_a, 0);
        assert_eq!(result.score_b, 2);
    }

    #[test]
    fn test_grudger_vs_tit_for_tat_stays_friendly() {
        let grudger = LogicTree::grudger(20);
        let tft = LogicTree::tit_for_tat();
        let result = run_match(&grudger.decider(), &tft.decider(), DEFAULT_ROUNDS, &mut rng());

        // Neither side ever initiates a betrayal.
        assert!(result.moves_a.iter().all(|m| *m == Move::Cooperate));
        assert!(result.moves_b.iter().all(|m| *m == Move::Cooperate));
        assert_eq!(result.score_a, 20);
        assert_eq!(result.score_b, 20);
    }

    #[test]
    fn test_tit_for_tat_mirror_match() {
        let t1 = LogicTree::tit_for_tat();
        let t2 = LogicTree::tit_for_tat();
        let result = run_match(&t1.decider(), &t2.decider(), DEFAULT_ROUNDS, &mut rng());
        assert!(result.moves_a.iter().all(|m| *m == Move::Cooperate));
        assert!(result.moves_b.iter().all(|m| *m == Move::Cooperate));
    }

    #[test]
    fn test_zero_rounds_is_an_empty_match() {
        let t = LogicTree::tit_for_tat();
        let result = run_match(&t.decider(), &t.decider(), 0, &mut rng());
        assert!(result.moves_a.is_empty());
        assert!(result.moves_b.is_empty());
        assert_eq!(result.score_a, 0);
        assert_eq!(result.score_b, 0);
    }

    proptest! {
        /// Histories always come back exactly `rounds` long, with scores
        /// bounded by the exploiter payoff.
        #[test]
        fn prop_match_length_and_score_bounds(rounds in 0u16..60, seed in any::<u64>()) {
            let t1 = LogicTree::coin_flip();
            let t2 = LogicTree::coin_flip();
            let mut rng = MatchRng::seeded(seed);
            let result = run_match(&t1.decider(), &t2.decider(), rounds, &mut rng);
            prop_assert_eq!(result.moves_a.len(), rounds as usize);
            prop_assert_eq!(result.moves_b.len(), rounds as usize);
            prop_assert!(result.score_a <= 2 * rounds as u32);
            prop_assert!(result.score_b <= 2 * rounds as u32);
        }
    }
}
