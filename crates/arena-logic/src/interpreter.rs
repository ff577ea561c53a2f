//! Logic tree interpretation
//!
//! Turns a validated `LogicTree` into a decision function over the two move
//! histories. Interpretation is fail-safe: anything a tree cannot answer
//! (empty histories, lookbacks past the start of the match, condition kinds
//! from a newer editor) degrades to Cooperate or to no-match, never to an
//! error.

use crate::random::MatchRng;
use crate::strategy::{Action, Clause, ClauseRole, Condition, ConditionKind, LogicTree, MatchMode, Move};

/// Evaluate a single condition against the two histories.
///
/// Pure function of its inputs. Missing data resolves optimistically: an
/// empty history or an out-of-range lookback reads as Cooperate, and the
/// most-common kinds pick Betray only on a strict majority.
pub fn evaluate_condition(
    condition: &Condition,
    my_history: &[Move],
    opponent_history: &[Move],
) -> bool {
    let subject = match condition.kind {
        ConditionKind::OpponentLastMove => last_move(opponent_history),
        ConditionKind::YourLastMove => last_move(my_history),
        ConditionKind::OpponentNthLastMove => nth_last_move(opponent_history, condition.n),
        ConditionKind::YourNthLastMove => nth_last_move(my_history, condition.n),
        ConditionKind::OpponentMostCommon => most_common(opponent_history),
        ConditionKind::YourMostCommon => most_common(my_history),
        ConditionKind::Unknown => return false,
    };
    subject == condition.target
}

#[inline]
fn last_move(history: &[Move]) -> Move {
    history.last().copied().unwrap_or(Move::Cooperate)
}

#[inline]
fn nth_last_move(history: &[Move], n: u32) -> Move {
    let n = n as usize;
    if n == 0 || n > history.len() {
        return Move::Cooperate;
    }
    history[history.len() - n]
}

#[inline]
fn most_common(history: &[Move]) -> Move {
    let betrayals = history.iter().filter(|m| **m == Move::Betray).count();
    // Strict majority; ties and empty history read as Cooperate.
    if betrayals * 2 > history.len() {
        Move::Betray
    } else {
        Move::Cooperate
    }
}

/// A compiled strategy: a logic tree ready to answer `decide` calls.
///
/// Holds no state of its own, so one decider can serve any number of
/// matches, including interleaved ones.
#[derive(Clone, Copy, Debug)]
pub struct Decider<'a> {
    tree: &'a LogicTree,
}

impl LogicTree {
    /// Compile this tree into a decision function.
    pub fn decider(&self) -> Decider<'_> {
        Decider { tree: self }
    }
}

impl Decider<'_> {
    /// Choose a move given the histories as they stand before this round.
    ///
    /// Clauses are tried top to bottom; the first satisfied clause wins. A
    /// random action re-rolls on every call. If nothing matches, the
    /// decision falls through to Cooperate.
    pub fn decide(
        &self,
        my_history: &[Move],
        opponent_history: &[Move],
        rng: &mut MatchRng,
    ) -> Move {
        for clause in self.tree.clauses() {
            if clause_holds(clause, my_history, opponent_history) {
                return resolve_action(clause.action, rng);
            }
        }
        Move::Cooperate
    }
}

fn clause_holds(clause: &Clause, my_history: &[Move], opponent_history: &[Move]) -> bool {
    match clause.role {
        ClauseRole::Else => true,
        ClauseRole::If | ClauseRole::ElseIf => {
            // No conditions to satisfy means nothing ever satisfies the
            // clause, regardless of mode.
            if clause.conditions.is_empty() {
                return false;
            }
            match clause.match_mode {
                MatchMode::All => clause
                    .conditions
                    .iter()
                    .all(|c| evaluate_condition(c, my_history, opponent_history)),
                MatchMode::Any => clause
                    .conditions
                    .iter()
                    .any(|c| evaluate_condition(c, my_history, opponent_history)),
            }
        }
    }
}

fn resolve_action(action: Action, rng: &mut MatchRng) -> Move {
    match action {
        Action::Cooperate => Move::Cooperate,
        Action::Betray => Move::Betray,
        Action::Random => {
            if rng.coin_flip() {
                Move::Cooperate
            } else {
                Move::Betray
            }
        }
    }
}
