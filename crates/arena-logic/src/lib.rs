//! Match Logic for Dilemma Arena
//!
//! Core game logic for the Iterated Prisoner's Dilemma arena:
//! - Interprets user-authored logic trees as decision functions
//! - Runs fixed-length matches between two strategies
//! - Runs round-robin and on-save tournament passes, producing score
//!   deltas and match records for the storage layer to commit as one batch

mod random;
mod strategy;
mod interpreter;
mod game;
mod tournament;

pub use random::MatchRng;
pub use strategy::{
    Action, Clause, ClauseRole, Condition, ConditionKind, LogicTree, LogicTreeError, MatchMode,
    Move,
};
pub use interpreter::{evaluate_condition, Decider};
pub use game::{run_match, MatchResult, DEFAULT_ROUNDS};
pub use tournament::{
    match_count, run_grand_tournament, run_on_save_tournament, MatchRecord, OnSaveOutcome,
    StrategySnapshot, TournamentGate, TournamentOutcome, TournamentPermit,
};

/// Payoff matrix for one round of the Prisoner's Dilemma
/// Returns (score_a, score_b)
///
/// A lone betrayal exploits the cooperator for the biggest single payout.
/// Mutual cooperation beats mutual betrayal for both sides.
pub fn payoff(a: Move, b: Move) -> (u32, u32) {
    match (a, b) {
        (Move::Cooperate, Move::Cooperate) => (1, 1),
        (Move::Cooperate, Move::Betray) => (0, 2),
        (Move::Betray, Move::Cooperate) => (2, 0),
        (Move::Betray, Move::Betray) => (0, 0),
    }
}
