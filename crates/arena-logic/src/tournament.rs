//! Tournament orchestration
//!
//! Two pass shapes, both pure over immutable strategy snapshots:
//! - grand: full round-robin over the arena
//! - on-save: a newly created strategy against every existing one
//!
//! A pass returns a bundle of score deltas and match records; the storage
//! layer must commit the whole bundle as one atomic batch so scores and
//! records never tear. The orchestrator never reads live scores back during
//! its own pass.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::{run_match, MatchResult};
use crate::random::MatchRng;
use crate::strategy::{LogicTree, Move};

/// Immutable view of a stored strategy, as handed over by the storage layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySnapshot {
    pub id: String,
    pub name: String,
    pub author_display_name: String,
    pub author_id: String,
    pub tree: LogicTree,
    /// Running total at snapshot time. Passes never read it; they only
    /// produce deltas for the storage layer to add.
    pub score: u32,
    pub created_at: i64,
}

/// One finished match, ready for the storage layer to append
///
/// Record ids are assigned by the storage layer on append; `played_at` is
/// supplied by the caller, since the core holds no clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub strategy_a_id: String,
    pub strategy_a_name: String,
    pub strategy_b_id: String,
    pub strategy_b_name: String,
    pub moves_a: Vec<Move>,
    pub moves_b: Vec<Move>,
    pub score_a: u32,
    pub score_b: u32,
    pub played_at: i64,
}

/// Result bundle of a grand tournament pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentOutcome {
    /// Score to add per strategy id; every participant has an entry, even
    /// if it scored nothing.
    pub deltas: BTreeMap<String, u32>,
    /// Match records in ascending pair order.
    pub records: Vec<MatchRecord>,
}

impl TournamentOutcome {
    /// True when the pass had nothing to do (fewer than two participants).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result bundle of an on-save pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnSaveOutcome {
    /// Total the new strategy earned across all its matches.
    pub new_strategy_delta: u32,
    /// Score to add per opponent id.
    pub opponent_deltas: BTreeMap<String, u32>,
    /// Match records in existing-strategy iteration order.
    pub records: Vec<MatchRecord>,
}

/// Number of matches a grand tournament runs for `participant_count`
/// strategies.
pub fn match_count(participant_count: usize) -> usize {
    if participant_count < 2 {
        return 0;
    }
    participant_count * (participant_count - 1) / 2
}

/// Run a full round-robin over the strategy set.
///
/// One match per unordered pair (i < j), enumerated in ascending pair
/// order, each on its own RNG substream so the pass is reproducible from
/// `rng`'s seed. Fewer than two strategies is a no-op returning an empty
/// outcome.
pub fn run_grand_tournament(
    strategies: &[StrategySnapshot],
    rounds: u16,
    rng: &MatchRng,
    played_at: i64,
) -> TournamentOutcome {
    if strategies.len() < 2 {
        debug!(
            participants = strategies.len(),
            "grand tournament skipped, nothing to pair"
        );
        return TournamentOutcome::default();
    }

    let mut deltas: BTreeMap<String, u32> = strategies
        .iter()
        .map(|s| (s.id.clone(), 0))
        .collect();
    let mut records = Vec::with_capacity(match_count(strategies.len()));
    let mut match_index = 0u64;

    for (i, a) in strategies.iter().enumerate() {
        for b in &strategies[i + 1..] {
            let mut match_rng = rng.substream(match_index);
            let result = run_match(&a.tree.decider(), &b.tree.decider(), rounds, &mut match_rng);
            match_index += 1;

            *deltas.entry(a.id.clone()).or_insert(0) += result.score_a;
            *deltas.entry(b.id.clone()).or_insert(0) += result.score_b;
            records.push(record_for(a, b, result, played_at));
        }
    }

    debug!(
        participants = strategies.len(),
        matches = records.len(),
        "grand tournament pass complete"
    );

    TournamentOutcome { deltas, records }
}

/// Run a newly saved strategy against every existing one.
///
/// Matches follow existing-strategy iteration order, skipping a self-match
/// if the new id already appears in the set. The new strategy's winnings
/// accumulate into one delta; each opponent gets its own match result as a
/// delta.
pub fn run_on_save_tournament(
    new: &StrategySnapshot,
    existing: &[StrategySnapshot],
    rounds: u16,
    rng: &MatchRng,
    played_at: i64,
) -> OnSaveOutcome {
    let mut outcome = OnSaveOutcome::default();

    for (index, opponent) in existing.iter().enumerate() {
        if opponent.id == new.id {
            debug!(id = %new.id, "skipping self-match in on-save pass");
            continue;
        }

        let mut match_rng = rng.substream(index as u64);
        let result = run_match(
            &new.tree.decider(),
            &opponent.tree.decider(),
            rounds,
            &mut match_rng,
        );

        outcome.new_strategy_delta += result.score_a;
        *outcome
            .opponent_deltas
            .entry(opponent.id.clone())
            .or_insert(0) += result.score_b;
        outcome.records.push(record_for(new, opponent, result, played_at));
    }

    debug!(
        id = %new.id,
        opponents = outcome.records.len(),
        delta = outcome.new_strategy_delta,
        "on-save pass complete"
    );

    outcome
}

fn record_for(
    a: &StrategySnapshot,
    b: &StrategySnapshot,
    result: MatchResult,
    played_at: i64,
) -> MatchRecord {
    MatchRecord {
        strategy_a_id: a.id.clone(),
        strategy_a_name: a.name.clone(),
        strategy_b_id: b.id.clone(),
        strategy_b_name: b.name.clone(),
        moves_a: result.moves_a,
        moves_b: result.moves_b,
        score_a: result.score_a,
        score_b: result.score_b,
        played_at,
    }
}

/// Rejects overlapping grand-tournament passes.
///
/// The calling context holds one gate and acquires a permit before starting
/// a pass; a second caller finding the gate held treats its invocation as a
/// no-op rather than queueing. Dropping the permit releases the gate.
#[derive(Debug, Default)]
pub struct TournamentGate {
    running: AtomicBool,
}

impl TournamentGate {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Take the gate if no pass is outstanding.
    pub fn try_acquire(&self) -> Option<TournamentPermit<'_>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            Some(TournamentPermit { gate: self })
        } else {
            None
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the duration of one tournament pass.
#[derive(Debug)]
pub struct TournamentPermit<'a> {
    gate: &'a TournamentGate,
}

impl Drop for TournamentPermit<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}
