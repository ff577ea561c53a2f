//! Strategy definitions: moves, conditions, clauses, logic trees
//!
//! A strategy is an ordered list of if/elseif/else clauses authored in the
//! arena editor. Trees arrive from the editor and storage layers as JSON;
//! structural invariants are checked once at construction and deserialization
//! routes through the same check, so the interpreter only ever sees valid
//! trees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Cooperate,
    Betray,
}

impl core::fmt::Display for Move {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Move::Cooperate => write!(f, "cooperate"),
            Move::Betray => write!(f, "betray"),
        }
    }
}

/// Predicate kind for a single condition
///
/// Tags match the wire names used by the editor. Kinds introduced by newer
/// editors than this build deserialize to `Unknown` and never match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ConditionKind {
    /// Opponent's most recent move.
    OpponentLastMove,
    /// Own most recent move.
    YourLastMove,
    /// Opponent's move `n` rounds back (n=1 is the last move).
    OpponentNthLastMove,
    /// Own move `n` rounds back (n=1 is the last move).
    YourNthLastMove,
    /// Opponent's majority move over the whole match so far.
    OpponentMostCommon,
    /// Own majority move over the whole match so far.
    YourMostCommon,
    /// Forward-compat catch-all; evaluates to no-match.
    Unknown,
}

impl From<String> for ConditionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "opponent_last_move" => Self::OpponentLastMove,
            "your_last_move" => Self::YourLastMove,
            "opponent_nth_last_move" => Self::OpponentNthLastMove,
            "your_nth_last_move" => Self::YourNthLastMove,
            "opponent_most_common" => Self::OpponentMostCommon,
            "your_most_common" => Self::YourMostCommon,
            _ => Self::Unknown,
        }
    }
}

fn default_condition_n() -> u32 {
    1
}

/// A single predicate over the move histories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    /// Lookback depth; only meaningful for the nth-last-move kinds.
    #[serde(default = "default_condition_n")]
    pub n: u32,
    pub target: Move,
}

impl Condition {
    /// Condition with the default lookback of 1.
    pub fn new(kind: ConditionKind, target: Move) -> Self {
        Self { kind, n: 1, target }
    }

    /// Condition probing `n` rounds back.
    pub fn nth(kind: ConditionKind, n: u32, target: Move) -> Self {
        Self { kind, n, target }
    }
}

/// Position of a clause in the if/elseif/else chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseRole {
    If,
    ElseIf,
    Else,
}

/// How a clause combines its conditions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

/// What a satisfied clause plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Cooperate,
    Betray,
    /// Fair coin, re-rolled on every decision.
    Random,
}

/// One if/elseif/else rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub role: ClauseRole,
    /// Empty on an if/elseif clause means the clause never matches.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Ignored for else clauses.
    #[serde(default)]
    pub match_mode: MatchMode,
    pub action: Action,
}

/// Errors rejected when building a logic tree
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LogicTreeError {
    #[error("logic tree has no clauses")]
    Empty,
    #[error("first clause must be an if clause")]
    MissingLeadingIf,
    #[error("clause {0} is a second if clause")]
    DuplicateIf(usize),
    #[error("else clause at {0} must be the final clause")]
    ElseNotLast(usize),
    #[error("else clause at {0} carries conditions")]
    ElseWithConditions(usize),
}

/// Ordered clause list defining a strategy's behavior
///
/// Invariants, checked at construction:
/// - at least one clause, and the first is the only `if`
/// - at most one `else`, in final position, with no conditions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Clause>", into = "Vec<Clause>")]
pub struct LogicTree(Vec<Clause>);

impl LogicTree {
    /// Build a tree, rejecting structurally malformed clause lists.
    pub fn new(clauses: Vec<Clause>) -> Result<Self, LogicTreeError> {
        let Some(first) = clauses.first() else {
            return Err(LogicTreeError::Empty);
        };
        if first.role != ClauseRole::If {
            return Err(LogicTreeError::MissingLeadingIf);
        }
        for (index, clause) in clauses.iter().enumerate() {
            match clause.role {
                ClauseRole::If if index > 0 => {
                    return Err(LogicTreeError::DuplicateIf(index));
                }
                ClauseRole::Else => {
                    if !clause.conditions.is_empty() {
                        return Err(LogicTreeError::ElseWithConditions(index));
                    }
                    if index + 1 != clauses.len() {
                        return Err(LogicTreeError::ElseNotLast(index));
                    }
                }
                _ => {}
            }
        }
        Ok(Self(clauses))
    }

    /// Parse a tree from editor/storage JSON, validating structure.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    /// Human-readable one-line summary, e.g. for strategy listings.
    pub fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(self.0.len());
        for clause in &self.0 {
            let head = match clause.role {
                ClauseRole::If => "if",
                ClauseRole::ElseIf => "else if",
                ClauseRole::Else => "otherwise",
            };
            let body = match clause.role {
                ClauseRole::Else => format!("{head}: {}", describe_action(clause.action)),
                _ => {
                    let joiner = match clause.match_mode {
                        MatchMode::All => " and ",
                        MatchMode::Any => " or ",
                    };
                    let conditions: Vec<String> =
                        clause.conditions.iter().map(describe_condition).collect();
                    format!(
                        "{head} {}: {}",
                        conditions.join(joiner),
                        describe_action(clause.action)
                    )
                }
            };
            parts.push(body);
        }
        parts.join("; ")
    }
}

impl TryFrom<Vec<Clause>> for LogicTree {
    type Error = LogicTreeError;

    fn try_from(clauses: Vec<Clause>) -> Result<Self, Self::Error> {
        Self::new(clauses)
    }
}

impl From<LogicTree> for Vec<Clause> {
    fn from(tree: LogicTree) -> Self {
        tree.0
    }
}

fn describe_condition(condition: &Condition) -> String {
    match condition.kind {
        ConditionKind::OpponentLastMove => {
            format!("opponent's last move was {}", condition.target)
        }
        ConditionKind::YourLastMove => format!("your last move was {}", condition.target),
        ConditionKind::OpponentNthLastMove => format!(
            "opponent's move {} back was {}",
            condition.n, condition.target
        ),
        ConditionKind::YourNthLastMove => {
            format!("your move {} back was {}", condition.n, condition.target)
        }
        ConditionKind::OpponentMostCommon => {
            format!("opponent mostly played {}", condition.target)
        }
        ConditionKind::YourMostCommon => format!("you mostly played {}", condition.target),
        ConditionKind::Unknown => "(unrecognized condition)".to_string(),
    }
}

fn describe_action(action: Action) -> String {
    match action {
        Action::Cooperate => "cooperate".to_string(),
        Action::Betray => "betray".to_string(),
        Action::Random => "play at random".to_string(),
    }
}

/// Stock trees, written the way an arena user would author them.
impl LogicTree {
    /// Never betrays.
    pub fn always_cooperate() -> Self {
        Self(vec![
            Clause {
                role: ClauseRole::If,
                conditions: vec![Condition::new(ConditionKind::OpponentLastMove, Move::Betray)],
                match_mode: MatchMode::All,
                action: Action::Cooperate,
            },
            Clause {
                role: ClauseRole::Else,
                conditions: Vec::new(),
                match_mode: MatchMode::All,
                action: Action::Cooperate,
            },
        ])
    }

    /// Never cooperates.
    pub fn always_betray() -> Self {
        Self(vec![
            Clause {
                role: ClauseRole::If,
                conditions: vec![Condition::new(ConditionKind::OpponentLastMove, Move::Betray)],
                match_mode: MatchMode::All,
                action: Action::Betray,
            },
            Clause {
                role: ClauseRole::Else,
                conditions: Vec::new(),
                match_mode: MatchMode::All,
                action: Action::Betray,
            },
        ])
    }

    /// Copies the opponent's last move. Starts by cooperating.
    pub fn tit_for_tat() -> Self {
        Self(vec![
            Clause {
                role: ClauseRole::If,
                conditions: vec![Condition::new(ConditionKind::OpponentLastMove, Move::Betray)],
                match_mode: MatchMode::All,
                action: Action::Betray,
            },
            Clause {
                role: ClauseRole::Else,
                conditions: Vec::new(),
                match_mode: MatchMode::All,
                action: Action::Cooperate,
            },
        ])
    }

    /// Cooperates until betrayed once, then betrays for the rest of the
    /// match. Probes the last `horizon` moves, so it holds the grudge over
    /// a standard-length match.
    pub fn grudger(horizon: u32) -> Self {
        let probes = (1..=horizon)
            .map(|n| Condition::nth(ConditionKind::OpponentNthLastMove, n, Move::Betray))
            .collect();
        Self(vec![
            Clause {
                role: ClauseRole::If,
                conditions: probes,
                match_mode: MatchMode::Any,
                action: Action::Betray,
            },
            Clause {
                role: ClauseRole::Else,
                conditions: Vec::new(),
                match_mode: MatchMode::All,
                action: Action::Cooperate,
            },
        ])
    }

    /// Flips a fair coin every round.
    pub fn coin_flip() -> Self {
        Self(vec![
            // Conditionless if never fires; the else does all the work.
            Clause {
                role: ClauseRole::If,
                conditions: Vec::new(),
                match_mode: MatchMode::All,
                action: Action::Cooperate,
            },
            Clause {
                role: ClauseRole::Else,
                conditions: Vec::new(),
                match_mode: MatchMode::All,
                action: Action::Random,
            },
        ])
    }
}
