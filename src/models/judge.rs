//! Judge registry entries.

use crate::models::debate::MatchId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique identifier for a judge: 1-based, assigned monotonically.
pub type JudgeId = u32;

/// Institution used for judges registered without one.
pub const DEFAULT_JUDGE_INSTITUTION: &str = "Tournament Hire";

/// A judge and the matches currently assigned to them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
    pub institution: String,
    /// Kept coherent with each match's `judge_id`.
    pub matches_judged: BTreeSet<MatchId>,
}

impl Judge {
    pub fn new(id: JudgeId, name: impl Into<String>, institution: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            institution: institution.unwrap_or_else(|| DEFAULT_JUDGE_INSTITUTION.to_string()),
            matches_judged: BTreeSet::new(),
        }
    }
}
