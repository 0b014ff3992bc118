//! Match records: the immutable pairing decision plus the mutable outcome.

use crate::models::judge::JudgeId;
use crate::models::team::{Side, Team, TeamId};
use serde::{Deserialize, Serialize};

/// Unique identifier for a match: 1-based, assigned monotonically.
pub type MatchId = u32;

/// Per-match speaker points: `[aff first, aff second, neg first, neg second]`.
pub type SpeakerPoints = [Option<f64>; 4];

/// Inclusive bounds for a single speaker score.
pub const SPEAKER_POINTS_MIN: f64 = 0.0;
pub const SPEAKER_POINTS_MAX: f64 = 30.0;

/// A single debate match. Pairing fields are frozen at creation; the outcome
/// (`result`, `judge_id`, `speaker_points`) may be set, corrected, or cleared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebateMatch {
    pub match_id: MatchId,
    pub round_num: u32,
    pub aff_id: TeamId,
    pub neg_id: TeamId,
    /// Display names captured at pairing time.
    pub aff_name: String,
    pub neg_name: String,
    /// None until a ballot is entered.
    pub result: Option<Side>,
    pub judge_id: Option<JudgeId>,
    pub speaker_points: Option<SpeakerPoints>,
}

impl DebateMatch {
    pub fn new(match_id: MatchId, round_num: u32, aff: &Team, neg: &Team) -> Self {
        Self {
            match_id,
            round_num,
            aff_id: aff.id,
            neg_id: neg.id,
            aff_name: aff.name.clone(),
            neg_name: neg.name.clone(),
            result: None,
            judge_id: None,
            speaker_points: None,
        }
    }

    /// Id of the winning team, if a result has been entered.
    pub fn winner_id(&self) -> Option<TeamId> {
        self.result.map(|side| match side {
            Side::Aff => self.aff_id,
            Side::Neg => self.neg_id,
        })
    }
}
