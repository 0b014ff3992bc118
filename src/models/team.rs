//! Team and Member data structures, including the derived stat block.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Team identifier: dense `0..num_teams`, stable for the tournament's lifetime.
pub type TeamId = i32;

/// Sentinel stored in `opponents` for a round in which the team had no opponent.
pub const BYE_OPPONENT: TeamId = -1;

/// Side of a debate match.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Aff,
    Neg,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::Aff => Side::Neg,
            Side::Neg => Side::Aff,
        }
    }
}

/// One of the two speakers on a team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// Intra-team slot: 0 or 1.
    pub slot: usize,
}

/// Speaker points recorded for one round, in member-slot order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeakerRound {
    pub round: u32,
    pub points: [Option<f64>; 2],
}

/// A team and its derived statistics.
///
/// Everything from `score` down is rebuilt from the match log by the stat
/// recomputer and must never be edited directly by callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub institution: String,
    pub members: [Member; 2],
    /// 1 = strongest, for virtual rosters; 0 when unknown (live tournaments).
    pub true_rank: u32,
    /// Tournament points: one per win, plus one per bye.
    pub score: u32,
    /// Decided matches won (byes excluded).
    pub wins: u32,
    /// Sum of opponents' current scores.
    pub buchholz: u32,
    pub aff_count: u32,
    pub neg_count: u32,
    pub last_side: Option<Side>,
    /// Opponent ids in round order; `BYE_OPPONENT` marks a bye.
    pub opponents: Vec<TeamId>,
    /// Opponent id -> sides taken against that opponent, in meeting order.
    pub side_history: BTreeMap<TeamId, Vec<Side>>,
    /// One 'W' or 'L' per decided match, in round order.
    pub history: String,
    /// Calendar round of each `history` entry (byes occupy a round but add
    /// nothing here, so the two sequences stay aligned).
    pub history_rounds: Vec<u32>,
    pub speaker_points_history: Vec<SpeakerRound>,
    /// 1-based seed position once the team breaks to elimination rounds.
    pub break_seed: Option<u32>,
}

impl Team {
    /// Create a team with named members and zeroed stats.
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        institution: impl Into<String>,
        member_names: [String; 2],
    ) -> Self {
        let [first, second] = member_names;
        Self {
            id,
            name: name.into(),
            institution: institution.into(),
            members: [
                Member { name: first, slot: 0 },
                Member { name: second, slot: 1 },
            ],
            true_rank: 0,
            score: 0,
            wins: 0,
            buchholz: 0,
            aff_count: 0,
            neg_count: 0,
            last_side: None,
            opponents: Vec::new(),
            side_history: BTreeMap::new(),
            history: String::new(),
            history_rounds: Vec::new(),
            speaker_points_history: Vec::new(),
            break_seed: None,
        }
    }

    /// Create a virtual team for simulation: rank `id + 1`, placeholder names.
    pub fn with_rank(id: TeamId, true_rank: u32) -> Self {
        let name = format!("Team {}", id + 1);
        let members = [format!("{name} A"), format!("{name} B")];
        let mut team = Team::new(id, name, "", members);
        team.true_rank = true_rank;
        team
    }

    /// Clear every derived field back to its zero state (for full rebuilds).
    pub fn reset_stats(&mut self) {
        self.score = 0;
        self.wins = 0;
        self.buchholz = 0;
        self.aff_count = 0;
        self.neg_count = 0;
        self.last_side = None;
        self.opponents.clear();
        self.side_history.clear();
        self.history.clear();
        self.history_rounds.clear();
        self.speaker_points_history.clear();
        self.break_seed = None;
    }

    /// Record one round on the given side against the given opponent.
    pub fn record_side(&mut self, opponent: TeamId, side: Side) {
        self.opponents.push(opponent);
        match side {
            Side::Aff => self.aff_count += 1,
            Side::Neg => self.neg_count += 1,
        }
        self.last_side = Some(side);
        self.side_history.entry(opponent).or_default().push(side);
    }

    /// Record a match won in the given round.
    pub fn record_win(&mut self, round: u32) {
        self.score += 1;
        self.wins += 1;
        self.history.push('W');
        self.history_rounds.push(round);
    }

    /// Record a match lost in the given round.
    pub fn record_loss(&mut self, round: u32) {
        self.history.push('L');
        self.history_rounds.push(round);
    }

    /// Record a bye: a point with no opponent, no side, and no history mark.
    pub fn record_bye(&mut self) {
        self.score += 1;
        self.opponents.push(BYE_OPPONENT);
    }

    /// Whether this team has already met the given opponent (byes never match).
    pub fn has_played(&self, opponent: TeamId) -> bool {
        self.opponents.contains(&opponent)
    }

    /// Whether this team has taken `side` against the given opponent before.
    pub fn played_side_against(&self, opponent: TeamId, side: Side) -> bool {
        self.side_history
            .get(&opponent)
            .map_or(false, |sides| sides.contains(&side))
    }
}
