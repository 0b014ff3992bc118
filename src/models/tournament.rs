//! Tournament aggregate, configuration, and error types.

use crate::models::debate::{DebateMatch, MatchId};
use crate::models::judge::{Judge, JudgeId};
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};

/// Comment headers written at the top of the two textual projections.
pub const PAIRING_LOG_HEADER: &str = "# Format: Round MatchID AffID NegID";
pub const RESULT_LOG_HEADER: &str =
    "# Format: Round MatchID AffID NegID Outcome JudgeID [Aff1 Aff2 Neg1 Neg2]";

/// Errors that can occur during tournament operations.
///
/// Most variants are validation errors: the caller's request was refused and
/// state is unchanged. `Inconsistent` is different in kind: it means a
/// cross-representation invariant no longer holds, which indicates a defect
/// or tampering. Callers should surface it and re-read from the last good
/// snapshot rather than retry.
#[derive(Clone, Debug, PartialEq)]
pub enum TournamentError {
    /// No match with this id exists.
    UnknownMatch(MatchId),
    /// No team with this id exists.
    UnknownTeam(TeamId),
    /// No judge with this id exists.
    UnknownJudge(JudgeId),
    /// A judge with this name already exists (names are unique, case-insensitive).
    DuplicateJudgeName(String),
    /// The judge still has matches assigned and cannot be removed.
    JudgeHasAssignments(JudgeId),
    /// Rounds must be paired in order.
    RoundOutOfSequence { expected: u32, requested: u32 },
    /// The requested round is beyond the configured round count.
    RoundOutOfRange(u32),
    /// An earlier round still has unreported matches.
    PriorRoundIncomplete(u32),
    /// The match already has a result; use an update to overwrite it.
    DuplicateResult(MatchId),
    /// Fewer teams than the elimination bracket requires.
    BreakTooLarge { break_size: u32, num_teams: u32 },
    /// A tournament needs at least two teams.
    NotEnoughTeams(u32),
    /// Speaker points must lie in [0, 30].
    SpeakerPointsOutOfRange(f64),
    /// An outcome token other than A or N.
    InvalidOutcome(String),
    /// A pairing or result log line that could not be parsed.
    MalformedLogLine { line: usize, reason: String },
    /// A pairing log declared the same match id twice.
    MatchIdCollision(MatchId),
    /// A result line's team ids disagree with the recorded pairing.
    TeamIdMismatch(MatchId),
    /// Unrecognised win model name.
    UnknownWinModel(String),
    /// Unrecognised speaker ranking method name.
    UnknownRankingMethod(String),
    /// A win/loss history string that is malformed or longer than the round count.
    InvalidHistory(String),
    /// A cross-representation invariant is broken.
    Inconsistent(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::UnknownMatch(id) => write!(f, "Match {} does not exist", id),
            TournamentError::UnknownTeam(id) => write!(f, "Team {} does not exist", id),
            TournamentError::UnknownJudge(id) => write!(f, "Judge {} does not exist", id),
            TournamentError::DuplicateJudgeName(name) => {
                write!(f, "A judge named '{}' already exists", name)
            }
            TournamentError::JudgeHasAssignments(id) => {
                write!(f, "Judge {} still has matches assigned", id)
            }
            TournamentError::RoundOutOfSequence { expected, requested } => {
                write!(f, "Expected to pair Round {}, but got {}", expected, requested)
            }
            TournamentError::RoundOutOfRange(round) => {
                write!(f, "Round {} is beyond the configured schedule", round)
            }
            TournamentError::PriorRoundIncomplete(round) => {
                write!(f, "Round {} is not fully reported", round)
            }
            TournamentError::DuplicateResult(id) => {
                write!(f, "Match {} already has a result (update to overwrite)", id)
            }
            TournamentError::BreakTooLarge { break_size, num_teams } => {
                write!(f, "Cannot break {} teams from a field of {}", break_size, num_teams)
            }
            TournamentError::NotEnoughTeams(n) => {
                write!(f, "Need at least 2 teams, got {}", n)
            }
            TournamentError::SpeakerPointsOutOfRange(v) => {
                write!(f, "Speaker points {} outside [0, 30]", v)
            }
            TournamentError::InvalidOutcome(token) => {
                write!(f, "Invalid outcome '{}' (expected A or N)", token)
            }
            TournamentError::MalformedLogLine { line, reason } => {
                write!(f, "Malformed log line {}: {}", line, reason)
            }
            TournamentError::MatchIdCollision(id) => write!(f, "Duplicate match ID {}", id),
            TournamentError::TeamIdMismatch(id) => {
                write!(f, "Team ID mismatch for match {}", id)
            }
            TournamentError::UnknownWinModel(name) => {
                write!(f, "Unknown win model '{}'", name)
            }
            TournamentError::UnknownRankingMethod(name) => {
                write!(f, "Unknown ranking method '{}'", name)
            }
            TournamentError::InvalidHistory(reason) => {
                write!(f, "Invalid win/loss history: {}", reason)
            }
            TournamentError::Inconsistent(detail) => {
                write!(f, "State inconsistency detected: {}", detail)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// Static tournament configuration fixed at init time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub num_teams: u32,
    pub num_prelim_rounds: u32,
    pub num_elim_rounds: u32,
}

impl TournamentConfig {
    pub fn num_rounds(&self) -> u32 {
        self.num_prelim_rounds + self.num_elim_rounds
    }

    /// Number of teams that break: `2 ^ num_elim_rounds`.
    pub fn break_size(&self) -> u32 {
        1 << self.num_elim_rounds
    }
}

/// Input record for one team at init time. Missing fields are padded with
/// defaults ("Team N", empty institution, "<name> A"/"<name> B").
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamSeed {
    pub name: String,
    pub institution: String,
    pub members: [String; 2],
}

/// A round in which one team sat out and was awarded a win.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bye {
    pub round_num: u32,
    pub team_id: TeamId,
}

/// Full tournament state: configuration, registries, the match log, and the
/// two textual projections kept pointwise equal to the structured records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub config: TournamentConfig,
    /// Highest round R such that every round 1..=R is fully reported.
    pub current_round: u32,
    pub teams: Vec<Team>,
    pub judges: Vec<Judge>,
    /// All matches across all rounds, in creation order.
    pub matches: Vec<DebateMatch>,
    pub byes: Vec<Bye>,
    pub next_match_id: MatchId,
    pub next_judge_id: JudgeId,
    pub pairing_text: String,
    pub result_text: String,
}

impl Tournament {
    /// Create a tournament with the given configuration and team details.
    /// The seed list may be shorter than `num_teams`; missing entries get
    /// default names. Extra entries are ignored.
    pub fn new(config: TournamentConfig, seeds: Vec<TeamSeed>) -> Result<Self, TournamentError> {
        if config.num_teams < 2 {
            return Err(TournamentError::NotEnoughTeams(config.num_teams));
        }
        let mut teams = Vec::with_capacity(config.num_teams as usize);
        for i in 0..config.num_teams {
            let seed = seeds.get(i as usize);
            let name = match seed {
                Some(s) if !s.name.trim().is_empty() => s.name.trim().to_string(),
                _ => format!("Team {}", i + 1),
            };
            let institution = seed.map(|s| s.institution.clone()).unwrap_or_default();
            let members = match seed {
                Some(s) if s.members.iter().all(|m| !m.trim().is_empty()) => [
                    s.members[0].trim().to_string(),
                    s.members[1].trim().to_string(),
                ],
                _ => [format!("{name} A"), format!("{name} B")],
            };
            teams.push(Team::new(i as TeamId, name, institution, members));
        }
        Ok(Self {
            config,
            current_round: 0,
            teams,
            judges: Vec::new(),
            matches: Vec::new(),
            byes: Vec::new(),
            next_match_id: 1,
            next_judge_id: 1,
            pairing_text: format!("{PAIRING_LOG_HEADER}\n"),
            result_text: format!("{RESULT_LOG_HEADER}\n"),
        })
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        if id < 0 {
            return None;
        }
        self.teams.get(id as usize).filter(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        if id < 0 {
            return None;
        }
        self.teams.get_mut(id as usize).filter(|t| t.id == id)
    }

    pub fn find_match(&self, match_id: MatchId) -> Option<&DebateMatch> {
        self.matches.iter().find(|m| m.match_id == match_id)
    }

    pub fn find_match_mut(&mut self, match_id: MatchId) -> Option<&mut DebateMatch> {
        self.matches.iter_mut().find(|m| m.match_id == match_id)
    }

    pub fn judge(&self, id: JudgeId) -> Option<&Judge> {
        self.judges.iter().find(|j| j.id == id)
    }

    pub fn judge_mut(&mut self, id: JudgeId) -> Option<&mut Judge> {
        self.judges.iter_mut().find(|j| j.id == id)
    }

    /// Matches of one round, in creation order.
    pub fn round_matches(&self, round: u32) -> Vec<&DebateMatch> {
        self.matches.iter().filter(|m| m.round_num == round).collect()
    }

    /// Highest round for which pairings exist (0 before the first pairing).
    pub fn highest_paired_round(&self) -> u32 {
        let from_matches = self.matches.iter().map(|m| m.round_num).max().unwrap_or(0);
        let from_byes = self.byes.iter().map(|b| b.round_num).max().unwrap_or(0);
        from_matches.max(from_byes)
    }

    /// Whether every match of the given round has a result. Byes need none.
    pub fn round_complete(&self, round: u32) -> bool {
        self.matches
            .iter()
            .filter(|m| m.round_num == round)
            .all(|m| m.result.is_some())
    }
}
