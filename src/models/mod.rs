//! Data structures for the tournament engine: teams, matches, judges, state.

mod debate;
mod judge;
mod team;
mod tournament;

pub use debate::{DebateMatch, MatchId, SpeakerPoints, SPEAKER_POINTS_MAX, SPEAKER_POINTS_MIN};
pub use judge::{Judge, JudgeId, DEFAULT_JUDGE_INSTITUTION};
pub use team::{Member, Side, SpeakerRound, Team, TeamId, BYE_OPPONENT};
pub use tournament::{
    Bye, TeamSeed, Tournament, TournamentConfig, TournamentError, PAIRING_LOG_HEADER,
    RESULT_LOG_HEADER,
};
