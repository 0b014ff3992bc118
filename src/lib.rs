//! Swiss-system debate tournament engine: score-group pairing with side
//! constraints, single-elimination brackets, standings and tiebreakers, a
//! consistency-checked state pipeline, and a Monte Carlo simulator built on
//! the same pairing core.

pub mod logic;
pub mod models;
pub mod sim;

pub use logic::{
    add_judge, apply_result_log, assign_judge, bracket_pairs, determine_sides,
    find_best_opponent, pair_round, pair_swiss, parse_pairing_log, parse_result_log,
    participant_standings, preliminary_standings, recompute_stats, reinit_from_logs,
    remove_judge, report_result, side_preference, standings, standings_through,
    unassign_judge, update_buchholz, update_result, validate, PairingLine,
    ParticipantMethod, ParticipantRow, ResultLine, RoundPairing, StandingsRow,
};
pub use models::{
    Bye, DebateMatch, Judge, JudgeId, MatchId, Member, Side, SpeakerPoints, SpeakerRound,
    Team, TeamId, TeamSeed, Tournament, TournamentConfig, TournamentError, BYE_OPPONENT,
};
pub use sim::{
    head_to_head, rank_distribution_from_history, rank_distribution_from_wins, run_tournament,
    simulate_match, top_n_probability, top_n_probability_from_history, win_distribution,
    HeadToHeadParams, HeadToHeadReport, Lcg, RankDistributionReport, SimConfig,
    TopNHistoryReport, TopNReport, WinDistributionReport, WinModel,
};
