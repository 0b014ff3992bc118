//! Tournament engine logic: pairing, brackets, stats, standings, judges,
//! and the consistency layer.

mod bracket;
mod consistency;
mod judges;
mod pairing;
mod rounds;
mod standings;
mod stats;

pub use bracket::bracket_pairs;
pub use consistency::{
    apply_result_log, parse_pairing_log, parse_result_log, reinit_from_logs, validate,
    PairingLine, ResultLine,
};
pub use judges::{add_judge, assign_judge, remove_judge, unassign_judge};
pub use pairing::{
    determine_sides, find_best_opponent, pair_swiss, side_preference, update_buchholz,
    RoundPairing,
};
pub use rounds::{pair_round, report_result, update_result};
pub use standings::{
    participant_standings, preliminary_standings, standings, standings_through,
    ParticipantMethod, ParticipantRow, StandingsRow,
};
pub use stats::recompute_stats;
