//! Round lifecycle: pairing the next round, entering results, corrections.

use crate::logic::bracket::elim_round_pairs;
use crate::logic::consistency;
use crate::logic::pairing::pair_swiss;
use crate::logic::stats::recompute_stats;
use crate::models::{
    Bye, DebateMatch, MatchId, Side, SpeakerPoints, Tournament, TournamentError,
    SPEAKER_POINTS_MAX, SPEAKER_POINTS_MIN,
};

/// Pair the next round.
///
/// `round` must be the next unpaired round and within the schedule. Round 2
/// may be paired before round 1 reports (the draw is random either way, and
/// the full rebuild keeps stats coherent once results arrive); from round 3
/// on, and for every elimination round, all earlier rounds must be fully
/// reported first.
pub fn pair_round(t: &mut Tournament, round: u32) -> Result<(), TournamentError> {
    let expected = t.highest_paired_round() + 1;
    if round != expected {
        return Err(TournamentError::RoundOutOfSequence {
            expected,
            requested: round,
        });
    }
    if round > t.config.num_rounds() {
        return Err(TournamentError::RoundOutOfRange(round));
    }
    let is_elim = round > t.config.num_prelim_rounds;
    let must_complete_through = if is_elim || round > 2 { round - 1 } else { 0 };
    for r in 1..=must_complete_through {
        if !t.round_complete(r) {
            return Err(TournamentError::PriorRoundIncomplete(r));
        }
    }

    let mut rng = rand::thread_rng();
    let (pairs, bye) = if is_elim {
        (elim_round_pairs(t, round, &mut rng)?, None)
    } else {
        let pairing = pair_swiss(&mut t.teams, round, true, &mut rng);
        (pairing.pairs, pairing.bye)
    };

    for (aff_id, neg_id) in pairs {
        let m = {
            let aff = t.team(aff_id).ok_or(TournamentError::UnknownTeam(aff_id))?;
            let neg = t.team(neg_id).ok_or(TournamentError::UnknownTeam(neg_id))?;
            DebateMatch::new(t.next_match_id, round, aff, neg)
        };
        consistency::append_pairing_line(&mut t.pairing_text, &m);
        t.matches.push(m);
        t.next_match_id += 1;
    }
    if let Some(team_id) = bye {
        t.byes.push(Bye {
            round_num: round,
            team_id,
        });
    }

    recompute_stats(t);
    consistency::validate(t)
}

/// Enter a result for an unreported match, optionally with speaker points.
/// Overwriting an existing result goes through [`update_result`] instead.
pub fn report_result(
    t: &mut Tournament,
    match_id: MatchId,
    winner: Side,
    speaker_points: Option<SpeakerPoints>,
) -> Result<(), TournamentError> {
    if let Some(points) = &speaker_points {
        check_speaker_points(points)?;
    }
    let m = t
        .find_match_mut(match_id)
        .ok_or(TournamentError::UnknownMatch(match_id))?;
    if m.result.is_some() {
        return Err(TournamentError::DuplicateResult(match_id));
    }
    m.result = Some(winner);
    if speaker_points.is_some() {
        m.speaker_points = speaker_points;
    }
    consistency::append_result_line(t, match_id);

    recompute_stats(t);
    consistency::validate(t)
}

/// Correct or clear a match result.
///
/// The match's active result-log line is commented out for audit and a fresh
/// line is appended when the new outcome is present. Speaker points are
/// replaced only when supplied; `new_outcome = None` clears the result.
pub fn update_result(
    t: &mut Tournament,
    match_id: MatchId,
    new_outcome: Option<Side>,
    speaker_points: Option<SpeakerPoints>,
) -> Result<(), TournamentError> {
    if let Some(points) = &speaker_points {
        check_speaker_points(points)?;
    }
    if t.find_match(match_id).is_none() {
        return Err(TournamentError::UnknownMatch(match_id));
    }
    consistency::retire_result_line(t, match_id, "Updated");
    let m = t
        .find_match_mut(match_id)
        .ok_or(TournamentError::UnknownMatch(match_id))?;
    m.result = new_outcome;
    if speaker_points.is_some() {
        m.speaker_points = speaker_points;
    }
    consistency::append_result_line(t, match_id);

    recompute_stats(t);
    consistency::validate(t)
}

pub(crate) fn check_speaker_points(points: &SpeakerPoints) -> Result<(), TournamentError> {
    for value in points.iter().flatten() {
        if !(SPEAKER_POINTS_MIN..=SPEAKER_POINTS_MAX).contains(value) {
            return Err(TournamentError::SpeakerPointsOutOfRange(*value));
        }
    }
    Ok(())
}
