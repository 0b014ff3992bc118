//! Full stat rebuild from the ordered match log.

use crate::logic::pairing::update_buchholz;
use crate::logic::standings::preliminary_standings;
use crate::models::{Bye, DebateMatch, Side, SpeakerRound, Team, TeamId, Tournament};

/// Rebuild every derived team field from the match log and bye list.
///
/// Matches replay in (round, match id) order. Pairing-derived fields
/// (opponents, sides, counts) accrue for every match; result-derived fields
/// only for reported ones, so a round paired ahead of its predecessor's
/// results stays well-defined. Afterwards `current_round` is set to the
/// longest fully-reported prefix, and break seeds are reassigned from the
/// preliminary standings once the tournament has entered elimination.
///
/// This rebuild is the single source of truth: every mutation calls it, and
/// it is idempotent. No code path patches stats incrementally.
pub fn recompute_stats(t: &mut Tournament) {
    let Tournament {
        teams,
        matches,
        byes,
        ..
    } = t;
    replay(teams, matches, byes, u32::MAX);

    let last = t.highest_paired_round();
    let mut current = 0;
    for round in 1..=last {
        if t.round_complete(round) {
            current = round;
        } else {
            break;
        }
    }
    t.current_round = current;

    let prelim = t.config.num_prelim_rounds;
    if t.matches.iter().any(|m| m.round_num > prelim) {
        let break_size = t.config.break_size() as usize;
        let seeds: Vec<TeamId> = preliminary_standings(t)
            .iter()
            .take(break_size)
            .map(|row| row.team_id)
            .collect();
        for (pos, id) in seeds.iter().enumerate() {
            if let Some(team) = t.team_mut(*id) {
                team.break_seed = Some(pos as u32 + 1);
            }
        }
    }
}

/// Replay rounds 1..=max_round of the match log (and byes) into `teams`,
/// starting from zeroed stats, then recompute Buchholz.
pub(crate) fn replay(teams: &mut [Team], matches: &[DebateMatch], byes: &[Bye], max_round: u32) {
    for team in teams.iter_mut() {
        team.reset_stats();
    }

    let mut order: Vec<usize> = (0..matches.len())
        .filter(|&i| matches[i].round_num <= max_round)
        .collect();
    order.sort_by_key(|&i| (matches[i].round_num, matches[i].match_id));

    let last_round = order
        .iter()
        .map(|&i| matches[i].round_num)
        .max()
        .unwrap_or(0)
        .max(
            byes.iter()
                .filter(|b| b.round_num <= max_round)
                .map(|b| b.round_num)
                .max()
                .unwrap_or(0),
        );

    for round in 1..=last_round {
        for &i in &order {
            let m = &matches[i];
            if m.round_num != round {
                continue;
            }
            if let Some(aff) = team_of(teams, m.aff_id) {
                aff.record_side(m.neg_id, Side::Aff);
                if let Some(points) = m.speaker_points {
                    aff.speaker_points_history.push(SpeakerRound {
                        round,
                        points: [points[0], points[1]],
                    });
                }
            }
            if let Some(neg) = team_of(teams, m.neg_id) {
                neg.record_side(m.aff_id, Side::Neg);
                if let Some(points) = m.speaker_points {
                    neg.speaker_points_history.push(SpeakerRound {
                        round,
                        points: [points[2], points[3]],
                    });
                }
            }
            match m.result {
                Some(Side::Aff) => {
                    if let Some(aff) = team_of(teams, m.aff_id) {
                        aff.record_win(round);
                    }
                    if let Some(neg) = team_of(teams, m.neg_id) {
                        neg.record_loss(round);
                    }
                }
                Some(Side::Neg) => {
                    if let Some(neg) = team_of(teams, m.neg_id) {
                        neg.record_win(round);
                    }
                    if let Some(aff) = team_of(teams, m.aff_id) {
                        aff.record_loss(round);
                    }
                }
                None => {}
            }
        }
        for bye in byes.iter().filter(|b| b.round_num == round) {
            if let Some(team) = team_of(teams, bye.team_id) {
                team.record_bye();
            }
        }
    }

    update_buchholz(teams);
}

fn team_of(teams: &mut [Team], id: TeamId) -> Option<&mut Team> {
    if id < 0 {
        return None;
    }
    teams.get_mut(id as usize).filter(|t| t.id == id)
}
