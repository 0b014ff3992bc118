//! Single-elimination bracket seeding and elimination-round pairing.

use crate::logic::pairing::determine_sides;
use crate::logic::standings::preliminary_standings;
use crate::models::{TeamId, Tournament, TournamentError};
use rand::Rng;

/// Standard single-elimination pairings from a seed list (`seeds[0]` is the
/// top seed).
///
/// Recursive halving: positions congruent to 1 or 0 modulo 4 form the top
/// half, the rest the bottom half; both halves recurse and the bottom half's
/// pairs are emitted in reverse. Seed 1 lands in the first pair, seed 2 in
/// the last, the two seeds of every first-round pair sum to `len + 1`, and
/// top seeds can only meet in later rounds.
pub fn bracket_pairs(seeds: &[TeamId]) -> Vec<(TeamId, TeamId)> {
    if seeds.len() < 2 {
        return Vec::new();
    }
    if seeds.len() == 2 {
        return vec![(seeds[0], seeds[1])];
    }
    let mut top = Vec::with_capacity(seeds.len() / 2);
    let mut bottom = Vec::with_capacity(seeds.len() / 2);
    for (idx, &seed) in seeds.iter().enumerate() {
        match (idx + 1) % 4 {
            0 | 1 => top.push(seed),
            _ => bottom.push(seed),
        }
    }
    let mut pairs = bracket_pairs(&top);
    let mut bottom_pairs = bracket_pairs(&bottom);
    bottom_pairs.reverse();
    pairs.extend(bottom_pairs);
    pairs
}

/// Pairings for elimination round `round` (overall 1-based round number),
/// as (aff, neg) pairs in bracket order.
///
/// The first elimination round seeds the top `break_size` teams from the
/// preliminary standings; later rounds pair adjacent winners of the previous
/// round without re-sorting, since that order already encodes the bracket
/// path. Sides follow the usual preference logic.
pub(crate) fn elim_round_pairs(
    t: &Tournament,
    round: u32,
    rng: &mut impl Rng,
) -> Result<Vec<(TeamId, TeamId)>, TournamentError> {
    let k = round - t.config.num_prelim_rounds;
    let seeds: Vec<TeamId> = if k == 1 {
        let break_size = t.config.break_size();
        if t.config.num_teams < break_size {
            return Err(TournamentError::BreakTooLarge {
                break_size,
                num_teams: t.config.num_teams,
            });
        }
        preliminary_standings(t)
            .into_iter()
            .take(break_size as usize)
            .map(|row| row.team_id)
            .collect()
    } else {
        let mut winners = Vec::new();
        for m in t.round_matches(round - 1) {
            match m.winner_id() {
                Some(w) => winners.push(w),
                None => return Err(TournamentError::PriorRoundIncomplete(round - 1)),
            }
        }
        winners
    };

    let raw = if k == 1 {
        bracket_pairs(&seeds)
    } else {
        seeds.chunks_exact(2).map(|c| (c[0], c[1])).collect()
    };

    let mut pairs = Vec::with_capacity(raw.len());
    for (a, b) in raw {
        let ta = t.team(a).ok_or(TournamentError::UnknownTeam(a))?;
        let tb = t.team(b).ok_or(TournamentError::UnknownTeam(b))?;
        pairs.push(determine_sides(ta, tb, false, rng));
    }
    Ok(pairs)
}
