//! Swiss pairing core: score groups, floating, opponent search, side assignment.

use crate::models::{Side, Team, TeamId, BYE_OPPONENT};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Output of one pairing pass: (aff, neg) pairs in emission order, plus at
/// most one bye for an odd field.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RoundPairing {
    pub pairs: Vec<(TeamId, TeamId)>,
    pub bye: Option<TeamId>,
}

/// Pair one round of Swiss play.
///
/// 1. Recompute Buchholz across all teams.
/// 2. Shuffle a working order.
/// 3. Rounds 1-2 use a single bracket (scores ignored); later rounds group by
///    exact score.
/// 4. Walk brackets in descending score, carrying unpaired teams down as
///    floats. Past round 2 each working list is sorted by
///    (score desc, buchholz desc, id asc); with `use_buchholz` off, buchholz
///    is dropped from the key.
/// 5. Greedily pair from the head via [`find_best_opponent`]. Leftover floats
///    drain pairwise with no repeat check; an odd leftover takes the bye.
///
/// The bye is applied to the team record directly (score + 1, sentinel
/// opponent). Nothing prevents a team from drawing a second bye in a
/// pathological field.
///
/// Generic over the random source: the live manager passes the platform RNG,
/// the simulator its seeded generator.
pub fn pair_swiss(
    teams: &mut [Team],
    round_num: u32,
    use_buchholz: bool,
    rng: &mut impl Rng,
) -> RoundPairing {
    update_buchholz(teams);

    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.shuffle(rng);

    // score -> working list of team indices, in shuffled order
    let mut brackets: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for &i in &order {
        let key = if round_num <= 2 { 0 } else { teams[i].score };
        brackets.entry(key).or_default().push(i);
    }

    let mut pairs: Vec<(TeamId, TeamId)> = Vec::new();
    let mut floaters: Vec<usize> = Vec::new();

    for (_score, mut group) in brackets.into_iter().rev() {
        group.extend(floaters.drain(..));
        if round_num > 2 {
            if use_buchholz {
                group.sort_by_key(|&i| {
                    (
                        Reverse(teams[i].score),
                        Reverse(teams[i].buchholz),
                        teams[i].id,
                    )
                });
            } else {
                group.sort_by_key(|&i| (Reverse(teams[i].score), teams[i].id));
            }
        }
        while !group.is_empty() {
            let head = group.remove(0);
            match find_best_opponent(&teams[head], &group, teams) {
                Some((pos, swappable)) => {
                    let opp = group.remove(pos);
                    let (aff, neg) = determine_sides(&teams[head], &teams[opp], swappable, rng);
                    pairs.push((aff, neg));
                }
                None => floaters.push(head),
            }
        }
    }

    // Last resort: floats pair in arrival order, repeats tolerated.
    while floaters.len() >= 2 {
        let a = floaters.remove(0);
        let b = floaters.remove(0);
        let (aff, neg) = determine_sides(&teams[a], &teams[b], false, rng);
        pairs.push((aff, neg));
    }

    let bye = floaters.pop().map(|i| {
        teams[i].record_bye();
        teams[i].id
    });

    RoundPairing { pairs, bye }
}

/// Scan the working list for the best opponent for `team`.
///
/// Priority 1: the first candidate the team has never met. Priority 2, only
/// when no fresh candidate exists: the first prior opponent against whom at
/// least one side is still unplayed, flagged swappable. `group` holds indices
/// into `teams`; the returned position indexes into `group`. Removal and pair
/// emission are left to the caller.
pub fn find_best_opponent(team: &Team, group: &[usize], teams: &[Team]) -> Option<(usize, bool)> {
    let mut swappable: Option<usize> = None;
    for (pos, &i) in group.iter().enumerate() {
        let candidate = &teams[i];
        if !team.has_played(candidate.id) {
            return Some((pos, false));
        }
        if swappable.is_none()
            && (!team.played_side_against(candidate.id, Side::Aff)
                || !team.played_side_against(candidate.id, Side::Neg))
        {
            swappable = Some(pos);
        }
    }
    swappable.map(|pos| (pos, true))
}

/// Decide which team argues Aff; returns (aff, neg).
///
/// A swappable rematch forces the side `t1` has not yet taken against `t2`
/// when exactly one is open. Otherwise the team with the higher side
/// preference takes Aff; exact ties flip a coin.
pub fn determine_sides(
    t1: &Team,
    t2: &Team,
    swappable: bool,
    rng: &mut impl Rng,
) -> (TeamId, TeamId) {
    if swappable {
        let aff_open = !t1.played_side_against(t2.id, Side::Aff);
        let neg_open = !t1.played_side_against(t2.id, Side::Neg);
        if aff_open && !neg_open {
            return (t1.id, t2.id);
        }
        if neg_open && !aff_open {
            return (t2.id, t1.id);
        }
    }
    let p1 = side_preference(t1);
    let p2 = side_preference(t2);
    if p1 > p2 {
        (t1.id, t2.id)
    } else if p2 > p1 {
        (t2.id, t1.id)
    } else if rng.gen_bool(0.5) {
        (t1.id, t2.id)
    } else {
        (t2.id, t1.id)
    }
}

/// Side preference: positive means the team wants Aff next. The last-side
/// nudge of 2.0 outweighs a one-match side imbalance but not a two-match one;
/// the magnitude is load-bearing.
pub fn side_preference(team: &Team) -> f64 {
    let mut pref = f64::from(team.neg_count) - f64::from(team.aff_count);
    match team.last_side {
        Some(Side::Neg) => pref += 2.0,
        Some(Side::Aff) => pref -= 2.0,
        None => {}
    }
    pref
}

/// Recompute every team's Buchholz: the sum of its opponents' current scores,
/// byes excluded.
pub fn update_buchholz(teams: &mut [Team]) {
    let score_of: HashMap<TeamId, u32> = teams.iter().map(|t| (t.id, t.score)).collect();
    for team in teams.iter_mut() {
        team.buchholz = team
            .opponents
            .iter()
            .filter(|&&o| o != BYE_OPPONENT)
            .filter_map(|o| score_of.get(o))
            .sum();
    }
}
