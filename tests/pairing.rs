//! Integration tests for the Swiss pairing core: opponent search, side
//! assignment, byes.

use swiss_tab::{
    determine_sides, find_best_opponent, pair_swiss, side_preference, Lcg, Side, Team, TeamId,
    BYE_OPPONENT,
};

fn virtual_teams(n: u32) -> Vec<Team> {
    (0..n).map(|i| Team::with_rank(i as TeamId, i + 1)).collect()
}

fn assert_each_team_used_once(teams: &[Team], pairs: &[(TeamId, TeamId)], bye: Option<TeamId>) {
    let mut used: Vec<TeamId> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
    used.extend(bye);
    used.sort();
    let mut expected: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    expected.sort();
    assert_eq!(used, expected);
}

#[test]
fn round_one_pairs_everyone_exactly_once() {
    let mut teams = virtual_teams(8);
    let mut rng = Lcg::new(12345);
    let pairing = pair_swiss(&mut teams, 1, true, &mut rng);
    assert_eq!(pairing.pairs.len(), 4);
    assert_eq!(pairing.bye, None);
    assert_each_team_used_once(&teams, &pairing.pairs, pairing.bye);
    for &(aff, neg) in &pairing.pairs {
        assert_ne!(aff, neg);
    }
}

#[test]
fn odd_field_awards_exactly_one_bye() {
    let mut teams = virtual_teams(5);
    let mut rng = Lcg::new(12345);
    let pairing = pair_swiss(&mut teams, 1, true, &mut rng);
    assert_eq!(pairing.pairs.len(), 2);
    let bye_id = pairing.bye.expect("odd field must produce a bye");
    assert_each_team_used_once(&teams, &pairing.pairs, pairing.bye);

    let bye_team = &teams[bye_id as usize];
    assert_eq!(bye_team.score, 1);
    assert_eq!(bye_team.opponents, vec![BYE_OPPONENT]);
    assert_eq!(bye_team.aff_count + bye_team.neg_count, 0);
    assert_eq!(bye_team.wins, 0);
}

#[test]
fn side_preference_counts_and_last_side() {
    let mut team = Team::with_rank(0, 1);
    assert_eq!(side_preference(&team), 0.0);

    team.record_side(1, Side::Neg);
    // one neg round: balance +1, last-side nudge +2
    assert_eq!(side_preference(&team), 3.0);

    team.record_side(2, Side::Aff);
    // balanced counts, but the aff nudge dominates
    assert_eq!(side_preference(&team), -2.0);
}

#[test]
fn fresh_opponent_beats_swappable_rematch() {
    let mut teams = virtual_teams(3);
    teams[0].record_side(1, Side::Aff);
    teams[1].record_side(0, Side::Neg);

    // candidate order: the rematch first, the fresh team second
    let group = vec![1usize, 2usize];
    let found = find_best_opponent(&teams[0], &group, &teams);
    assert_eq!(found, Some((1, false)));
}

#[test]
fn swappable_rematch_is_last_resort() {
    let mut teams = virtual_teams(2);
    teams[0].record_side(1, Side::Aff);
    teams[1].record_side(0, Side::Neg);

    let group = vec![1usize];
    assert_eq!(find_best_opponent(&teams[0], &group, &teams), Some((0, true)));

    // once both sides have been played, the rematch is not offered at all
    teams[0].record_side(1, Side::Neg);
    teams[1].record_side(0, Side::Aff);
    assert_eq!(find_best_opponent(&teams[0], &group, &teams), None);
}

#[test]
fn swappable_pair_forces_the_open_side() {
    let mut teams = virtual_teams(2);
    teams[0].record_side(1, Side::Aff);
    teams[1].record_side(0, Side::Neg);

    let mut rng = Lcg::new(12345);
    // team 0 already argued Aff against team 1, so it must take Neg now
    let (aff, neg) = determine_sides(&teams[0], &teams[1], true, &mut rng);
    assert_eq!((aff, neg), (1, 0));
}

#[test]
fn higher_preference_takes_aff() {
    let mut teams = virtual_teams(2);
    // team 0 has argued Neg twice: preference 2 + 2
    teams[0].record_side(5, Side::Neg);
    teams[0].record_side(6, Side::Neg);
    // team 1 has argued Aff twice: preference -2 - 2
    teams[1].record_side(5, Side::Aff);
    teams[1].record_side(6, Side::Aff);

    let mut rng = Lcg::new(12345);
    let (aff, neg) = determine_sides(&teams[0], &teams[1], false, &mut rng);
    assert_eq!((aff, neg), (0, 1));
}

#[test]
fn later_rounds_pair_within_score_groups() {
    let mut teams = virtual_teams(8);
    let mut rng = Lcg::new(12345);

    // fabricate rounds 1 and 2: ids 0..3 beat ids 4..7 twice (once per side)
    for winner in 0..4i32 {
        let loser = winner + 4;
        for (round, side) in [(1, Side::Aff), (2, Side::Neg)] {
            teams[winner as usize].record_side(loser, side);
            teams[winner as usize].record_win(round);
            teams[loser as usize].record_side(winner, side.other());
            teams[loser as usize].record_loss(round);
        }
    }

    let pairing = pair_swiss(&mut teams, 3, true, &mut rng);
    assert_eq!(pairing.pairs.len(), 4);
    for &(aff, neg) in &pairing.pairs {
        let sa = teams[aff as usize].score;
        let sn = teams[neg as usize].score;
        assert_eq!(sa, sn, "round 3 must pair inside score brackets");
    }
}

#[test]
fn float_drain_keeps_the_round_full() {
    // every team has met every other: only the float drain can pair them
    let mut teams = virtual_teams(4);
    for a in 0..4i32 {
        for b in 0..4i32 {
            if a == b {
                continue;
            }
            teams[a as usize].record_side(b, Side::Aff);
            teams[a as usize].record_side(b, Side::Neg);
        }
    }
    let mut rng = Lcg::new(12345);
    let pairing = pair_swiss(&mut teams, 3, true, &mut rng);
    assert_eq!(pairing.pairs.len(), 2);
    assert_eq!(pairing.bye, None);
    assert_each_team_used_once(&teams, &pairing.pairs, pairing.bye);
}
