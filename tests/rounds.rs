//! Integration tests for the round driver: pairing lifecycle, result entry,
//! corrections, and the rebuild laws.

use swiss_tab::{
    pair_round, recompute_stats, report_result, standings, update_result, Side, TeamId,
    Tournament, TournamentConfig, TournamentError,
};

fn new_tournament(num_teams: u32, prelim: u32, elim: u32) -> Tournament {
    Tournament::new(
        TournamentConfig {
            num_teams,
            num_prelim_rounds: prelim,
            num_elim_rounds: elim,
        },
        Vec::new(),
    )
    .unwrap()
}

fn report_round(t: &mut Tournament, round: u32, winner: Side) {
    let ids: Vec<u32> = t.round_matches(round).iter().map(|m| m.match_id).collect();
    for id in ids {
        report_result(t, id, winner, None).unwrap();
    }
}

#[test]
fn report_then_correct_a_result() {
    let mut t = new_tournament(4, 3, 0);
    pair_round(&mut t, 1).unwrap();
    assert_eq!(t.matches.len(), 2);

    let m1 = t.matches[0].clone();
    report_result(&mut t, m1.match_id, Side::Aff, None).unwrap();

    let winner = t.team(m1.aff_id).unwrap();
    assert_eq!(winner.score, 1);
    assert_eq!(winner.wins, 1);
    assert_eq!(winner.buchholz, 0);
    let top = &standings(&t)[0];
    assert_eq!(top.team_id, m1.aff_id);
    assert_eq!(top.score, 1);

    // round 1 is not complete yet: the other match is unreported
    assert_eq!(t.current_round, 0);

    update_result(&mut t, m1.match_id, Some(Side::Neg), None).unwrap();
    assert_eq!(t.team(m1.aff_id).unwrap().score, 0);
    assert_eq!(t.team(m1.neg_id).unwrap().score, 1);
}

#[test]
fn round_two_may_precede_round_one_results() {
    let mut t = new_tournament(4, 3, 0);
    pair_round(&mut t, 1).unwrap();
    pair_round(&mut t, 2).unwrap();

    assert_eq!(
        pair_round(&mut t, 3),
        Err(TournamentError::PriorRoundIncomplete(1))
    );

    report_round(&mut t, 1, Side::Aff);
    assert_eq!(t.current_round, 1);
    report_round(&mut t, 2, Side::Neg);
    assert_eq!(t.current_round, 2);

    pair_round(&mut t, 3).unwrap();
    assert_eq!(t.highest_paired_round(), 3);
}

#[test]
fn pairing_out_of_sequence_is_refused() {
    let mut t = new_tournament(4, 3, 0);
    assert_eq!(
        pair_round(&mut t, 2),
        Err(TournamentError::RoundOutOfSequence {
            expected: 1,
            requested: 2
        })
    );
    pair_round(&mut t, 1).unwrap();
    assert_eq!(
        pair_round(&mut t, 1),
        Err(TournamentError::RoundOutOfSequence {
            expected: 2,
            requested: 1
        })
    );
}

#[test]
fn pairing_beyond_the_schedule_is_refused() {
    let mut t = new_tournament(4, 1, 0);
    pair_round(&mut t, 1).unwrap();
    report_round(&mut t, 1, Side::Aff);
    assert_eq!(
        pair_round(&mut t, 2),
        Err(TournamentError::RoundOutOfRange(2))
    );
}

#[test]
fn duplicate_report_needs_an_update() {
    let mut t = new_tournament(4, 2, 0);
    pair_round(&mut t, 1).unwrap();
    let id = t.matches[0].match_id;
    report_result(&mut t, id, Side::Aff, None).unwrap();
    assert_eq!(
        report_result(&mut t, id, Side::Neg, None),
        Err(TournamentError::DuplicateResult(id))
    );
    // the update path may overwrite
    update_result(&mut t, id, Some(Side::Neg), None).unwrap();
    assert_eq!(t.matches[0].result, Some(Side::Neg));
}

#[test]
fn unknown_match_is_refused() {
    let mut t = new_tournament(4, 2, 0);
    pair_round(&mut t, 1).unwrap();
    assert_eq!(
        report_result(&mut t, 99, Side::Aff, None),
        Err(TournamentError::UnknownMatch(99))
    );
}

#[test]
fn update_and_revert_restores_stats() {
    let mut t = new_tournament(4, 2, 0);
    pair_round(&mut t, 1).unwrap();
    report_round(&mut t, 1, Side::Aff);

    let before = t.teams.clone();
    let id = t.matches[0].match_id;
    update_result(&mut t, id, Some(Side::Neg), None).unwrap();
    assert_ne!(t.teams, before);
    update_result(&mut t, id, Some(Side::Aff), None).unwrap();
    assert_eq!(t.teams, before);
}

#[test]
fn recompute_is_idempotent() {
    let mut t = new_tournament(5, 3, 0);
    pair_round(&mut t, 1).unwrap();
    report_round(&mut t, 1, Side::Aff);
    pair_round(&mut t, 2).unwrap();

    let once = t.clone();
    recompute_stats(&mut t);
    assert_eq!(t, once);
}

#[test]
fn every_team_plays_or_sits_each_round() {
    let mut t = new_tournament(5, 3, 0);
    for round in 1..=3 {
        pair_round(&mut t, round).unwrap();
        let mut used: Vec<TeamId> = t
            .round_matches(round)
            .iter()
            .flat_map(|m| [m.aff_id, m.neg_id])
            .collect();
        used.extend(
            t.byes
                .iter()
                .filter(|b| b.round_num == round)
                .map(|b| b.team_id),
        );
        used.sort();
        assert_eq!(used, vec![0, 1, 2, 3, 4]);
        report_round(&mut t, round, Side::Aff);
    }
}

#[test]
fn current_round_tracks_the_reported_prefix() {
    let mut t = new_tournament(4, 3, 0);
    pair_round(&mut t, 1).unwrap();
    pair_round(&mut t, 2).unwrap();

    // reporting round 2 first does not advance past the round 1 gap
    report_round(&mut t, 2, Side::Aff);
    assert_eq!(t.current_round, 0);
    report_round(&mut t, 1, Side::Aff);
    assert_eq!(t.current_round, 2);
}
