//! Aggregate analyzer queries over many simulated tournaments.
//!
//! Each tournament in a batch draws from its own generator, derived by
//! folding the caller's seed with the tournament index, so results are
//! reproducible and tournaments are independent. An optional observer is
//! invoked every `OBSERVER_INTERVAL` tournaments with the count so far;
//! returning `false` cancels the run and the query returns its partial
//! aggregates.

use super::rng::mix_seed;
use super::{run_tournament, Lcg, SimConfig};
use crate::models::{Team, TeamId, TournamentError, BYE_OPPONENT};
use std::collections::{BTreeMap, BTreeSet};

/// How often (in completed tournaments) the observer callback fires.
pub const OBSERVER_INTERVAL: u64 = 100;

type Observer<'a> = Option<&'a mut dyn FnMut(u64) -> bool>;

fn keep_going(observer: &mut Observer<'_>, done: u64) -> bool {
    if done % OBSERVER_INTERVAL != 0 {
        return true;
    }
    match observer {
        Some(callback) => callback(done),
        None => true,
    }
}

/// Uppercase and validate a W/L history prefix against the round count.
fn check_history(history: &str, num_rounds: u32) -> Result<String, TournamentError> {
    let cleaned: String = history
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return Err(TournamentError::InvalidHistory("history is empty".into()));
    }
    if cleaned.len() as u32 > num_rounds {
        return Err(TournamentError::InvalidHistory(format!(
            "length {} exceeds {} rounds",
            cleaned.len(),
            num_rounds
        )));
    }
    if let Some(bad) = cleaned.chars().find(|c| *c != 'W' && *c != 'L') {
        return Err(TournamentError::InvalidHistory(format!(
            "unexpected character '{bad}'"
        )));
    }
    Ok(cleaned)
}

fn matches_prefix(team: &Team, prefix: &str) -> bool {
    team.history.len() >= prefix.len() && team.history.starts_with(prefix)
}

/// Opponent and calendar round of the team's k-th (0-based) decided match.
///
/// `history` and `history_rounds` skip byes while `opponents` does not, so
/// the opponent is taken as the k-th non-bye entry; the two lookups then
/// agree on which match is meant even when byes shifted the calendar.
fn decided_match(team: &Team, k: usize) -> Option<(TeamId, u32)> {
    let round = *team.history_rounds.get(k)?;
    let opponent = team
        .opponents
        .iter()
        .copied()
        .filter(|&o| o != BYE_OPPONENT)
        .nth(k)?;
    Some((opponent, round))
}

/// How often each true rank finishes in the top N.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopNReport {
    pub top_n: u32,
    pub tournaments: u64,
    /// true rank -> number of top-N finishes
    pub counts: BTreeMap<u32, u64>,
}

pub fn top_n_probability(
    cfg: &SimConfig,
    top_n: u32,
    simulations: u64,
    seed: u32,
    mut observer: Observer<'_>,
) -> TopNReport {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let mut done = 0;
    while done < simulations {
        let mut rng = Lcg::new(mix_seed(seed, done));
        let standings = run_tournament(cfg, &mut rng);
        for team in standings.iter().take(top_n as usize) {
            *counts.entry(team.true_rank).or_insert(0) += 1;
        }
        done += 1;
        if !keep_going(&mut observer, done) {
            break;
        }
    }
    TopNReport {
        top_n,
        tournaments: done,
        counts,
    }
}

/// How often teams with a given W/L prefix finish in the top N.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopNHistoryReport {
    pub top_n: u32,
    pub tournaments: u64,
    /// Teams whose history matched the prefix, across all tournaments.
    pub teams_matched: u64,
    /// How many of those finished in the top N.
    pub teams_in_top_n: u64,
}

/// Top-N probability conditioned on an exact W/L history prefix rather than
/// on a true rank.
pub fn top_n_probability_from_history(
    cfg: &SimConfig,
    history: &str,
    top_n: u32,
    simulations: u64,
    seed: u32,
    mut observer: Observer<'_>,
) -> Result<TopNHistoryReport, TournamentError> {
    let prefix = check_history(history, cfg.num_rounds)?;
    let mut teams_matched = 0;
    let mut teams_in_top_n = 0;
    let mut done = 0;
    while done < simulations {
        let mut rng = Lcg::new(mix_seed(seed, done));
        let standings = run_tournament(cfg, &mut rng);
        let top_ids: BTreeSet<TeamId> = standings
            .iter()
            .take(top_n as usize)
            .map(|t| t.id)
            .collect();
        for team in &standings {
            if matches_prefix(team, &prefix) {
                teams_matched += 1;
                if top_ids.contains(&team.id) {
                    teams_in_top_n += 1;
                }
            }
        }
        done += 1;
        if !keep_going(&mut observer, done) {
            break;
        }
    }
    Ok(TopNHistoryReport {
        top_n,
        tournaments: done,
        teams_matched,
        teams_in_top_n,
    })
}

/// Distribution of final win counts for one true rank.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WinDistributionReport {
    pub true_rank: u32,
    pub tournaments: u64,
    /// wins -> number of tournaments
    pub counts: BTreeMap<u32, u64>,
}

pub fn win_distribution(
    cfg: &SimConfig,
    true_rank: u32,
    simulations: u64,
    seed: u32,
    mut observer: Observer<'_>,
) -> WinDistributionReport {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let mut done = 0;
    while done < simulations {
        let mut rng = Lcg::new(mix_seed(seed, done));
        let standings = run_tournament(cfg, &mut rng);
        if let Some(team) = standings.iter().find(|t| t.true_rank == true_rank) {
            *counts.entry(team.wins).or_insert(0) += 1;
        }
        done += 1;
        if !keep_going(&mut observer, done) {
            break;
        }
    }
    WinDistributionReport {
        true_rank,
        tournaments: done,
        counts,
    }
}

/// Distribution of true ranks over a cohort of teams (selected by win count
/// or by W/L history prefix).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RankDistributionReport {
    pub tournaments: u64,
    /// Teams that matched the cohort condition across all tournaments.
    pub teams_matched: u64,
    /// true rank -> number of matching teams
    pub counts: BTreeMap<u32, u64>,
}

pub fn rank_distribution_from_wins(
    cfg: &SimConfig,
    target_wins: u32,
    simulations: u64,
    seed: u32,
    mut observer: Observer<'_>,
) -> RankDistributionReport {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let mut teams_matched = 0;
    let mut done = 0;
    while done < simulations {
        let mut rng = Lcg::new(mix_seed(seed, done));
        for team in run_tournament(cfg, &mut rng) {
            if team.wins == target_wins {
                *counts.entry(team.true_rank).or_insert(0) += 1;
                teams_matched += 1;
            }
        }
        done += 1;
        if !keep_going(&mut observer, done) {
            break;
        }
    }
    RankDistributionReport {
        tournaments: done,
        teams_matched,
        counts,
    }
}

pub fn rank_distribution_from_history(
    cfg: &SimConfig,
    history: &str,
    simulations: u64,
    seed: u32,
    mut observer: Observer<'_>,
) -> Result<RankDistributionReport, TournamentError> {
    let prefix = check_history(history, cfg.num_rounds)?;
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let mut teams_matched = 0;
    let mut done = 0;
    while done < simulations {
        let mut rng = Lcg::new(mix_seed(seed, done));
        for team in run_tournament(cfg, &mut rng) {
            if matches_prefix(&team, &prefix) {
                *counts.entry(team.true_rank).or_insert(0) += 1;
                teams_matched += 1;
            }
        }
        done += 1;
        if !keep_going(&mut observer, done) {
            break;
        }
    }
    Ok(RankDistributionReport {
        tournaments: done,
        teams_matched,
        counts,
    })
}

/// Stopping rule for the adaptive head-to-head loop: run whole batches until
/// enough matchups are observed or the tournament cap is hit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeadToHeadParams {
    pub min_matchups: u64,
    pub max_tournaments: u64,
    pub batch_size: u64,
}

impl Default for HeadToHeadParams {
    fn default() -> Self {
        Self {
            min_matchups: 100,
            max_tournaments: 50_000,
            batch_size: 100,
        }
    }
}

/// Aggregate outcome of matchups between two history cohorts.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadToHeadReport {
    pub tournaments: u64,
    pub matchups: u64,
    pub a_wins: u64,
    pub b_wins: u64,
    pub mean_rank_a: f64,
    pub mean_rank_b: f64,
    /// Whether `min_matchups` was reached before the cap (or a cancel).
    pub reached_target: bool,
}

/// Head-to-head between cohorts with history prefixes A and B.
///
/// A matchup is a team with prefix A whose next decided match after the
/// prefix is against a team with prefix B that is likewise just past its own
/// prefix, in the same round; the recorded outcome of that match is tallied.
/// Byes occupy a calendar round without deciding anything, so the lookup
/// goes through each team's decided-match sequence rather than raw round
/// indices. Simulation count is data-driven: batches keep running until the
/// matchup target is met or `max_tournaments` is exceeded, in which case the
/// partial aggregates are returned with the observed count.
pub fn head_to_head(
    cfg: &SimConfig,
    history_a: &str,
    history_b: &str,
    params: &HeadToHeadParams,
    seed: u32,
    mut observer: Observer<'_>,
) -> Result<HeadToHeadReport, TournamentError> {
    let prefix_a = check_history(history_a, cfg.num_rounds)?;
    let prefix_b = check_history(history_b, cfg.num_rounds)?;

    let mut tournaments = 0;
    let mut matchups = 0;
    let mut a_wins = 0;
    let mut b_wins = 0;
    let mut rank_a_sum = 0u64;
    let mut rank_b_sum = 0u64;

    'outer: while tournaments < params.max_tournaments && matchups < params.min_matchups {
        let batch = params.batch_size.min(params.max_tournaments - tournaments);
        for _ in 0..batch {
            let mut rng = Lcg::new(mix_seed(seed, tournaments));
            let teams = run_tournament(cfg, &mut rng);
            let cohort_a: Vec<&Team> =
                teams.iter().filter(|t| matches_prefix(t, &prefix_a)).collect();
            let cohort_b: Vec<&Team> =
                teams.iter().filter(|t| matches_prefix(t, &prefix_b)).collect();
            for ta in &cohort_a {
                for tb in &cohort_b {
                    if ta.id == tb.id {
                        continue;
                    }
                    let Some((opp_a, round_a)) = decided_match(ta, prefix_a.len()) else {
                        continue;
                    };
                    if opp_a != tb.id {
                        continue;
                    }
                    let Some((opp_b, round_b)) = decided_match(tb, prefix_b.len()) else {
                        continue;
                    };
                    if opp_b != ta.id || round_b != round_a {
                        continue;
                    }
                    let Some(&outcome) = ta.history.as_bytes().get(prefix_a.len()) else {
                        continue;
                    };
                    matchups += 1;
                    rank_a_sum += u64::from(ta.true_rank);
                    rank_b_sum += u64::from(tb.true_rank);
                    if outcome == b'W' {
                        a_wins += 1;
                    } else {
                        b_wins += 1;
                    }
                }
            }
            tournaments += 1;
            if !keep_going(&mut observer, tournaments) {
                break 'outer;
            }
        }
    }

    let mean = |sum: u64| {
        if matchups == 0 {
            0.0
        } else {
            sum as f64 / matchups as f64
        }
    };
    Ok(HeadToHeadReport {
        tournaments,
        matchups,
        a_wins,
        b_wins,
        mean_rank_a: mean(rank_a_sum),
        mean_rank_b: mean(rank_b_sum),
        reached_target: matchups >= params.min_matchups,
    })
}
