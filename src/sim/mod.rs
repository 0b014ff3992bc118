//! Monte Carlo simulation harness driving the shared Swiss pairing core
//! against virtual rosters.

mod queries;
mod rng;

pub use queries::{
    head_to_head, rank_distribution_from_history, rank_distribution_from_wins,
    top_n_probability, top_n_probability_from_history, win_distribution, HeadToHeadParams,
    HeadToHeadReport, RankDistributionReport, TopNHistoryReport, TopNReport,
    WinDistributionReport, OBSERVER_INTERVAL,
};
pub use rng::Lcg;

use crate::logic::{pair_swiss, update_buchholz};
use crate::models::{Side, Team, TeamId, TournamentError};
use rand::seq::SliceRandom;
use std::str::FromStr;

/// Win probability model for simulated matches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WinModel {
    /// Logistic model over ratings 2000 - 50 * rank.
    #[default]
    Elo,
    /// Linear in the rank difference, clamped to [0, 1].
    Linear,
    /// The better rank always wins.
    Deterministic,
}

impl WinModel {
    /// Probability that `a` beats `b`, from their true ranks (1 = best).
    pub fn probability_of_win(self, a: &Team, b: &Team) -> f64 {
        match self {
            WinModel::Deterministic => {
                if a.true_rank < b.true_rank {
                    1.0
                } else {
                    0.0
                }
            }
            WinModel::Linear => {
                let rank_diff = f64::from(b.true_rank) - f64::from(a.true_rank);
                let max_rank = f64::from(a.true_rank.max(b.true_rank));
                (0.5 + rank_diff / (2.0 * max_rank)).clamp(0.0, 1.0)
            }
            WinModel::Elo => {
                let rating_a = 2000.0 - 50.0 * f64::from(a.true_rank);
                let rating_b = 2000.0 - 50.0 * f64::from(b.true_rank);
                1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
            }
        }
    }
}

impl FromStr for WinModel {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "elo" => Ok(WinModel::Elo),
            "linear" => Ok(WinModel::Linear),
            "deterministic" => Ok(WinModel::Deterministic),
            other => Err(TournamentError::UnknownWinModel(other.to_string())),
        }
    }
}

/// Configuration for one virtual tournament.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimConfig {
    pub num_teams: u32,
    pub num_rounds: u32,
    pub use_buchholz: bool,
    pub win_model: WinModel,
}

impl SimConfig {
    pub fn new(num_teams: u32, num_rounds: u32) -> Self {
        Self {
            num_teams,
            num_rounds,
            use_buchholz: true,
            win_model: WinModel::default(),
        }
    }
}

/// Draw one match outcome; true when the affirmative team wins.
pub fn simulate_match(aff: &Team, neg: &Team, model: WinModel, rng: &mut Lcg) -> bool {
    rng.next_f64() < model.probability_of_win(aff, neg)
}

/// Run one complete virtual tournament: fresh roster with `true_rank = id + 1`,
/// Swiss pairing each round, outcomes drawn from the win model, state committed
/// in the same canonical form the live manager uses. Returns the final
/// standings sorted by (score desc, buchholz desc) with ties in random order.
pub fn run_tournament(cfg: &SimConfig, rng: &mut Lcg) -> Vec<Team> {
    let mut teams: Vec<Team> = (0..cfg.num_teams)
        .map(|i| Team::with_rank(i as TeamId, i + 1))
        .collect();

    for round in 1..=cfg.num_rounds {
        let pairing = pair_swiss(&mut teams, round, cfg.use_buchholz, rng);
        for (aff_id, neg_id) in pairing.pairs {
            let aff_idx = aff_id as usize;
            let neg_idx = neg_id as usize;
            let aff_wins =
                simulate_match(&teams[aff_idx], &teams[neg_idx], cfg.win_model, rng);
            teams[aff_idx].record_side(neg_id, Side::Aff);
            teams[neg_idx].record_side(aff_id, Side::Neg);
            if aff_wins {
                teams[aff_idx].record_win(round);
                teams[neg_idx].record_loss(round);
            } else {
                teams[neg_idx].record_win(round);
                teams[aff_idx].record_loss(round);
            }
        }
        // a bye, if any, was already credited inside the pairer
    }

    update_buchholz(&mut teams);
    // shuffle first so the stable sort breaks ties randomly but reproducibly
    teams.shuffle(rng);
    teams.sort_by(|a, b| (b.score, b.buchholz).cmp(&(a.score, a.buchholz)));
    teams
}
