//! Standings, tiebreakers, and speaker rankings.

use crate::logic::stats::replay;
use crate::models::{TeamId, Tournament, TournamentError};
use serde::Serialize;
use std::str::FromStr;

/// One row of team standings; rank is the row's position.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub name: String,
    pub wins: u32,
    pub score: u32,
    pub buchholz: u32,
}

/// Current standings over the whole schedule, sorted by
/// (score desc, buchholz desc, wins desc, id asc).
pub fn standings(t: &Tournament) -> Vec<StandingsRow> {
    standings_through(t, t.config.num_rounds())
}

/// Standings considering only rounds 1..=round.
pub fn standings_through(t: &Tournament, round: u32) -> Vec<StandingsRow> {
    let mut teams = t.teams.clone();
    replay(&mut teams, &t.matches, &t.byes, round);
    teams.sort_by(|a, b| {
        (b.score, b.buchholz, b.wins)
            .cmp(&(a.score, a.buchholz, a.wins))
            .then(a.id.cmp(&b.id))
    });
    teams
        .into_iter()
        .map(|team| StandingsRow {
            team_id: team.id,
            name: team.name,
            wins: team.wins,
            score: team.score,
            buchholz: team.buchholz,
        })
        .collect()
}

/// Preliminary standings: only prelim matches count, including Buchholz.
/// This ranking decides who breaks and with which seed.
pub fn preliminary_standings(t: &Tournament) -> Vec<StandingsRow> {
    standings_through(t, t.config.num_prelim_rounds)
}

/// How a speaker's per-round points are adjusted before ranking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParticipantMethod {
    /// Plain sum of all recorded rounds.
    Total,
    /// With 3+ rounds recorded, drop the single lowest and single highest.
    DropOne,
    /// With 5+ rounds recorded, drop the two lowest and two highest.
    DropTwo,
}

impl FromStr for ParticipantMethod {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(ParticipantMethod::Total),
            "drop-1" => Ok(ParticipantMethod::DropOne),
            "drop-2" => Ok(ParticipantMethod::DropTwo),
            other => Err(TournamentError::UnknownRankingMethod(other.to_string())),
        }
    }
}

/// One row of the speaker ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipantRow {
    pub team_id: TeamId,
    pub name: String,
    pub total: f64,
    pub adjusted: f64,
    pub rounds_recorded: u32,
}

/// Rank individual speakers over preliminary rounds only, ordered by
/// (adjusted desc, total desc, name asc).
pub fn participant_standings(t: &Tournament, method: ParticipantMethod) -> Vec<ParticipantRow> {
    let prelim = t.config.num_prelim_rounds;
    let mut rows = Vec::with_capacity(t.teams.len() * 2);
    for team in &t.teams {
        for member in &team.members {
            let mut points: Vec<f64> = team
                .speaker_points_history
                .iter()
                .filter(|entry| entry.round <= prelim)
                .filter_map(|entry| entry.points[member.slot])
                .collect();
            let total: f64 = points.iter().sum();
            points.sort_by(f64::total_cmp);
            let adjusted: f64 = match method {
                ParticipantMethod::DropOne if points.len() >= 3 => {
                    points[1..points.len() - 1].iter().sum()
                }
                ParticipantMethod::DropTwo if points.len() >= 5 => {
                    points[2..points.len() - 2].iter().sum()
                }
                _ => total,
            };
            rows.push(ParticipantRow {
                team_id: team.id,
                name: member.name.clone(),
                total,
                adjusted,
                rounds_recorded: points.len() as u32,
            });
        }
    }
    rows.sort_by(|a, b| {
        b.adjusted
            .total_cmp(&a.adjusted)
            .then(b.total.total_cmp(&a.total))
            .then(a.name.cmp(&b.name))
    });
    rows
}
