//! Textual projections of the match log: rendering, parsing, validation,
//! and reconstruction of a tournament from exported logs.
//!
//! The structured records are authoritative; the two text forms are derived
//! on every change and checked for pointwise equality at the end of every
//! mutating operation. A mismatch is a defect, never a recoverable state.

use crate::logic::rounds::check_speaker_points;
use crate::logic::stats::recompute_stats;
use crate::models::{
    DebateMatch, JudgeId, MatchId, Side, SpeakerPoints, TeamId, Tournament, TournamentConfig,
    TournamentError, BYE_OPPONENT,
};
use std::collections::BTreeSet;

/// One parsed pairing-log line: `Round MatchID AffID NegID`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PairingLine {
    pub round: u32,
    pub match_id: MatchId,
    pub aff_id: TeamId,
    pub neg_id: TeamId,
}

/// One parsed result-log line:
/// `Round MatchID AffID NegID Outcome JudgeID [Aff1 Aff2 Neg1 Neg2]`.
/// The judge field may be omitted (older exports); `-1` means unassigned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResultLine {
    pub round: u32,
    pub match_id: MatchId,
    pub aff_id: TeamId,
    pub neg_id: TeamId,
    pub outcome: Side,
    pub judge_id: Option<JudgeId>,
    pub speaker_points: Option<SpeakerPoints>,
}

fn outcome_token(side: Side) -> &'static str {
    match side {
        Side::Aff => "A",
        Side::Neg => "N",
    }
}

fn points_token(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => "null".to_string(),
    }
}

pub(crate) fn render_pairing_line(m: &DebateMatch) -> String {
    format!("{} {} {} {}", m.round_num, m.match_id, m.aff_id, m.neg_id)
}

pub(crate) fn render_result_line(m: &DebateMatch) -> String {
    // callers only render reported matches; "?" would fail validation anyway
    let outcome = match m.result {
        Some(side) => outcome_token(side),
        None => "?",
    };
    let judge = m.judge_id.map(i64::from).unwrap_or(-1);
    let mut line = format!(
        "{} {} {} {} {} {}",
        m.round_num, m.match_id, m.aff_id, m.neg_id, outcome, judge
    );
    if let Some(points) = &m.speaker_points {
        for value in points {
            line.push(' ');
            line.push_str(&points_token(*value));
        }
    }
    line
}

/// Append the pairing-log line for a newly created match.
pub(crate) fn append_pairing_line(text: &mut String, m: &DebateMatch) {
    text.push_str(&render_pairing_line(m));
    text.push('\n');
}

/// Append the result-log line for a match that has a result.
pub(crate) fn append_result_line(t: &mut Tournament, match_id: MatchId) {
    let line = match t.find_match(match_id) {
        Some(m) if m.result.is_some() => render_result_line(m),
        _ => return,
    };
    t.result_text.push_str(&line);
    t.result_text.push('\n');
}

/// Comment out the active result-log line for a match, preserving it for
/// audit: `# <old line>  # Updated`.
pub(crate) fn retire_result_line(t: &mut Tournament, match_id: MatchId, note: &str) {
    let target = match_id.to_string();
    let mut out = String::with_capacity(t.result_text.len() + 16);
    for line in t.result_text.lines() {
        let trimmed = line.trim();
        let active = !trimmed.is_empty() && !trimmed.starts_with('#');
        if active && trimmed.split_whitespace().nth(1) == Some(target.as_str()) {
            out.push_str(&format!("# {line}  # {note}"));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    t.result_text = out;
}

fn malformed(line: usize, reason: impl Into<String>) -> TournamentError {
    TournamentError::MalformedLogLine {
        line,
        reason: reason.into(),
    }
}

fn parse_round(token: &str, line: usize) -> Result<u32, TournamentError> {
    token
        .parse::<u32>()
        .ok()
        .filter(|r| *r >= 1)
        .ok_or_else(|| malformed(line, format!("bad round '{token}'")))
}

fn parse_match_id(token: &str, line: usize) -> Result<MatchId, TournamentError> {
    token
        .parse::<MatchId>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| malformed(line, format!("bad match id '{token}'")))
}

fn parse_team_id(token: &str, line: usize) -> Result<TeamId, TournamentError> {
    token
        .parse::<TeamId>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| malformed(line, format!("bad team id '{token}'")))
}

fn parse_outcome(token: &str) -> Result<Side, TournamentError> {
    match token.to_ascii_uppercase().as_str() {
        "A" | "AFF" => Ok(Side::Aff),
        "N" | "NEG" => Ok(Side::Neg),
        _ => Err(TournamentError::InvalidOutcome(token.to_string())),
    }
}

fn parse_judge(token: &str, line: usize) -> Result<Option<JudgeId>, TournamentError> {
    match token.parse::<i64>() {
        Ok(-1) => Ok(None),
        Ok(id) if id >= 1 && id <= i64::from(u32::MAX) => Ok(Some(id as JudgeId)),
        _ => Err(malformed(line, format!("bad judge id '{token}'"))),
    }
}

fn parse_points(token: &str, line: usize) -> Result<Option<f64>, TournamentError> {
    if token.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| malformed(line, format!("bad speaker points '{token}'")))
}

/// Parse a pairing log, ignoring comments and blank lines.
pub fn parse_pairing_log(text: &str) -> Result<Vec<PairingLine>, TournamentError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(malformed(
                lineno,
                format!("expected 4 fields, got {}", fields.len()),
            ));
        }
        out.push(PairingLine {
            round: parse_round(fields[0], lineno)?,
            match_id: parse_match_id(fields[1], lineno)?,
            aff_id: parse_team_id(fields[2], lineno)?,
            neg_id: parse_team_id(fields[3], lineno)?,
        });
    }
    Ok(out)
}

/// Parse a result log, ignoring comments and blank lines. Accepts 5 fields
/// (no judge), 6 fields, or 10 fields (judge plus four speaker-point tokens).
pub fn parse_result_log(text: &str) -> Result<Vec<ResultLine>, TournamentError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if !matches!(fields.len(), 5 | 6 | 10) {
            return Err(malformed(
                lineno,
                format!("expected 5, 6, or 10 fields, got {}", fields.len()),
            ));
        }
        let judge_id = if fields.len() >= 6 {
            parse_judge(fields[5], lineno)?
        } else {
            None
        };
        let speaker_points = if fields.len() == 10 {
            Some([
                parse_points(fields[6], lineno)?,
                parse_points(fields[7], lineno)?,
                parse_points(fields[8], lineno)?,
                parse_points(fields[9], lineno)?,
            ])
        } else {
            None
        };
        out.push(ResultLine {
            round: parse_round(fields[0], lineno)?,
            match_id: parse_match_id(fields[1], lineno)?,
            aff_id: parse_team_id(fields[2], lineno)?,
            neg_id: parse_team_id(fields[3], lineno)?,
            outcome: parse_outcome(fields[4])?,
            judge_id,
            speaker_points,
        });
    }
    Ok(out)
}

/// Check both textual projections and the registry relations against the
/// structured records. Called at the end of every mutating operation; any
/// mismatch means the state can no longer be trusted.
pub fn validate(t: &Tournament) -> Result<(), TournamentError> {
    let broken = |detail: String| Err(TournamentError::Inconsistent(detail));

    let pairing_lines = parse_pairing_log(&t.pairing_text)
        .map_err(|e| TournamentError::Inconsistent(format!("pairing log unreadable: {e}")))?;
    if pairing_lines.len() != t.matches.len() {
        return broken(format!(
            "pairing log has {} lines for {} matches",
            pairing_lines.len(),
            t.matches.len()
        ));
    }
    for (line, m) in pairing_lines.iter().zip(&t.matches) {
        if line.round != m.round_num
            || line.match_id != m.match_id
            || line.aff_id != m.aff_id
            || line.neg_id != m.neg_id
        {
            return broken(format!(
                "pairing line for match {} disagrees with the record",
                line.match_id
            ));
        }
    }

    let result_lines = parse_result_log(&t.result_text)
        .map_err(|e| TournamentError::Inconsistent(format!("result log unreadable: {e}")))?;
    let reported = t.matches.iter().filter(|m| m.result.is_some()).count();
    if result_lines.len() != reported {
        return broken(format!(
            "result log has {} lines for {} reported matches",
            result_lines.len(),
            reported
        ));
    }
    let mut seen: BTreeSet<MatchId> = BTreeSet::new();
    for line in &result_lines {
        if !seen.insert(line.match_id) {
            return broken(format!("result log lists match {} twice", line.match_id));
        }
        let m = match t.find_match(line.match_id) {
            Some(m) => m,
            None => return broken(format!("result log lists unknown match {}", line.match_id)),
        };
        if line.round != m.round_num
            || line.aff_id != m.aff_id
            || line.neg_id != m.neg_id
            || m.result != Some(line.outcome)
            || m.judge_id != line.judge_id
            || m.speaker_points != line.speaker_points
        {
            return broken(format!(
                "result line for match {} disagrees with the record",
                line.match_id
            ));
        }
    }

    for judge in &t.judges {
        let derived: BTreeSet<MatchId> = t
            .matches
            .iter()
            .filter(|m| m.judge_id == Some(judge.id))
            .map(|m| m.match_id)
            .collect();
        if derived != judge.matches_judged {
            return broken(format!(
                "judge {} assignment set disagrees with the matches",
                judge.id
            ));
        }
    }
    for m in &t.matches {
        if let Some(j) = m.judge_id {
            if t.judge(j).is_none() {
                return broken(format!("match {} names unknown judge {}", m.match_id, j));
            }
        }
    }

    for team in &t.teams {
        let expected: u32 = team
            .opponents
            .iter()
            .filter(|&&o| o != BYE_OPPONENT)
            .filter_map(|o| t.team(*o).map(|opp| opp.score))
            .sum();
        if expected != team.buchholz {
            return broken(format!(
                "team {} Buchholz is {}, expected {}",
                team.id, team.buchholz, expected
            ));
        }
    }

    Ok(())
}

/// Rebuild a tournament from an exported pairing log and optional result log.
///
/// The field size is inferred from the highest team id, the round count from
/// the highest round number; the rebuilt tournament has no elimination
/// rounds. Judge ids in result lines are ignored (judges enter only through
/// the judge registry).
pub fn reinit_from_logs(
    pairings: &str,
    results: Option<&str>,
) -> Result<Tournament, TournamentError> {
    let pairing_lines = parse_pairing_log(pairings)?;
    if pairing_lines.is_empty() {
        return Err(malformed(1, "pairing log contains no pairings"));
    }

    let num_teams = pairing_lines
        .iter()
        .map(|l| l.aff_id.max(l.neg_id))
        .max()
        .unwrap_or(0)
        + 1;
    let num_rounds = pairing_lines.iter().map(|l| l.round).max().unwrap_or(0);
    let config = TournamentConfig {
        num_teams: num_teams as u32,
        num_prelim_rounds: num_rounds,
        num_elim_rounds: 0,
    };
    let mut t = Tournament::new(config, Vec::new())?;

    let mut seen: BTreeSet<MatchId> = BTreeSet::new();
    let mut highest_id: MatchId = 0;
    for line in &pairing_lines {
        if line.aff_id == line.neg_id {
            return Err(TournamentError::Inconsistent(format!(
                "pairing pits team {} against itself",
                line.aff_id
            )));
        }
        if !seen.insert(line.match_id) {
            return Err(TournamentError::MatchIdCollision(line.match_id));
        }
        let m = {
            let aff = t
                .team(line.aff_id)
                .ok_or(TournamentError::UnknownTeam(line.aff_id))?;
            let neg = t
                .team(line.neg_id)
                .ok_or(TournamentError::UnknownTeam(line.neg_id))?;
            DebateMatch::new(line.match_id, line.round, aff, neg)
        };
        append_pairing_line(&mut t.pairing_text, &m);
        t.matches.push(m);
        highest_id = highest_id.max(line.match_id);
    }
    t.next_match_id = highest_id + 1;

    if let Some(results_text) = results {
        for line in parse_result_log(results_text)? {
            let m = t
                .find_match_mut(line.match_id)
                .ok_or(TournamentError::UnknownMatch(line.match_id))?;
            if m.round_num != line.round || m.aff_id != line.aff_id || m.neg_id != line.neg_id {
                return Err(TournamentError::TeamIdMismatch(line.match_id));
            }
            if m.result.is_some() {
                return Err(TournamentError::DuplicateResult(line.match_id));
            }
            if let Some(points) = &line.speaker_points {
                check_speaker_points(points)?;
            }
            m.result = Some(line.outcome);
            m.speaker_points = line.speaker_points;
            append_result_line(&mut t, line.match_id);
        }
    }

    recompute_stats(&mut t);
    validate(&t)?;
    Ok(t)
}

/// Apply results from a result-log text, optionally restricted to one round.
///
/// Lines re-stating an already recorded outcome are idempotent and count as
/// processed; a conflicting outcome needs `force`, which routes through the
/// audit-preserving update path. Judge fields are ignored. All lines are
/// checked before anything is applied, so a validation failure mutates
/// nothing. Returns the number of processed lines.
pub fn apply_result_log(
    t: &mut Tournament,
    text: &str,
    round_filter: Option<u32>,
    force: bool,
) -> Result<usize, TournamentError> {
    let lines: Vec<ResultLine> = parse_result_log(text)?
        .into_iter()
        .filter(|l| round_filter.map_or(true, |r| l.round == r))
        .collect();

    for line in &lines {
        let m = t
            .find_match(line.match_id)
            .ok_or(TournamentError::UnknownMatch(line.match_id))?;
        if m.round_num != line.round || m.aff_id != line.aff_id || m.neg_id != line.neg_id {
            return Err(TournamentError::TeamIdMismatch(line.match_id));
        }
        if let Some(points) = &line.speaker_points {
            check_speaker_points(points)?;
        }
        match m.result {
            Some(existing) if existing != line.outcome && !force => {
                return Err(TournamentError::DuplicateResult(line.match_id));
            }
            _ => {}
        }
    }

    let mut processed = 0;
    for line in &lines {
        let existing = t
            .find_match(line.match_id)
            .ok_or(TournamentError::UnknownMatch(line.match_id))?
            .result;
        if existing == Some(line.outcome) {
            processed += 1;
            continue;
        }
        if existing.is_some() {
            retire_result_line(t, line.match_id, "Updated");
        }
        let m = t
            .find_match_mut(line.match_id)
            .ok_or(TournamentError::UnknownMatch(line.match_id))?;
        m.result = Some(line.outcome);
        if line.speaker_points.is_some() {
            m.speaker_points = line.speaker_points;
        }
        append_result_line(t, line.match_id);
        processed += 1;
    }

    recompute_stats(t);
    validate(t)?;
    Ok(processed)
}
