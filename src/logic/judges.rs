//! Judge registry and match-assignment bookkeeping.

use crate::logic::consistency;
use crate::models::{Judge, JudgeId, MatchId, Tournament, TournamentError};

/// Register a judge. Names are unique (case-insensitive); the institution
/// defaults to "Tournament Hire". Returns the new judge's id.
pub fn add_judge(
    t: &mut Tournament,
    name: &str,
    institution: Option<String>,
) -> Result<JudgeId, TournamentError> {
    let name = name.trim();
    if t.judges.iter().any(|j| j.name.eq_ignore_ascii_case(name)) {
        return Err(TournamentError::DuplicateJudgeName(name.to_string()));
    }
    let id = t.next_judge_id;
    t.judges.push(Judge::new(id, name, institution));
    t.next_judge_id += 1;
    consistency::validate(t)?;
    Ok(id)
}

/// Remove a judge; refused while any match is still assigned to them.
pub fn remove_judge(t: &mut Tournament, judge_id: JudgeId) -> Result<(), TournamentError> {
    let idx = t
        .judges
        .iter()
        .position(|j| j.id == judge_id)
        .ok_or(TournamentError::UnknownJudge(judge_id))?;
    if !t.judges[idx].matches_judged.is_empty() {
        return Err(TournamentError::JudgeHasAssignments(judge_id));
    }
    t.judges.remove(idx);
    consistency::validate(t)
}

/// Assign a judge to a match, replacing any prior assignment. Both sides of
/// the relation are maintained; a reported match's result-log line is
/// rewritten so the projections stay in step.
pub fn assign_judge(
    t: &mut Tournament,
    match_id: MatchId,
    judge_id: JudgeId,
) -> Result<(), TournamentError> {
    if t.judge(judge_id).is_none() {
        return Err(TournamentError::UnknownJudge(judge_id));
    }
    let (old_judge, reported) = {
        let m = t
            .find_match(match_id)
            .ok_or(TournamentError::UnknownMatch(match_id))?;
        (m.judge_id, m.result.is_some())
    };
    if old_judge == Some(judge_id) {
        return Ok(());
    }
    if let Some(old) = old_judge {
        if let Some(judge) = t.judge_mut(old) {
            judge.matches_judged.remove(&match_id);
        }
    }
    if let Some(m) = t.find_match_mut(match_id) {
        m.judge_id = Some(judge_id);
    }
    if let Some(judge) = t.judge_mut(judge_id) {
        judge.matches_judged.insert(match_id);
    }
    if reported {
        consistency::retire_result_line(t, match_id, "Updated");
        consistency::append_result_line(t, match_id);
    }
    consistency::validate(t)
}

/// Clear a match's judge assignment; a no-op when none is assigned.
pub fn unassign_judge(t: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    let (old_judge, reported) = {
        let m = t
            .find_match(match_id)
            .ok_or(TournamentError::UnknownMatch(match_id))?;
        (m.judge_id, m.result.is_some())
    };
    let Some(old) = old_judge else {
        return Ok(());
    };
    if let Some(judge) = t.judge_mut(old) {
        judge.matches_judged.remove(&match_id);
    }
    if let Some(m) = t.find_match_mut(match_id) {
        m.judge_id = None;
    }
    if reported {
        consistency::retire_result_line(t, match_id, "Updated");
        consistency::append_result_line(t, match_id);
    }
    consistency::validate(t)
}
