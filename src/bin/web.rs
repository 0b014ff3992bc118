//! Single binary REST server over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default; override with env: HOST, PORT.
//!
//! One tournament is held in memory; persistence is the caller's business
//! (GET the snapshot, POST it back or reinit from exported logs).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::RwLock;
use swiss_tab::{
    add_judge, apply_result_log, assign_judge, pair_round, participant_standings,
    preliminary_standings, reinit_from_logs, remove_judge, report_result, standings,
    unassign_judge, update_result, JudgeId, MatchId, ParticipantMethod, Side, SpeakerPoints,
    TeamSeed, Tournament, TournamentConfig, TournamentError,
};

/// In-memory state: at most one live tournament.
type AppState = Data<RwLock<Option<Tournament>>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct InitBody {
    num_teams: u32,
    num_prelim_rounds: u32,
    #[serde(default)]
    num_elim_rounds: u32,
    #[serde(default)]
    teams: Vec<TeamSeed>,
    #[serde(default)]
    force: bool,
}

#[derive(Deserialize)]
struct PairBody {
    round: u32,
}

#[derive(Deserialize)]
struct ReportBody {
    match_id: MatchId,
    winner: Side,
    speaker_points: Option<SpeakerPoints>,
}

#[derive(Deserialize)]
struct UpdateBody {
    match_id: MatchId,
    winner: Option<Side>,
    speaker_points: Option<SpeakerPoints>,
}

#[derive(Deserialize)]
struct ImportBody {
    text: String,
    round: Option<u32>,
    #[serde(default)]
    force: bool,
}

#[derive(Deserialize)]
struct AddJudgeBody {
    name: String,
    institution: Option<String>,
}

#[derive(Deserialize)]
struct AssignJudgeBody {
    judge_id: JudgeId,
}

#[derive(Deserialize)]
struct ReinitBody {
    pairings: String,
    results: Option<String>,
}

#[derive(Deserialize)]
struct SpeakersQuery {
    method: Option<String>,
}

/// Path segment: match id (e.g. /api/tournament/matches/{id}/judge)
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Path segment: judge id (e.g. /api/tournament/judges/{id})
#[derive(Deserialize)]
struct JudgePath {
    id: JudgeId,
}

/// Validation failures map to 400; a broken invariant is a 500 because the
/// state can no longer be trusted.
fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::Inconsistent(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn no_tournament() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-tab",
    })
}

/// Initialize the tournament (refuses to overwrite one unless force is set).
#[post("/api/tournament")]
async fn api_init(state: AppState, body: Json<InitBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if g.is_some() && !body.force {
        return HttpResponse::Conflict()
            .json(serde_json::json!({ "error": "Tournament already exists (use force)" }));
    }
    let body = body.into_inner();
    let config = TournamentConfig {
        num_teams: body.num_teams,
        num_prelim_rounds: body.num_prelim_rounds,
        num_elim_rounds: body.num_elim_rounds,
    };
    match Tournament::new(config, body.teams) {
        Ok(t) => {
            log::info!(
                "Initialized tournament: {} teams, {} prelim + {} elim rounds",
                config.num_teams,
                config.num_prelim_rounds,
                config.num_elim_rounds
            );
            *g = Some(t);
            HttpResponse::Ok().json(g.as_ref())
        }
        Err(e) => error_response(e),
    }
}

/// Full tournament snapshot (the serde form round-trips exactly).
#[get("/api/tournament")]
async fn api_get(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.as_ref() {
        Some(t) => HttpResponse::Ok().json(t),
        None => no_tournament(),
    }
}

/// Pair the next round.
#[post("/api/tournament/pair")]
async fn api_pair(state: AppState, body: Json<PairBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match pair_round(t, body.round) {
        Ok(()) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(e),
    }
}

/// Enter a result for an unreported match.
#[post("/api/tournament/results")]
async fn api_report(state: AppState, body: Json<ReportBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match report_result(t, body.match_id, body.winner, body.speaker_points) {
        Ok(()) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(e),
    }
}

/// Correct or clear a result (winner omitted = clear).
#[put("/api/tournament/results")]
async fn api_update(state: AppState, body: Json<UpdateBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match update_result(t, body.match_id, body.winner, body.speaker_points) {
        Ok(()) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(e),
    }
}

/// Apply a result-log text (optionally one round only).
#[post("/api/tournament/results/import")]
async fn api_import(state: AppState, body: Json<ImportBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match apply_result_log(t, &body.text, body.round, body.force) {
        Ok(processed) => HttpResponse::Ok().json(serde_json::json!({ "processed": processed })),
        Err(e) => error_response(e),
    }
}

#[get("/api/tournament/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.as_ref() {
        Some(t) => HttpResponse::Ok().json(standings(t)),
        None => no_tournament(),
    }
}

#[get("/api/tournament/standings/preliminary")]
async fn api_prelim_standings(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.as_ref() {
        Some(t) => HttpResponse::Ok().json(preliminary_standings(t)),
        None => no_tournament(),
    }
}

/// Speaker rankings; ?method=total|drop-1|drop-2 (default total).
#[get("/api/tournament/speakers")]
async fn api_speakers(state: AppState, query: Query<SpeakersQuery>) -> HttpResponse {
    let method = match query.method.as_deref() {
        None => ParticipantMethod::Total,
        Some(name) => match ParticipantMethod::from_str(name) {
            Ok(m) => m,
            Err(e) => return error_response(e),
        },
    };
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.as_ref() {
        Some(t) => HttpResponse::Ok().json(participant_standings(t, method)),
        None => no_tournament(),
    }
}

#[post("/api/tournament/judges")]
async fn api_add_judge(state: AppState, body: Json<AddJudgeBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match add_judge(t, &body.name, body.institution.clone()) {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "judge_id": id })),
        Err(e) => error_response(e),
    }
}

#[delete("/api/tournament/judges/{id}")]
async fn api_remove_judge(state: AppState, path: Path<JudgePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match remove_judge(t, path.id) {
        Ok(()) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(e),
    }
}

#[put("/api/tournament/matches/{id}/judge")]
async fn api_assign_judge(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<AssignJudgeBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match assign_judge(t, path.id, body.judge_id) {
        Ok(()) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(e),
    }
}

#[delete("/api/tournament/matches/{id}/judge")]
async fn api_unassign_judge(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let t = match g.as_mut() {
        Some(t) => t,
        None => return no_tournament(),
    };
    match unassign_judge(t, path.id) {
        Ok(()) => HttpResponse::Ok().json(&t),
        Err(e) => error_response(e),
    }
}

/// Both textual projections, for file export.
#[get("/api/tournament/export")]
async fn api_export(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.as_ref() {
        Some(t) => HttpResponse::Ok().json(serde_json::json!({
            "pairings": t.pairing_text,
            "results": t.result_text,
        })),
        None => no_tournament(),
    }
}

/// Rebuild the tournament from exported logs, replacing the current one.
#[post("/api/tournament/reinit")]
async fn api_reinit(state: AppState, body: Json<ReinitBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match reinit_from_logs(&body.pairings, body.results.as_deref()) {
        Ok(t) => {
            log::info!(
                "Reinitialized tournament from logs: {} teams, {} matches",
                t.config.num_teams,
                t.matches.len()
            );
            *g = Some(t);
            HttpResponse::Ok().json(g.as_ref())
        }
        Err(e) => error_response(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(None));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_init)
            .service(api_get)
            .service(api_pair)
            .service(api_report)
            .service(api_update)
            .service(api_import)
            .service(api_standings)
            .service(api_prelim_standings)
            .service(api_speakers)
            .service(api_add_judge)
            .service(api_remove_judge)
            .service(api_assign_judge)
            .service(api_unassign_judge)
            .service(api_export)
            .service(api_reinit)
    })
    .bind(bind)?
    .run()
    .await
}
