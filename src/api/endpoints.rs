use actix_web::{
    get, post, put,
    web::{self, Data, Json, Path},
    HttpRequest, HttpResponse, Responder,
};
use log::{log, Level};

use crate::{
    app::AppState,
    auth::{bearer_token, SessionAuth, User},
    report::ReportDraft,
    schema::api::{
        EvidenceResponse, FeedParams, LoginRequest, LoginResponse, NewIncident, NewNote,
        StatusChange, UpvoteResponse, VersionResponse,
    },
    store::incidents::{filter_feed, tally},
    utils::{fresh_id, is_valid_email},
};

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 400, description = "Malformed email"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Credential service failure")
    )
)]
#[post("/login", wrap = "SessionAuth::disabled()")]
pub async fn login(state: Data<AppState>, body: Json<LoginRequest>) -> impl Responder {
    log!(Level::Info, "POST /api/login");

    if !is_valid_email(body.email.as_str()) {
        return HttpResponse::BadRequest().body("Invalid email format specified.");
    }

    match state.backend.authenticate(&body.email, &body.password).await {
        Ok(Some(user)) => {
            let (token, user) = state.sessions.adopt(user);
            HttpResponse::Ok().json(LoginResponse { token, user })
        }
        Ok(None) => HttpResponse::Unauthorized().body("Invalid email or password."),
        Err(e) => {
            log!(Level::Warn, "Credential exchange failed: {e}");
            HttpResponse::InternalServerError().body("Login failed. Please try again.")
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    responses((status = 200, description = "Session cleared")),
    security(("prometeo" = []))
)]
#[post("/logout", wrap = "SessionAuth::enabled()")]
pub async fn logout(state: Data<AppState>, req: HttpRequest) -> impl Responder {
    log!(Level::Info, "POST /api/logout");
    if let Some(token) = bearer_token(&req) {
        state.sessions.logout(&token);
    }
    HttpResponse::Ok().body("")
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    responses((status = 200, description = "Current identity", body = User)),
    security(("prometeo" = []))
)]
#[get("/session", wrap = "SessionAuth::enabled()")]
pub async fn get_session(user: User) -> impl Responder {
    HttpResponse::Ok().json(user)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    params(FeedParams),
    responses((status = 200, description = "Filtered feed, most recent first", body = [Incident]))
)]
#[get("/incidents", wrap = "SessionAuth::disabled()")]
pub async fn get_incidents(state: Data<AppState>, params: web::Query<FeedParams>) -> impl Responder {
    let snapshot = state.incidents.snapshot();
    let feed = filter_feed(&snapshot, params.kind.as_deref(), params.severity.as_deref());
    HttpResponse::Ok().json(feed)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    responses(
        (status = 200, description = "Single incident", body = Incident),
        (status = 404, description = "Unknown id")
    )
)]
#[get("/incidents/{id}", wrap = "SessionAuth::disabled()")]
pub async fn get_incident(state: Data<AppState>, path: Path<(String,)>) -> impl Responder {
    let (id,) = path.into_inner();
    match state.incidents.snapshot().iter().find(|i| i.id == id) {
        Some(incident) => HttpResponse::Ok().json(incident),
        None => HttpResponse::NotFound().body("Incident could not be found"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    request_body = NewIncident,
    responses(
        (status = 200, description = "Created incident", body = Incident),
        (status = 400, description = "Invalid report"),
        (status = 500, description = "Backend failure")
    ),
    security(("prometeo" = []))
)]
#[post("/incidents", wrap = "SessionAuth::enabled()")]
pub async fn create_incident(
    state: Data<AppState>,
    body: Json<NewIncident>,
    _user: User,
) -> impl Responder {
    log!(Level::Info, "POST /api/incidents");

    if body.description.len() > 2000 {
        return HttpResponse::BadRequest().body("Maximum description length exceeded.");
    }

    let body = body.into_inner();
    let report = ReportDraft::filled(
        body.kind,
        body.severity,
        body.description,
        body.location,
        body.image_url,
    );

    // Same terminal validation the report form applies.
    let draft = match report.submit() {
        Ok(draft) => draft,
        Err(msg) => return HttpResponse::BadRequest().body(msg),
    };

    match state.backend.create_incident(draft).await {
        Ok(incident) => {
            log!(Level::Trace, "created incident {}", incident.id);
            HttpResponse::Ok().json(incident)
        }
        Err(e) => {
            log!(Level::Warn, "Failed to create incident: {e}");
            HttpResponse::InternalServerError().body("Failed to report incident.")
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Public reference for the uploaded image", body = EvidenceResponse),
        (status = 400, description = "Empty upload"),
        (status = 500, description = "Storage failure")
    ),
    security(("prometeo" = []))
)]
#[post("/evidence", wrap = "SessionAuth::enabled()")]
pub async fn upload_evidence(
    state: Data<AppState>,
    body: web::Bytes,
    _user: User,
) -> impl Responder {
    log!(Level::Info, "POST /api/evidence");

    if body.is_empty() {
        return HttpResponse::BadRequest().body("No image data specified.");
    }

    match state.backend.store_evidence(&fresh_id(), body.to_vec()).await {
        Ok(url) => HttpResponse::Ok().json(EvidenceResponse { url }),
        Err(e) => {
            log!(Level::Warn, "Failed to store evidence: {e}");
            HttpResponse::InternalServerError().body("Failed to upload evidence.")
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    responses(
        (status = 200, description = "Resulting vote count", body = UpvoteResponse),
        (status = 404, description = "Unknown id")
    ),
    security(("prometeo" = []))
)]
#[post("/incidents/{id}/upvote", wrap = "SessionAuth::enabled()")]
pub async fn upvote_incident(
    state: Data<AppState>,
    path: Path<(String,)>,
    user: User,
) -> impl Responder {
    let (id,) = path.into_inner();
    log!(Level::Info, "POST /api/incidents/{id}/upvote");

    // Idempotent: a repeated vote by the same user returns the same count.
    match state.incidents.upvote(&id, &user.id) {
        Some(upvotes) => HttpResponse::Ok().json(UpvoteResponse { upvotes }),
        None => HttpResponse::NotFound().body("Incident could not be found"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status replaced"),
        (status = 404, description = "Unknown id")
    ),
    security(("prometeo" = []))
)]
#[put("/incidents/{id}/status", wrap = "SessionAuth::responder_only()")]
pub async fn set_status(
    state: Data<AppState>,
    path: Path<(String,)>,
    body: Json<StatusChange>,
) -> impl Responder {
    let (id,) = path.into_inner();
    log!(Level::Info, "PUT /api/incidents/{id}/status");

    if state.incidents.set_status(&id, body.status) {
        HttpResponse::Ok().body("")
    } else {
        HttpResponse::NotFound().body("Incident could not be found")
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    request_body = NewNote,
    responses(
        (status = 200, description = "Appended note", body = Note),
        (status = 400, description = "Empty note"),
        (status = 404, description = "Unknown id")
    ),
    security(("prometeo" = []))
)]
#[post("/incidents/{id}/notes", wrap = "SessionAuth::responder_only()")]
pub async fn add_note(
    state: Data<AppState>,
    path: Path<(String,)>,
    body: Json<NewNote>,
    user: User,
) -> impl Responder {
    let (id,) = path.into_inner();
    log!(Level::Info, "POST /api/incidents/{id}/notes");

    if body.content.trim().is_empty() {
        return HttpResponse::BadRequest().body("No note content specified.");
    }

    match state.incidents.add_note(&id, &user.name, &body.content) {
        Some(note) => HttpResponse::Ok().json(note),
        None => HttpResponse::NotFound().body("Incident could not be found"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    responses((status = 200, description = "Dashboard aggregates", body = StatsResponse)),
    security(("prometeo" = []))
)]
#[get("/stats", wrap = "SessionAuth::responder_only()")]
pub async fn get_stats(state: Data<AppState>) -> impl Responder {
    let snapshot = state.incidents.snapshot();
    HttpResponse::Ok().json(tally(&snapshot))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Prometeo",
    responses((status = 200, description = "Build metadata", body = VersionResponse))
)]
#[get("/version", wrap = "SessionAuth::disabled()")]
pub async fn get_version() -> impl Responder {
    HttpResponse::Ok().json(VersionResponse {
        revision: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown").to_string(),
        built: option_env!("VERGEN_BUILD_TIMESTAMP")
            .unwrap_or("unknown")
            .to_string(),
    })
}
