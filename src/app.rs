use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web::{self, scope, Data};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::backend::{LocalBackend, RemoteBackend, ReportBackend},
    api::endpoints::*,
    auth::SECURITY_ENABLED,
    schema::api::{
        EvidenceResponse, LoginRequest, LoginResponse, NewIncident, NewNote, StatsResponse,
        StatusChange, UpvoteResponse, VersionResponse,
    },
    schema::incident::{Incident, IncidentStatus, IncidentType, Location, Note, Severity},
    schema::session::{User, UserRole},
    store::incidents::IncidentStore,
    store::sessions::SessionStore,
};

pub struct AppState {
    pub incidents: Arc<IncidentStore>,
    pub sessions: SessionStore,
    pub backend: Box<dyn ReportBackend>,
}

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    let cors = if *SECURITY_ENABLED {
        actix_cors::Cors::default()
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .allow_any_method()
            .max_age(3600)
    } else {
        actix_cors::Cors::permissive()
    };

    #[derive(OpenApi)]
    #[openapi(
        paths(
            add_note,
            create_incident,
            get_incident,
            get_incidents,
            get_session,
            get_stats,
            get_version,
            login,
            logout,
            set_status,
            upload_evidence,
            upvote_incident
        ),
        components(schemas(
            EvidenceResponse,
            Incident,
            IncidentStatus,
            IncidentType,
            Location,
            LoginRequest,
            LoginResponse,
            NewIncident,
            NewNote,
            Note,
            Severity,
            StatsResponse,
            StatusChange,
            UpvoteResponse,
            User,
            UserRole,
            VersionResponse
        )),
        modifiers(&SecurityAddon),
        tags(
            (name = "Prometeo", description = "PROMETEO incident reporting API")
        ),
    )]
    struct ApiDoc;

    struct SecurityAddon;

    impl Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let components = openapi.components.as_mut().unwrap();
            components.add_security_scheme(
                "prometeo",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("signed session")
                        .build(),
                ),
            );
        }
    }

    let openapi = ApiDoc::openapi();

    cfg.service(SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", openapi))
        .service(
            scope("/api")
                .wrap(cors)
                .service(login)
                .service(logout)
                .service(get_session)
                .service(create_incident)
                .service(upload_evidence)
                .service(get_incidents)
                .service(get_incident)
                .service(upvote_incident)
                .service(set_status)
                .service(add_note)
                .service(get_stats)
                .service(get_version),
        );
}

pub async fn get_app_data() -> Data<AppState> {
    let incidents = Arc::new(IncidentStore::new());

    let mode = env::var("PROMETEO_BACKEND").unwrap_or_else(|_| "local".to_string());
    let backend: Box<dyn ReportBackend> = match mode.as_str() {
        "remote" => Box::new(RemoteBackend),
        _ => {
            let seed = env::var("PROMETEO_SEED_DEMO")
                .map(|x| x.parse::<bool>().unwrap_or(true))
                .unwrap_or(true);
            if seed {
                incidents.seed_demo();
            }
            Box::new(LocalBackend::new(incidents.clone()))
        }
    };

    let session_file = env::var("PROMETEO_SESSION_FILE")
        .unwrap_or_else(|_| "prometeo_sessions.json".to_string());
    let sessions = SessionStore::restore(PathBuf::from(session_file));

    println!("PROMETEO backend ready ({mode} mode)");
    Data::new(AppState {
        incidents,
        sessions,
        backend,
    })
}
