use crate::app::AppState;
use crate::schema::session::Session;
pub use crate::schema::session::User;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web::Data,
    FromRequest, HttpMessage, HttpResponse,
};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use futures::future::LocalBoxFuture;
use lazy_static::lazy_static;
use log::{log, Level};
use sha3::{Digest, Sha3_256};
use std::{
    env,
    future::{ready, Ready},
    task::{Context, Poll},
};

lazy_static! {
    pub static ref SECURITY_ENABLED: bool = env::var("SECURITY_ENABLED")
        .map(|x| x.parse::<bool>().unwrap_or(true))
        .unwrap_or(true);
    static ref TOKEN_SECRET: String =
        env::var("PROMETEO_TOKEN_SECRET").unwrap_or_else(|_| "prometeo-demo-secret".to_string());
}

const SESSION_TTL_SECS: i64 = 60 * 60 * 24;

fn sign(payload_64: &str) -> Vec<u8> {
    let mut hasher = Sha3_256::new();
    hasher.update(TOKEN_SECRET.as_bytes());
    hasher.update(b".");
    hasher.update(payload_64.as_bytes());
    hasher.finalize().to_vec()
}

pub(crate) fn encode_session(session: &Session) -> String {
    let payload_64 =
        general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(session).unwrap());
    let sig_64 = general_purpose::URL_SAFE_NO_PAD.encode(sign(&payload_64));
    format!("{payload_64}.{sig_64}")
}

/// Mints a signed bearer token for the identity.
pub fn issue_token(user: User) -> (String, Session) {
    let now = chrono::Utc::now().timestamp();
    let session = Session {
        user,
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };
    (encode_session(&session), session)
}

fn get_token_pieces(token: &str) -> Result<(Session, String, Vec<u8>)> {
    let mut it = token.split('.');
    let payload_64 = it.next().ok_or(anyhow!("!payload"))?.to_owned();
    let payload = general_purpose::URL_SAFE_NO_PAD.decode(payload_64.as_bytes())?;
    let session: Session = serde_json::from_slice(&payload)?;
    let signature = it.next().ok_or(anyhow!("!signature"))?;
    let signature = general_purpose::URL_SAFE_NO_PAD.decode(signature)?;
    Ok((session, payload_64, signature))
}

fn verify_token(session: &Session, payload_64: &str, signature: &[u8]) -> bool {
    if session.exp < chrono::Utc::now().timestamp() {
        return false;
    }
    sign(payload_64) == signature
}

pub(crate) fn bearer_token(req: &actix_web::HttpRequest) -> Option<String> {
    req.headers().get("Authorization").map(|h| {
        h.to_str()
            .unwrap_or("")
            .trim_start_matches("Bearer ")
            .to_string()
    })
}

impl FromRequest for User {
    type Error = actix_web::error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let unauthorized = || {
            Box::pin(async {
                <Result<Self, Self::Error>>::Err(actix_web::error::ErrorUnauthorized(""))
            })
        };

        let token = match bearer_token(req) {
            Some(t) => t,
            None => return unauthorized(),
        };

        let (session, payload_64, signature) = match get_token_pieces(&token) {
            Ok(vals) => vals,
            Err(_) => return unauthorized(),
        };

        if verify_token(&session, &payload_64, &signature) {
            Box::pin(async move { Ok(session.user) })
        } else {
            unauthorized()
        }
    }
}

#[doc(hidden)]
pub struct SessionAuthService<S> {
    service: S,
    enabled: bool,
    responder_only: bool,
}

impl<S> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<
        ServiceRequest,
        Response = ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    S::Future: 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.enabled {
            let unauthorized = |req: ServiceRequest| -> Self::Future {
                Box::pin(async { Ok(req.into_response(HttpResponse::Unauthorized().finish())) })
            };

            let token = match req.headers().get("Authorization").map(|x| x.to_str()) {
                Some(Ok(x)) => x.trim_start_matches("Bearer ").to_string(),
                _ => return unauthorized(req),
            };

            let (session, payload_64, signature) = match get_token_pieces(&token) {
                Ok(x) => x,
                Err(e) => {
                    log!(Level::Debug, "Token is formatted incorrectly: {e}");
                    return unauthorized(req);
                }
            };

            if !verify_token(&session, &payload_64, &signature) {
                return unauthorized(req);
            }

            // Signature alone is not enough: logout revokes the session in
            // the store, so it must still be registered.
            let app_data: &Data<AppState> = req.app_data().unwrap();
            if !app_data.sessions.is_active(&token) {
                log!(Level::Debug, "Token valid but session revoked");
                return unauthorized(req);
            }

            if self.responder_only && !session.user.responder() {
                return unauthorized(req);
            }

            req.extensions_mut().insert(session.user.clone());

            let future = self.service.call(req);
            return Box::pin(async move {
                let response = future.await?;
                Ok(response)
            });
        }
        let future = self.service.call(req);
        Box::pin(async move {
            let response = future.await?;
            Ok(response)
        })
    }
}

#[derive(Clone, Debug)]
pub struct SessionAuth {
    enabled: bool,
    responder: bool,
}

impl SessionAuth {
    /// Any authenticated session.
    pub fn enabled() -> Self {
        Self {
            enabled: *SECURITY_ENABLED,
            responder: false,
        }
    }

    /// Responder sessions only; citizens get 401, never the payload.
    pub fn responder_only() -> Self {
        Self {
            enabled: *SECURITY_ENABLED,
            responder: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            responder: false,
        }
    }
}

impl<S> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<
        ServiceRequest,
        Response = ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    S::Future: 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = actix_web::Error;
    type Transform = SessionAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service,
            enabled: self.enabled,
            responder_only: self.responder,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::session::UserRole;

    fn demo_user() -> User {
        User {
            id: "cit-001".into(),
            name: "John Doe".into(),
            email: "citizen@prometeo.com".into(),
            role: UserRole::Citizen,
            avatar: None,
        }
    }

    #[test]
    fn issued_tokens_round_trip() {
        let (token, session) = issue_token(demo_user());
        let (decoded, payload_64, signature) = get_token_pieces(&token).unwrap();
        assert!(verify_token(&decoded, &payload_64, &signature));
        assert_eq!(decoded.user, session.user);
        assert_eq!(decoded.exp, session.exp);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let (token, _) = issue_token(demo_user());
        let (payload_64, sig_64) = token.split_once('.').unwrap();

        let mut session: Session = serde_json::from_slice(
            &general_purpose::URL_SAFE_NO_PAD
                .decode(payload_64.as_bytes())
                .unwrap(),
        )
        .unwrap();
        session.user.role = UserRole::Responder;
        let forged_64 =
            general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(&session).unwrap());
        let forged = format!("{forged_64}.{sig_64}");

        let (decoded, payload_64, signature) = get_token_pieces(&forged).unwrap();
        assert!(!verify_token(&decoded, &payload_64, &signature));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let now = chrono::Utc::now().timestamp();
        let stale = Session {
            user: demo_user(),
            iat: now - 100,
            exp: now - 1,
        };
        let token = encode_session(&stale);
        let (decoded, payload_64, signature) = get_token_pieces(&token).unwrap();
        assert!(!verify_token(&decoded, &payload_64, &signature));
    }

    #[test]
    fn garbage_tokens_fail_to_parse() {
        assert!(get_token_pieces("not-a-token").is_err());
        assert!(get_token_pieces("AAAA.BBBB").is_err());
    }
}
