use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;
use log::{log, Level};

use crate::auth::issue_token;
use crate::schema::session::{Session, User, UserRole};

/// The two fixed demo accounts, compared by exact string match.
pub fn demo_accounts() -> Vec<(&'static str, &'static str, User)> {
    vec![
        (
            "admin@prometeo.com",
            "admin123",
            User {
                id: "resp-001".into(),
                name: "Chief Sarah Connor".into(),
                email: "admin@prometeo.com".into(),
                role: UserRole::Responder,
                avatar: Some("https://api.dicebear.com/7.x/avataaars/svg?seed=Sarah".into()),
            },
        ),
        (
            "citizen@prometeo.com",
            "user123",
            User {
                id: "cit-001".into(),
                name: "John Doe".into(),
                email: "citizen@prometeo.com".into(),
                role: UserRole::Citizen,
                avatar: Some("https://api.dicebear.com/7.x/avataaars/svg?seed=John".into()),
            },
        ),
    ]
}

/// Active sessions keyed by token, mirrored to a single JSON file: written on
/// login, rewritten on logout, read once at startup. A missing file at
/// startup is normal. Bad credentials are a value-level outcome, never an
/// error.
pub struct SessionStore {
    path: PathBuf,
    active: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Reads any persisted sessions and adopts the ones still unexpired.
    pub fn restore(path: PathBuf) -> Self {
        let active = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, Session>>(&bytes) {
                Ok(mut sessions) => {
                    let now = Utc::now().timestamp();
                    sessions.retain(|_, s| s.exp > now);
                    log!(Level::Info, "restored {} session(s)", sessions.len());
                    sessions
                }
                Err(e) => {
                    log!(Level::Warn, "session file unreadable, starting empty: {e}");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            active: RwLock::new(active),
        }
    }

    /// Exact-match credential check against the demo accounts. `None` means
    /// wrong credentials and leaves every session untouched.
    pub fn login(&self, email: &str, password: &str) -> Option<(String, User)> {
        let user = demo_accounts()
            .into_iter()
            .find(|(e, p, _)| *e == email && *p == password)
            .map(|(_, _, user)| user)?;
        Some(self.adopt(user))
    }

    /// Registers a session for an already-authenticated identity (used by
    /// both the demo login and the remote credential exchange).
    pub fn adopt(&self, user: User) -> (String, User) {
        let (token, session) = issue_token(user.clone());
        self.active.write().unwrap().insert(token.clone(), session);
        self.persist();
        (token, user)
    }

    pub fn logout(&self, token: &str) -> bool {
        let removed = self.active.write().unwrap().remove(token).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    pub fn is_active(&self, token: &str) -> bool {
        self.active.read().unwrap().contains_key(token)
    }

    pub fn session(&self, token: &str) -> Option<Session> {
        self.active.read().unwrap().get(token).cloned()
    }

    fn persist(&self) {
        let sessions = self.active.read().unwrap();
        match serde_json::to_vec(&*sessions) {
            Ok(bytes) => {
                if let Err(e) = fs::write(&self.path, bytes) {
                    log!(Level::Warn, "failed to persist sessions: {e}");
                }
            }
            Err(e) => log!(Level::Warn, "failed to serialize sessions: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fresh_id;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("prometeo-sessions-{}.json", fresh_id()))
    }

    #[test]
    fn wrong_credentials_leave_sessions_unset() {
        let store = SessionStore::restore(scratch_path());
        assert!(store.login("admin@prometeo.com", "wrong").is_none());
        assert!(store.login("nobody@prometeo.com", "admin123").is_none());
        assert!(store.active.read().unwrap().is_empty());
    }

    #[test]
    fn responder_login_sets_responder_identity() {
        let store = SessionStore::restore(scratch_path());
        let (token, user) = store
            .login("admin@prometeo.com", "admin123")
            .expect("demo responder credentials");
        assert_eq!(user.role, UserRole::Responder);
        assert_eq!(user.id, "resp-001");
        assert!(store.is_active(&token));
    }

    #[test]
    fn logout_revokes_and_is_idempotent_to_absence() {
        let store = SessionStore::restore(scratch_path());
        let (token, _) = store.login("citizen@prometeo.com", "user123").unwrap();
        assert!(store.logout(&token));
        assert!(!store.is_active(&token));
        assert!(!store.logout(&token));
    }

    #[test]
    fn sessions_survive_a_restart_via_the_file() {
        let path = scratch_path();
        let store = SessionStore::restore(path.clone());
        let (token, _) = store.login("admin@prometeo.com", "admin123").unwrap();
        drop(store);

        let revived = SessionStore::restore(path.clone());
        assert!(revived.is_active(&token));
        let session = revived.session(&token).unwrap();
        assert_eq!(session.user.email, "admin@prometeo.com");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_a_normal_empty_start() {
        let store = SessionStore::restore(scratch_path());
        assert!(store.active.read().unwrap().is_empty());
    }
}
