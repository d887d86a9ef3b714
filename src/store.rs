use crate::error::Result;
use crate::models::user::AuthSession;
use crate::utils::time;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, alias = "id", alias = "userId")]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Reads claims without checking the signature. The server verifies tokens;
/// the client only needs to know when its own token runs out.
pub fn peek_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    peek_claims(token)?.exp.and_then(time::from_unix)
}

/// The signed-in user, kept on disk between CLI runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    current: Option<AuthSession>,
}

impl SessionStore {
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<AuthSession>(&bytes) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "discarding unreadable session file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, current })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<&AuthSession> {
        self.current.as_ref()
    }

    /// Token of a session that has not expired yet.
    pub fn active_token(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|_| self.is_authenticated_at(time::now()))
            .map(|s| s.token.as_str())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        match &self.current {
            None => false,
            // Tokens without a readable expiry are left for the server to judge.
            Some(session) => token_expiry(&session.token).map_or(true, |exp| exp > now),
        }
    }

    pub async fn save(&mut self, session: AuthSession) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let bytes = serde_json::to_vec_pretty(&session)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!(path = %self.path.display(), "session saved");
        self.current = Some(session);
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.current = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(exp: i64) -> String {
        let claims = serde_json::json!({"sub": "u1", "exp": exp});
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    fn session(token: String) -> AuthSession {
        AuthSession {
            token,
            user: User {
                id: "u1".into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                avatar: None,
                plan: None,
                created_at: None,
            },
        }
    }

    #[test]
    fn claims_are_read_without_the_secret() {
        let claims = peek_claims(&token(1_900_000_000)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert!(peek_claims("not-a-jwt").is_none());
    }

    #[tokio::test]
    async fn save_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = SessionStore::load(&path).await.unwrap();
        assert!(store.current().is_none());

        store.save(session(token(1_900_000_000))).await.unwrap();
        let reloaded = SessionStore::load(&path).await.unwrap();
        assert_eq!(reloaded.current().unwrap().user.name, "Ana");

        store.clear().await.unwrap();
        assert!(!path.exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn expired_token_is_not_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::load(dir.path().join("s.json")).await.unwrap();
        store.save(session(token(1_000))).await.unwrap();
        assert!(store.active_token().is_none());

        let now = time::from_unix(500).unwrap();
        assert!(store.is_authenticated_at(now));
    }

    #[tokio::test]
    async fn garbage_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let store = SessionStore::load(&path).await.unwrap();
        assert!(store.current().is_none());
    }
}
