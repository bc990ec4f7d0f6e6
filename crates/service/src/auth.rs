use chrono::{DateTime, Duration, Utc};
use connector_database::basic_db::SafeDatabase;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::parser::user::User;
use crate::store::{Document, DocumentStore, SESSIONS};

pub const NO_TOKEN: &str = "No token, authorization denied";
pub const INVALID_TOKEN: &str = "Token is not valid";

/// Server-side record of an issued bearer token. Only the digest is stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub digest: String,
    pub user: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Document for Session {
    const TABLE: &'static str = SESSIONS;

    fn key(&self) -> String {
        self.digest.clone()
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Resolves bearer tokens to user ids.
#[derive(Clone)]
pub struct AuthGuard<D> {
    store: DocumentStore<D>,
}

impl<D: SafeDatabase> AuthGuard<D> {
    pub fn new(database: D) -> Self {
        Self {
            store: DocumentStore::new(database),
        }
    }

    /// Mints a token for `user` valid for `ttl`. The raw token is returned once.
    pub fn issue(&self, user: Uuid, ttl: Duration) -> Result<String, ServiceError> {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let session = Session {
            digest: digest(&token),
            user,
            expires_at: Utc::now() + ttl,
        };
        self.store.save(&session)?;
        Ok(token)
    }

    pub fn verify(&self, token: Option<&str>) -> Result<Uuid, ServiceError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::unauthorized(NO_TOKEN))?;

        let session: Session = self
            .store
            .find(&digest(token))?
            .ok_or_else(|| ServiceError::unauthorized(INVALID_TOKEN))?;

        if session.expires_at <= Utc::now() {
            debug!(user = %session.user, "rejecting expired session");
            return Err(ServiceError::unauthorized(INVALID_TOKEN));
        }

        Ok(session.user)
    }

    /// The account behind a verified id; it may have been deleted since.
    pub fn current_user(&self, user: Uuid) -> Result<User, ServiceError> {
        self.store
            .find(&user.to_string())?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    /// Returns `true` when the token named a live session.
    pub fn revoke(&self, token: &str) -> Result<bool, ServiceError> {
        Ok(self.store.remove::<Session>(&digest(token))?)
    }
}
