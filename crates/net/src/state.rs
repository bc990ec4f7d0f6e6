use connector_database::basic_db::SafeDatabase;
use connector_service::auth::AuthGuard;
use connector_service::error::ServiceError;
use connector_service::github::GithubClient;
use connector_service::post_editor::PostEditor;
use connector_service::profile_editor::ProfileEditor;
use uuid::Uuid;

/// Shared by every handler. The database handle is cheap to clone.
#[derive(Clone)]
pub struct AppState<T> {
    pub database: T,
    pub github: GithubClient,
    pub session_ttl: chrono::Duration,
}

impl<T: SafeDatabase> AppState<T> {
    pub fn new(database: T, github: GithubClient, session_ttl: chrono::Duration) -> Self {
        Self {
            database,
            github,
            session_ttl,
        }
    }

    pub fn guard(&self) -> AuthGuard<T> {
        AuthGuard::new(self.database.clone())
    }

    pub fn profiles(&self) -> ProfileEditor<T> {
        ProfileEditor::new(self.database.clone())
    }

    pub fn posts(&self) -> PostEditor<T> {
        PostEditor::new(self.database.clone())
    }

    /// Mints a token for an existing account that lives for `session_ttl`.
    pub fn open_session(&self, user: Uuid) -> Result<String, ServiceError> {
        let guard = self.guard();
        guard.current_user(user)?;
        guard.issue(user, self.session_ttl)
    }

    pub fn close_session(&self, token: &str) -> Result<bool, ServiceError> {
        self.guard().revoke(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connector_database::basic_db::InnerDatabase;
    use connector_service::github::GithubConfig;
    use connector_service::parser::user::User;
    use connector_service::store::DocumentStore;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

    fn state(ttl: chrono::Duration) -> TestResult<(TempDir, AppState<InnerDatabase>, User)> {
        let dir = tempdir()?;
        let database = InnerDatabase::open(dir.path().join("test_db"))?;
        let user = User::new("Ada", "ada@example.com", "hash", "//avatar");
        DocumentStore::new(database.clone()).save(&user)?;
        let github = GithubClient::new(GithubConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout: Duration::from_secs(1),
        })?;
        Ok((dir, AppState::new(database, github, ttl), user))
    }

    #[test]
    fn session_lives_for_the_configured_ttl() -> TestResult {
        let (_dir, state, user) = state(chrono::Duration::hours(1))?;

        let token = state.open_session(user.id)?;

        assert_eq!(state.guard().verify(Some(&token))?, user.id);
        Ok(())
    }

    #[test]
    fn zero_ttl_session_is_already_expired() -> TestResult {
        let (_dir, state, user) = state(chrono::Duration::zero())?;

        let token = state.open_session(user.id)?;

        assert!(matches!(state.guard().verify(Some(&token)), Err(ServiceError::Unauthorized(_))));
        Ok(())
    }

    #[test]
    fn unknown_account_gets_no_session() -> TestResult {
        let (_dir, state, _user) = state(chrono::Duration::hours(1))?;

        let result = state.open_session(Uuid::new_v4());

        assert!(matches!(result, Err(ServiceError::NotFound(msg)) if msg == "User not found"));
        Ok(())
    }

    #[test]
    fn closed_session_no_longer_verifies() -> TestResult {
        let (_dir, state, user) = state(chrono::Duration::hours(1))?;
        let token = state.open_session(user.id)?;

        assert!(state.close_session(&token)?);
        assert!(!state.close_session(&token)?);
        assert!(state.guard().verify(Some(&token)).is_err());
        Ok(())
    }
}
