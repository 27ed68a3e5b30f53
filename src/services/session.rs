use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clients::BackendClient;
use crate::services::navigation::{Navigation, Navigator, Route};
use crate::services::scope::PageScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Gates page content behind `/auth/status`. Every failure resolves to
/// `Unauthenticated`; there are no retries.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    client: BackendClient,
}

impl SessionGuard {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub async fn check_session(&self) -> SessionState {
        match self.client.auth_status().await {
            Ok(status) if status.logged_in => SessionState::Authenticated,
            Ok(_) => {
                debug!("Auth status reports logged out");
                SessionState::Unauthenticated
            }
            Err(e) => {
                warn!("Auth status check failed, treating as logged out: {}", e);
                SessionState::Unauthenticated
            }
        }
    }

    /// Runs the check inside `scope` and redirects to login on failure.
    /// Returns `None` when the page was torn down before the check resolved;
    /// in that case nothing is navigated.
    pub async fn guard(&self, scope: &PageScope, navigator: &dyn Navigator) -> Option<SessionState> {
        let state = scope.run(self.check_session()).await.ok()?;
        if scope.is_cancelled() {
            return None;
        }

        if state == SessionState::Unauthenticated {
            info!("Not logged in, redirecting to login");
            navigator.navigate(Navigation::Replace(Route::login()));
        }
        Some(state)
    }

    /// Login page behaviour: an already-authenticated visitor is sent home.
    /// Failures are ignored so the login button stays usable.
    pub async fn redirect_if_logged_in(&self, scope: &PageScope, navigator: &dyn Navigator) -> bool {
        let status = match scope.run(self.client.auth_status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                debug!("Auth status check failed on login page: {}", e);
                return false;
            }
            Err(_) => return false,
        };

        if status.logged_in && !scope.is_cancelled() {
            navigator.navigate(Navigation::Replace(Route::Home));
            return true;
        }
        false
    }

    /// Ends the session. The login redirect happens after `delay` whether or
    /// not the backend call succeeded.
    pub async fn logout(&self, navigator: &dyn Navigator, delay: Duration) {
        if let Err(e) = self.client.logout().await {
            warn!("Logout request failed: {}", e);
        }
        tokio::time::sleep(delay).await;
        navigator.navigate(Navigation::Replace(Route::Login { just_logged_out: true }));
    }
}
