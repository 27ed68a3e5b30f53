use std::sync::Arc;

use parking_lot::Mutex;

use crate::clients::BackendClient;
use crate::config::Config;
use crate::error::AppError;
use crate::services::{Navigator, PageScope, SessionGuard, SessionState};

pub mod cx_report;
pub mod dashboard;
pub mod home;
pub mod login;
pub mod store_detail;
pub mod upload;

pub use cx_report::CxReportPage;
pub use dashboard::DashboardPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use store_detail::{StoreDetailPage, SyncStatus};
pub use upload::UploadPage;

/// Everything a page needs from its surroundings.
#[derive(Clone)]
pub struct PageContext {
    pub config: Config,
    pub client: BackendClient,
    pub navigator: Arc<dyn Navigator>,
}

impl PageContext {
    pub fn new(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self, AppError> {
        let client = BackendClient::new(&config)?;
        Ok(Self {
            config,
            client,
            navigator,
        })
    }

    pub fn guard(&self) -> SessionGuard {
        SessionGuard::new(self.client.clone())
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }
}

/// Session state of one page instance. `Unauthenticated` is terminal.
#[derive(Debug, Default)]
pub(crate) struct PageSession {
    state: Mutex<SessionState>,
}

impl PageSession {
    pub(crate) fn get(&self) -> SessionState {
        *self.state.lock()
    }

    /// Runs the guard once. A torn-down page keeps whatever state it had.
    pub(crate) async fn mount(&self, ctx: &PageContext, scope: &PageScope) -> SessionState {
        if self.get() == SessionState::Unauthenticated {
            return SessionState::Unauthenticated;
        }

        match ctx.guard().guard(scope, ctx.navigator()).await {
            Some(state) => {
                *self.state.lock() = state;
                state
            }
            None => self.get(),
        }
    }

    pub(crate) fn require(&self) -> Result<(), AppError> {
        if self.get().is_authenticated() {
            Ok(())
        } else {
            Err(AppError::Unauthenticated)
        }
    }
}
