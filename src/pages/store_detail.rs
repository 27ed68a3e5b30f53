use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::{PageContext, PageSession};

const SYNC_FAILED: &str = "An error occurred while syncing reviews.";
use crate::error::AppError;
use crate::models::ReportQuery;
use crate::services::overlay::StoreOverlay;
use crate::services::{Navigation, Overlay, PageScope, Route, SessionState};

/// Outcome of the last manual review sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Success { inserted: u64 },
    Error(String),
}

/// One store: pull its latest reviews, or pick a period and open its CX
/// report.
pub struct StoreDetailPage {
    ctx: PageContext,
    scope: PageScope,
    session: PageSession,
    overlay: Overlay<StoreOverlay>,
    store_id: String,
    sync: Mutex<SyncStatus>,
}

impl StoreDetailPage {
    pub fn new(ctx: PageContext, store_id: impl Into<String>) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            session: PageSession::default(),
            overlay: Overlay::new(),
            store_id: store_id.into(),
            sync: Mutex::new(SyncStatus::Idle),
        }
    }

    pub async fn mount(&self) -> SessionState {
        self.session.mount(&self.ctx, &self.scope).await
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn overlay(&self) -> &Overlay<StoreOverlay> {
        &self.overlay
    }

    pub fn is_syncing(&self) -> bool {
        self.overlay.current() == Some(StoreOverlay::Sync)
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.lock().clone()
    }

    /// Asks the backend to store any new Google reviews for this store and
    /// returns how many were inserted. A second request while one is running
    /// is rejected by the overlay.
    pub async fn sync_reviews(&self) -> Result<u64, AppError> {
        self.session.require()?;
        let _ticket = self.overlay.begin(StoreOverlay::Sync)?;
        *self.sync.lock() = SyncStatus::Idle;

        match self.scope.run(self.ctx.client.sync_reviews(&self.store_id)).await? {
            Ok(result) => {
                info!("Synced store {}: {} new reviews", self.store_id, result.inserted);
                *self.sync.lock() = SyncStatus::Success {
                    inserted: result.inserted,
                };
                Ok(result.inserted)
            }
            Err(e) => {
                warn!("Review sync for store {} failed: {}", self.store_id, e);
                *self.sync.lock() = SyncStatus::Error(SYNC_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Opens the CX report for the chosen period. Both bounds are required.
    pub fn analyze(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), AppError> {
        self.session.require()?;
        let (Some(from), Some(to)) = (from, to) else {
            return Err(AppError::InvalidInput(
                "choose both a start and an end date".to_string(),
            ));
        };

        let query = ReportQuery::new(self.store_id.clone()).with_period(Some(from), Some(to));
        self.ctx
            .navigator()
            .navigate(Navigation::Push(Route::CxReport(query)));
        Ok(())
    }

    pub async fn go_stores(&self) -> Result<(), AppError> {
        self.overlay
            .run_after_delay(StoreOverlay::Stores, self.ctx.config.overlay_delay, async {
                self.ctx.navigator().navigate(Navigation::Push(Route::Stores));
            })
            .await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let _ticket = self.overlay.begin(StoreOverlay::Logout)?;
        self.ctx
            .guard()
            .logout(self.ctx.navigator(), self.ctx.config.overlay_delay)
            .await;
        Ok(())
    }
}
