use parking_lot::Mutex;
use tracing::warn;

use super::{PageContext, PageSession};
use crate::error::AppError;
use crate::services::overlay::HomeOverlay;
use crate::services::{Navigation, Overlay, PageScope, Route, SessionState};

/// Landing page. Besides the session check it needs to know whether a
/// Google Business account is connected before offering the store list.
pub struct HomePage {
    ctx: PageContext,
    scope: PageScope,
    session: PageSession,
    overlay: Overlay<HomeOverlay>,
    google_connected: Mutex<Option<bool>>,
}

impl HomePage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            session: PageSession::default(),
            overlay: Overlay::new(),
            google_connected: Mutex::new(None),
        }
    }

    pub async fn mount(&self) -> SessionState {
        let state = self.session.mount(&self.ctx, &self.scope).await;
        if !state.is_authenticated() {
            return state;
        }

        match self.scope.run(self.ctx.client.google_status()).await {
            Ok(Ok(status)) => *self.google_connected.lock() = Some(status.connected),
            Ok(Err(e)) => {
                warn!("Integration status check failed: {}", e);
                if !self.scope.is_cancelled() {
                    self.ctx
                        .navigator()
                        .navigate(Navigation::Replace(Route::login()));
                }
            }
            Err(_) => {}
        }
        state
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }

    pub fn overlay(&self) -> &Overlay<HomeOverlay> {
        &self.overlay
    }

    pub fn google_connected(&self) -> Option<bool> {
        *self.google_connected.lock()
    }

    pub async fn go_upload(&self) -> Result<(), AppError> {
        self.session.require()?;
        self.overlay
            .run_after_delay(HomeOverlay::Upload, self.ctx.config.overlay_delay, async {
                self.ctx.navigator().navigate(Navigation::Push(Route::Upload));
            })
            .await
    }

    pub async fn go_stores(&self) -> Result<(), AppError> {
        self.session.require()?;
        if self.google_connected() != Some(true) {
            return Err(AppError::InvalidInput(
                "connect a Google Business account to browse stores".to_string(),
            ));
        }

        self.overlay
            .run_after_delay(HomeOverlay::Stores, self.ctx.config.overlay_delay, async {
                self.ctx.navigator().navigate(Navigation::Push(Route::Stores));
            })
            .await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let _ticket = self.overlay.begin(HomeOverlay::Logout)?;
        self.ctx
            .guard()
            .logout(self.ctx.navigator(), self.ctx.config.overlay_delay)
            .await;
        Ok(())
    }
}
