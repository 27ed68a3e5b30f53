use super::{PageContext, PageSession};
use crate::error::AppError;
use crate::models::AnalysisResult;
use crate::services::overlay::DashboardOverlay;
use crate::services::{Navigation, Overlay, PageScope, Route, SessionState};

/// Shows the result handed over by the upload page. Nothing is fetched
/// except the session check.
pub struct DashboardPage {
    ctx: PageContext,
    scope: PageScope,
    session: PageSession,
    overlay: Overlay<DashboardOverlay>,
    result: Option<AnalysisResult>,
}

impl DashboardPage {
    pub fn new(ctx: PageContext, result: Option<AnalysisResult>) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            session: PageSession::default(),
            overlay: Overlay::new(),
            result,
        }
    }

    pub async fn mount(&self) -> SessionState {
        self.session.mount(&self.ctx, &self.scope).await
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }

    pub fn overlay(&self) -> &Overlay<DashboardOverlay> {
        &self.overlay
    }

    /// `None` means no analysis has been run in this session.
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        if self.session.get().is_authenticated() {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub async fn go_home(&self) -> Result<(), AppError> {
        self.overlay
            .run_after_delay(DashboardOverlay::Home, self.ctx.config.overlay_delay, async {
                self.ctx.navigator().navigate(Navigation::Push(Route::Home));
            })
            .await
    }

    pub async fn go_upload(&self) -> Result<(), AppError> {
        self.overlay
            .run_after_delay(DashboardOverlay::Upload, self.ctx.config.overlay_delay, async {
                self.ctx.navigator().navigate(Navigation::Push(Route::Upload));
            })
            .await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let _ticket = self.overlay.begin(DashboardOverlay::Logout)?;
        self.ctx
            .guard()
            .logout(self.ctx.navigator(), self.ctx.config.overlay_delay)
            .await;
        Ok(())
    }
}
