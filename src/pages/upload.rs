use bytes::Bytes;
use parking_lot::Mutex;

use super::{PageContext, PageSession};
use crate::error::AppError;
use crate::services::ingest::{IngestPipeline, ParseSummary, PreviewRow};
use crate::services::overlay::UploadOverlay;
use crate::services::{Navigation, Overlay, PageScope, Route, SessionState};

pub struct UploadPage {
    ctx: PageContext,
    scope: PageScope,
    session: PageSession,
    overlay: Overlay<UploadOverlay>,
    pipeline: IngestPipeline,
    notice: Mutex<Option<String>>,
}

impl UploadPage {
    pub fn new(ctx: PageContext) -> Self {
        let pipeline = IngestPipeline::new(ctx.config.max_file_size);
        Self {
            ctx,
            scope: PageScope::new(),
            session: PageSession::default(),
            overlay: Overlay::new(),
            pipeline,
            notice: Mutex::new(None),
        }
    }

    pub async fn mount(&self) -> SessionState {
        self.session.mount(&self.ctx, &self.scope).await
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }

    pub fn session(&self) -> SessionState {
        self.session.get()
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }

    pub fn overlay(&self) -> &Overlay<UploadOverlay> {
        &self.overlay
    }

    /// Last user-facing error, if any.
    pub fn notice(&self) -> Option<String> {
        self.notice.lock().clone()
    }

    fn set_notice(&self, err: &AppError) {
        *self.notice.lock() = Some(err.user_message());
    }

    pub async fn select_file(&self, name: &str, bytes: Bytes) -> Result<ParseSummary, AppError> {
        self.session.require()?;
        let _ticket = self.overlay.begin(UploadOverlay::File)?;
        *self.notice.lock() = None;

        self.pipeline.select_file(name, bytes).await.map_err(|e| {
            if !matches!(e, AppError::Cancelled) {
                self.set_notice(&e);
            }
            e
        })
    }

    pub async fn toggle_preview(&self) -> Result<bool, AppError> {
        if self.pipeline.preview().is_empty() {
            return Ok(self.pipeline.show_preview());
        }

        self.overlay
            .run_after_delay(UploadOverlay::Preview, self.ctx.config.preview_delay, async {
                self.pipeline.toggle_preview()
            })
            .await
    }

    /// Rows to render under the file card; empty while the preview is hidden.
    pub fn visible_preview(&self) -> Vec<PreviewRow> {
        if self.pipeline.show_preview() {
            self.pipeline.preview()
        } else {
            Vec::new()
        }
    }

    /// Submits the selected file and moves to the dashboard with the result.
    pub async fn analyze(&self) -> Result<(), AppError> {
        self.session.require()?;
        let _ticket = self.overlay.begin(UploadOverlay::Analyze)?;

        match self.pipeline.submit_for_analysis(&self.ctx.client).await {
            Ok(result) => {
                self.ctx
                    .navigator()
                    .navigate(Navigation::Push(Route::Dashboard(Some(result))));
                Ok(())
            }
            Err(e) => {
                self.set_notice(&e);
                Err(e)
            }
        }
    }

    pub async fn go_home(&self) -> Result<(), AppError> {
        self.overlay
            .run_after_delay(UploadOverlay::Home, self.ctx.config.overlay_delay, async {
                self.ctx.navigator().navigate(Navigation::Push(Route::Home));
            })
            .await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let _ticket = self.overlay.begin(UploadOverlay::Logout)?;
        self.ctx
            .guard()
            .logout(self.ctx.navigator(), self.ctx.config.overlay_delay)
            .await;
        Ok(())
    }
}
