use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{PageContext, PageSession};
use crate::error::AppError;
use crate::models::{ReportQuery, TrendUnit};
use crate::services::overlay::ReportOverlay;
use crate::services::report::{load_report, load_trend, ReportView};
use crate::services::{Overlay, PageScope, SessionState};

pub struct CxReportPage {
    ctx: PageContext,
    scope: PageScope,
    session: PageSession,
    overlay: Overlay<ReportOverlay>,
    query: Option<ReportQuery>,
    unit: Mutex<TrendUnit>,
    loading: AtomicBool,
    view: Mutex<Option<ReportView>>,
}

impl CxReportPage {
    pub fn new(ctx: PageContext, query: Option<ReportQuery>) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            session: PageSession::default(),
            overlay: Overlay::new(),
            query,
            unit: Mutex::new(TrendUnit::Day),
            loading: AtomicBool::new(false),
            view: Mutex::new(None),
        }
    }

    pub async fn mount(&self) -> SessionState {
        self.session.mount(&self.ctx, &self.scope).await
    }

    /// Tears the page down; an in-flight report request is aborted.
    pub fn teardown(&self) {
        self.scope.cancel();
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn view(&self) -> Option<ReportView> {
        self.view.lock().clone()
    }

    pub fn overlay(&self) -> &Overlay<ReportOverlay> {
        &self.overlay
    }

    /// Fetches the report for the page's store and period. Without a store
    /// there is nothing to load and `Ok(None)` is returned.
    pub async fn load(&self) -> Result<Option<ReportView>, AppError> {
        self.session.require()?;
        let Some(query) = self.query.as_ref() else {
            return Ok(None);
        };

        let unit = *self.unit.lock();
        self.loading.store(true, Ordering::SeqCst);
        let result = self
            .scope
            .defer(load_report(&self.ctx.client, query, unit))
            .await;
        self.loading.store(false, Ordering::SeqCst);

        let view = result??;
        *self.view.lock() = Some(view.clone());
        Ok(Some(view))
    }

    /// Switches the trend granularity and refetches only the trend.
    pub async fn set_unit(&self, unit: TrendUnit) -> Result<(), AppError> {
        *self.unit.lock() = unit;

        let Some(query) = self.query.as_ref() else {
            return Ok(());
        };
        if !matches!(*self.view.lock(), Some(ReportView::Report { .. })) {
            return Ok(());
        }

        let points = self.scope.run(load_trend(&self.ctx.client, query, unit)).await?;
        if let Some(ReportView::Report { trend, unit: current, .. }) = self.view.lock().as_mut() {
            *trend = points;
            *current = unit;
        }
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let _ticket = self.overlay.begin(ReportOverlay::Logout)?;
        self.ctx
            .guard()
            .logout(self.ctx.navigator(), Duration::ZERO)
            .await;
        Ok(())
    }
}
