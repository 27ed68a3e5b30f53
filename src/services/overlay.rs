use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::AppError;

/// A page's closed set of blocking transitions.
pub trait OverlayTag: Copy + Eq + std::fmt::Debug + Send + Sync + 'static {
    fn message(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeOverlay {
    Stores,
    Upload,
    Logout,
}

impl OverlayTag for HomeOverlay {
    fn message(&self) -> &'static str {
        match self {
            HomeOverlay::Stores => "Opening store list…",
            HomeOverlay::Upload => "Opening file upload…",
            HomeOverlay::Logout => "Logging out…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOverlay {
    Home,
    Logout,
    Analyze,
    File,
    Preview,
}

impl OverlayTag for UploadOverlay {
    fn message(&self) -> &'static str {
        match self {
            UploadOverlay::Home => "Returning to the main screen…",
            UploadOverlay::Logout => "Logging out…",
            UploadOverlay::Analyze => "AI is analyzing the reviews…",
            UploadOverlay::File => "Loading file…",
            UploadOverlay::Preview => "Preparing preview…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardOverlay {
    Home,
    Upload,
    Logout,
}

impl OverlayTag for DashboardOverlay {
    fn message(&self) -> &'static str {
        match self {
            DashboardOverlay::Home => "Returning to the main screen…",
            DashboardOverlay::Upload => "Opening file upload…",
            DashboardOverlay::Logout => "Logging out…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOverlay {
    Stores,
    Sync,
    Logout,
}

impl OverlayTag for StoreOverlay {
    fn message(&self) -> &'static str {
        match self {
            StoreOverlay::Stores => "Returning to the store list…",
            StoreOverlay::Sync => "Fetching the latest reviews…",
            StoreOverlay::Logout => "Logging out…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOverlay {
    Logout,
}

impl OverlayTag for ReportOverlay {
    fn message(&self) -> &'static str {
        match self {
            ReportOverlay::Logout => "Logging out…",
        }
    }
}

/// `None` is idle. At most one transition is active per page.
#[derive(Debug)]
pub struct Overlay<T: OverlayTag> {
    active: Mutex<Option<T>>,
}

impl<T: OverlayTag> Default for Overlay<T> {
    fn default() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }
}

impl<T: OverlayTag> Overlay<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<T> {
        *self.active.lock()
    }

    pub fn message(&self) -> Option<&'static str> {
        self.current().map(|tag| tag.message())
    }

    pub fn is_blocked(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn begin(&self, tag: T) -> Result<OverlayTicket<'_, T>, AppError> {
        let mut active = self.active.lock();
        if let Some(current) = *active {
            return Err(AppError::TransitionInProgress(format!("{:?}", current)));
        }
        *active = Some(tag);
        tracing::debug!("overlay {:?}: {}", tag, tag.message());
        Ok(OverlayTicket { overlay: self })
    }

    /// Shows `tag` for `delay`, then runs `action`. Once started the
    /// transition always completes.
    pub async fn run_after_delay<F, R>(&self, tag: T, delay: Duration, action: F) -> Result<R, AppError>
    where
        F: Future<Output = R>,
    {
        let _ticket = self.begin(tag)?;
        tokio::time::sleep(delay).await;
        Ok(action.await)
    }

    fn clear(&self) {
        *self.active.lock() = None;
    }
}

/// Clears the overlay when dropped, standing in for the destination page
/// taking over.
#[derive(Debug)]
pub struct OverlayTicket<'a, T: OverlayTag> {
    overlay: &'a Overlay<T>,
}

impl<T: OverlayTag> Drop for OverlayTicket<'_, T> {
    fn drop(&mut self) {
        self.overlay.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_transition_is_rejected_while_active() {
        let overlay = Overlay::<UploadOverlay>::new();
        let ticket = overlay.begin(UploadOverlay::Analyze).unwrap();

        assert!(overlay.is_blocked());
        assert_eq!(overlay.message(), Some("AI is analyzing the reviews…"));
        assert!(matches!(
            overlay.begin(UploadOverlay::Home),
            Err(AppError::TransitionInProgress(_))
        ));

        drop(ticket);
        assert_eq!(overlay.current(), None);
        assert!(overlay.begin(UploadOverlay::Home).is_ok());
    }

    #[tokio::test]
    async fn delayed_transition_clears_after_action() {
        let overlay = Overlay::<HomeOverlay>::new();

        let seen = overlay
            .run_after_delay(HomeOverlay::Upload, Duration::from_millis(5), async {
                "navigated"
            })
            .await
            .unwrap();

        assert_eq!(seen, "navigated");
        assert!(!overlay.is_blocked());
    }

    #[tokio::test]
    async fn overlay_is_visible_during_delay() {
        let overlay = Overlay::<DashboardOverlay>::new();

        let (_, observed) = tokio::join!(
            overlay.run_after_delay(DashboardOverlay::Logout, Duration::from_millis(50), async {}),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                overlay.current()
            }
        );

        assert_eq!(observed, Some(DashboardOverlay::Logout));
        assert_eq!(overlay.current(), None);
    }
}
