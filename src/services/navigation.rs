use parking_lot::Mutex;

use crate::models::{AnalysisResult, ReportQuery};

/// Pages reachable in the dashboard. Data that used to travel through
/// session storage rides on the route itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Home,
    Login { just_logged_out: bool },
    Upload,
    Dashboard(Option<AnalysisResult>),
    Stores,
    StoreDetail(String),
    CxReport(ReportQuery),
}

impl Route {
    pub fn login() -> Self {
        Route::Login { just_logged_out: false }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login { .. } => "/login".to_string(),
            Route::Upload => "/upload".to_string(),
            Route::Dashboard(_) => "/dashboard".to_string(),
            Route::Stores => "/stores".to_string(),
            Route::StoreDetail(store_id) => format!("/stores/{}", store_id),
            Route::CxReport(query) => {
                let mut path = format!("/cx-dashboard?storeId={}", query.store_id);
                for (key, value) in query.query_pairs().into_iter().skip(1) {
                    path.push_str(&format!("&{}={}", key, value));
                }
                path
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Push(Route),
    Replace(Route),
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}

/// In-memory history stack. `Replace` overwrites the top entry, so going back
/// never lands on a page that redirected away.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    pub fn new(initial: Route) -> Self {
        Self {
            entries: Mutex::new(vec![initial]),
        }
    }

    pub fn current(&self) -> Option<Route> {
        self.entries.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn back(&self) -> Option<Route> {
        let mut entries = self.entries.lock();
        if entries.len() > 1 {
            entries.pop();
        }
        entries.last().cloned()
    }
}

impl Navigator for History {
    fn navigate(&self, navigation: Navigation) {
        let mut entries = self.entries.lock();
        match navigation {
            Navigation::Push(route) => {
                tracing::debug!("push {}", route.path());
                entries.push(route);
            }
            Navigation::Replace(route) => {
                tracing::debug!("replace with {}", route.path());
                entries.pop();
                entries.push(route);
            }
        }
    }
}
