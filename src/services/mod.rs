pub mod ingest;
pub mod navigation;
pub mod overlay;
pub mod report;
pub mod scope;
pub mod session;

pub use navigation::{History, Navigation, Navigator, Route};
pub use overlay::Overlay;
pub use scope::PageScope;
pub use session::{SessionGuard, SessionState};
