//! Client for the CX analytics backend: session guard, local survey/review
//! file ingestion with preview, page navigation state, and the CX report.

pub mod clients;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pages;
pub mod services;

pub use config::Config;
pub use error::AppError;
