//! Browser-driven crawlers for the task and vacation portals.
//!
//! This crate provides:
//! - `PageHandle` / `SessionLauncher` seams over a live browser page
//! - A Chromium implementation of those seams over the DevTools protocol
//! - `SessionManager` for login detection and session reuse
//! - `TaskCrawler` and `VacationCrawler`, the per-site cycle drivers

pub mod chromium;
pub mod extract;
pub mod page;
pub mod retry;
pub(crate) mod scripts;
pub mod session;
pub mod task;
pub mod vacation;

#[cfg(test)]
mod testing;

pub use chromium::ChromiumLauncher;
pub use extract::TaskExtractor;
pub use page::{eval, PageError, PageHandle, SessionLauncher};
pub use retry::RetryPolicy;
pub use session::SessionManager;
pub use task::TaskCrawler;
pub use vacation::VacationCrawler;
