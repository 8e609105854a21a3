//! Shared types for the team dashboard: configuration, crawl records and
//! results, the error taxonomy, and the traits that connect crawlers,
//! schedulers and the push layer.

pub mod config;
pub mod credentials;
pub mod error;
pub mod query;
pub mod record;
pub mod result;
pub mod site;
pub mod traits;

pub use config::Config;
pub use credentials::{CredentialSource, Credentials, EnvCredentials, StaticCredentials};
pub use error::{ConfigError, CrawlError};
pub use query::{QueryKind, QuerySpec};
pub use record::{DisplayRecord, Projection, RawRecord};
pub use result::{CrawlResult, CycleStatus};
pub use site::Site;
pub use traits::{CrawlJob, Publisher};
