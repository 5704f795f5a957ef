//! trendscope - Google Trends dashboard
//!
//! Looks up search interest for a set of keywords and presents it as a
//! time-series chart, a regional breakdown with a world map, and related
//! query lists, each with CSV downloads.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`trends`] - Trends service adapter and client handle cache
//! - [`models`] - Query parameters and result tables
//! - [`export`] - CSV serialization and downloads
//! - [`dashboard`] - Stage orchestration, charts and page rendering
//! - [`server`] - HTTP front end for the dashboard
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trendscope::config::Config;
//! use trendscope::dashboard::{analyze, render_text, AnalysisForm};
//! use trendscope::trends::{ClientHandle, GoogleTrendsClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let form = AnalysisForm::default();
//!     let report = analyze(&form, || {
//!         let client = GoogleTrendsClient::new(&config.trends)?;
//!         Ok(Arc::new(client) as ClientHandle)
//!     })
//!     .await;
//!     println!("{}", render_text(&report));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod models;
pub mod server;
pub mod trends;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dashboard::{analyze, AnalysisForm, Report, Stage};
    pub use crate::error::{Error, FetchError, Result, ValidationError};
    pub use crate::export::Download;
    pub use crate::models::{
        QueryParameters, RegionResult, RelatedQueryResult, Resolution, Table, Timeframe,
        TimeSeriesResult,
    };
    pub use crate::trends::{ClientCache, ClientHandle, GoogleTrendsClient, TrendsSource};
}

// Direct re-exports for convenience
pub use models::{QueryParameters, Resolution, Timeframe};
