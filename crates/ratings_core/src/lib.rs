//! # ratings_core
//!
//! Bond discovery, reference-data retrieval and rating normalisation.
//!
//! ## Pipeline
//!
//! 1. [`screener`] probes bond indices for their constituents
//! 2. [`fetcher`] requests the rating fields for those securities in batches
//! 3. [`transform`] maps each raw field record to a canonical [`BondRecord`]
//!
//! [`service::BondService`] owns the connection (see [`connection`]) and runs
//! the pipeline on behalf of the HTTP layer.
//!
//! ## Example
//!
//! ```
//! use ratings_core::record::{FieldValue, RawFieldRecord};
//! use ratings_core::transform::transform;
//!
//! let mut raw = RawFieldRecord::new();
//! raw.insert("ISSUER".to_string(), Some(FieldValue::from("US TREASURY N/B")));
//! raw.insert("RTG_MOODY_OUTLOOK".to_string(), Some(FieldValue::from("NEG")));
//!
//! let bond = transform(&raw);
//! assert_eq!(bond.issuer, "US TREASURY N/B");
//! assert_eq!(bond.moodys_outlook.as_str(), "negative");
//! assert_eq!(bond.sp_watch.as_str(), "Not on watchlist");
//! ```

pub mod connection;
pub mod drain;
pub mod fetcher;
pub mod fields;
pub mod record;
pub mod screener;
pub mod service;
pub mod source;
pub mod transform;
pub mod universe;

pub use connection::{ConnectionError, Connector, RefDataConnector, StaticConnector};
pub use drain::DrainPolicy;
pub use fetcher::BatchedFetcher;
pub use record::{BondRecord, FieldValue, Outlook, RawDataSet, RawFieldRecord, WatchStatus};
pub use screener::{IndexScreener, ScreeningOutcome};
pub use service::{BondPolicy, BondService, BondsError};
pub use source::{RefDataSource, SecurityDataSource, StaticDataSource};
