//! Security data sources.
//!
//! [`SecurityDataSource`] is the seam between the bond service and the
//! vendor: [`RefDataSource`] drives a live [`VendorSession`], while
//! [`StaticDataSource`] serves a fixed in-memory data set.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use adapter_refdata::VendorSession;
use tracing::debug;

use crate::fetcher::BatchedFetcher;
use crate::record::{RawDataSet, RawFieldRecord};
use crate::screener::{IndexScreener, ScreeningOutcome};

/// A connected provider of identifiers and reference data
pub trait SecurityDataSource: Send {
    /// Discover bond identifiers
    fn screen(&mut self) -> ScreeningOutcome;

    /// Fetch `fields` for `ids`
    fn fetch(&mut self, ids: &[String], fields: &[&str]) -> RawDataSet;

    /// Release any underlying session
    fn close(&mut self) {}
}

/// Data source backed by a started vendor session with the reference-data service open
pub struct RefDataSource<S> {
    session: S,
    screener: IndexScreener,
    fetcher: BatchedFetcher,
}

impl<S: VendorSession> RefDataSource<S> {
    pub fn new(session: S, screener: IndexScreener, fetcher: BatchedFetcher) -> Self {
        Self {
            session,
            screener,
            fetcher,
        }
    }
}

impl<S: VendorSession> SecurityDataSource for RefDataSource<S> {
    fn screen(&mut self) -> ScreeningOutcome {
        self.screener.screen(&mut self.session)
    }

    fn fetch(&mut self, ids: &[String], fields: &[&str]) -> RawDataSet {
        self.fetcher.fetch(&mut self.session, ids, fields)
    }

    fn close(&mut self) {
        debug!("Stopping vendor session");
        self.session.stop();
    }
}

/// In-memory data source.
///
/// Screening returns the configured identifiers (or a configured outcome);
/// fetching returns the requested fields of the known records. Clones share
/// the fetch counter.
#[derive(Debug, Clone, Default)]
pub struct StaticDataSource {
    ids: Vec<String>,
    data: RawDataSet,
    screening: Option<ScreeningOutcome>,
    fetches: Arc<AtomicUsize>,
}

impl StaticDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a security with its raw fields; it is also returned by screening
    pub fn with_security(mut self, id: impl Into<String>, record: RawFieldRecord) -> Self {
        let id = id.into();
        if !self.ids.contains(&id) {
            self.ids.push(id.clone());
        }
        self.data.insert(id, record);
        self
    }

    /// Override what screening returns
    pub fn with_screening(mut self, outcome: ScreeningOutcome) -> Self {
        self.screening = Some(outcome);
        self
    }

    /// Number of fetch calls made against this source and its clones
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SecurityDataSource for StaticDataSource {
    fn screen(&mut self) -> ScreeningOutcome {
        match &self.screening {
            Some(outcome) => outcome.clone(),
            None if self.ids.is_empty() => ScreeningOutcome::Empty,
            None => ScreeningOutcome::Found(self.ids.clone()),
        }
    }

    fn fetch(&mut self, ids: &[String], fields: &[&str]) -> RawDataSet {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        ids.iter()
            .filter_map(|id| {
                let known = self.data.get(id)?;
                let record: RawFieldRecord = fields
                    .iter()
                    .map(|f| (f.to_string(), known.get(*f).cloned().flatten()))
                    .collect();
                Some((id.clone(), record))
            })
            .collect()
    }
}
