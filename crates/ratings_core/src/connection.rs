//! Establishing connections to a security data source.

use std::fmt;

use adapter_refdata::names::REFDATA_SERVICE;
use adapter_refdata::{BridgeSession, SessionError, SessionOptions, VendorSession};
use thiserror::Error;
use tracing::info;

use crate::fetcher::BatchedFetcher;
use crate::screener::IndexScreener;
use crate::source::{RefDataSource, SecurityDataSource, StaticDataSource};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to start session: {0}")]
    SessionStart(#[source] SessionError),

    #[error("Failed to open {service}: {source}")]
    ServiceOpen {
        service: String,
        #[source]
        source: SessionError,
    },

    #[error("Connection failed: {0}")]
    Transport(String),
}

/// Creates connected data sources
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn SecurityDataSource>, ConnectionError>;
}

/// Connects vendor sessions produced by a session factory.
///
/// Each connection builds a fresh session, starts it and opens the
/// reference-data service. No retries.
pub struct RefDataConnector<F> {
    options: SessionOptions,
    factory: F,
    screener: IndexScreener,
    fetcher: BatchedFetcher,
}

impl RefDataConnector<fn(&SessionOptions) -> BridgeSession> {
    /// Connector over TCP bridge sessions
    pub fn bridge(options: SessionOptions, screener: IndexScreener, fetcher: BatchedFetcher) -> Self {
        fn open(options: &SessionOptions) -> BridgeSession {
            BridgeSession::new(options.clone())
        }
        Self::new(options, open, screener, fetcher)
    }
}

impl<F, S> RefDataConnector<F>
where
    F: Fn(&SessionOptions) -> S + Send + Sync,
    S: VendorSession + 'static,
{
    pub fn new(
        options: SessionOptions,
        factory: F,
        screener: IndexScreener,
        fetcher: BatchedFetcher,
    ) -> Self {
        Self {
            options,
            factory,
            screener,
            fetcher,
        }
    }
}

impl<F> fmt::Debug for RefDataConnector<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefDataConnector")
            .field("options", &self.options)
            .finish()
    }
}

impl<F, S> Connector for RefDataConnector<F>
where
    F: Fn(&SessionOptions) -> S + Send + Sync,
    S: VendorSession + 'static,
{
    fn connect(&self) -> Result<Box<dyn SecurityDataSource>, ConnectionError> {
        let mut session = (self.factory)(&self.options);

        session.start().map_err(|e| match e {
            SessionError::Io(io) => ConnectionError::Transport(io.to_string()),
            other => ConnectionError::SessionStart(other),
        })?;

        if let Err(source) = session.open_service(REFDATA_SERVICE) {
            session.stop();
            return Err(ConnectionError::ServiceOpen {
                service: REFDATA_SERVICE.to_string(),
                source,
            });
        }

        info!(address = %self.options.server_address(), "Connected to reference data service");
        Ok(Box::new(RefDataSource::new(
            session,
            self.screener.clone(),
            self.fetcher.clone(),
        )))
    }
}

/// Connector handing out clones of a [`StaticDataSource`]
#[derive(Debug, Clone, Default)]
pub struct StaticConnector {
    source: StaticDataSource,
    failure: Option<String>,
}

impl StaticConnector {
    pub fn new(source: StaticDataSource) -> Self {
        Self {
            source,
            failure: None,
        }
    }

    /// Connector whose every attempt fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            source: StaticDataSource::default(),
            failure: Some(reason.into()),
        }
    }
}

impl Connector for StaticConnector {
    fn connect(&self) -> Result<Box<dyn SecurityDataSource>, ConnectionError> {
        match &self.failure {
            Some(reason) => Err(ConnectionError::Transport(reason.clone())),
            None => Ok(Box::new(self.source.clone())),
        }
    }
}
