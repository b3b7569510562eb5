//! Bond service: owns the connection and answers bond queries.
//!
//! The service holds at most one connected [`SecurityDataSource`]. All vendor
//! work happens under a single lock, so requests sharing the connection are
//! serialised. Every call blocks; async callers should run it on a blocking
//! thread. [`BondService::is_connected`] does not take the lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{info, warn};

use crate::connection::{ConnectionError, Connector};
use crate::fields::BOND_FIELDS;
use crate::record::{BondRecord, RawDataSet, RawFieldRecord};
use crate::screener::ScreeningOutcome;
use crate::source::SecurityDataSource;
use crate::transform::transform;
use crate::universe::fallback_identifiers;

/// Failures of a bond query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BondsError {
    #[error("Bloomberg not connected")]
    NotConnected,

    #[error("Daily data capacity reached")]
    QuotaExhausted,

    #[error("Index screening returned no securities")]
    ScreeningEmpty,

    #[error("Reference data request returned no securities")]
    FetchEmpty,

    #[error("No securities with a resolvable issuer")]
    DataQuality,

    #[error("Bond not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How the service treats sparse upstream results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BondPolicy {
    /// Substitute the built-in universe when screening finds nothing
    pub fallback_universe: bool,
    /// Drop records whose issuer resolved to an empty name
    pub drop_missing_issuers: bool,
}

type SourceSlot = Option<Box<dyn SecurityDataSource>>;

pub struct BondService {
    connector: Box<dyn Connector>,
    source: Mutex<SourceSlot>,
    connected: AtomicBool,
    policy: BondPolicy,
}

impl std::fmt::Debug for BondService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BondService")
            .field("connected", &self.is_connected())
            .field("policy", &self.policy)
            .finish()
    }
}

impl BondService {
    /// Create a disconnected service
    pub fn new(connector: impl Connector + 'static, policy: BondPolicy) -> Self {
        Self {
            connector: Box::new(connector),
            source: Mutex::new(None),
            connected: AtomicBool::new(false),
            policy,
        }
    }

    fn slot(&self) -> MutexGuard<'_, SourceSlot> {
        self.source
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Connect, replacing and closing any existing connection.
    ///
    /// On failure the previous connection, if any, is kept.
    pub fn connect(&self) -> Result<(), ConnectionError> {
        let mut slot = self.slot();
        let source = self.connector.connect()?;

        if let Some(mut previous) = slot.replace(source) {
            previous.close();
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Release the connection if one is held
    pub fn disconnect(&self) {
        let mut slot = self.slot();
        self.connected.store(false, Ordering::SeqCst);
        if let Some(mut source) = slot.take() {
            source.close();
            info!("Disconnected from reference data service");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Screen for identifiers and return up to `limit` bond records.
    ///
    /// Records follow screening order. A `limit` of zero returns an empty
    /// list without touching the vendor.
    pub fn list_bonds(&self, limit: usize) -> Result<Vec<BondRecord>, BondsError> {
        let mut slot = self.slot();
        let source = slot.as_mut().ok_or(BondsError::NotConnected)?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut ids = match source.screen() {
            ScreeningOutcome::Found(ids) => ids,
            ScreeningOutcome::QuotaExhausted => return Err(BondsError::QuotaExhausted),
            ScreeningOutcome::Empty if self.policy.fallback_universe => {
                warn!("Index screening returned nothing, using fallback universe");
                fallback_identifiers()
            }
            ScreeningOutcome::Empty => return Err(BondsError::ScreeningEmpty),
        };
        ids.truncate(limit);

        let data = source.fetch(&ids, &BOND_FIELDS);
        if data.is_empty() {
            return Err(BondsError::FetchEmpty);
        }

        let bonds: Vec<BondRecord> = in_screening_order(&ids, data)
            .iter()
            .map(transform)
            .collect();
        if bonds.is_empty() {
            return Err(BondsError::FetchEmpty);
        }

        if !self.policy.drop_missing_issuers {
            return Ok(bonds);
        }

        let total = bonds.len();
        let kept: Vec<BondRecord> = bonds.into_iter().filter(BondRecord::has_issuer).collect();
        if kept.len() < total {
            warn!(dropped = total - kept.len(), "Dropped records without issuer");
        }
        if kept.is_empty() {
            return Err(BondsError::DataQuality);
        }
        Ok(kept)
    }

    /// Fetch a single bond by identifier
    pub fn get_bond(&self, id: &str) -> Result<BondRecord, BondsError> {
        let mut slot = self.slot();
        let source = slot.as_mut().ok_or(BondsError::NotConnected)?;

        // A single-security request is answered by whatever key the vendor echoes
        let data = source.fetch(&[id.to_string()], &BOND_FIELDS);
        data.get(id)
            .or_else(|| data.values().next())
            .map(transform)
            .ok_or_else(|| BondsError::NotFound(id.to_string()))
    }
}

/// Records for the requested ids first, in request order, then any record the
/// vendor returned under a different form of the identifier
fn in_screening_order(ids: &[String], mut data: RawDataSet) -> Vec<RawFieldRecord> {
    let mut ordered: Vec<RawFieldRecord> = ids.iter().filter_map(|id| data.remove(id)).collect();
    ordered.extend(data.into_values());
    ordered
}

impl Drop for BondService {
    fn drop(&mut self) {
        if let Some(mut source) = self.slot().take() {
            source.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StaticConnector;
    use crate::fields::{ISSUER, RTG_MOODY_OUTLOOK};
    use crate::record::{FieldValue, Outlook, RawFieldRecord};
    use crate::source::StaticDataSource;

    fn record(issuer: Option<&str>) -> RawFieldRecord {
        RawFieldRecord::from([
            (ISSUER.to_string(), issuer.map(FieldValue::from)),
            (RTG_MOODY_OUTLOOK.to_string(), Some(FieldValue::from("POS"))),
        ])
    }

    fn connected(source: StaticDataSource, policy: BondPolicy) -> BondService {
        let service = BondService::new(StaticConnector::new(source), policy);
        service.connect().unwrap();
        service
    }

    #[test]
    fn test_not_connected() {
        let service = BondService::new(StaticConnector::default(), BondPolicy::default());
        assert!(!service.is_connected());
        assert_eq!(service.list_bonds(10), Err(BondsError::NotConnected));
        assert_eq!(service.get_bond("X"), Err(BondsError::NotConnected));
    }

    #[test]
    fn test_connect_and_disconnect() {
        let service = connected(StaticDataSource::new(), BondPolicy::default());
        assert!(service.is_connected());
        service.disconnect();
        assert!(!service.is_connected());
    }

    #[test]
    fn test_failed_connect_reports_error() {
        let service = BondService::new(StaticConnector::failing("offline"), BondPolicy::default());
        assert!(service.connect().is_err());
        assert!(!service.is_connected());
    }

    #[test]
    fn test_list_bonds_follows_screening_order_and_limit() {
        let source = StaticDataSource::new()
            .with_security("B", record(Some("Beta")))
            .with_security("A", record(Some("Alpha")))
            .with_security("C", record(Some("Gamma")));
        let service = connected(source, BondPolicy::default());

        let bonds = service.list_bonds(2).unwrap();
        let issuers: Vec<_> = bonds.iter().map(|b| b.issuer.as_str()).collect();
        assert_eq!(issuers, vec!["Beta", "Alpha"]);
        assert_eq!(bonds[0].moodys_outlook, Outlook::Positive);
    }

    #[test]
    fn test_limit_zero_skips_vendor() {
        let source = StaticDataSource::new().with_security("A", record(Some("Alpha")));
        let observer = source.clone();
        let service = connected(source, BondPolicy::default());

        assert_eq!(service.list_bonds(0), Ok(Vec::new()));
        assert_eq!(observer.fetch_count(), 0);
    }

    #[test]
    fn test_screening_outcomes() {
        let quota = StaticDataSource::new().with_screening(ScreeningOutcome::QuotaExhausted);
        let service = connected(quota, BondPolicy::default());
        assert_eq!(service.list_bonds(10), Err(BondsError::QuotaExhausted));

        let service = connected(StaticDataSource::new(), BondPolicy::default());
        assert_eq!(service.list_bonds(10), Err(BondsError::ScreeningEmpty));
    }

    #[test]
    fn test_fallback_universe_when_screening_empty() {
        let source = StaticDataSource::new()
            .with_security("US912828Z250", record(Some("United States Treasury")))
            .with_screening(ScreeningOutcome::Empty);
        let policy = BondPolicy {
            fallback_universe: true,
            ..Default::default()
        };
        let service = connected(source, policy);

        let bonds = service.list_bonds(3000).unwrap();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].issuer, "United States Treasury");
    }

    #[test]
    fn test_fetch_empty() {
        let source = StaticDataSource::new()
            .with_screening(ScreeningOutcome::Found(vec!["UNKNOWN".to_string()]));
        let service = connected(source, BondPolicy::default());
        assert_eq!(service.list_bonds(10), Err(BondsError::FetchEmpty));
    }

    #[test]
    fn test_missing_issuers() {
        let source = StaticDataSource::new()
            .with_security("A", record(None))
            .with_security("B", record(Some("Beta")));

        let lenient = connected(source.clone(), BondPolicy::default());
        assert_eq!(lenient.list_bonds(10).unwrap().len(), 2);

        let strict_policy = BondPolicy {
            drop_missing_issuers: true,
            ..Default::default()
        };
        let strict = connected(source, strict_policy);
        let bonds = strict.list_bonds(10).unwrap();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].issuer, "Beta");

        let only_blank = StaticDataSource::new().with_security("A", record(Some("  ")));
        let strict = connected(only_blank, strict_policy);
        assert_eq!(strict.list_bonds(10), Err(BondsError::DataQuality));
    }

    #[test]
    fn test_records_under_echoed_keys_are_kept() {
        let ids = vec!["b".to_string(), "a".to_string()];
        let data = RawDataSet::from([
            ("A".to_string(), record(Some("Alpha"))),
            ("b".to_string(), record(Some("Beta"))),
        ]);

        let ordered = in_screening_order(&ids, data);
        let issuers: Vec<_> = ordered.iter().map(|r| transform(r).issuer).collect();
        assert_eq!(issuers, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn test_get_bond() {
        let source = StaticDataSource::new().with_security("A", record(Some("Alpha")));
        let service = connected(source, BondPolicy::default());

        assert_eq!(service.get_bond("A").unwrap().issuer, "Alpha");
        assert_eq!(
            service.get_bond("Z"),
            Err(BondsError::NotFound("Z".to_string()))
        );
    }
}
