//! Index Screener: discovers bond identifiers from index constituents.
//!
//! Each configured index is queried for its member bulk fields. Members
//! are collected in order of first appearance, de-duplicated across
//! indices, until the target count is reached or the indices run out.

use std::collections::HashSet;
use std::ops::ControlFlow;

use adapter_refdata::names::{
    FIELD_DATA, RESPONSE_ERROR, SECURITY, SECURITY_DATA, SECURITY_ERROR, SUBCATEGORY,
};
use adapter_refdata::{Element, Message, Request, VendorSession};
use tracing::{debug, info, warn};

use crate::drain::{drain_replies, DrainPolicy};
use crate::fields::{
    DAILY_CAPACITY_REACHED, MEMBER_BULK_FIELDS, MEMBER_ID_SUBFIELDS, SCREENING_INDICES,
    SCREENING_TARGET,
};

/// Result of a screening run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreeningOutcome {
    /// Unique identifiers, at most the screening target
    Found(Vec<String>),
    /// Every index yielded nothing
    Empty,
    /// The vendor reported the daily data allowance as used up
    QuotaExhausted,
}

impl ScreeningOutcome {
    fn from_ids(ids: Vec<String>) -> Self {
        if ids.is_empty() {
            ScreeningOutcome::Empty
        } else {
            ScreeningOutcome::Found(ids)
        }
    }
}

struct QuotaReached;

/// Whether an error element reports an exhausted daily allowance
pub fn is_quota_error(error: &Element) -> bool {
    error.get_str(SUBCATEGORY) == Some(DAILY_CAPACITY_REACHED)
}

/// Identifiers of the members listed in a `fieldData` element.
///
/// The first bulk field present is used; within each member entry the
/// first identifier sub-field present wins.
pub fn member_identifiers(field_data: &Element) -> Vec<&str> {
    let Some(members) = MEMBER_BULK_FIELDS
        .iter()
        .find_map(|field| field_data.get(field))
    else {
        return Vec::new();
    };

    members
        .values()
        .iter()
        .filter_map(|entry| {
            MEMBER_ID_SUBFIELDS
                .iter()
                .find_map(|subfield| entry.get_str(subfield))
        })
        .filter(|id| !id.trim().is_empty())
        .collect()
}

/// Ordered, de-duplicated identifier collection with a size cap
struct Collector {
    ids: Vec<String>,
    seen: HashSet<String>,
    target: usize,
}

impl Collector {
    fn new(target: usize) -> Self {
        Self {
            ids: Vec::new(),
            seen: HashSet::new(),
            target,
        }
    }

    fn is_full(&self) -> bool {
        self.ids.len() >= self.target
    }

    fn push(&mut self, id: &str) {
        if !self.is_full() && self.seen.insert(id.to_string()) {
            self.ids.push(id.to_string());
        }
    }
}

/// Screens a fixed list of indices for their constituents
#[derive(Debug, Clone)]
pub struct IndexScreener {
    indices: Vec<String>,
    target: usize,
    drain: DrainPolicy,
}

impl Default for IndexScreener {
    fn default() -> Self {
        Self::new(DrainPolicy::default())
    }
}

impl IndexScreener {
    pub fn new(drain: DrainPolicy) -> Self {
        Self {
            indices: SCREENING_INDICES.iter().map(|s| s.to_string()).collect(),
            target: SCREENING_TARGET,
            drain,
        }
    }

    /// Replace the indices probed, in priority order
    pub fn with_indices<I, S>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indices = indices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// Query every index in turn and collect member identifiers
    pub fn screen<S: VendorSession + ?Sized>(&self, session: &mut S) -> ScreeningOutcome {
        let mut collector = Collector::new(self.target);

        for index in &self.indices {
            if collector.is_full() {
                break;
            }

            let request = Request::reference_data([index.as_str()], MEMBER_BULK_FIELDS);
            let id = match session.send_request(&request) {
                Ok(id) => id,
                Err(e) => {
                    warn!(index = %index, error = %e, "Failed to request index members");
                    continue;
                }
            };

            let before = collector.ids.len();
            let flow = drain_replies(session, id, &self.drain, |message| {
                collect_members(index, message, &mut collector)
            });

            match flow {
                Ok(ControlFlow::Break(QuotaReached)) => {
                    warn!(index = %index, "Daily data capacity reached while screening");
                    return ScreeningOutcome::QuotaExhausted;
                }
                Ok(ControlFlow::Continue(())) => {
                    info!(
                        index = %index,
                        added = collector.ids.len() - before,
                        total = collector.ids.len(),
                        "Screened index"
                    );
                }
                Err(e) => {
                    warn!(index = %index, error = %e, "Index screening failed");
                }
            }
        }

        ScreeningOutcome::from_ids(collector.ids)
    }
}

fn collect_members(
    index: &str,
    message: &Message,
    collector: &mut Collector,
) -> ControlFlow<QuotaReached> {
    if let Some(error) = message.get_element(RESPONSE_ERROR) {
        if is_quota_error(error) {
            return ControlFlow::Break(QuotaReached);
        }
        warn!(index = %index, error = ?error, "Response error while screening");
        return ControlFlow::Continue(());
    }

    let Some(entries) = message.get_element(SECURITY_DATA) else {
        return ControlFlow::Continue(());
    };

    for entry in entries.values() {
        if let Some(error) = entry.get(SECURITY_ERROR) {
            if is_quota_error(error) {
                return ControlFlow::Break(QuotaReached);
            }
            warn!(
                index = %index,
                security = entry.get_str(SECURITY).unwrap_or_default(),
                error = ?error,
                "Security error while screening"
            );
            continue;
        }

        if let Some(field_data) = entry.get(FIELD_DATA) {
            let members = member_identifiers(field_data);
            debug!(index = %index, members = members.len(), "Index members received");
            for member in members {
                collector.push(member);
            }
        }
    }

    ControlFlow::Continue(())
}
