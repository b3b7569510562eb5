//! Batched Fetcher: reference data for many securities in bounded requests.

use std::ops::ControlFlow;

use adapter_refdata::names::{
    FIELD_DATA, FIELD_EXCEPTIONS, RESPONSE_ERROR, SECURITY, SECURITY_DATA, SECURITY_ERROR,
};
use adapter_refdata::{Element, Message, Request, VendorSession};
use tracing::{debug, info, warn};

use crate::drain::{drain_replies, DrainPolicy};
use crate::fields::DEFAULT_BATCH_SIZE;
use crate::record::{FieldValue, RawDataSet, RawFieldRecord};

/// Fetches reference data in batches, skipping securities and batches that fail
#[derive(Debug, Clone)]
pub struct BatchedFetcher {
    batch_size: usize,
    drain: DrainPolicy,
}

impl Default for BatchedFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DrainPolicy::default())
    }
}

impl BatchedFetcher {
    /// Create a fetcher; a batch size of zero is treated as one
    pub fn new(batch_size: usize, drain: DrainPolicy) -> Self {
        Self {
            batch_size: batch_size.max(1),
            drain,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fetch `fields` for every identifier in `ids`.
    ///
    /// Records are keyed by the security the vendor echoes back. Requested
    /// fields missing from a reply are recorded as `None`.
    pub fn fetch<S: VendorSession + ?Sized>(
        &self,
        session: &mut S,
        ids: &[String],
        fields: &[&str],
    ) -> RawDataSet {
        let mut data = RawDataSet::new();

        for (batch_no, batch) in ids.chunks(self.batch_size).enumerate() {
            let request = Request::reference_data(batch, fields.iter().copied());
            let id = match session.send_request(&request) {
                Ok(id) => id,
                Err(e) => {
                    warn!(batch = batch_no, error = %e, "Failed to send reference data request");
                    continue;
                }
            };

            let result = drain_replies(session, id, &self.drain, |message| {
                collect_records(message, fields, &mut data);
                ControlFlow::<()>::Continue(())
            });

            match result {
                Ok(_) => debug!(batch = batch_no, size = batch.len(), "Batch complete"),
                Err(e) => warn!(batch = batch_no, error = %e, "Batch failed, moving on"),
            }
        }

        info!(requested = ids.len(), received = data.len(), "Reference data fetched");
        data
    }
}

fn collect_records(message: &Message, fields: &[&str], data: &mut RawDataSet) {
    if let Some(error) = message.get_element(RESPONSE_ERROR) {
        warn!(error = ?error, "Response error while fetching reference data");
        return;
    }

    let Some(entries) = message.get_element(SECURITY_DATA) else {
        return;
    };

    for entry in entries.values() {
        let Some(security) = entry.get_str(SECURITY) else {
            continue;
        };

        if let Some(error) = entry.get(SECURITY_ERROR) {
            warn!(security = %security, error = ?error, "Security error, skipping");
            continue;
        }

        if let Some(exceptions) = entry.get(FIELD_EXCEPTIONS) {
            if exceptions.num_values() > 0 {
                debug!(security = %security, count = exceptions.num_values(), "Field exceptions");
            }
        }

        data.insert(security.to_string(), field_record(entry.get(FIELD_DATA), fields));
    }
}

fn field_record(field_data: Option<&Element>, fields: &[&str]) -> RawFieldRecord {
    fields
        .iter()
        .map(|field| {
            let value = field_data
                .and_then(|d| d.get(field))
                .and_then(FieldValue::from_element);
            (field.to_string(), value)
        })
        .collect()
}
