//! Field Transformer: raw vendor fields to canonical [`BondRecord`]s.
//!
//! Pure and deterministic. Missing values never produce missing output
//! attributes: text fields default to `""`, outlooks to `stable`, watch
//! status to `Not on watchlist`.

use crate::fields::*;
use crate::record::{BondRecord, FieldValue, Outlook, RawFieldRecord, WatchStatus};

/// Vendor outlook tokens, matched case-insensitively
const OUTLOOK_TOKENS: [(&str, Outlook); 8] = [
    ("POSITIVE", Outlook::Positive),
    ("NEGATIVE", Outlook::Negative),
    ("STABLE", Outlook::Stable),
    ("DEVELOPING", Outlook::Developing),
    ("POS", Outlook::Positive),
    ("NEG", Outlook::Negative),
    ("STA", Outlook::Stable),
    ("DEV", Outlook::Developing),
];

/// Substrings of a watch status, checked in order
const WATCH_MARKERS: [(&str, WatchStatus); 4] = [
    ("POSITIVE", WatchStatus::Positive),
    ("UPGRADE", WatchStatus::Positive),
    ("NEGATIVE", WatchStatus::Negative),
    ("DOWNGRADE", WatchStatus::Negative),
];

/// Normalise a vendor outlook string
pub fn parse_outlook(raw: Option<&FieldValue>) -> Outlook {
    let Some(value) = raw else {
        return Outlook::default();
    };
    let token = value.as_text().trim().to_uppercase();

    OUTLOOK_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, outlook)| *outlook)
        .unwrap_or_default()
}

/// Normalise a vendor watch/review string
pub fn parse_watch(raw: Option<&FieldValue>) -> WatchStatus {
    let Some(value) = raw else {
        return WatchStatus::default();
    };
    let text = value.as_text().to_uppercase();

    WATCH_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, status)| *status)
        .unwrap_or_default()
}

fn field<'a>(record: &'a RawFieldRecord, name: &str) -> Option<&'a FieldValue> {
    record.get(name).and_then(Option::as_ref)
}

fn text(record: &RawFieldRecord, name: &str) -> String {
    field(record, name).map(FieldValue::as_text).unwrap_or_default()
}

fn issuer(record: &RawFieldRecord) -> String {
    let primary = text(record, ISSUER);
    if primary.is_empty() {
        text(record, ISSUER_BULK)
    } else {
        primary
    }
}

/// Map one raw field record to a canonical bond record
pub fn transform(record: &RawFieldRecord) -> BondRecord {
    BondRecord {
        isin: text(record, ID_ISIN),
        issuer: issuer(record),
        country: text(record, COUNTRY_ISO),
        sector: text(record, GICS_SECTOR_NAME),
        industry: text(record, GICS_INDUSTRY_NAME),
        moodys_rating: text(record, RTG_MOODY),
        sp_rating: text(record, RTG_SP),
        fitch_rating: text(record, RTG_FITCH),
        moodys_rating_date: text(record, RTG_MOODY_RATING_DATE),
        sp_rating_date: text(record, RTG_SP_RATING_DATE),
        fitch_rating_date: text(record, RTG_FITCH_RATING_DATE),
        moodys_outlook: parse_outlook(field(record, RTG_MOODY_OUTLOOK)),
        sp_outlook: parse_outlook(field(record, RTG_SP_OUTLOOK)),
        fitch_outlook: parse_outlook(field(record, RTG_FITCH_OUTLOOK)),
        moodys_outlook_date: text(record, RTG_MOODY_OUTLOOK_DT),
        sp_outlook_date: text(record, RTG_SP_OUTLOOK_DT),
        fitch_outlook_date: text(record, RTG_FITCH_OUTLOOK_DT),
        moodys_watch: parse_watch(field(record, RTG_MOODY_REVIEW)),
        sp_watch: parse_watch(field(record, RTG_SP_CREDITWATCH)),
        fitch_watch: parse_watch(field(record, RTG_FITCH_WATCH)),
    }
}
