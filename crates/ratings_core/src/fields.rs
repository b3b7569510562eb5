//! Vendor field catalogue.
//!
//! Field mnemonics requested from the reference-data service, the bond
//! indices probed while screening, and the bulk-field/sub-field names under
//! which index constituents are reported.

/// ISIN of the security
pub const ID_ISIN: &str = "ID_ISIN";
/// Issuer name
pub const ISSUER: &str = "ISSUER";
/// Issuer name as reported by the bulk issuer field
pub const ISSUER_BULK: &str = "ISSUER_BULK";
/// ISO country of risk
pub const COUNTRY_ISO: &str = "COUNTRY_ISO";
/// GICS sector
pub const GICS_SECTOR_NAME: &str = "GICS_SECTOR_NAME";
/// GICS industry
pub const GICS_INDUSTRY_NAME: &str = "GICS_INDUSTRY_NAME";

pub const RTG_MOODY: &str = "RTG_MOODY";
pub const RTG_SP: &str = "RTG_SP";
pub const RTG_FITCH: &str = "RTG_FITCH";
pub const RTG_MOODY_RATING_DATE: &str = "RTG_MOODY_RATING_DATE";
pub const RTG_SP_RATING_DATE: &str = "RTG_SP_RATING_DATE";
pub const RTG_FITCH_RATING_DATE: &str = "RTG_FITCH_RATING_DATE";
pub const RTG_MOODY_OUTLOOK: &str = "RTG_MOODY_OUTLOOK";
pub const RTG_SP_OUTLOOK: &str = "RTG_SP_OUTLOOK";
pub const RTG_FITCH_OUTLOOK: &str = "RTG_FITCH_OUTLOOK";
pub const RTG_MOODY_OUTLOOK_DT: &str = "RTG_MOODY_OUTLOOK_DT";
pub const RTG_SP_OUTLOOK_DT: &str = "RTG_SP_OUTLOOK_DT";
pub const RTG_FITCH_OUTLOOK_DT: &str = "RTG_FITCH_OUTLOOK_DT";
pub const RTG_MOODY_REVIEW: &str = "RTG_MOODY_REVIEW";
pub const RTG_SP_CREDITWATCH: &str = "RTG_SP_CREDITWATCH";
pub const RTG_FITCH_WATCH: &str = "RTG_FITCH_WATCH";

/// Every field requested for a bond record
pub const BOND_FIELDS: [&str; 21] = [
    ID_ISIN,
    ISSUER,
    ISSUER_BULK,
    COUNTRY_ISO,
    RTG_MOODY,
    RTG_SP,
    RTG_FITCH,
    RTG_MOODY_RATING_DATE,
    RTG_SP_RATING_DATE,
    RTG_FITCH_RATING_DATE,
    RTG_MOODY_OUTLOOK,
    RTG_SP_OUTLOOK,
    RTG_FITCH_OUTLOOK,
    RTG_MOODY_OUTLOOK_DT,
    RTG_SP_OUTLOOK_DT,
    RTG_FITCH_OUTLOOK_DT,
    RTG_MOODY_REVIEW,
    RTG_SP_CREDITWATCH,
    RTG_FITCH_WATCH,
    GICS_SECTOR_NAME,
    GICS_INDUSTRY_NAME,
];

/// Bond indices probed for constituents, in priority order
pub const SCREENING_INDICES: [&str; 4] = [
    // Global Aggregate, USD component
    "LEGATRUU Index",
    // US Corporate investment grade
    "LUACTRUU Index",
    // US Corporate high yield
    "LF98TRUU Index",
    // Emerging markets USD aggregate
    "EMUSTRUU Index",
];

/// Bulk fields under which index constituents may be reported, in priority order
pub const MEMBER_BULK_FIELDS: [&str; 3] = ["INDX_MEMBERS", "INDX_MWEIGHT", "INDX_MWEIGHT_HIST"];

/// Sub-fields of a member entry holding its identifier, in priority order
pub const MEMBER_ID_SUBFIELDS: [&str; 4] = [
    "Member Ticker and Exchange Code",
    "Index Member",
    "Member ISIN",
    "ID_ISIN",
];

/// Error subcategory reported once the daily data allowance is used up
pub const DAILY_CAPACITY_REACHED: &str = "DAILY_CAPACITY_REACHED";

/// Number of unique identifiers screening aims for
pub const SCREENING_TARGET: usize = 3000;

/// Securities per reference-data request
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bond_fields_unique() {
        let unique: HashSet<_> = BOND_FIELDS.iter().collect();
        assert_eq!(unique.len(), BOND_FIELDS.len());
    }

    #[test]
    fn test_bond_fields_cover_every_agency() {
        for agency in ["MOODY", "SP", "FITCH"] {
            let count = BOND_FIELDS
                .iter()
                .filter(|f| f.starts_with(&format!("RTG_{}", agency)))
                .count();
            assert_eq!(count, 5, "agency {}", agency);
        }
    }
}
