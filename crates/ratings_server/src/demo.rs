//! Demo dataset served when live data is unavailable.

use ratings_core::{BondRecord, Outlook, WatchStatus};

/// Sample bonds shaped exactly like live records
pub fn demo_bonds() -> Vec<BondRecord> {
    vec![BondRecord {
        isin: "US912828Z250".to_string(),
        issuer: "United States Treasury".to_string(),
        country: "US".to_string(),
        sector: "sovereign".to_string(),
        industry: "Government".to_string(),
        moodys_rating: "Aaa".to_string(),
        sp_rating: "AA+".to_string(),
        fitch_rating: "AAA".to_string(),
        moodys_rating_date: "2023-01-15".to_string(),
        sp_rating_date: "2023-02-20".to_string(),
        fitch_rating_date: "2023-01-10".to_string(),
        moodys_outlook: Outlook::Stable,
        sp_outlook: Outlook::Stable,
        fitch_outlook: Outlook::Stable,
        moodys_outlook_date: "2023-01-15".to_string(),
        sp_outlook_date: "2023-02-20".to_string(),
        fitch_outlook_date: "2023-01-10".to_string(),
        moodys_watch: WatchStatus::NotOnWatchlist,
        sp_watch: WatchStatus::NotOnWatchlist,
        fitch_watch: WatchStatus::NotOnWatchlist,
    }]
}
