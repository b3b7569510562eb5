//! Integration tests for the vendor pipeline.
//!
//! These tests drive screening, batched fetching and the bond service
//! against a scripted session that answers like the reference-data service.

use std::time::Duration;

use adapter_refdata::messages::{
    error_info, reference_data_response, security_entry, security_error_entry,
};
use adapter_refdata::{Element, Event, Request, ScriptedSession, SessionOptions};
use ratings_core::fields::{BOND_FIELDS, DAILY_CAPACITY_REACHED};
use ratings_core::{
    BatchedFetcher, BondPolicy, BondService, BondsError, DrainPolicy, IndexScreener, Outlook,
    RefDataConnector, ScreeningOutcome, WatchStatus,
};

fn quick() -> DrainPolicy {
    DrainPolicy::new(Duration::from_millis(1), Duration::from_millis(100))
}

fn index_members(ids: &[String]) -> Element {
    Element::Array(
        ids.iter()
            .map(|id| {
                Element::sequence([("Member Ticker and Exchange Code", Element::string(id.as_str()))])
            })
            .collect(),
    )
}

fn bond_fields(security: &str) -> Vec<(&'static str, Element)> {
    vec![
        ("ID_ISIN", Element::string(security)),
        ("ISSUER", Element::string(format!("Issuer of {}", security))),
        ("RTG_MOODY", Element::string("A2")),
        ("RTG_MOODY_OUTLOOK", Element::string("POS")),
        ("RTG_SP_CREDITWATCH", Element::string("Watch Downgrade")),
    ]
}

/// Answers index requests with members and security requests with bond fields
fn terminal(
    members: Vec<(&'static str, Vec<String>)>,
) -> impl FnMut(&Request) -> Vec<Event> + Send + 'static {
    move |request: &Request| {
        let first = request.securities[0].as_str();
        if let Some((_, ids)) = members.iter().find(|(index, _)| *index == first) {
            return vec![Event::response(vec![reference_data_response(vec![
                security_entry(first, [("INDX_MEMBERS", index_members(ids))]),
            ])])];
        }

        let entries = request
            .securities
            .iter()
            .map(|s| security_entry(s, bond_fields(s)))
            .collect();
        vec![Event::response(vec![reference_data_response(entries)])]
    }
}

fn ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{:04}", prefix, i)).collect()
}

// ============================================================================
// Batched Fetcher
// ============================================================================

#[test]
fn test_250_identifiers_take_three_batches() {
    let mut session = ScriptedSession::new(terminal(Vec::new())).started();
    let log = session.request_log();

    let securities = ids("XS", 250);
    let data = BatchedFetcher::new(100, quick()).fetch(&mut session, &securities, &BOND_FIELDS);

    let sizes: Vec<usize> = log.requests().iter().map(|r| r.securities.len()).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert_eq!(data.len(), 250);
    assert!(log.requests().iter().all(|r| r.fields.len() == BOND_FIELDS.len()));
}

#[test]
fn test_failed_batch_does_not_stop_the_rest() {
    // First batch never completes, the others answer normally
    let mut answered = terminal(Vec::new());
    let mut session = ScriptedSession::new(move |request: &Request| {
        if request.securities[0] == "XS0000" {
            vec![Event::partial(Vec::new())]
        } else {
            answered(request)
        }
    })
    .started();

    let securities = ids("XS", 30);
    let data = BatchedFetcher::new(10, quick()).fetch(&mut session, &securities, &["ISSUER"]);

    assert_eq!(data.len(), 20);
    assert!(!data.contains_key("XS0000"));
    assert!(data.contains_key("XS0010"));
}

#[test]
fn test_partial_responses_are_merged() {
    let mut session = ScriptedSession::new(|request: &Request| {
        let (head, tail) = request.securities.split_at(1);
        let entry = |s: &String| security_entry(s, [("ISSUER", Element::string("Issuer"))]);
        vec![
            Event::partial(vec![reference_data_response(head.iter().map(entry).collect())]),
            Event::response(vec![reference_data_response(tail.iter().map(entry).collect())]),
        ]
    })
    .started();

    let securities = ids("US", 3);
    let data = BatchedFetcher::default().fetch(&mut session, &securities, &["ISSUER"]);
    assert_eq!(data.len(), 3);
}

#[test]
fn test_erroring_securities_are_left_out() {
    let mut session = ScriptedSession::new(|request: &Request| {
        let entries = request
            .securities
            .iter()
            .map(|s| {
                if s.ends_with('1') {
                    security_error_entry(s, error_info("BAD_SEC", "INVALID_SECURITY", "Unknown"))
                } else {
                    security_entry(s, bond_fields(s))
                }
            })
            .collect();
        vec![Event::response(vec![reference_data_response(entries)])]
    })
    .started();

    let securities = ids("US", 12);
    let data = BatchedFetcher::default().fetch(&mut session, &securities, &BOND_FIELDS);

    assert_eq!(data.len(), 10);
    assert!(!data.contains_key("US0001"));
    assert!(!data.contains_key("US0011"));
}

// ============================================================================
// Index Screener
// ============================================================================

#[test]
fn test_screening_deduplicates_across_indices() {
    let first = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let second = vec!["B".to_string(), "D".to_string(), "A".to_string()];
    let mut session = ScriptedSession::new(terminal(vec![
        ("LEGATRUU Index", first),
        ("LUACTRUU Index", second),
    ]))
    .started();

    let outcome = IndexScreener::new(quick()).screen(&mut session);
    let expected: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
    assert_eq!(outcome, ScreeningOutcome::Found(expected));
}

#[test]
fn test_screening_stops_at_target() {
    let mut session = ScriptedSession::new(terminal(vec![
        ("LEGATRUU Index", ids("G", 2500)),
        ("LUACTRUU Index", ids("C", 2500)),
        ("LF98TRUU Index", ids("H", 10)),
    ]))
    .started();
    let log = session.request_log();

    match IndexScreener::new(quick()).screen(&mut session) {
        ScreeningOutcome::Found(found) => {
            assert_eq!(found.len(), 3000);
            assert_eq!(found[2500], "C0000");
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(log.len(), 2);
}

#[test]
fn test_quota_sentinel_is_distinct_from_empty() {
    let mut session = ScriptedSession::new(|request: &Request| {
        vec![Event::response(vec![reference_data_response(vec![
            security_error_entry(
                &request.securities[0],
                error_info("LIMIT", DAILY_CAPACITY_REACHED, "Daily capacity reached"),
            ),
        ])])]
    })
    .started();
    assert_eq!(
        IndexScreener::new(quick()).screen(&mut session),
        ScreeningOutcome::QuotaExhausted
    );

    let mut quiet = ScriptedSession::new(terminal(Vec::new())).started();
    assert_eq!(
        IndexScreener::new(quick()).screen(&mut quiet),
        ScreeningOutcome::Empty
    );
}

// ============================================================================
// Bond service over a scripted connection
// ============================================================================

fn service_over<F>(factory: F, policy: BondPolicy) -> BondService
where
    F: Fn(&SessionOptions) -> ScriptedSession + Send + Sync + 'static,
{
    let connector = RefDataConnector::new(
        SessionOptions::default(),
        factory,
        IndexScreener::new(quick()),
        BatchedFetcher::new(100, quick()),
    );
    BondService::new(connector, policy)
}

#[test]
fn test_list_bonds_end_to_end() {
    let service = service_over(
        |_| {
            ScriptedSession::new(terminal(vec![(
                "LEGATRUU Index",
                vec!["US912828Z250".to_string(), "XS2388365457".to_string()],
            )]))
        },
        BondPolicy::default(),
    );
    service.connect().unwrap();

    let bonds = service.list_bonds(3000).unwrap();
    assert_eq!(bonds.len(), 2);
    assert_eq!(bonds[0].isin, "US912828Z250");
    assert_eq!(bonds[0].issuer, "Issuer of US912828Z250");
    assert_eq!(bonds[0].moodys_outlook, Outlook::Positive);
    assert_eq!(bonds[0].sp_watch, WatchStatus::Negative);
    assert_eq!(bonds[0].fitch_outlook, Outlook::Stable);
}

/// Answers like `terminal`, but echoes security identifiers upper-cased
fn upper_casing_terminal(index: &'static str, members: Vec<String>) -> ScriptedSession {
    let mut inner = terminal(vec![(index, members)]);
    ScriptedSession::new(move |request: &Request| {
        if request.securities[0] == index {
            return inner(request);
        }
        let entries = request
            .securities
            .iter()
            .map(|s| security_entry(&s.to_uppercase(), [("ISSUER", Element::string("Apple"))]))
            .collect();
        vec![Event::response(vec![reference_data_response(entries)])]
    })
}

#[test]
fn test_list_bonds_keeps_records_echoed_under_another_key() {
    let service = service_over(
        |_| upper_casing_terminal("LEGATRUU Index", vec!["aapl 4.5 Corp".to_string()]),
        BondPolicy::default(),
    );
    service.connect().unwrap();

    let bonds = service.list_bonds(3000).unwrap();
    assert_eq!(bonds.len(), 1);
    assert_eq!(bonds[0].issuer, "Apple");
}

#[test]
fn test_single_bond_echoed_under_another_key() {
    let service = service_over(
        |_| upper_casing_terminal("LEGATRUU Index", Vec::new()),
        BondPolicy::default(),
    );
    service.connect().unwrap();

    let bond = service.get_bond("aapl 4.5 Corp").unwrap();
    assert_eq!(bond.issuer, "Apple");
}

#[test]
fn test_fallback_universe_over_session() {
    let policy = BondPolicy {
        fallback_universe: true,
        ..Default::default()
    };
    let service = service_over(|_| ScriptedSession::new(terminal(Vec::new())), policy);
    service.connect().unwrap();

    let bonds = service.list_bonds(5).unwrap();
    assert_eq!(bonds.len(), 5);
    assert_eq!(bonds[0].isin, "US912828Z250");
}

#[test]
fn test_single_bond_over_session() {
    let service = service_over(|_| ScriptedSession::new(terminal(Vec::new())), BondPolicy::default());
    assert_eq!(service.get_bond("US912828Z250"), Err(BondsError::NotConnected));

    service.connect().unwrap();
    let bond = service.get_bond("US912828Z250").unwrap();
    assert_eq!(bond.moodys_rating, "A2");
}

#[test]
fn test_reconnect_replaces_session() {
    let service = service_over(|_| ScriptedSession::new(terminal(Vec::new())), BondPolicy::default());
    service.connect().unwrap();
    service.connect().unwrap();
    assert!(service.is_connected());

    service.disconnect();
    assert!(!service.is_connected());
}
