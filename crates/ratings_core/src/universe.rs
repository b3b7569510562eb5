//! Built-in identifier universe used when index screening comes back empty.

/// Well-known sovereign and corporate ISINs across regions
#[rustfmt::skip]
pub const FALLBACK_UNIVERSE: [&str; 65] = [
    // Sovereigns
    "US912828Z250", "US912810TS08", "DE0001102341", "FR0014007L00", "GB00BM8Z2S21",
    "IT0005436693", "JP1103661L42", "CN210008", "AU0000097495", "CA135087K528",
    // North American corporates
    "US0378331005", "US5949181045", "US0231351067", "US4581401001", "US5024731009",
    "US9311421039", "US30303M1027", "US1912161007", "US46625H1005", "US0605051046",
    "US92343V1044", "US88160R1014", "US0970231058", "US2546871060", "US7427181091",
    "US20030N1019", "US38141G1040", "US0200021014", "US00130H1059", "US7134481081",
    // European corporates
    "XS2388365457", "XS1967664286", "XS2051361264", "XS1405780619", "XS2010034077",
    "DE000A1R07P5", "FR0013446132", "XS1586796990", "XS1190663952", "XS1693259973",
    "XS2063268754", "XS1960685386", "XS2347582312", "XS2280845491", "XS2263659158",
    // Asia and emerging markets
    "US88032X1090", "US404280AT69", "US71654V4086", "US7800977221", "US80589M1099",
    "US7164471089", "US6311031081", "XS2218525012", "XS1953250148", "XS2238779037",
    // Banks and financials
    "US46647PAN65", "US172967MT50", "US38259P5089", "US4461501045", "US6174461430",
    "US0641191060", "US29273V1008", "XS0993043831", "US29265W1099", "XA1326442655",
];

/// Owned copy of [`FALLBACK_UNIVERSE`]
pub fn fallback_identifiers() -> Vec<String> {
    FALLBACK_UNIVERSE.iter().map(|s| s.to_string()).collect()
}
