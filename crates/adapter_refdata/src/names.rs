//! Service, operation and element names of the reference-data schema.

/// Reference-data service
pub const REFDATA_SERVICE: &str = "//blp/refdata";

/// Static reference-data request operation
pub const REFERENCE_DATA_REQUEST: &str = "ReferenceDataRequest";

/// Response message type for reference-data requests
pub const REFERENCE_DATA_RESPONSE: &str = "ReferenceDataResponse";

/// Array of per-security results in a response message
pub const SECURITY_DATA: &str = "securityData";

/// Echoed security identifier of a result entry
pub const SECURITY: &str = "security";

/// Field values of a result entry
pub const FIELD_DATA: &str = "fieldData";

/// Per-field failures of a result entry
pub const FIELD_EXCEPTIONS: &str = "fieldExceptions";

/// Security-level error of a result entry
pub const SECURITY_ERROR: &str = "securityError";

/// Message-level error of a response
pub const RESPONSE_ERROR: &str = "responseError";

/// Error category
pub const CATEGORY: &str = "category";

/// Error subcategory
pub const SUBCATEGORY: &str = "subcategory";

/// Human-readable error text
pub const MESSAGE: &str = "message";
