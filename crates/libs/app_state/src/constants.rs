/// Object key of the photo catalog document inside the api bucket.
pub const CATALOG_KEY: &str = "photos.json";

/// Object key of the session permission ledger inside the api bucket.
pub const LEDGER_KEY: &str = "session-blacklist";

/// Object key of the stored song requests inside the api bucket.
pub const REQUESTS_KEY: &str = "requests";

/// How many times a versioned read-modify-write is attempted before giving up on conflicts.
pub const DOCUMENT_WRITE_ATTEMPTS: usize = 5;

/// Delay between conflicting document write attempts, in milliseconds.
pub const DOCUMENT_RETRY_DELAY_MS: u64 = 25;

pub const JSON_CONTENT_TYPE: &str = "application/json";
