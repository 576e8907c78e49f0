//! User-Agent string shared by index-page and sample requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/sample-fetch";

/// Default User-Agent for every request (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sample-fetch/{version} (+{PROJECT_UA_URL})")
}
