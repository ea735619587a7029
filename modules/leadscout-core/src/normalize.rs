//! Canonical comparison keys for raw business fields.
//!
//! All three functions are pure, total, and idempotent: normalizing an
//! already-normalized key returns it unchanged. Malformed input yields an
//! empty/absent key, never an error.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Normalize a business name for deduplication: strip diacritics via NFKD
/// decomposition, lowercase, and drop every character that is not an
/// ASCII letter or digit. `"Café Lunä GmbH"` becomes `"cafelunagmbh"`.
pub fn normalize_name(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Normalize a phone number to digits only. Returns None when the input
/// is absent or contains no digits.
pub fn normalize_phone(phone: Option<&str>) -> Option<String> {
    let digits: String = phone?.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Normalize a website to its bare host: prepend `https://` when the text
/// lacks a scheme, parse, take the lowercase host, strip a leading `www.`.
/// Returns None when no host can be parsed.
pub fn normalize_website(website: Option<&str>) -> Option<String> {
    let raw = website?.trim();
    if raw.is_empty() {
        return None;
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let parsed = Url::parse(&with_scheme).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
