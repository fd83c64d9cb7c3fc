//! Mobile-money phone number validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Cameroonian mobile numbers: 9 digits starting with 65-69.
static CAMEROON_MOBILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^6[5-9]\d{7}$").expect("Invalid regex pattern"));

/// Country calling code for Cameroon.
const CAMEROON_DIAL_CODE: &str = "237";

/// Normalizes a Cameroonian mobile number to its 9-digit local form.
///
/// Accepts spaces, dashes, and an optional `+237`, `00237` or `237` prefix.
/// Returns `None` when the number does not match the national mobile pattern.
#[must_use]
pub fn normalize_cameroon_mobile(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
        .collect();

    let without_plus = compact.strip_prefix('+').unwrap_or(&compact);
    let without_intl = without_plus.strip_prefix("00").unwrap_or(without_plus);
    let local = match without_intl.strip_prefix(CAMEROON_DIAL_CODE) {
        Some(rest) if rest.len() == 9 => rest,
        _ => without_intl,
    };

    CAMEROON_MOBILE.is_match(local).then(|| local.to_string())
}
