//! Charset transcoding to UTF-8

use crate::error::{DecodeError, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;
use tracing::debug;

/// Replaces a header value whose declared charset cannot be converted
pub const CONVERSION_FAILED: &str = "FAILED TO CONVERT THE SUBJECT";

/// Canonical form of a charset label.
///
/// Surrounding quotes and trailing parameters are dropped and `UTF8` in any
/// case becomes `UTF-8`.
#[must_use]
pub fn normalize_label(label: &str) -> &str {
    let label = label
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');

    if label.eq_ignore_ascii_case("utf8") {
        "UTF-8"
    } else {
        label
    }
}

#[must_use]
pub fn is_utf8(label: &str) -> bool {
    normalize_label(label).eq_ignore_ascii_case("utf-8")
}

/// Strictly convert `bytes` from `label` to UTF-8.
///
/// Fails on labels the transcoder does not know and on byte sequences that
/// are invalid in the source charset.
pub fn transcode(bytes: &[u8], label: &str) -> Result<String> {
    let label = normalize_label(label);
    let malformed = || DecodeError::Malformed {
        charset: label.to_string(),
    };

    if label.eq_ignore_ascii_case("utf-8") {
        return String::from_utf8(bytes.to_vec()).map_err(|_| malformed());
    }

    let encoding = Encoding::for_label_no_replacement(label.as_bytes())
        .ok_or_else(|| DecodeError::UnknownCharset(label.to_string()))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(malformed)
}

/// Best-effort conversion of `bytes` to UTF-8.
///
/// Unknown or missing labels fall back to lossy UTF-8; malformed sequences
/// become replacement characters.
#[must_use]
pub fn to_utf8(bytes: &[u8], label: Option<&str>) -> String {
    let Some(label) = label.map(normalize_label) else {
        return String::from_utf8_lossy(bytes).into_owned();
    };

    if label.eq_ignore_ascii_case("utf-8") {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    match Encoding::for_label_no_replacement(label.as_bytes()) {
        Some(encoding) => encoding
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
        None => {
            debug!(charset = %label, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
