//! Base64 and quoted-printable primitives
//!
//! Both decoders are lenient: malformed input is decoded as far as it makes
//! sense and never rejected.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use quoted_printable::ParseMode;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

/// Longest line a compliant quoted-printable encoder emits
pub const MAX_QP_LINE_LENGTH: usize = 76;

static BASE64_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+/=0-9A-Za-z\r\n]+").unwrap());

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode the first base64 run found in `text` into raw bytes.
///
/// Line breaks inside the run are skipped and decoding stops at the first
/// padding character. A dangling sextet is dropped.
#[must_use]
pub fn decode_base64_bytes(text: &str) -> Vec<u8> {
    let Some(run) = BASE64_RUN.find(text) else {
        return Vec::new();
    };

    let mut sextets: String = run
        .as_str()
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .take_while(|c| *c != '=')
        .collect();
    if sextets.len() % 4 == 1 {
        sextets.pop();
    }

    LENIENT_BASE64.decode(sextets).unwrap_or_default()
}

/// Best-effort base64 decode of a string.
///
/// Returns `None` for absent input. The decoded bytes are not validated;
/// invalid UTF-8 sequences come back as replacement characters.
#[must_use]
pub fn base64_decode(text: Option<&str>) -> Option<String> {
    let bytes = decode_base64_bytes(text?);
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode quoted-printable bytes.
///
/// `=XX` escapes accept either hex case, `=` followed by LF or CRLF is a soft
/// line break, and anything else (including 8-bit bytes and stray `=`) is
/// copied through. Trailing whitespace on a line is dropped and hard line
/// breaks come out as LF.
#[must_use]
pub fn decode_quoted_printable(input: &[u8]) -> Vec<u8> {
    match quoted_printable::decode(escape_raw_bytes(input), ParseMode::Robust) {
        Ok(decoded) => crlf_to_lf(&decoded),
        Err(e) => {
            debug!(error = %e, "Quoted-printable decoding failed, keeping input");
            input.to_vec()
        }
    }
}

/// Quoted-printable decode straight to a string, replacing invalid UTF-8
#[must_use]
pub fn decode_quoted_printable_str(input: &str) -> String {
    String::from_utf8_lossy(&decode_quoted_printable(input.as_bytes())).into_owned()
}

/// Encode a single line as quoted-printable.
///
/// The result uses `=` + LF soft breaks, keeps every physical line within
/// [`MAX_QP_LINE_LENGTH`] characters, and decodes back to `line` exactly.
#[must_use]
pub fn encode_quoted_printable_line(line: &str) -> String {
    quoted_printable::encode_to_str(line).replace("=\r\n", "=\n")
}

/// Escape the bytes the decoder would otherwise discard as `=XX`
fn escape_raw_bytes(input: &[u8]) -> Cow<'_, [u8]> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    if input.iter().all(|&b| passes_through(b)) {
        return Cow::Borrowed(input);
    }

    let mut escaped = Vec::with_capacity(input.len() + input.len() / 2);
    for &byte in input {
        if passes_through(byte) {
            escaped.push(byte);
        } else {
            escaped.extend_from_slice(&[
                b'=',
                HEX[usize::from(byte >> 4)],
                HEX[usize::from(byte & 0x0F)],
            ]);
        }
    }
    Cow::Owned(escaped)
}

const fn passes_through(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\r' | b'\n' | b' '..=b'~')
}

fn crlf_to_lf(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}
