//! RFC 2047 encoded-word detection and decoding

use crate::charset::{self, CONVERSION_FAILED};
use crate::codec::{decode_base64_bytes, decode_quoted_printable};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{trace, warn};

static ENCODED_WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\?[-_0-9A-Za-z]+\?[BbQq]\?.+\?=").unwrap());

static ENCODED_WORD_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A(.*)=\?([-_0-9A-Za-z]+)\?([BbQq])\?(.+)\?=(.*)\z").unwrap()
});

/// Encoding letter of an encoded word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordEncoding {
    /// `B`
    Base64,
    /// `Q`
    QuotedPrintable,
}

impl WordEncoding {
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'B' | 'b' => Some(Self::Base64),
            'Q' | 'q' => Some(Self::QuotedPrintable),
            _ => None,
        }
    }

    /// Decode an encoded-word payload into raw bytes.
    ///
    /// In `Q` payloads `_` stands for a space (RFC 2047 section 4.2), so
    /// `=?ISO-8859-1?Q?a_b?=` decodes to `a b`. A plain quoted-printable
    /// decoder would leave the underscore in place.
    #[must_use]
    pub fn decode(self, payload: &str) -> Vec<u8> {
        match self {
            Self::Base64 => decode_base64_bytes(payload),
            Self::QuotedPrintable => {
                decode_quoted_printable(payload.replace('_', "=20").as_bytes())
            }
        }
    }
}

/// One header fragment split around its encoded word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedWord<'a> {
    pub prefix: &'a str,
    pub charset: &'a str,
    pub encoding: WordEncoding,
    pub payload: &'a str,
    pub suffix: &'a str,
}

impl<'a> EncodedWord<'a> {
    /// Split a fragment such as `(=?utf-8?B?44Gr?=)`.
    ///
    /// When a fragment holds more than one encoded word only the last one is
    /// recognized; the rest stays in `prefix`.
    #[must_use]
    pub fn parse(fragment: &'a str) -> Option<Self> {
        let cap = ENCODED_WORD_PARTS.captures(fragment)?;
        let letter = cap.get(3)?.as_str().chars().next()?;

        Some(Self {
            prefix: cap.get(1)?.as_str(),
            charset: cap.get(2)?.as_str(),
            encoding: WordEncoding::from_letter(letter)?,
            payload: cap.get(4)?.as_str(),
            suffix: cap.get(5)?.as_str(),
        })
    }
}

/// Whether `text` contains at least one encoded word.
///
/// Double quotes are ignored and each space-separated token is checked on
/// its own.
#[must_use]
pub fn is_encoded_word(text: Option<&str>) -> bool {
    let Some(text) = text else {
        return false;
    };

    text.replace('"', "")
        .split(' ')
        .any(|token| ENCODED_WORD_TOKEN.is_match(token))
}

/// Decode the whitespace-split fragments of one header value.
///
/// Fragments are concatenated without separators. The charset and encoding
/// of the first encoded word apply to every encoded word that follows it in
/// the same call. If that charset cannot be converted to UTF-8 the whole
/// result is replaced by [`CONVERSION_FAILED`].
pub fn decode<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sticky: Option<(String, WordEncoding)> = None;
    let mut decoded: Vec<u8> = Vec::new();

    for fragment in fragments {
        let fragment = fragment.as_ref().trim().replace('"', "");

        let word = if is_encoded_word(Some(fragment.as_str())) {
            EncodedWord::parse(&fragment)
        } else {
            None
        };

        let Some(word) = word else {
            decoded.extend_from_slice(fragment.as_bytes());
            continue;
        };

        let (_, encoding) =
            sticky.get_or_insert_with(|| (word.charset.to_string(), word.encoding));
        trace!(charset = word.charset, "Decoding encoded word");

        decoded.extend_from_slice(word.prefix.as_bytes());
        decoded.extend(encoding.decode(word.payload));
        decoded.extend_from_slice(word.suffix.as_bytes());
    }

    if decoded.is_empty() {
        return String::new();
    }

    match sticky {
        Some((label, _)) if !charset::is_utf8(&label) => {
            charset::transcode(&decoded, &label).unwrap_or_else(|e| {
                warn!(error = %e, "Could not convert encoded header to UTF-8");
                CONVERSION_FAILED.to_string()
            })
        }
        _ => String::from_utf8_lossy(&decoded).into_owned(),
    }
}

/// Decode a raw header value, splitting it on whitespace first
#[must_use]
pub fn decode_header_value(value: &str) -> String {
    decode(value.split_whitespace())
}
