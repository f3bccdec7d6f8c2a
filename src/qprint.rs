//! Quoted-printable body repair
//!
//! Bounce messages often carry parts labelled `quoted-printable` whose lines
//! were never escaped (Office365 diagnostics are a common source). The
//! repairer walks the body line by line, re-encodes the lines that cannot be
//! trusted, decodes each quoted-printable part and converts it to UTF-8.
//! Everything outside those parts is copied through untouched.

use crate::boundary::MultipartBoundary;
use crate::charset;
use crate::codec::{
    MAX_QP_LINE_LENGTH, decode_quoted_printable, decode_quoted_printable_str,
    encode_quoted_printable_line,
};
use crate::headers::HeaderMap;
use crate::patterns::{Pattern, PatternRegistry};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::{debug, trace};

static BOUNDARY_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A--\S+[^\s-]\z").unwrap());

static BASE64_PADDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+/0-9A-Za-z]{32,}=+\z").unwrap());

/// Repairs and decodes quoted-printable message bodies
#[derive(Debug, Clone, Copy)]
pub struct Repairer<'p> {
    patterns: &'p PatternRegistry,
}

impl<'p> Repairer<'p> {
    #[must_use]
    pub const fn new(patterns: &'p PatternRegistry) -> Self {
        Self { patterns }
    }

    /// Rebuild `body` with its quoted-printable parts decoded.
    ///
    /// Without a `content-type` header, without a boundary, or without any
    /// `Content-Transfer-Encoding: quoted-printable` line in the body, the
    /// whole body is decoded in one pass instead.
    #[must_use]
    pub fn repair(&self, body: Option<&str>, headers: &HeaderMap) -> Option<String> {
        let body = body?;

        let Some(content_type) = headers.content_type().filter(|c| !c.is_empty()) else {
            return Some(decode_quoted_printable_str(body));
        };

        let boundary = MultipartBoundary::from_content_type(content_type)
            .filter(|b| !b.marker().is_empty());
        let Some(boundary) = boundary else {
            return Some(decode_quoted_printable_str(body));
        };

        if !self
            .patterns
            .is_match(Pattern::QuotedPrintable, &body.to_lowercase())
        {
            return Some(decode_quoted_printable_str(body));
        }

        Some(self.walk(body, boundary))
    }

    fn walk(&self, body: &str, mut boundary: MultipartBoundary) -> String {
        let mut output = String::with_capacity(body.len());
        let mut part = Part::default();

        for raw in body.split_inclusive('\n') {
            let line = raw.trim_end_matches(['\r', '\n']);

            if part.inside {
                if line == boundary.start() || is_closing(line, &boundary) {
                    output.push_str(&part.finish());
                    output.push_str(raw);
                    trace!(boundary = boundary.marker(), "Left quoted-printable part");
                } else {
                    part.buffer(line);
                }
                continue;
            }

            let lowercased = line.to_lowercase();
            if BOUNDARY_OPENER.is_match(line) {
                if line != boundary.start() {
                    boundary = MultipartBoundary::from_line(line);
                    debug!(boundary = boundary.marker(), "Switched to a new boundary");
                }
            } else if let Some(label) = self.patterns.charset_of(&lowercased) {
                part.charset = Some(label.to_string());
                if part.quoted_printable {
                    part.inside = true;
                }
            } else if self.patterns.is_match(Pattern::QuotedPrintable, &lowercased) {
                part.quoted_printable = true;
                if part.charset.is_some() {
                    part.inside = true;
                }
            } else if line == boundary.end() {
                part.inside = false;
            }

            output.push_str(raw);
        }

        if part.inside && !part.pending.is_empty() {
            debug!("Body ended inside a quoted-printable part, keeping it undecoded");
            output.push_str(&part.pending);
        }

        output
    }
}

/// Per-part state while walking a body
#[derive(Debug, Default)]
struct Part {
    inside: bool,
    quoted_printable: bool,
    charset: Option<String>,
    /// Repaired lines waiting for the next boundary
    pending: String,
}

impl Part {
    fn buffer(&mut self, line: &str) {
        self.pending.push_str(&repair_line(line));
        self.pending.push('\n');
    }

    /// Decode the buffered lines and reset for the next part
    fn finish(&mut self) -> String {
        let decoded = decode_quoted_printable(self.pending.as_bytes());
        let text = charset::to_utf8(&decoded, self.charset.as_deref());
        *self = Self::default();
        text
    }
}

fn is_closing(line: &str, boundary: &MultipartBoundary) -> bool {
    line.strip_prefix(boundary.start()) == Some("--")
}

/// Apply the repair heuristic to one line of a quoted-printable part.
///
/// Lines longer than [`MAX_QP_LINE_LENGTH`] characters are re-encoded. Shorter
/// lines are kept as they are when they end in a space or tab, contain a byte
/// outside printable ASCII, end in base64 padding, or contain an `=` that does
/// not start an `=3D` escape; any other line is re-encoded. Each `=` is
/// looked at on its own, so `a=3Db=C3` is kept while `a=3Db` is re-encoded.
#[must_use]
pub fn repair_line(line: &str) -> Cow<'_, str> {
    if line.chars().count() > MAX_QP_LINE_LENGTH || !is_acceptable(line) {
        Cow::Owned(encode_quoted_printable_line(line))
    } else {
        Cow::Borrowed(line)
    }
}

fn is_acceptable(line: &str) -> bool {
    line.ends_with([' ', '\t'])
        || line.bytes().any(|b| !(32..=126).contains(&b))
        || (line.ends_with('=') && BASE64_PADDING.is_match(line))
        || has_bare_equals(line)
}

fn has_bare_equals(line: &str) -> bool {
    line.match_indices('=').any(|(i, _)| {
        !line[i..]
            .get(..3)
            .is_some_and(|escape| escape.eq_ignore_ascii_case("=3D"))
    })
}

/// Repair `body` using the process-wide pattern registry
#[must_use]
pub fn repair(body: Option<&str>, headers: &HeaderMap) -> Option<String> {
    Repairer::new(PatternRegistry::global()).repair(body, headers)
}
