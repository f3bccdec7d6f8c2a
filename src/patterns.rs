//! Compiled patterns for MIME header lines
//!
//! The registry is built once per process and only ever handed out by
//! shared reference.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Named patterns known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `Content-Transfer-Encoding: 7bit`
    SevenBitEncoded,
    /// `Content-Transfer-Encoding: quoted-printable`
    QuotedPrintable,
    /// `Content-Type: ...; charset=iso-2022-*`
    SomeIso2022,
    /// `Content-Type: ...; charset=...`
    WithCharset,
    /// A folded `charset=...` continuation line
    OnlyCharset,
    /// `Content-Type: text/html;`
    HtmlMessage,
}

impl Pattern {
    /// Every pattern, in registry order
    pub const ALL: [Self; 6] = [
        Self::SevenBitEncoded,
        Self::QuotedPrintable,
        Self::SomeIso2022,
        Self::WithCharset,
        Self::OnlyCharset,
        Self::HtmlMessage,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SevenBitEncoded => "7bit-encoded",
            Self::QuotedPrintable => "quoted-printable",
            Self::SomeIso2022 => "some-iso2022",
            Self::WithCharset => "with-charset",
            Self::OnlyCharset => "only-charset",
            Self::HtmlMessage => "html-message",
        }
    }

    const fn source(self) -> &'static str {
        // Transfer-encoding names are matched case-sensitively; callers
        // lower-case the line first.
        match self {
            Self::SevenBitEncoded => r"(?mR)^content-transfer-encoding:[ ]*7bit$",
            Self::QuotedPrintable => r"(?mR)^content-transfer-encoding:[ ]*quoted-printable$",
            Self::SomeIso2022 => {
                r#"(?imR)^content-type:[ ]*.+;[ ]*charset=["']?(iso-2022-[-a-z0-9]+?)['"]?$"#
            }
            Self::WithCharset => r#"(?i)^content-type:[ ]*.+;[ ]*charset=['"]?(.+?)['"]?$"#,
            Self::OnlyCharset => r#"(?i)^[\s\t]+charset=['"]?(.+?)['"]?$"#,
            Self::HtmlMessage => r"(?imR)^content-type:[ ]*text/html;",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Immutable table of compiled header patterns
#[derive(Debug)]
pub struct PatternRegistry {
    compiled: Vec<(Pattern, Regex)>,
}

static REGISTRY: LazyLock<PatternRegistry> = LazyLock::new(PatternRegistry::new);

impl PatternRegistry {
    fn new() -> Self {
        let compiled = Pattern::ALL
            .iter()
            .map(|&p| (p, Regex::new(p.source()).unwrap()))
            .collect();
        Self { compiled }
    }

    /// The process-wide registry
    #[must_use]
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Compiled regex for a pattern
    #[must_use]
    pub fn get(&self, pattern: Pattern) -> &Regex {
        // `compiled` is built from `Pattern::ALL`, so the index always lines up.
        &self.compiled[pattern as usize].1
    }

    #[must_use]
    pub fn is_match(&self, pattern: Pattern, text: &str) -> bool {
        self.get(pattern).is_match(text)
    }

    /// First capture group of `pattern` in `text`, if any
    #[must_use]
    pub fn capture<'t>(&self, pattern: Pattern, text: &'t str) -> Option<&'t str> {
        self.get(pattern)
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Charset declared on a header line, either inline with `Content-Type`
    /// or on a folded continuation line
    #[must_use]
    pub fn charset_of<'t>(&self, line: &'t str) -> Option<&'t str> {
        self.capture(Pattern::WithCharset, line)
            .or_else(|| self.capture(Pattern::OnlyCharset, line))
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (Pattern, &Regex)> {
        self.compiled.iter().map(|(p, r)| (*p, r))
    }
}
