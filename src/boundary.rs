//! Multipart boundary extraction

use regex::Regex;
use std::sync::LazyLock;

static BOUNDARY_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bboundary=([^ ]+)").unwrap());

/// Which textual form of a boundary to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// The bare marker: `marker`
    Marker,
    /// Start of a part: `--marker`
    Start,
    /// End of the parts: `marker--`
    End,
}

impl BoundaryMode {
    /// Map the numeric modes `-1`, `0`, `1`
    #[must_use]
    pub const fn from_i8(mode: i8) -> Self {
        match mode {
            i8::MIN..=-1 => Self::Marker,
            0 => Self::Start,
            _ => Self::End,
        }
    }
}

/// A boundary marker and its derived forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBoundary {
    marker: String,
    start: String,
    end: String,
}

impl MultipartBoundary {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self {
            start: format!("--{marker}"),
            end: format!("{marker}--"),
            marker,
        }
    }

    /// Boundary declared by a `Content-Type` value.
    ///
    /// Returns `None` if there is no `boundary=` parameter.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let cap = BOUNDARY_PARAM.captures(content_type)?.get(1)?;
        let marker: String = cap
            .as_str()
            .chars()
            .filter(|c| *c != '"' && *c != '\'')
            .collect();
        Some(Self::new(marker))
    }

    /// Boundary from a `--marker` line found in a body
    #[must_use]
    pub fn from_line(line: &str) -> Self {
        Self::new(line.strip_prefix("--").unwrap_or(line))
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    #[must_use]
    pub fn render(&self, mode: BoundaryMode) -> &str {
        match mode {
            BoundaryMode::Marker => self.marker(),
            BoundaryMode::Start => self.start(),
            BoundaryMode::End => self.end(),
        }
    }
}

/// Boundary string of a `Content-Type` value in the requested form.
///
/// Returns `None` only when `content_type` is `None`, and an empty string
/// when there is no boundary parameter.
#[must_use]
pub fn boundary(content_type: Option<&str>, mode: BoundaryMode) -> Option<String> {
    let content_type = content_type?;
    Some(
        MultipartBoundary::from_content_type(content_type)
            .map(|b| b.render(mode).to_string())
            .unwrap_or_default(),
    )
}
