// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Bounce MIME decoder
//!
//! Best-effort decoding of the MIME encodings found in email bounce
//! messages, so that the diagnostic text can be read and classified.
//! Nothing here rejects malformed input: every function returns the most
//! useful string it can.
//!
//! # Features
//!
//! - RFC 2047 encoded words in header values
//! - Base64 payloads located anywhere in a string
//! - Multipart boundary extraction
//! - Repair and decoding of broken quoted-printable bodies
//! - Charset conversion to UTF-8
//! - Bounce reason classification from status codes and diagnostics
//!
//! # Example
//!
//! ```rust
//! use bounce_mime::{HeaderMap, encoded_word, qprint};
//!
//! let subject = encoded_word::decode(["=?UTF-8?B?6YeN6KaB?="]);
//! assert_eq!(subject, "重要");
//!
//! let body = qprint::repair(Some("Hello=20World"), &HeaderMap::new());
//! assert_eq!(body.as_deref(), Some("Hello World"));
//! ```

pub mod boundary;
pub mod charset;
pub mod codec;
pub mod encoded_word;
mod error;
mod headers;
pub mod patterns;
pub mod qprint;
pub mod reason;
pub mod status;

pub use boundary::{BoundaryMode, MultipartBoundary, boundary};
pub use codec::base64_decode;
pub use encoded_word::{EncodedWord, is_encoded_word};
pub use error::{DecodeError, Result};
pub use headers::HeaderMap;
pub use patterns::{Pattern, PatternRegistry};
pub use qprint::{Repairer, repair};
pub use reason::{BounceRecord, Classifier, Reason, classify};
