//! Enhanced SMTP status code lookup

use crate::reason::Reason;

const STATUS_REASONS: &[(&str, Reason)] = &[
    ("4.2.2", Reason::MailboxFull),
    ("4.3.1", Reason::SystemFull),
    ("4.4.7", Reason::Expired),
    ("5.1.1", Reason::UserUnknown),
    ("5.1.2", Reason::HostUnknown),
    ("5.1.3", Reason::UserUnknown),
    ("5.1.4", Reason::UserUnknown),
    ("5.1.6", Reason::HasMoved),
    ("5.1.8", Reason::Rejected),
    ("5.2.0", Reason::Filtered),
    ("5.2.1", Reason::Filtered),
    ("5.2.2", Reason::MailboxFull),
    ("5.2.3", Reason::ExceedLimit),
    ("5.2.4", Reason::SystemError),
    ("5.3.0", Reason::SystemError),
    ("5.3.1", Reason::SystemFull),
    ("5.3.2", Reason::NotAccept),
    ("5.3.4", Reason::MesgTooBig),
    ("5.4.0", Reason::NetworkError),
    ("5.4.4", Reason::HostUnknown),
    ("5.4.7", Reason::Expired),
    ("5.6.0", Reason::ContentError),
    ("5.6.1", Reason::ContentError),
    ("5.7.0", Reason::SecurityError),
    ("5.7.1", Reason::SecurityError),
];

/// Reason implied by a status code such as `5.1.2`
#[must_use]
pub fn reason_for(code: &str) -> Option<Reason> {
    let code = code.trim();
    STATUS_REASONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, reason)| *reason)
}
