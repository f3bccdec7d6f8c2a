//! Bounce reason labels and the pattern dictionaries that detect them

use crate::status;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Why a message could not be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    ContentError,
    ExceedLimit,
    Expired,
    Filtered,
    HasMoved,
    HostUnknown,
    MailboxFull,
    MesgTooBig,
    NetworkError,
    NotAccept,
    Rejected,
    SecurityError,
    SpamDetected,
    SystemError,
    SystemFull,
    UserUnknown,
}

impl Reason {
    /// Lowercase label, as used in bounce records
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ContentError => "contenterror",
            Self::ExceedLimit => "exceedlimit",
            Self::Expired => "expired",
            Self::Filtered => "filtered",
            Self::HasMoved => "hasmoved",
            Self::HostUnknown => "hostunknown",
            Self::MailboxFull => "mailboxfull",
            Self::MesgTooBig => "mesgtoobig",
            Self::NetworkError => "networkerror",
            Self::NotAccept => "notaccept",
            Self::Rejected => "rejected",
            Self::SecurityError => "securityerror",
            Self::SpamDetected => "spamdetected",
            Self::SystemError => "systemerror",
            Self::SystemFull => "systemfull",
            Self::UserUnknown => "userunknown",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The parts of a parsed bounce a classifier looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BounceRecord {
    /// Reason already assigned, if any
    #[serde(default)]
    pub reason: Option<Reason>,

    /// Enhanced status code, e.g. `5.1.2`
    #[serde(rename = "deliverystatus", default)]
    pub delivery_status: String,

    /// Free-text diagnostic from the remote host, ideally already decoded
    #[serde(rename = "diagnosticcode", default)]
    pub diagnostic_code: String,
}

/// A reason paired with the pattern that recognizes its diagnostics
#[derive(Debug)]
pub struct Classifier {
    reason: Reason,
    pattern: Regex,
    requires_status: bool,
}

impl Classifier {
    fn new(reason: Reason, pattern: &str) -> Self {
        Self {
            reason,
            pattern: Regex::new(pattern).unwrap(),
            requires_status: false,
        }
    }

    const fn requiring_status(mut self) -> Self {
        self.requires_status = true;
        self
    }

    #[must_use]
    pub const fn reason(&self) -> Reason {
        self.reason
    }

    /// Pure pattern test against diagnostic text
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Whether `record` bounced for this classifier's reason.
    ///
    /// An already assigned reason decides first, then the status code. The
    /// diagnostic text is only matched when the status code does not point
    /// at this reason.
    #[must_use]
    pub fn is_reason(&self, record: &BounceRecord) -> bool {
        if self.requires_status && record.delivery_status.is_empty() {
            return false;
        }
        if record.reason == Some(self.reason) {
            return true;
        }
        if status::reason_for(&record.delivery_status) == Some(self.reason) {
            return true;
        }
        self.matches(&record.diagnostic_code)
    }
}

const HOST_UNKNOWN: &str = r"(?ix)
    domain\x20(?:
         does\x20not\x20exist
        |must\x20exist
        |is\x20not\x20reachable
    )
    |host\x20(?:
         or\x20domain\x20name\x20not\x20found
        |unknown
        |unreachable
    )
    |name\x20or\x20service\x20not\x20known
    |no\x20such\x20domain
    |recipient\x20(?:
         address\x20rejected:\x20unknown\x20domain\x20name
        |domain\x20must\x20exist
    )
    |unknown\x20host
";

const SPAM_DETECTED: &str = r#"(?ix)
     ["]The\x20mail\x20server\x20detected\x20your\x20message\x20as\x20spam\x20and\x20
        has\x20prevented\x20delivery[.]["]
    |(?:\d[.]\d[.]\d|\d{3})\x20spam\z
    |appears\x20to\x20be\x20unsolicited
    |Blacklisted\x20URL\x20in\x20message
    |block\x20for\x20spam
    |blocked\x20by\x20(?:
         policy:\x20no\x20spam\x20please
        |spamAssassin
    )
    |blocked\x20for\x20abuse[.]\x20see\x20http://att[.]net/blocks
    |bulk\x20email
    |content\x20filter\x20rejection
    |cyberoam\x20anti\x20spam\x20engine\x20has\x20identified\x20this\x20email\x20as\x20a\x20bulk\x20email
    |denied\x20due\x20to\x20spam\x20list
    |dt:spm\x20mx.+\x20http://mail[.]163[.]com/help/help_spam_16[.]htm
    |greylisted.?.\x20please\x20try\x20again\x20in
    |http://(?:
         www[.]spamhaus[.]org
        |dsbl[.]org
        |www[.]sorbs[.]net
    )
    |listed\x20in\x20work[.]drbl[.]imedia[.]ru
    |mail\x20(?:
         appears\x20to\x20be\x20unsolicited
        |content\x20denied
    )
    |may\x20consider\x20spam
    |message\x20(?:
         content\x20rejected
        |filtered
        |filtered[.]\x20please\x20see\x20the\x20faqs\x20section\x20on\x20spam
        |filtered[.]\x20Refer\x20to\x20the\x20Troubleshooting\x20page\x20at\x20
        |looks\x20like\x20spam
        |not\x20accepted\x20for\x20policy\x20reasons[.]\x20See\x20http:
        |refused\x20by\x20mailmarshal\x20spamprofiler
        |rejected\x20as\x20spam
        |rejected\x20as\x20spam\x20by\x20Content\x20Filtering
        |rejected\x20due\x20to\x20suspected\x20spam\x20content
        |rejected\x20for\x20policy\x20reasons
    )
    |our\x20email\x20server\x20thinks\x20this\x20email\x20is\x20spam
    |our\x20filters\x20rate\x20at\x20and\x20above\x20.+\x20percent\x20probability\x20of\x20being\x20spam
    |our\x20system\x20has\x20detected\x20that\x20this\x20message\x20is
    |probable\x20spam
    |rejected(?:
         :\x20spamassassin\x20score\x20
        |\x20by\x20.+\x20[(]spam[)]
        |\x20due\x20to\x20spam\x20content
    )
    |rejecting\x20banned\x20content
    |related\x20to\x20content\x20with\x20spam[-]like\x20characteristics
    |rule\x20imposed\x20as\x20.+is\x20blacklisted\x20on
    |sending\x20address\x20not\x20accepted\x20due\x20to\x20spam\x20filter
    |spam\x20(?:
         blocked
        |check
        |content\x20matched
        |detected
        |email
        |email\x20not\x20accepted
        |message\x20rejected[.]
        |not\x20accepted
        |refused
        |rejection
        |Reporting\x20Address
        |score\x20
    )
    |spambouncer\x20identified\x20spam
    |spamming\x20not\x20allowed
    |Too\x20much\x20spam[.]
    |the\x20message\x20was\x20rejected\x20due\x20to\x20classification\x20as\x20bulk\x20mail
    |The\x20content\x20of\x20this\x20message\x20looked\x20like\x20spam
    |this\x20message\x20(?:
         appears\x20to\x20be\x20spam
        |has\x20been\x20identified\x20as\x20spam
        |scored\x20.+\x20spam\x20points
        |was\x20classified\x20as\x20spam
    )
    |transaction\x20failed\x20spam\x20message\x20not\x20queued
    |we\x20dont\x20accept\x20spam
    |you're\x20using\x20a\x20mass\x20mailer
    |your\x20(?:
         email\x20(?:
             appears\x20similar\x20to\x20spam\x20we\x20have\x20received\x20before
            |breaches\x20local\x20URIBL\x20policy
            |had\x20spam[-]like\x20
            |is\x20considered\x20spam
            |is\x20probably\x20spam
            |was\x20detected\x20as\x20spam
        )
        |message\x20(?:
             has\x20been\x20(?:
                 temporarily\x20blocked\x20by\x20our\x20filter
                |rejected\x20because\x20it\x20appears\x20to\x20be\x20SPAM
            )
            |has\x20triggered\x20a\x20SPAM\x20block
            |may\x20contain\x20the\x20spam\x20contents
            |failed\x20several\x20antispam\x20checks
        )
    )
"#;

static CLASSIFIERS: LazyLock<Vec<Classifier>> = LazyLock::new(|| {
    vec![
        Classifier::new(Reason::HostUnknown, HOST_UNKNOWN),
        Classifier::new(Reason::SpamDetected, SPAM_DETECTED).requiring_status(),
    ]
});

/// All classifiers, in the order they are tried
#[must_use]
pub fn classifiers() -> &'static [Classifier] {
    &CLASSIFIERS
}

#[must_use]
pub fn classifier(reason: Reason) -> Option<&'static Classifier> {
    classifiers().iter().find(|c| c.reason == reason)
}

/// First reason whose pattern matches the diagnostic text
#[must_use]
pub fn classify(text: &str) -> Option<Reason> {
    classifiers()
        .iter()
        .find(|c| c.matches(text))
        .map(Classifier::reason)
}
