//! Query-safety pipeline for sqlward.
//!
//! This is the last line of defense between an untrusted question (and an
//! adversarial-by-default model completion) and the warehouse. It covers
//! input validation, the textual SQL safety gate and the scope classifier.
//!
//! The gate is deliberately lexical: it trades recall for simplicity and
//! predictable latency, and runs on every inference call without parsing SQL.

mod gate;
mod scope;

pub use gate::{SqlGate, FORBIDDEN_KEYWORDS};
pub use scope::{ScopeClassifier, ScopeLabel};

use std::fmt;

/// Minimum trimmed length for a question to be considered valid.
const MIN_QUESTION_LEN: usize = 3;

/// Validates raw user input before any oracle call is made.
///
/// Returns false when the trimmed text is shorter than 3 characters.
/// Pure predicate, no side effects.
pub fn validate_question(text: &str) -> bool {
    text.trim().chars().count() >= MIN_QUESTION_LEN
}

/// A model completion normalized for the safety gate.
///
/// Produced by a single normalization step before the gate's checks run:
/// trim surrounding whitespace, strip one layer of enclosing straight or
/// curly quotes, then discriminate the degenerate shapes a drifting model
/// can emit instead of SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSql {
    /// The completion carried no text part at all.
    NonTextual,
    /// The text was empty after normalization.
    Empty,
    /// The text was exactly a bare boolean literal ("true"/"false").
    Boolean,
    /// Normalized SQL candidate text.
    Text(String),
}

/// Quote pairs stripped as a single enclosing layer.
const QUOTE_PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];

impl CandidateSql {
    /// Normalizes an oracle completion into a gate-ready candidate.
    ///
    /// `None` models a completion without a text part.
    pub fn from_completion(completion: Option<&str>) -> Self {
        let Some(raw) = completion else {
            return Self::NonTextual;
        };

        let mut text = raw.trim();
        for (open, close) in QUOTE_PAIRS {
            if text.len() >= open.len_utf8() + close.len_utf8()
                && text.starts_with(open)
                && text.ends_with(close)
            {
                text = text[open.len_utf8()..text.len() - close.len_utf8()].trim();
                break;
            }
        }

        if text.is_empty() {
            return Self::Empty;
        }

        let lowered = text.to_lowercase();
        if lowered == "true" || lowered == "false" {
            return Self::Boolean;
        }

        Self::Text(text.to_string())
    }
}

/// Reason a candidate was rejected by the safety gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The completion had no text part.
    NonTextual,
    /// The text was empty after normalization.
    Empty,
    /// The text was a bare boolean literal.
    BooleanLiteral,
    /// The text does not start with an allowed leading clause.
    WrongLeadingClause,
    /// A denylisted keyword matched as a whole word; carries the keyword.
    ForbiddenKeyword(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonTextual => write!(f, "non-textual output"),
            Self::Empty => write!(f, "empty output"),
            Self::BooleanLiteral => write!(f, "invalid boolean output"),
            Self::WrongLeadingClause => write!(f, "does not start with SELECT or WITH"),
            Self::ForbiddenKeyword(keyword) => write!(f, "forbidden keyword: {keyword}"),
        }
    }
}

/// Verdict of the safety gate over one candidate.
///
/// Every code path produces a complete verdict; `reason()` renders "OK" for
/// the safe case and the machine-readable reason otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// The candidate may be executed.
    Safe,
    /// The candidate must not reach the warehouse.
    Rejected(RejectReason),
}

impl SafetyVerdict {
    /// Returns true if the candidate may be executed.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// Returns the reason string: "OK" when safe, the reject reason otherwise.
    pub fn reason(&self) -> String {
        match self {
            Self::Safe => "OK".to_string(),
            Self::Rejected(reason) => reason.to_string(),
        }
    }
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}
