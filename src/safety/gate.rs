//! The SQL safety gate.
//!
//! Validates that generated SQL text is well-formed, non-destructive and
//! begins with an allowed clause. Checks run in strict order; the first
//! failing check produces the verdict. The gate holds no state across calls
//! and re-validates the full text from scratch on every invocation.

use regex::Regex;

use super::{CandidateSql, RejectReason, SafetyVerdict};

/// Keywords that must never appear as a whole word in generated SQL.
pub const FORBIDDEN_KEYWORDS: [&str; 6] =
    ["DROP", "DELETE", "ALTER", "TRUNCATE", "UPDATE", "INSERT"];

/// Leading clauses a candidate is allowed to start with.
const ALLOWED_LEADING_CLAUSES: [&str; 2] = ["select", "with"];

/// The textual safety gate applied to generated SQL before execution.
///
/// Matching is word-boundary anchored: a keyword inside a larger identifier
/// (`updated_at`) does not match, while a keyword anywhere as its own word
/// does, including inside subqueries and comments.
pub struct SqlGate {
    keyword_patterns: Vec<(&'static str, Regex)>,
}

impl SqlGate {
    /// Creates a gate with the fixed keyword denylist compiled.
    pub fn new() -> Self {
        let keyword_patterns = FORBIDDEN_KEYWORDS
            .iter()
            .map(|keyword| {
                // Static patterns over a fixed keyword list cannot fail to compile.
                let pattern = Regex::new(&format!(r"(?i)\b{keyword}\b"))
                    .expect("forbidden-keyword pattern is static and valid");
                (*keyword, pattern)
            })
            .collect();
        Self { keyword_patterns }
    }

    /// Sanitizes a normalized candidate.
    ///
    /// Pure function over its input; calling it twice on the same candidate
    /// yields the same verdict.
    pub fn sanitize(&self, candidate: &CandidateSql) -> SafetyVerdict {
        let sql = match candidate {
            CandidateSql::NonTextual => {
                return SafetyVerdict::Rejected(RejectReason::NonTextual)
            }
            CandidateSql::Empty => return SafetyVerdict::Rejected(RejectReason::Empty),
            CandidateSql::Boolean => {
                return SafetyVerdict::Rejected(RejectReason::BooleanLiteral)
            }
            CandidateSql::Text(sql) => sql,
        };

        let lowered = sql.to_lowercase();
        if !ALLOWED_LEADING_CLAUSES
            .iter()
            .any(|clause| lowered.starts_with(clause))
        {
            return SafetyVerdict::Rejected(RejectReason::WrongLeadingClause);
        }

        for (keyword, pattern) in &self.keyword_patterns {
            if pattern.is_match(sql) {
                return SafetyVerdict::Rejected(RejectReason::ForbiddenKeyword(
                    keyword.to_string(),
                ));
            }
        }

        SafetyVerdict::Safe
    }

    /// Normalizes a raw oracle completion and sanitizes it in one step.
    pub fn sanitize_completion(&self, completion: Option<&str>) -> SafetyVerdict {
        self.sanitize(&CandidateSql::from_completion(completion))
    }
}

impl Default for SqlGate {
    fn default() -> Self {
        Self::new()
    }
}
