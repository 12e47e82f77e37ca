//! Failure classification for remote calls.
//!
//! The remote endpoint's error shapes are outside our control, so rate limiting
//! is recognised by a case-insensitive substring match on the error text.
//! Retry logic only ever sees a [`FailureKind`]; swap the classifier on
//! [`Gate`](super::retries::Gate) to change the rule.

use std::fmt;

/// Substrings that mark an error as a rate-limit signal.
pub const RATE_LIMIT_MARKERS: [&str; 3] = ["429", "quota", "exhausted"];

/// How the gate treats a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Quota or 429: trip the circuit, back off and retry.
    RateLimited,
    /// Anything else: report immediately.
    Other,
}

/// Signature of a pluggable classification rule.
pub type Classifier = fn(&str) -> FailureKind;

/// Classify an error by its human-readable description.
pub fn classify_failure<E: fmt::Display + ?Sized>(error: &E) -> FailureKind {
    classify_description(&error.to_string())
}

/// Default rule: match any of [`RATE_LIMIT_MARKERS`], ignoring case.
pub fn classify_description(description: &str) -> FailureKind {
    let lowered = description.to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| lowered.contains(m)) {
        FailureKind::RateLimited
    } else {
        FailureKind::Other
    }
}
