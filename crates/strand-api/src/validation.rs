//! Input shape checks applied by the route handlers before any database
//! work. Every violated constraint is reported, not just the first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_THREAD_LEN: usize = 3;

/// Body of a thread-creation form.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadPayload {
    pub thread: String,
    pub account_id: String,
}

/// Body of a comment form.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub thread: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    TooShort { min: usize },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "{} is required", self.field),
            ViolationKind::TooShort { min } => {
                write!(f, "{} must be at least {} characters", self.field, min)
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Validation failed: {}", .violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ThreadPayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = check_thread_text(&self.thread);
        if self.account_id.is_empty() {
            violations.push(Violation {
                field: "account_id",
                kind: ViolationKind::Required,
            });
        }
        finish(violations)
    }
}

impl CommentPayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        finish(check_thread_text(&self.thread))
    }
}

// An empty string violates both constraints and reports both, the way a
// non-empty + minimum-length schema enumerates its issues.
fn check_thread_text(text: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if text.is_empty() {
        violations.push(Violation {
            field: "thread",
            kind: ViolationKind::Required,
        });
    }
    if text.chars().count() < MIN_THREAD_LEN {
        violations.push(Violation {
            field: "thread",
            kind: ViolationKind::TooShort {
                min: MIN_THREAD_LEN,
            },
        });
    }
    violations
}

fn finish(violations: Vec<Violation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}
