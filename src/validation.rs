//! Request validation, layered in front of handlers.
//!
//! Requests are mapped into a validation-only form ([`GreetForm`]) whose
//! fields declare [`Constraint`]s. Each field reports only its first violated
//! constraint; violations are rendered as `"<field> <description>"` and joined
//! with `"; "` into a single invalid-argument error.

use std::fmt;

use serde::Deserialize;

use crate::proto::GreetRequest;
use crate::{GatehouseError, Result};

/// Whether handlers receive validated or raw requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Reject requests that violate declared constraints.
    #[default]
    Enforce,
    /// Pass every request straight to the handler.
    Skip,
}

/// A declared constraint on a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    MinLength(usize),
}

impl Constraint {
    fn check(&self, value: &str) -> bool {
        match self {
            Constraint::Required => !value.is_empty(),
            Constraint::MinLength(min) => value.chars().count() >= *min,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "is required"),
            Constraint::MinLength(min) => write!(f, "must be at least {min} characters"),
        }
    }
}

/// A single field that failed one of its constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// Types that can list their constraint violations.
pub trait Validate {
    fn violations(&self) -> Vec<Violation>;

    /// Fail with [`GatehouseError::InvalidArgument`] if any constraint is violated.
    fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            return Ok(());
        }
        Err(GatehouseError::InvalidArgument(format_violations(&violations)))
    }
}

/// Join violations into the invalid-argument message.
pub fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check one field, stopping at its first failing constraint.
fn check_field(
    field: &'static str,
    value: &str,
    constraints: &[Constraint],
    out: &mut Vec<Violation>,
) {
    if let Some(constraint) = constraints.iter().find(|c| !c.check(value)) {
        out.push(Violation {
            field,
            constraint: *constraint,
        });
    }
}

/// Minimum accepted length for a greeting name.
pub const MIN_NAME_LENGTH: usize = 5;

/// Validation-only view of a [`GreetRequest`].
#[derive(Debug, Clone, Copy)]
pub struct GreetForm<'a> {
    pub name: &'a str,
}

impl GreetForm<'_> {
    const NAME: &'static [Constraint] =
        &[Constraint::Required, Constraint::MinLength(MIN_NAME_LENGTH)];
}

impl<'a> From<&'a GreetRequest> for GreetForm<'a> {
    fn from(request: &'a GreetRequest) -> Self {
        Self {
            name: &request.name,
        }
    }
}

impl Validate for GreetForm<'_> {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_field("name", self.name, Self::NAME, &mut out);
        out
    }
}
