use serde::Serialize;
use std::fmt;

/// Severity of a schema validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

/// A single recorded non-conformance finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub severity: Severity,
    pub message: String,
}

impl Violation {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str(), self.message)
    }
}

/// Append-only collector of findings, supplied by the surrounding harness.
///
/// Validators write accumulated violations here instead of failing, so one
/// session collects every problem.
#[derive(Debug, Default, Serialize)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// Formats a schema diagnostic with its source position.
pub fn format_schema_finding(line: i32, column: i32, message: &str) -> String {
    format!("line {}, column {}: {}", line, column, message)
}

/// Formats the instance path of a validation error, rooted at `prefix`.
pub fn format_instance_location(instance_path: &str, prefix: &str) -> String {
    if instance_path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, instance_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let mut violations = Violations::new();
        assert!(violations.is_empty());
        violations.add(Violation::new(Severity::Warning, "first"));
        violations.add(Violation::new(Severity::Fatal, "second"));
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn display_tags_severity() {
        let violation = Violation::new(Severity::Error, "line 3, column 1: bad");
        assert_eq!(violation.to_string(), "[error] line 3, column 1: bad");
    }

    #[test]
    fn instance_location_falls_back_to_prefix() {
        assert_eq!(format_instance_location("", "body"), "body");
        assert_eq!(format_instance_location("/name", "body"), "body/name");
    }
}
