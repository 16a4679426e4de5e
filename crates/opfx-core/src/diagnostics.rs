//! Diagnostics sink for non-fatal issues raised while executing an OPF.
//!
//! Configuration problems (an unrecognized algorithm code, a backend whose
//! runtime dependency is missing) do not abort an OPF run. They are recorded
//! here and handed back to the caller alongside the (absent) results.
//!
//! - Severity levels (Warning, Error)
//! - Categories for grouping issues (config, backend, ...)
//! - Optional entity references (e.g., "OPF_ALG 580", "ipopt")
//! - Serialization for JSON output
//!
//! # Example
//!
//! ```
//! use opfx_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_error_with_entity("config", "not a valid algorithm code", "OPF_ALG 999");
//!
//! assert_eq!(diag.error_count(), 1);
//! assert_eq!(diag.summary(), "1 error");
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the run continued
    Warning,
    /// The run could not produce results
    Error,
}

/// A single diagnostic issue
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g., "config", "backend")
    pub category: String,
    pub message: String,
    /// Optional entity reference (e.g., "OPF_ALG 580")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    /// Create an issue with no entity reference
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    /// Add entity reference to the issue
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one OPF run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error attributed to an entity (e.g., "OPF_ALG 580")
    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    /// Number of warning-level issues
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Number of error-level issues
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Check if any error-level issue was recorded
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Iterate over error-level issues
    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// One-line count of warnings and errors
    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let errors = self.error_count();

        match (warnings, errors) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (0, e) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (w, e) => format!(
                "{} warning{}, {} error{}",
                w,
                if w == 1 { "" } else { "s" },
                e,
                if e == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagnostics() {
        let diag = Diagnostics::new();
        assert!(!diag.has_errors());
        assert_eq!(diag.summary(), "No issues");
    }

    #[test]
    fn test_counts_and_summary() {
        let mut diag = Diagnostics::new();
        diag.issues
            .push(DiagnosticIssue::new(Severity::Warning, "config", "w1"));
        diag.add_error_with_entity("config", "e1", "OPF_ALG 300");
        diag.add_error_with_entity("config", "e2", "OPF_ALG 580");

        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.error_count(), 2);
        assert!(diag.has_errors());
        assert_eq!(diag.errors().count(), 2);
        assert_eq!(diag.summary(), "1 warning, 2 errors");
    }

    #[test]
    fn test_issue_display_with_entity() {
        let issue = DiagnosticIssue::new(Severity::Error, "config", "requires IPOPT")
            .with_entity("OPF_ALG 580");
        assert_eq!(
            issue.to_string(),
            "[error:config] requires IPOPT (OPF_ALG 580)"
        );
    }

    #[test]
    fn test_serializes_without_empty_entity() {
        let mut diag = Diagnostics::new();
        diag.issues
            .push(DiagnosticIssue::new(Severity::Error, "config", "bad code"));
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"error\""));
        assert!(!json.contains("entity"));
    }
}
