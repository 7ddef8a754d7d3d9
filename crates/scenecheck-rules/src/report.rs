//! Violation report types

use crate::types::{Rule, Severity};

/// Offending items found for one rule (or one sub-check of a rule)
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationReport {
    pub rule_name: String,
    pub severity: Severity,
    pub description: String,
    /// Node names, component paths or composite strings, in discovery order
    pub items: Vec<String>,
    /// Identifier of the corrective action that can fix these items
    pub corrective: Option<String>,
}

impl ViolationReport {
    pub fn new(
        rule_name: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        items: Vec<String>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            severity,
            description: description.into(),
            items,
            corrective: None,
        }
    }

    /// A report carrying the rule's own name, severity, description and corrective
    pub fn for_rule(rule: &Rule, items: Vec<String>) -> Self {
        Self {
            rule_name: rule.name.clone(),
            severity: rule.severity,
            description: rule.description.clone(),
            items,
            corrective: rule.corrective.clone(),
        }
    }

    pub fn with_corrective(mut self, corrective: impl Into<String>) -> Self {
        self.corrective = Some(corrective.into());
        self
    }

    /// Use this corrective unless the rule configured one already
    pub fn with_default_corrective(mut self, corrective: impl Into<String>) -> Self {
        if self.corrective.is_none() {
            self.corrective = Some(corrective.into());
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Number of offending items
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_fixable(&self) -> bool {
        self.corrective.is_some()
    }
}

/// Counts over a list of reports
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub reports: usize,
    pub errors: usize,
    pub warnings: usize,
    pub items: usize,
}

impl ReportSummary {
    pub fn from_reports(reports: &[ViolationReport]) -> Self {
        let mut summary = Self {
            reports: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
            summary.items += report.count();
        }
        summary
    }

    /// Check if nothing was reported at error severity
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.reports == 0 {
            return f.write_str("No problems found.");
        }
        write!(
            f,
            "{} problem(s) across {} item(s): {} error(s), {} warning(s)",
            self.reports, self.items, self.errors, self.warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_rule_copies_rule_metadata() {
        let rule = Rule::new("N-gons", Severity::Warning, "check_ngons")
            .with_description("five or more sides")
            .with_corrective("custom_fix");
        let report = ViolationReport::for_rule(&rule, vec!["|a.f[0]".into()])
            .with_default_corrective("adjust_ngons");

        assert_eq!(report.rule_name, "N-gons");
        assert_eq!(report.severity, Severity::Warning);
        assert_eq!(report.description, "five or more sides");
        assert_eq!(report.corrective.as_deref(), Some("custom_fix"));
        assert_eq!(report.count(), 1);
    }

    #[test]
    fn test_default_corrective_fills_gap() {
        let rule = Rule::new("N-gons", Severity::Warning, "check_ngons");
        let report = ViolationReport::for_rule(&rule, vec![]).with_default_corrective("adjust_ngons");
        assert_eq!(report.corrective.as_deref(), Some("adjust_ngons"));
        assert!(report.is_empty());
    }

    #[test]
    fn test_summary() {
        let reports = vec![
            ViolationReport::new("a", Severity::Error, "", vec!["x".into(), "y".into()]),
            ViolationReport::new("b", Severity::Warning, "", vec!["z".into()]),
        ];
        let summary = ReportSummary::from_reports(&reports);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.items, 3);
        assert!(!summary.is_clean());
        assert!(summary.to_string().contains("1 error(s)"));

        assert_eq!(
            ReportSummary::from_reports(&[]).to_string(),
            "No problems found."
        );
    }
}
