//! Result board: presents a finished session and applies corrective actions

use crate::export;
use crate::registry::CheckRegistry;
use crate::report::{ReportSummary, ViolationReport};
use crate::runner::RunSession;
use crate::types::Severity;
use scenecheck_core::{Result, SceneCheckError};
use scenecheck_scene::SceneGraph;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// What a successful adjust did
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustOutcome {
    pub rule_name: String,
    pub corrective: String,
    pub items: usize,
}

/// The reports of one finished run.
///
/// After any corrective runs the board is stale: its reports describe the
/// scene as it was before the fix, and a fresh run is needed to refresh them.
#[derive(Debug, Clone)]
pub struct ResultBoard {
    reports: Vec<ViolationReport>,
    cancelled: bool,
    stale: bool,
}

impl ResultBoard {
    pub fn new(reports: Vec<ViolationReport>) -> Self {
        Self {
            reports,
            cancelled: false,
            stale: false,
        }
    }

    pub fn from_session(session: RunSession) -> Self {
        let cancelled = session.is_cancelled();
        Self {
            reports: session.into_reports(),
            cancelled,
            stale: false,
        }
    }

    pub fn reports(&self) -> &[ViolationReport] {
        &self.reports
    }

    pub fn get(&self, index: usize) -> Option<&ViolationReport> {
        self.reports.get(index)
    }

    /// Index of the first report with this rule name
    pub fn position(&self, rule_name: &str) -> Option<usize> {
        self.reports.iter().position(|r| r.rule_name == rule_name)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// True if the run behind this board was cancelled part way
    pub fn is_partial(&self) -> bool {
        self.cancelled
    }

    /// True once a corrective has touched the scene
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&ViolationReport> {
        self.reports.iter().filter(|r| r.severity == severity).collect()
    }

    pub fn fixable(&self) -> Vec<(usize, &ViolationReport)> {
        self.reports
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_fixable())
            .collect()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_reports(&self.reports)
    }

    /// Apply the corrective of report `index` to all of its items.
    ///
    /// The board is marked stale as soon as the corrective is invoked, even if
    /// it then reports failure, since it may have changed part of the scene.
    pub fn adjust(
        &mut self,
        index: usize,
        scene: &mut SceneGraph,
        registry: &CheckRegistry,
    ) -> Result<AdjustOutcome> {
        let report = self
            .reports
            .get(index)
            .ok_or(SceneCheckError::ReportNotFound(index))?;
        let corrective_name = report
            .corrective
            .as_deref()
            .ok_or_else(|| SceneCheckError::NoCorrective(report.rule_name.clone()))?;
        let corrective = registry.lookup_corrective(corrective_name).ok_or_else(|| {
            tracing::warn!(rule = %report.rule_name, corrective = corrective_name, "corrective not registered");
            SceneCheckError::NoCorrective(report.rule_name.clone())
        })?;

        self.stale = true;
        let fixed = panic::catch_unwind(AssertUnwindSafe(|| corrective(scene, &report.items)))
            .unwrap_or_else(|_| {
                tracing::warn!(rule = %report.rule_name, corrective = corrective_name, "corrective panicked");
                false
            });

        if !fixed {
            return Err(SceneCheckError::AdjustFailed(report.rule_name.clone()));
        }

        tracing::info!(rule = %report.rule_name, corrective = corrective_name, items = report.count(), "adjusted");
        Ok(AdjustOutcome {
            rule_name: report.rule_name.clone(),
            corrective: corrective_name.to_string(),
            items: report.count(),
        })
    }

    /// Write the reports as CSV
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        export::write_csv(path, &self.reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CheckRunner;
    use crate::types::Rule;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn board() -> ResultBoard {
        ResultBoard::new(vec![
            ViolationReport::new("Fixable", Severity::Error, "", vec!["a".into(), "b".into()])
                .with_corrective("record"),
            ViolationReport::new("Manual", Severity::Warning, "", vec!["c".into()]),
            ViolationReport::new("Unregistered", Severity::Warning, "", vec!["d".into()])
                .with_corrective("nobody_home"),
            ViolationReport::new("Refuses", Severity::Error, "", vec!["e".into()])
                .with_corrective("refuse"),
        ])
    }

    fn registry(seen: Rc<RefCell<Vec<String>>>) -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        registry.register_corrective("record", move |_scene, items| {
            seen.borrow_mut().extend(items.iter().cloned());
            true
        });
        registry.register_corrective("refuse", |_scene, _items| false);
        registry
    }

    #[test]
    fn test_adjust_passes_all_items_and_marks_stale() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let registry = registry(seen.clone());
        let mut scene = SceneGraph::new();
        let mut board = board();
        assert!(!board.is_stale());

        let outcome = board.adjust(0, &mut scene, &registry).unwrap();
        assert_eq!(outcome.rule_name, "Fixable");
        assert_eq!(outcome.corrective, "record");
        assert_eq!(outcome.items, 2);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
        assert!(board.is_stale());
        // Reports are not recomputed
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_adjust_without_corrective() {
        let registry = registry(Rc::default());
        let mut scene = SceneGraph::new();
        let mut board = board();

        assert!(matches!(
            board.adjust(1, &mut scene, &registry),
            Err(SceneCheckError::NoCorrective(name)) if name == "Manual"
        ));
        assert!(matches!(
            board.adjust(2, &mut scene, &registry),
            Err(SceneCheckError::NoCorrective(_))
        ));
        assert!(!board.is_stale());
    }

    #[test]
    fn test_adjust_failure_is_loud() {
        let registry = registry(Rc::default());
        let mut scene = SceneGraph::new();
        let mut board = board();

        assert!(matches!(
            board.adjust(3, &mut scene, &registry),
            Err(SceneCheckError::AdjustFailed(name)) if name == "Refuses"
        ));
        assert!(board.is_stale());
    }

    #[test]
    fn test_adjust_out_of_range() {
        let registry = registry(Rc::default());
        let mut scene = SceneGraph::new();
        assert!(matches!(
            board().adjust(9, &mut scene, &registry),
            Err(SceneCheckError::ReportNotFound(9))
        ));
    }

    #[test]
    fn test_queries() {
        let board = board();
        assert_eq!(board.position("Manual"), Some(1));
        assert_eq!(board.by_severity(Severity::Error).len(), 2);
        assert_eq!(board.fixable().len(), 3);
        assert_eq!(board.summary().items, 5);
    }

    #[test]
    fn test_from_cancelled_session_is_partial() {
        let mut registry = CheckRegistry::new();
        registry.register_predicate("hit", |_scene, rule| {
            Ok(vec![ViolationReport::for_rule(rule, vec!["x".into()])])
        });
        let rules = vec![
            Rule::new("A", Severity::Error, "hit"),
            Rule::new("B", Severity::Error, "hit"),
        ];
        let scene = SceneGraph::new();
        let session = CheckRunner::new(&registry, rules).run_with_progress(&scene, |i, _, _| i < 2);

        let board = ResultBoard::from_session(session);
        assert!(board.is_partial());
        assert_eq!(board.len(), 1);
    }
}
