//! Check runner: evaluates rules in order with progress and cancellation

use crate::registry::CheckRegistry;
use crate::report::{ReportSummary, ViolationReport};
use crate::types::Rule;
use scenecheck_scene::SceneGraph;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The outcome of one run. Created only by [`CheckRunner::run`].
#[derive(Debug, Clone)]
pub struct RunSession {
    rules: Vec<Rule>,
    reports: Vec<ViolationReport>,
    state: RunState,
    evaluated: usize,
}

impl RunSession {
    /// Non-empty reports, in rule order
    pub fn reports(&self) -> &[ViolationReport] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<ViolationReport> {
        self.reports
    }

    /// Rules the run was asked to evaluate
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Either `Completed` or `Cancelled`
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }

    /// How many rules were evaluated before the run finished or stopped
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_reports(&self.reports)
    }
}

/// Evaluates an ordered rule list against a scene.
///
/// A runner is single use: `run` consumes it, so a second run needs a new
/// runner and a new session.
pub struct CheckRunner<'a> {
    registry: &'a CheckRegistry,
    rules: Vec<Rule>,
    cancel: CancelToken,
    state: RunState,
}

impl<'a> CheckRunner<'a> {
    pub fn new(registry: &'a CheckRegistry, rules: Vec<Rule>) -> Self {
        Self {
            registry,
            rules,
            cancel: CancelToken::new(),
            state: RunState::Idle,
        }
    }

    /// Use an existing token, e.g. one held by a signal handler
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this run from elsewhere
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every rule with no progress reporting
    pub fn run(self, scene: &SceneGraph) -> RunSession {
        self.run_with_progress(scene, |_, _, _| true)
    }

    /// Run every rule, calling `progress(current, total, message)` before each.
    ///
    /// Returning false from `progress` cancels the run before that rule is
    /// evaluated. A cancellation raised while a predicate is running takes
    /// effect when it returns, and that predicate's results are discarded.
    pub fn run_with_progress<F>(mut self, scene: &SceneGraph, mut progress: F) -> RunSession
    where
        F: FnMut(usize, usize, &str) -> bool,
    {
        self.state = RunState::Running;
        let total = self.rules.len();
        let mut reports = Vec::new();
        let mut evaluated = 0;

        tracing::debug!(rules = total, "check run started");

        for (i, rule) in self.rules.iter().enumerate() {
            if self.cancel.is_cancelled() {
                self.state = RunState::Cancelled;
                break;
            }
            let message = format!("チェック中: {}", rule.name);
            if !progress(i + 1, total, &message) {
                self.cancel.cancel();
                self.state = RunState::Cancelled;
                break;
            }

            let found = self.evaluate(scene, rule);
            if self.cancel.is_cancelled() {
                self.state = RunState::Cancelled;
                break;
            }

            evaluated += 1;
            reports.extend(found.into_iter().filter(|r| !r.is_empty()));
        }

        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }

        tracing::info!(
            state = ?self.state,
            evaluated,
            total,
            reports = reports.len(),
            "check run finished"
        );

        RunSession {
            rules: self.rules,
            reports,
            state: self.state,
            evaluated,
        }
    }

    /// Evaluate one rule, isolating predicate faults
    fn evaluate(&self, scene: &SceneGraph, rule: &Rule) -> Vec<ViolationReport> {
        let Some(predicate) = self.registry.lookup(&rule.predicate) else {
            tracing::debug!(rule = %rule.name, predicate = %rule.predicate, "unknown predicate; rule skipped");
            return Vec::new();
        };

        match panic::catch_unwind(AssertUnwindSafe(|| predicate(scene, rule))) {
            Ok(Ok(reports)) => reports,
            Ok(Err(err)) => {
                tracing::warn!(rule = %rule.name, error = %err, "predicate failed; no violations recorded");
                Vec::new()
            }
            Err(payload) => {
                tracing::warn!(
                    rule = %rule.name,
                    panic = panic_message(payload.as_ref()),
                    "predicate panicked; no violations recorded"
                );
                Vec::new()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
