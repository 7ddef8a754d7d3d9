//! Check registry mapping predicate and corrective identifiers to functions

use crate::report::ViolationReport;
use crate::types::Rule;
use crate::{correctives, predicates};
use scenecheck_core::Result;
use scenecheck_scene::SceneGraph;
use std::collections::HashMap;
use std::fmt;

/// A read-only check over the scene
pub type PredicateFn = dyn Fn(&SceneGraph, &Rule) -> Result<Vec<ViolationReport>>;

/// A scene mutation for a list of reported items. Returns true if anything was fixed.
pub type CorrectiveFn = dyn Fn(&mut SceneGraph, &[String]) -> bool;

/// Registry of named predicates and correctives
#[derive(Default)]
pub struct CheckRegistry {
    predicates: HashMap<String, Box<PredicateFn>>,
    correctives: HashMap<String, Box<CorrectiveFn>>,
}

impl CheckRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in check and fix
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        predicates::register(&mut registry);
        correctives::register(&mut registry);
        registry
    }

    /// Register a predicate, replacing any existing one with the same name
    pub fn register_predicate<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&SceneGraph, &Rule) -> Result<Vec<ViolationReport>> + 'static,
    {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    /// Register a corrective, replacing any existing one with the same name
    pub fn register_corrective<F>(&mut self, name: impl Into<String>, corrective: F)
    where
        F: Fn(&mut SceneGraph, &[String]) -> bool + 'static,
    {
        self.correctives.insert(name.into(), Box::new(corrective));
    }

    pub fn lookup(&self, name: &str) -> Option<&PredicateFn> {
        self.predicates.get(name).map(|p| p.as_ref())
    }

    pub fn lookup_corrective(&self, name: &str) -> Option<&CorrectiveFn> {
        self.correctives.get(name).map(|c| c.as_ref())
    }

    /// Predicate names, sorted
    pub fn predicate_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Corrective names, sorted
    pub fn corrective_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.correctives.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("predicates", &self.predicate_names())
            .field("correctives", &self.corrective_names())
            .finish()
    }
}
