//! Per-node outcomes inside a predicate

use scenecheck_core::SceneCheckError;

/// Result of inspecting a single node.
///
/// `Skipped` nodes are left out of the report instead of failing the whole
/// rule, so one broken mesh does not hide problems on the rest of the scene.
#[derive(Debug)]
pub enum Probe<T> {
    Offending(T),
    Clean,
    Skipped(SceneCheckError),
}

impl<T> Probe<T> {
    pub fn from_result(result: scenecheck_core::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Probe::Offending(value),
            Ok(None) => Probe::Clean,
            Err(err) => Probe::Skipped(err),
        }
    }

    pub fn is_offending(&self) -> bool {
        matches!(self, Probe::Offending(_))
    }
}

/// Flatten the offending items of many probes, logging skipped nodes
pub fn collect_items<I, T>(check: &str, probes: I) -> Vec<String>
where
    I: IntoIterator<Item = Probe<T>>,
    T: IntoIterator<Item = String>,
{
    let mut items = Vec::new();
    for probe in probes {
        match probe {
            Probe::Offending(found) => items.extend(found),
            Probe::Clean => {}
            Probe::Skipped(err) => {
                tracing::debug!(check, error = %err, "node skipped");
            }
        }
    }
    items
}
