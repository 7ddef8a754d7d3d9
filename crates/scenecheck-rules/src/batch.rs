//! Non-interactive batch checks with CSV output

use crate::config::{load_rule_config, DEFAULT_CONFIG};
use crate::export;
use crate::registry::CheckRegistry;
use crate::runner::CheckRunner;
use scenecheck_core::{Result, SceneCheckError};
use scenecheck_scene::{load_scene, SceneGraph};
use std::path::{Path, PathBuf};

/// Parameters for one batch check
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub config_dir: PathBuf,
    pub config_name: String,
    /// Output path; defaults to `<scene stem>_check_results.csv`
    pub output_csv: Option<PathBuf>,
    /// Scene to open; when absent the scene already in memory is checked
    pub scene_file: Option<PathBuf>,
}

impl BatchRequest {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            config_name: DEFAULT_CONFIG.to_string(),
            output_csv: None,
            scene_file: None,
        }
    }

    pub fn with_config(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_csv = Some(path.into());
        self
    }

    pub fn with_scene(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene_file = Some(path.into());
        self
    }
}

/// Run every rule of a rule set and write the results as CSV.
///
/// When the request names a scene file it replaces `scene`, the way opening a
/// file replaces the scene in an editor. Returns the path written.
pub fn run_batch_check(
    scene: &mut SceneGraph,
    registry: &CheckRegistry,
    request: &BatchRequest,
) -> Result<PathBuf> {
    if let Some(file) = &request.scene_file {
        if !file.exists() {
            return Err(SceneCheckError::SceneNotFound(file.clone()));
        }
        let (loaded, _) = load_scene(file)?;
        *scene = loaded;
    }

    let config = load_rule_config(&request.config_dir, &request.config_name);
    let session = CheckRunner::new(registry, config.rules()).run(scene);

    let output = request
        .output_csv
        .clone()
        .unwrap_or_else(|| default_output_path(scene));
    export::write_csv(&output, session.reports())?;

    tracing::info!(
        config = %request.config_name,
        output = %output.display(),
        reports = session.reports().len(),
        "batch check complete"
    );
    Ok(output)
}

/// `<scene stem>_check_results.csv`, or `untitled_check_results.csv` for an
/// unsaved scene
pub fn default_output_path(scene: &SceneGraph) -> PathBuf {
    PathBuf::from(output_file_name(scene.source_path()))
}

fn output_file_name(scene_path: Option<&Path>) -> String {
    let stem = scene_path
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    format!("{}_check_results.csv", stem)
}

/// Check several scene files, writing one CSV per scene.
///
/// Output goes to `output_dir` when given, otherwise next to each scene.
/// A scene that fails is logged and skipped; the written paths are returned.
pub fn batch_check_multiple<P: AsRef<Path>>(
    registry: &CheckRegistry,
    scene_files: &[P],
    config_dir: &Path,
    config_name: &str,
    output_dir: Option<&Path>,
) -> Vec<PathBuf> {
    let mut written = Vec::new();

    for scene_file in scene_files {
        let scene_file = scene_file.as_ref();
        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => scene_file.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let request = BatchRequest::new(config_dir)
            .with_config(config_name)
            .with_scene(scene_file)
            .with_output(dir.join(output_file_name(Some(scene_file))));

        let mut scene = SceneGraph::new();
        match run_batch_check(&mut scene, registry, &request) {
            Ok(path) => {
                tracing::info!(scene = %scene_file.display(), "check complete");
                written.push(path);
            }
            Err(err) => {
                tracing::warn!(scene = %scene_file.display(), error = %err, "check failed");
            }
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Some(Path::new("/scenes/level01.toml"))),
            "level01_check_results.csv"
        );
        assert_eq!(output_file_name(None), "untitled_check_results.csv");
    }

    #[test]
    fn test_default_output_uses_scene_source() {
        let mut scene = SceneGraph::new();
        assert_eq!(
            default_output_path(&scene),
            PathBuf::from("untitled_check_results.csv")
        );
        scene.set_source_path("/work/city_block.toml");
        assert_eq!(
            default_output_path(&scene),
            PathBuf::from("city_block_check_results.csv")
        );
    }

    #[test]
    fn test_request_builder() {
        let request = BatchRequest::new("configs");
        assert_eq!(request.config_name, "bg_checks");
        assert!(request.scene_file.is_none());

        let request = request.with_config("motion_checks").with_output("out.csv");
        assert_eq!(request.config_name, "motion_checks");
        assert_eq!(request.output_csv, Some(PathBuf::from("out.csv")));
    }
}
