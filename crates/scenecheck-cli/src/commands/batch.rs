//! Batch check command

use anyhow::{Context, Result};
use scenecheck_rules::{batch_check_multiple, run_batch_check, BatchRequest, CheckRegistry};
use scenecheck_scene::SceneGraph;
use std::path::PathBuf;

pub struct BatchArgs {
    pub scenes: Vec<PathBuf>,
    pub config_dir: PathBuf,
    pub config: String,
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: BatchArgs) -> Result<()> {
    let registry = CheckRegistry::builtin();

    if let [scene_file] = args.scenes.as_slice() {
        if args.output_dir.is_none() {
            let mut request = BatchRequest::new(&args.config_dir)
                .with_config(&args.config)
                .with_scene(scene_file);
            if let Some(output) = &args.output {
                request = request.with_output(output);
            }
            let mut scene = SceneGraph::new();
            let written = run_batch_check(&mut scene, &registry, &request)
                .with_context(|| format!("batch check failed for {}", scene_file.display()))?;
            println!("Results written to {}", written.display());
            return Ok(());
        }
    }

    if args.output.is_some() {
        anyhow::bail!("--output takes a single scene; use --output-dir for several");
    }

    let written = batch_check_multiple(
        &registry,
        &args.scenes,
        &args.config_dir,
        &args.config,
        args.output_dir.as_deref(),
    );

    for path in &written {
        println!("Results written to {}", path.display());
    }
    println!("{}/{} scene(s) checked.", written.len(), args.scenes.len());

    if written.len() < args.scenes.len() {
        anyhow::bail!("{} scene(s) failed", args.scenes.len() - written.len());
    }
    Ok(())
}
