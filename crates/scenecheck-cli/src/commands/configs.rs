//! Rule set listing command

use anyhow::Result;
use scenecheck_rules::list_configs;
use std::path::Path;

pub fn run(config_dir: &Path, format: &str) -> Result<()> {
    let configs = list_configs(config_dir);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&configs)?);
        return Ok(());
    }

    if configs.is_empty() {
        println!("No rule sets found in {}", config_dir.display());
        return Ok(());
    }

    for config in &configs {
        println!("{:<20} {}", config.id, config.name);
        if !config.description.is_empty() {
            println!("{:<20} {}", "", config.description);
        }
    }
    Ok(())
}
