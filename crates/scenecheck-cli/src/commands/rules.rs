//! Rule set inspection command

use anyhow::{Context, Result};
use scenecheck_rules::{try_load_rule_config, CheckRegistry, RuleConfig};
use std::path::Path;

pub fn run(config_dir: &Path, name: &str, format: &str) -> Result<()> {
    let config = try_load_rule_config(config_dir, name)
        .with_context(|| format!("failed to load rule set '{}'", name))?;
    let registry = CheckRegistry::builtin();

    if format == "json" {
        print_rules_json(&config, &registry)
    } else {
        print_rules_text(&config, &registry);
        Ok(())
    }
}

fn print_rules_text(config: &RuleConfig, registry: &CheckRegistry) {
    println!("{}", config.name);
    if !config.description.is_empty() {
        println!("{}", config.description);
    }

    for category in &config.categories {
        println!("\n{}:", category.name);
        for entry in &category.rules {
            let mut notes = Vec::new();
            if registry.lookup(&entry.function).is_none() {
                notes.push("unknown check".to_string());
            }
            if let Some(adjust) = &entry.adjust {
                if registry.lookup_corrective(adjust).is_none() {
                    notes.push(format!("unknown fix {}", adjust));
                }
            }
            let notes = if notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", notes.join(", "))
            };

            println!(
                "  [{}] {} -> {}{}",
                entry.severity, entry.name, entry.function, notes
            );
            if !entry.description.is_empty() {
                println!("          {}", entry.description);
            }
        }
    }
}

fn print_rules_json(config: &RuleConfig, registry: &CheckRegistry) -> Result<()> {
    let rules: Vec<serde_json::Value> = config
        .rules()
        .iter()
        .map(|rule| {
            serde_json::json!({
                "name": rule.name,
                "category": rule.category,
                "severity": rule.severity.as_str(),
                "description": rule.description,
                "function": rule.predicate,
                "adjust": rule.corrective,
                "known": registry.lookup(&rule.predicate).is_some(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "name": config.name,
        "description": config.description,
        "rules": rules,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
