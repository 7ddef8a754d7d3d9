//! Scene check command

use anyhow::{Context, Result};
use scenecheck_rules::{
    load_rule_config, CancelToken, CheckRegistry, CheckRunner, ResultBoard, Rule, Severity,
    ViolationReport,
};
use scenecheck_scene::{diff_scene_text, load_scene, save_scene, save_scene_string, SceneGraph};
use std::path::PathBuf;

/// Exit status after Ctrl-C, as shells report SIGINT
const EXIT_CANCELLED: i32 = 130;

pub struct CheckArgs {
    pub scene: PathBuf,
    pub config_dir: PathBuf,
    pub config: String,
    pub categories: Vec<String>,
    pub only: Vec<String>,
    pub adjust: Vec<String>,
    pub dry_run: bool,
    pub output_diff: bool,
    pub csv: Option<PathBuf>,
    pub format: String,
}

/// An open scene with the rules selected for it
struct CheckSession {
    path: PathBuf,
    scene: SceneGraph,
    registry: CheckRegistry,
    rules: Vec<Rule>,
    cancel: CancelToken,
}

impl CheckSession {
    fn open(path: PathBuf, rules: Vec<Rule>) -> Result<Self> {
        let (scene, _) = load_scene(&path)
            .with_context(|| format!("failed to open scene {}", path.display()))?;
        tracing::debug!(scene = %path.display(), rules = rules.len(), "check session opened");
        Ok(Self {
            path,
            scene,
            registry: CheckRegistry::builtin(),
            rules,
            cancel: CancelToken::new(),
        })
    }

    /// Run the selected rules, printing progress to stderr when asked
    fn check(&self, show_progress: bool) -> ResultBoard {
        let runner = CheckRunner::new(&self.registry, self.rules.clone())
            .with_cancel_token(self.cancel.clone());
        let session = runner.run_with_progress(&self.scene, |current, total, message| {
            if show_progress {
                eprintln!("[{}/{}] {}", current, total, message);
            }
            true
        });
        ResultBoard::from_session(session)
    }
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = load_rule_config(&args.config_dir, &args.config);
    let rules = select_rules(config.rules(), &args.categories, &args.only);

    if rules.is_empty() {
        println!(
            "No rules selected from '{}' in {}",
            args.config,
            args.config_dir.display()
        );
        println!("Check the rule set name or the --category/--only filters.");
        return Ok(());
    }

    let json = args.format == "json";
    let mut session = CheckSession::open(args.scene.clone(), rules)?;
    cancel_on_ctrl_c(session.cancel.clone());
    let mut board = session.check(!json);

    if !json {
        print_board_text(&board);
    }

    if let Some(csv) = &args.csv {
        board
            .export_csv(csv)
            .with_context(|| format!("failed to write {}", csv.display()))?;
        notice(json, &format!("\nResults written to {}", csv.display()));
    }

    let mut failed = 0;
    if !args.adjust.is_empty() && !board.is_partial() {
        let before = if args.output_diff {
            Some(save_scene_string(&session.scene)?)
        } else {
            None
        };

        notice(json, "");
        for name in &args.adjust {
            // Each fix works from a fresh board so its items match the scene
            if board.is_stale() {
                board = session.check(false);
            }
            let Some(index) = board.position(name) else {
                eprintln!("No reported problem for rule '{}'", name);
                failed += 1;
                continue;
            };
            match board.adjust(index, &mut session.scene, &session.registry) {
                Ok(outcome) => notice(
                    json,
                    &format!(
                        "Adjusted '{}' with {} ({} item(s))",
                        outcome.rule_name, outcome.corrective, outcome.items
                    ),
                ),
                Err(err) => {
                    eprintln!("Could not adjust '{}': {}", name, err);
                    failed += 1;
                }
            }
        }

        if board.is_stale() {
            if args.dry_run {
                notice(json, "\nDry run: scene not saved.");
            } else {
                save_scene(&session.path, &session.scene)
                    .with_context(|| format!("failed to save {}", session.path.display()))?;
                notice(json, &format!("\nScene saved to {}", session.path.display()));
            }

            if let Some(before) = before {
                let after = save_scene_string(&session.scene)?;
                let diff = diff_scene_text(&before, &after);
                if diff.is_empty() {
                    notice(json, "\nNo changes.");
                } else {
                    notice(json, "\nDiff:");
                    notice(json, diff.trim_end());
                }
            }

            board = session.check(false);
            if !json {
                println!("\nAfter adjustments:");
                print_board_text(&board);
            }
        }
    }

    if json {
        print_board_json(&args.config, &board)?;
    }

    if failed > 0 {
        anyhow::bail!("{} adjustment(s) failed", failed);
    }
    if let Some(code) = exit_code(&board) {
        std::process::exit(code);
    }

    Ok(())
}

/// Non-zero status for a cancelled check or remaining errors
fn exit_code(board: &ResultBoard) -> Option<i32> {
    if board.is_partial() {
        Some(EXIT_CANCELLED)
    } else if !board.summary().is_clean() {
        Some(1)
    } else {
        None
    }
}

/// Cancel the check on the first Ctrl-C; a second one exits at once
fn cancel_on_ctrl_c(token: CancelToken) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::warn!(error = %err, "Ctrl-C handling unavailable");
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::info!("Received Ctrl-C, cancelling after the current rule");
            token.cancel();

            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(EXIT_CANCELLED);
            }
        });
    });
}

/// Keep rules matching any given category and any given name; empty filters
/// match everything
fn select_rules(rules: Vec<Rule>, categories: &[String], only: &[String]) -> Vec<Rule> {
    rules
        .into_iter()
        .filter(|rule| categories.is_empty() || categories.contains(&rule.category))
        .filter(|rule| only.is_empty() || only.contains(&rule.name))
        .collect()
}

/// Status lines go to stdout for text output and stderr for JSON
fn notice(json: bool, message: &str) {
    if json {
        eprintln!("{}", message);
    } else {
        println!("{}", message);
    }
}

fn print_board_text(board: &ResultBoard) {
    let summary = board.summary();
    println!("{}", summary);
    if board.is_partial() {
        println!("Check was cancelled; results are partial.");
    }
    if board.is_empty() {
        return;
    }

    for severity in [Severity::Error, Severity::Warning] {
        let reports = board.by_severity(severity);
        if reports.is_empty() {
            continue;
        }
        println!();
        for report in reports {
            print_report_text(report);
        }
    }
}

fn print_report_text(report: &ViolationReport) {
    let severity_str = match report.severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARN ",
    };
    let fix_marker = if report.is_fixable() { " [fixable]" } else { "" };

    println!(
        "  [{}] {} ({}){}",
        severity_str,
        report.rule_name,
        report.count(),
        fix_marker
    );
    if !report.description.is_empty() {
        println!("          {}", report.description);
    }
    for item in &report.items {
        println!("          - {}", item);
    }
}

fn print_board_json(config: &str, board: &ResultBoard) -> Result<()> {
    let summary = board.summary();
    let reports: Vec<serde_json::Value> = board
        .reports()
        .iter()
        .map(|r| {
            serde_json::json!({
                "rule": r.rule_name,
                "severity": r.severity.as_str(),
                "description": r.description,
                "count": r.count(),
                "items": r.items,
                "corrective": r.corrective,
            })
        })
        .collect();

    let output = serde_json::json!({
        "config": config,
        "clean": summary.is_clean(),
        "partial": board.is_partial(),
        "summary": summary.to_string(),
        "errors": summary.errors,
        "warnings": summary.warnings,
        "items": summary.items,
        "reports": reports,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
