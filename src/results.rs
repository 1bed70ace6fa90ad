use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::Style;
use serde::Serialize;

/// Outcome of a single check. Results are appended in execution order and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Full run report written to results/report.json.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub started_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub checks: Vec<TestResult>,
}

impl RunReport {
    pub fn new(base_url: &str, started_at: String, checks: Vec<TestResult>) -> Self {
        let passed = checks.iter().filter(|c| c.passed).count();
        RunReport {
            base_url: base_url.to_string(),
            started_at,
            total: checks.len(),
            passed,
            failed: checks.len() - passed,
            checks,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

/// Print one PASS/FAIL line the moment a check resolves.
pub fn print_result(result: &TestResult) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();

    if result.passed {
        println!("  {} {}: {}", green.apply_to("PASS"), result.name, result.detail);
    } else {
        println!("  {} {}: {}", red.apply_to("FAIL"), result.name, result.detail);
    }
}

/// Print the final summary block after all checks have run.
pub fn print_summary(report: &RunReport) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();

    println!();
    println!("Summary:");
    println!("{}", "-".repeat(60));

    for check in &report.checks {
        let status = if check.passed {
            green.apply_to("[PASS]")
        } else {
            red.apply_to("[FAIL]")
        };
        println!("{} {}", status, check.name);
        if !check.passed {
            if let Some(first_line) = check.detail.lines().next() {
                println!("       {first_line}");
            }
        }
    }

    println!("{}", "-".repeat(60));
    println!("{}/{} checks passed", report.passed, report.total);
    println!();
}

/// Write the report as pretty-printed JSON under `<output_dir>/results/`.
pub fn write_report(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let results_dir = output_dir.join("results");
    fs::create_dir_all(&results_dir)
        .with_context(|| format!("Failed to create results directory {}", results_dir.display()))?;

    let path = results_dir.join("report.json");
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(path)
}
