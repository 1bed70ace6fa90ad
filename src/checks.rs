use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::client::{
    BENEFITS_FIELD, PRODUCT_TYPES_FIELD, SettingsClient, SettingsUpdate, SiteSettings,
    validate_settings,
};
use crate::progress::request_spinner;
use crate::results::{self, RunReport, TestResult};

/// Root greeting that identifies the right backend.
pub const EXPECTED_ROOT_MESSAGE: &str = "DryFruto API";

/// Literal appended to bulkOrderProductTypes by the update check.
pub const TEST_PRODUCT_TYPE: &str = "Spices";

/// Literal appended to bulkOrderBenefits by the update check.
pub const TEST_BENEFIT: &str = "Free delivery above 50kg";

/// Drives the fixed check sequence against one backend and accumulates
/// per-check results. Connectivity and the initial settings fetch are fatal
/// preconditions; the update and persistence checks are recorded but never
/// halt the run.
pub struct ConformanceSuite {
    client: SettingsClient,
    results: Vec<TestResult>,
    verbose: bool,
}

impl ConformanceSuite {
    pub fn new(base_url: &str, verbose: bool) -> Self {
        ConformanceSuite {
            client: SettingsClient::new(base_url),
            results: Vec::new(),
            verbose,
        }
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    fn record(&mut self, name: &str, passed: bool, detail: String) -> bool {
        let result = TestResult {
            name: name.to_string(),
            passed,
            detail,
        };
        results::print_result(&result);
        self.results.push(result);
        passed
    }

    fn dump_body(&self, body: &str) {
        if self.verbose && !body.is_empty() {
            eprintln!("       body: {}", body.trim_end());
        }
    }

    /// GET {base}/ and expect the DryFruto greeting. Fatal on failure.
    pub async fn check_connectivity(&mut self) -> bool {
        let pb = request_spinner("GET / ...");
        let outcome = self.client.get_root().await;
        pb.finish_and_clear();

        let resp = match outcome {
            Ok(r) => r,
            Err(e) => return self.record("connectivity", false, format!("{e:#}")),
        };
        if !resp.is_ok() {
            self.dump_body(&resp.body);
            let detail = format!("status {}: {}", resp.status, resp.snippet());
            return self.record("connectivity", false, detail);
        }
        let body = match resp.json() {
            Ok(v) => v,
            Err(e) => return self.record("connectivity", false, format!("{e:#}")),
        };

        match body.get("message").and_then(Value::as_str) {
            Some(EXPECTED_ROOT_MESSAGE) => {
                self.record("connectivity", true, "backend API is reachable".to_string())
            }
            Some(other) => {
                let detail = format!("unexpected greeting: {other:?}");
                self.record("connectivity", false, detail)
            }
            None => {
                let detail = format!("no message field in root response: {}", resp.snippet());
                self.record("connectivity", false, detail)
            }
        }
    }

    /// GET {base}/site-settings and validate the bulk-order field shapes.
    /// Returns the parsed settings on pass; `None` is fatal to the run.
    pub async fn fetch_settings(&mut self) -> Option<SiteSettings> {
        let pb = request_spinner("GET /site-settings ...");
        let outcome = self.client.get_settings().await;
        pb.finish_and_clear();

        let resp = match outcome {
            Ok(r) => r,
            Err(e) => {
                self.record("fetch settings", false, format!("{e:#}"));
                return None;
            }
        };
        if !resp.is_ok() {
            self.dump_body(&resp.body);
            let detail = format!("status {}: {}", resp.status, resp.snippet());
            self.record("fetch settings", false, detail);
            return None;
        }
        let body = match resp.json() {
            Ok(v) => v,
            Err(e) => {
                self.record("fetch settings", false, format!("{e:#}"));
                return None;
            }
        };

        match validate_settings(&body) {
            Ok(settings) => {
                let detail = format!(
                    "{} product types, {} benefits",
                    settings.bulk_order_product_types.len(),
                    settings.bulk_order_benefits.len()
                );
                self.record("fetch settings", true, detail);
                Some(settings)
            }
            Err(msg) => {
                self.record("fetch settings", false, msg);
                None
            }
        }
    }

    /// PUT a copy of the current product types with the test literal appended.
    /// Only that field goes into the body. Non-fatal.
    pub async fn update_product_types(&mut self, current: &SiteSettings) -> bool {
        let mut product_types = current.bulk_order_product_types.clone();
        product_types.push(TEST_PRODUCT_TYPE.to_string());
        let update = SettingsUpdate {
            bulk_order_product_types: Some(product_types),
            ..Default::default()
        };
        self.run_update("update product types", &update, PRODUCT_TYPES_FIELD, TEST_PRODUCT_TYPE)
            .await
    }

    /// Same as `update_product_types`, for the benefits list. Uses the
    /// settings from the initial fetch, not the first PUT's response.
    pub async fn update_benefits(&mut self, current: &SiteSettings) -> bool {
        let mut benefits = current.bulk_order_benefits.clone();
        benefits.push(TEST_BENEFIT.to_string());
        let update = SettingsUpdate {
            bulk_order_benefits: Some(benefits),
            ..Default::default()
        };
        self.run_update("update benefits", &update, BENEFITS_FIELD, TEST_BENEFIT)
            .await
    }

    async fn run_update(
        &mut self,
        name: &str,
        update: &SettingsUpdate,
        field: &str,
        literal: &str,
    ) -> bool {
        let pb = request_spinner(&format!("PUT /site-settings ({field}) ..."));
        let outcome = self.client.put_settings(update).await;
        pb.finish_and_clear();

        let resp = match outcome {
            Ok(r) => r,
            Err(e) => return self.record(name, false, format!("{e:#}")),
        };
        if !resp.is_ok() {
            self.dump_body(&resp.body);
            let detail = format!("status {}: {}", resp.status, resp.snippet());
            return self.record(name, false, detail);
        }
        let body = match resp.json() {
            Ok(v) => v,
            Err(e) => return self.record(name, false, format!("{e:#}")),
        };

        if !contains_string(&body, field, literal) {
            let detail = format!("{literal:?} not found in {field} after update");
            return self.record(name, false, detail);
        }
        let total = body
            .get(field)
            .and_then(Value::as_array)
            .map(|a| a.len())
            .unwrap_or(0);
        self.record(name, true, format!("added {literal:?} ({field} now has {total} entries)"))
    }

    /// Fresh GET of the settings resource, no reuse of any prior response.
    /// Passes iff both update literals survived. Non-fatal.
    pub async fn verify_persistence(&mut self) -> bool {
        let pb = request_spinner("GET /site-settings (fresh) ...");
        let outcome = self.client.get_settings().await;
        pb.finish_and_clear();

        let resp = match outcome {
            Ok(r) => r,
            Err(e) => return self.record("persistence", false, format!("{e:#}")),
        };
        if !resp.is_ok() {
            self.dump_body(&resp.body);
            let detail = format!("status {}: {}", resp.status, resp.snippet());
            return self.record("persistence", false, detail);
        }
        let body = match resp.json() {
            Ok(v) => v,
            Err(e) => return self.record("persistence", false, format!("{e:#}")),
        };

        if !contains_string(&body, PRODUCT_TYPES_FIELD, TEST_PRODUCT_TYPE) {
            let detail = format!("{TEST_PRODUCT_TYPE:?} missing from {PRODUCT_TYPES_FIELD}");
            return self.record("persistence", false, detail);
        }
        if !contains_string(&body, BENEFITS_FIELD, TEST_BENEFIT) {
            let detail = format!("{TEST_BENEFIT:?} missing from {BENEFITS_FIELD}");
            return self.record("persistence", false, detail);
        }
        self.record("persistence", true, "both additions survived a fresh fetch".to_string())
    }

    /// Fixed order: connectivity, fetch, both updates, persistence. The two
    /// fatal preconditions abort the remaining checks.
    pub async fn run_all(&mut self) -> bool {
        if !self.check_connectivity().await {
            eprintln!("\nConnectivity check failed, aborting remaining checks.");
            return false;
        }

        let settings = match self.fetch_settings().await {
            Some(s) => s,
            None => {
                eprintln!("\nCould not fetch site settings, aborting remaining checks.");
                return false;
            }
        };

        self.update_product_types(&settings).await;
        self.update_benefits(&settings).await;
        self.verify_persistence().await;

        self.results().iter().all(|r| r.passed)
    }
}

fn contains_string(body: &Value, field: &str, needle: &str) -> bool {
    body.get(field)
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(needle)))
}

/// Run the full suite, print the summary, and optionally write the JSON
/// report. Returns the overall pass flag.
pub async fn run_suite(base_url: &str, report_dir: Option<&Path>, verbose: bool) -> Result<bool> {
    let mut suite = ConformanceSuite::new(base_url, verbose);
    let base_url = suite.client.base_url().to_string();
    println!("Checking {base_url}");
    println!("{}", "-".repeat(60));

    let started_at = chrono::Utc::now().to_rfc3339();
    suite.run_all().await;

    let report = RunReport::new(&base_url, started_at, suite.into_results());
    results::print_summary(&report);

    if let Some(dir) = report_dir {
        let path = results::write_report(&report, dir)?;
        println!("Report written to {}", path.display());
    }

    Ok(report.all_passed())
}

/// Connectivity probe only, for the `check` subcommand.
pub async fn run_connectivity_check(base_url: &str, verbose: bool) -> Result<bool> {
    let mut suite = ConformanceSuite::new(base_url, verbose);
    Ok(suite.check_connectivity().await)
}
