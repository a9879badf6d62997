//! QC Engine
//!
//! Runs the registered timing rules over a document and collects a report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{
    CharactersPerLineRule, CharactersPerSecondRule, MaxLinesRule, MinDurationRule, MinGapRule,
    OverlapRule, TimingRule,
};
use super::violation::{QCViolation, Severity};
use crate::core::{document::Document, settings::TimingSettings, CoreError, CoreResult};

/// Configuration for the QC engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QCEngineConfig {
    /// Violations below this severity are dropped from the report
    pub min_severity: Severity,
    /// Rules to skip entirely
    pub disabled_rules: Vec<String>,
}

impl Default for QCEngineConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            disabled_rules: Vec::new(),
        }
    }
}

impl QCEngineConfig {
    pub fn disable_rule(&mut self, rule_name: &str) {
        if self.is_rule_enabled(rule_name) {
            self.disabled_rules.push(rule_name.to_string());
        }
    }

    pub fn enable_rule(&mut self, rule_name: &str) {
        self.disabled_rules.retain(|r| r != rule_name);
    }

    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule_name)
    }
}

/// QC check report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QCReport {
    pub checked_at: chrono::DateTime<chrono::Utc>,
    /// Number of subtitles checked
    pub subtitle_count: usize,
    pub violations: Vec<QCViolation>,
    /// Count by severity
    pub severity_counts: HashMap<String, usize>,
    pub skipped_rules: Vec<String>,
    /// False when any violation is an error
    pub passed: bool,
}

impl QCReport {
    fn new(subtitle_count: usize) -> Self {
        Self {
            checked_at: chrono::Utc::now(),
            subtitle_count,
            violations: Vec::new(),
            severity_counts: HashMap::new(),
            skipped_rules: Vec::new(),
            passed: true,
        }
    }

    fn add_violation(&mut self, violation: QCViolation) {
        *self
            .severity_counts
            .entry(violation.severity.to_string())
            .or_insert(0) += 1;
        if violation.severity >= Severity::Error {
            self.passed = false;
        }
        self.violations.push(violation);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.severity_counts
            .get(&severity.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_violations(&self) -> usize {
        self.violations.len()
    }

    pub fn violations_for_rule<'a>(&'a self, rule_name: &'a str) -> impl Iterator<Item = &'a QCViolation> + 'a {
        self.violations.iter().filter(move |v| v.rule_name == rule_name)
    }

    pub fn summary(&self) -> String {
        format!(
            "QC Report: {} ({} violations - {} error, {} warning, {} info)",
            if self.passed { "PASSED" } else { "FAILED" },
            self.total_violations(),
            self.count(Severity::Error),
            self.count(Severity::Warning),
            self.count(Severity::Info)
        )
    }
}

/// Runs timing rules against documents
pub struct QCEngine {
    rules: Vec<Box<dyn TimingRule>>,
    config: QCEngineConfig,
}

impl QCEngine {
    /// Creates an engine with the built-in rules
    pub fn new() -> Self {
        Self::with_config(QCEngineConfig::default())
    }

    pub fn with_config(config: QCEngineConfig) -> Self {
        let mut engine = Self {
            rules: Vec::new(),
            config,
        };
        engine.register_rule(Box::new(MinGapRule));
        engine.register_rule(Box::new(OverlapRule));
        engine.register_rule(Box::new(MinDurationRule));
        engine.register_rule(Box::new(CharactersPerSecondRule));
        engine.register_rule(Box::new(CharactersPerLineRule));
        engine.register_rule(Box::new(MaxLinesRule));
        engine
    }

    pub fn register_rule(&mut self, rule: Box<dyn TimingRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn config(&self) -> &QCEngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut QCEngineConfig {
        &mut self.config
    }

    /// Runs every enabled rule with the document's own timing settings
    pub fn check(&self, document: &Document) -> QCReport {
        self.check_with(document, document.timing_settings())
    }

    pub fn check_with(&self, document: &Document, settings: &TimingSettings) -> QCReport {
        let mut report = QCReport::new(document.subtitles().size());

        for rule in &self.rules {
            let rule_name = rule.name();
            if !self.config.is_rule_enabled(rule_name) {
                report.skipped_rules.push(rule_name.to_string());
                continue;
            }
            for violation in rule.check(document, settings) {
                if violation.severity.meets_threshold(self.config.min_severity) {
                    report.add_violation(violation);
                }
            }
        }

        debug!(summary = %report.summary(), "QC check finished");
        report
    }

    /// Runs a single rule by name
    pub fn check_rule(&self, rule_name: &str, document: &Document) -> CoreResult<Vec<QCViolation>> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.name() == rule_name)
            .ok_or_else(|| CoreError::Validation(format!("QC rule not found: {}", rule_name)))?;
        Ok(rule.check(document, document.timing_settings()))
    }
}

impl Default for QCEngine {
    fn default() -> Self {
        Self::new()
    }
}
