//! QC Rules
//!
//! Built-in timing rules. Each rule reads the document and the thresholds
//! from `TimingSettings`; none of them edits anything.

use super::violation::{QCViolation, Severity};
use crate::core::{
    document::{Document, Subtitle},
    settings::TimingSettings,
};

/// Trait for all timing rules
pub trait TimingRule: Send + Sync {
    /// Returns the unique name of this rule
    fn name(&self) -> &str;

    /// Returns a human-readable description
    fn description(&self) -> &str;

    /// Returns the default severity for violations from this rule
    fn default_severity(&self) -> Severity;

    /// Checks the document for violations
    fn check(&self, document: &Document, settings: &TimingSettings) -> Vec<QCViolation>;
}

fn violation(rule: &dyn TimingRule, subtitle: &Subtitle<'_>, message: String) -> QCViolation {
    QCViolation::new(rule.name(), rule.default_severity(), message)
        .with_subtitle(subtitle.id(), subtitle.num())
        .with_location(subtitle.start().totalmsecs(), subtitle.end().totalmsecs())
}

// ============================================================================
// MinGapRule
// ============================================================================

/// Consecutive subtitles separated by less than the minimum gap
#[derive(Debug, Default)]
pub struct MinGapRule;

impl TimingRule for MinGapRule {
    fn name(&self) -> &str {
        "min-gap"
    }

    fn description(&self) -> &str {
        "Checks the gap between consecutive subtitles"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document, settings: &TimingSettings) -> Vec<QCViolation> {
        let min_gap = settings.min_gap_between_subtitles;
        document
            .subtitles()
            .iter()
            .filter(|sub| !sub.is_last())
            .filter_map(|sub| {
                let gap = sub.gap_after().totalmsecs();
                // Negative gaps belong to the overlap rule
                if gap < 0 || sub.check_gap_after(min_gap) {
                    return None;
                }
                Some(
                    violation(self, &sub, format!("Gap to next subtitle too short ({} ms)", gap))
                        .with_details(format!("Minimum gap is {} ms", min_gap)),
                )
            })
            .collect()
    }
}

// ============================================================================
// OverlapRule
// ============================================================================

/// Subtitles ending after the next one starts
#[derive(Debug, Default)]
pub struct OverlapRule;

impl TimingRule for OverlapRule {
    fn name(&self) -> &str {
        "overlap"
    }

    fn description(&self) -> &str {
        "Detects subtitles that overlap the next one"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, document: &Document, _settings: &TimingSettings) -> Vec<QCViolation> {
        document
            .subtitles()
            .iter()
            .filter(|sub| !sub.is_last() && sub.gap_after().totalmsecs() < 0)
            .map(|sub| {
                let overlap = -sub.gap_after().totalmsecs();
                violation(
                    self,
                    &sub,
                    format!("Overlaps the next subtitle by {} ms", overlap),
                )
            })
            .collect()
    }
}

// ============================================================================
// MinDurationRule
// ============================================================================

/// Subtitles displayed for less than the minimum display time
#[derive(Debug, Default)]
pub struct MinDurationRule;

impl TimingRule for MinDurationRule {
    fn name(&self) -> &str {
        "min-duration"
    }

    fn description(&self) -> &str {
        "Checks that each subtitle stays on screen long enough"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document, settings: &TimingSettings) -> Vec<QCViolation> {
        document
            .subtitles()
            .iter()
            .filter(|sub| !sub.check_duration(settings.min_display))
            .map(|sub| {
                violation(
                    self,
                    &sub,
                    format!(
                        "Too short ({} ms < {} ms minimum)",
                        sub.duration().totalmsecs(),
                        settings.min_display
                    ),
                )
            })
            .collect()
    }
}

// ============================================================================
// CharactersPerSecondRule
// ============================================================================

/// Reading speed outside the configured range
#[derive(Debug, Default)]
pub struct CharactersPerSecondRule;

impl TimingRule for CharactersPerSecondRule {
    fn name(&self) -> &str {
        "characters-per-second"
    }

    fn description(&self) -> &str {
        "Checks reading speed against the minimum and maximum"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, document: &Document, settings: &TimingSettings) -> Vec<QCViolation> {
        let (min, max) = (
            settings.min_characters_per_second,
            settings.max_characters_per_second,
        );
        document
            .subtitles()
            .iter()
            .filter(|sub| !sub.text().is_empty())
            .filter_map(|sub| {
                let cps = sub.characters_per_second_text();
                let message = match sub.check_cps_text(min, max) {
                    1 => format!("Reading speed too fast ({:.1} > {:.1} cps)", cps, max),
                    -1 => format!("Reading speed too slow ({:.1} < {:.1} cps)", cps, min),
                    _ => return None,
                };
                Some(violation(self, &sub, message))
            })
            .collect()
    }
}

// ============================================================================
// CharactersPerLineRule
// ============================================================================

#[derive(Debug, Default)]
pub struct CharactersPerLineRule;

impl TimingRule for CharactersPerLineRule {
    fn name(&self) -> &str {
        "characters-per-line"
    }

    fn description(&self) -> &str {
        "Checks the visible length of each text line"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, document: &Document, settings: &TimingSettings) -> Vec<QCViolation> {
        let max = settings.max_characters_per_line;
        document
            .subtitles()
            .iter()
            .filter(|sub| !sub.check_characters_per_line(max))
            .map(|sub| {
                let longest = sub
                    .characters_per_line_text()
                    .iter()
                    .copied()
                    .max()
                    .unwrap_or(0);
                violation(
                    self,
                    &sub,
                    format!("Line too long ({} > {} characters)", longest, max),
                )
            })
            .collect()
    }
}

// ============================================================================
// MaxLinesRule
// ============================================================================

#[derive(Debug, Default)]
pub struct MaxLinesRule;

impl TimingRule for MaxLinesRule {
    fn name(&self) -> &str {
        "max-lines"
    }

    fn description(&self) -> &str {
        "Checks the number of text lines per subtitle"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, document: &Document, settings: &TimingSettings) -> Vec<QCViolation> {
        let max = settings.max_line_per_subtitle;
        document
            .subtitles()
            .iter()
            .filter(|sub| sub.characters_per_line_text().len() > max)
            .map(|sub| {
                violation(
                    self,
                    &sub,
                    format!(
                        "Too many lines ({} > {})",
                        sub.characters_per_line_text().len(),
                        max
                    ),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::SubtitleTime;

    fn document_with(rows: &[(i64, i64, &str)]) -> Document {
        let mut document = Document::new();
        for (start, end, text) in rows {
            let id = document.subtitles_mut().append().unwrap();
            let mut sub = document.subtitle_mut(id).unwrap();
            sub.set_start_and_end(SubtitleTime::new(*start), SubtitleTime::new(*end))
                .unwrap();
            sub.set_text(text).unwrap();
        }
        document
    }

    #[test]
    fn min_gap_flags_short_gaps_only() {
        let document = document_with(&[(0, 1000, "a"), (1050, 2000, "b"), (2500, 3500, "c")]);
        let violations = MinGapRule.check(&document, &TimingSettings::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].subtitle_num, Some(1));
        assert_eq!(violations[0].rule_name, "min-gap");
    }

    #[test]
    fn overlap_is_not_reported_as_min_gap() {
        let document = document_with(&[(0, 1500, "a"), (1000, 2000, "b")]);
        let settings = TimingSettings::default();
        assert!(MinGapRule.check(&document, &settings).is_empty());

        let overlaps = OverlapRule.check(&document, &settings);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].severity, Severity::Error);
        assert!(overlaps[0].message.contains("500 ms"));
    }

    #[test]
    fn min_duration_uses_min_display() {
        let document = document_with(&[(0, 800, "short"), (2000, 4000, "long enough")]);
        let violations = MinDurationRule.check(&document, &TimingSettings::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.map(|l| l.end_ms), Some(800));
    }

    #[test]
    fn cps_rule_reports_fast_subtitles() {
        // 30 visible characters over 1 second
        let document = document_with(&[(0, 1000, "abcdefghijklmnopqrstuvwxyzabcd")]);
        let violations = CharactersPerSecondRule.check(&document, &TimingSettings::default());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("too fast"));
    }

    #[test]
    fn line_rules_count_lines_and_length() {
        let settings = TimingSettings {
            max_characters_per_line: 5,
            max_line_per_subtitle: 2,
            ..TimingSettings::default()
        };
        let document = document_with(&[(0, 2000, "one\ntwo\nthree"), (3000, 5000, "toolong")]);

        let lines = MaxLinesRule.check(&document, &settings);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].subtitle_num, Some(1));

        let length = CharactersPerLineRule.check(&document, &settings);
        assert_eq!(length.len(), 1);
        assert_eq!(length[0].subtitle_num, Some(2));
    }
}
