//! Default metric set requested from the backend at the end of a run.
//!
//! Values are opaque to this crate: whatever the backend returns is written out
//! unchanged. Keys the backend does not know are simply absent from its answer.

/// Metric keys requested when `SONAR_METRICS` is not set.
pub const DEFAULT_METRICS: &[&str] = &[
    "new_technical_debt", "analysis_from_sonarqube_9_4", "blocker_violations", "bugs",
    "classes", "code_smells", "cognitive_complexity", "comment_lines", "comment_lines_density",
    "comment_lines_data", "class_complexity", "file_complexity", "function_complexity",
    "complexity_in_classes", "complexity_in_functions", "branch_coverage",
    "new_branch_coverage", "conditions_to_cover", "new_conditions_to_cover",
    "confirmed_issues", "coverage", "new_coverage", "critical_violations", "complexity",
    "last_commit_date", "development_cost", "new_development_cost", "directories",
    "duplicated_blocks", "new_duplicated_blocks", "duplicated_files", "duplicated_lines",
    "duplicated_lines_density", "new_duplicated_lines_density", "new_duplicated_lines",
    "duplications_data", "effort_to_reach_maintainability_rating_a", "executable_lines_data",
    "false_positive_issues", "file_complexity_distribution", "files",
    "function_complexity_distribution", "functions", "generated_lines", "generated_ncloc",
    "info_violations", "violations", "line_coverage", "new_line_coverage", "lines", "ncloc",
    "ncloc_language_distribution", "lines_to_cover", "new_lines_to_cover", "sqale_rating",
    "new_maintainability_rating", "major_violations", "minor_violations", "ncloc_data",
    "new_blocker_violations", "new_bugs", "new_code_smells", "new_critical_violations",
    "new_info_violations", "new_violations", "new_lines", "new_major_violations",
    "new_minor_violations", "new_security_hotspots", "new_vulnerabilities", "unanalyzed_c",
    "unanalyzed_cpp", "open_issues", "quality_profiles", "projects", "public_api",
    "public_documented_api_density", "public_undocumented_api", "quality_gate_details",
    "alert_status", "reliability_rating", "new_reliability_rating",
    "reliability_remediation_effort", "new_reliability_remediation_effort", "reopened_issues",
    "security_hotspots", "security_hotspots_reviewed", "new_security_hotspots_reviewed",
    "security_rating", "new_security_rating", "security_remediation_effort",
    "new_security_remediation_effort", "security_review_rating", "new_security_review_rating",
    "security_hotspots_reviewed_status", "new_security_hotspots_reviewed_status",
    "security_hotspots_to_review_status", "new_security_hotspots_to_review_status",
    "skipped_tests", "statements", "vulnerabilities", "high_impact_accepted_issues",
    "software_quality_blocker_issues", "software_quality_high_issues",
    "software_quality_info_issues", "software_quality_medium_issues",
    "software_quality_low_issues", "software_quality_maintainability_issues",
    "software_quality_reliability_issues", "software_quality_security_issues",
    "new_software_quality_blocker_issues", "new_software_quality_high_issues",
    "new_software_quality_info_issues", "new_software_quality_medium_issues",
    "new_software_quality_low_issues", "new_software_quality_maintainability_issues",
    "new_software_quality_reliability_issues", "new_software_quality_security_issues",
    "sqale_index", "sqale_debt_ratio", "new_sqale_debt_ratio", "accepted_issues",
    "new_accepted_issues", "reliability_issues", "maintainability_issues", "security_issues",
    "uncovered_lines", "new_uncovered_lines", "uncovered_conditions",
    "new_uncovered_conditions", "tests", "test_errors", "test_failures", "test_execution_time",
    "test_success_density", "wont_fix_issues", "pull_request_fixed_issues",
];

/// Owned copy of [`DEFAULT_METRICS`].
#[must_use]
pub fn default_metrics() -> Vec<String> {
    DEFAULT_METRICS.iter().map(|m| (*m).to_string()).collect()
}

/// Parse a comma-separated metric list, dropping blanks and duplicates while
/// keeping first-seen order.
#[must_use]
pub fn parse_metric_list(raw: &str) -> Vec<String> {
    let mut metrics: Vec<String> = Vec::new();
    for metric in raw.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        if !metrics.iter().any(|existing| existing == metric) {
            metrics.push(metric.to_string());
        }
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_metrics_are_unique() {
        let unique: HashSet<&str> = DEFAULT_METRICS.iter().copied().collect();
        assert_eq!(unique.len(), DEFAULT_METRICS.len());
    }

    #[test]
    fn test_default_metrics_cover_core_families() {
        for metric in ["bugs", "vulnerabilities", "code_smells", "coverage", "ncloc", "complexity"] {
            assert!(DEFAULT_METRICS.contains(&metric), "missing {metric}");
        }
    }

    #[test]
    fn test_parse_metric_list() {
        assert_eq!(
            parse_metric_list(" bugs, coverage,,bugs ,ncloc"),
            vec!["bugs".to_string(), "coverage".to_string(), "ncloc".to_string()]
        );
        assert!(parse_metric_list(" , ").is_empty());
    }
}
