//! JSON output for verify results.
//!
//! Serializes every visible violation with its acknowledge mark, plus the
//! scan summary, for scripting and piping.

use serde::Serialize;

use crate::rules::Violation;
use crate::scan::ScanResult;
use crate::store::VerifyResults;

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    violation: &'a Violation,
    ignored: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    violations: Vec<JsonRow<'a>>,
    diagnostics: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u128>,
    people_checked: usize,
    families_checked: usize,
    cancelled: bool,
}

pub fn render(result: &ScanResult, results: &VerifyResults) -> String {
    let rows = results.rows();
    let report = JsonReport {
        violations: results
            .visible()
            .into_iter()
            .map(|i| JsonRow {
                violation: &rows[i].violation,
                ignored: rows[i].ignored,
            })
            .collect(),
        diagnostics: &result.diagnostics,
        duration_ms: result.duration_ms,
        people_checked: result.people_checked,
        families_checked: result.families_checked,
        cancelled: result.cancelled,
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ObjectKind, RuleKey, Severity};
    use crate::store::IgnoreSet;

    #[test]
    fn renders_rows_with_marks() {
        let mut results = VerifyResults::new(IgnoreSet::new());
        results.add(Violation {
            message: "Unknown gender".into(),
            object_id: "I1".into(),
            name: "Holm, Ada".into(),
            kind: ObjectKind::Person,
            rule: RuleKey::new(8, vec![]),
            severity: Severity::Warning,
            handle: "h1".into(),
        });
        results.mark_all();

        let mut scan = ScanResult::empty();
        scan.people_checked = 1;

        let value: serde_json::Value = serde_json::from_str(&render(&scan, &results)).unwrap();
        assert_eq!(value["people_checked"], 1);
        assert_eq!(value["violations"][0]["message"], "Unknown gender");
        assert_eq!(value["violations"][0]["ignored"], true);
        assert_eq!(value["violations"][0]["rule"]["id"], 8);
        assert!(value.get("duration_ms").is_none());
    }
}
