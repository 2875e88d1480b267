//! One line per violation, for grepping:
//!
//! ```text
//! E: Death before birth, Person: I0001, Holm, Ada
//! ```

use crate::rules::Violation;
use crate::store::VerifyResults;

pub fn line(violation: &Violation) -> String {
    format!(
        "{}: {}, {}: {}, {}",
        violation.severity.letter(),
        violation.message,
        violation.kind,
        violation.object_id,
        violation.name
    )
}

pub fn render(results: &VerifyResults) -> String {
    let rows = results.rows();
    results
        .visible()
        .into_iter()
        .map(|i| line(&rows[i].violation) + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ObjectKind, RuleKey, Severity};
    use crate::store::IgnoreSet;

    #[test]
    fn matches_line_format() {
        let violation = Violation {
            message: "Death before birth".into(),
            object_id: "I0001".into(),
            name: "Holm, Ada".into(),
            kind: ObjectKind::Person,
            rule: RuleKey::new(5, vec![]),
            severity: Severity::Error,
            handle: "h".into(),
        };
        assert_eq!(line(&violation), "E: Death before birth, Person: I0001, Holm, Ada");

        let mut results = VerifyResults::new(IgnoreSet::new());
        results.add(violation.clone());
        results.add(Violation {
            kind: ObjectKind::Family,
            severity: Severity::Warning,
            ..violation
        });
        assert_eq!(
            render(&results),
            "E: Death before birth, Person: I0001, Holm, Ada\n\
             W: Death before birth, Family: I0001, Holm, Ada\n"
        );
    }
}
