//! Terminal table rendering for verify results.
//!
//! Formats output as one block per message:
//! - group header with its mark and the unacknowledged count
//! - one numbered line per visible violation
//! - a summary line at the bottom

use crate::rules::Violation;
use crate::store::{GroupMark, VerifyResults};
use crate::util::truncate;

fn group_glyph(mark: GroupMark) -> &'static str {
    match mark {
        GroupMark::None => "[ ]",
        GroupMark::Partial => "[-]",
        GroupMark::All => "[x]",
    }
}

fn row_glyph(ignored: bool) -> &'static str {
    if ignored {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_row(output: &mut String, number: usize, violation: &Violation, ignored: bool) {
    output.push_str(&format!(
        "  {number:>5} {} {} {:<10} {:<7} {}\n",
        row_glyph(ignored),
        violation.severity.letter(),
        truncate(&violation.object_id, 10),
        violation.kind,
        truncate(&violation.name, 40)
    ));
}

pub fn render(results: &VerifyResults) -> String {
    if results.is_empty() {
        return String::from("No problems found.\n");
    }

    let visible = results.visible();
    let mut output = String::new();

    for group in results.groups() {
        let rows: Vec<usize> = group
            .rows
            .iter()
            .copied()
            .filter(|i| visible.binary_search(i).is_ok())
            .collect();
        if rows.is_empty() {
            continue;
        }

        output.push_str(&format!(
            "\n{} {} ({} of {} unacknowledged)\n",
            group_glyph(group.mark()),
            group.message,
            group.unacknowledged(),
            group.rows.len()
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        for index in rows {
            let row = &results.rows()[index];
            // numbered from 1, the same numbers `mark --row` takes
            render_row(&mut output, index + 1, &row.violation, row.ignored);
        }
    }

    let ignored = results.rows().iter().filter(|r| r.ignored).count();
    output.push_str(&format!(
        "\n{} problems, {} acknowledged{}\n",
        results.len(),
        ignored,
        if results.hide_marked() && ignored > 0 {
            " (hidden)"
        } else {
            ""
        }
    ));

    output
}
