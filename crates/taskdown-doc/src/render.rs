//! Snapshot → markdown rendering.
//!
//! Output is deterministic: rendering the same snapshot twice yields
//! byte-identical text, so an unedited document reconciles to nothing.

use taskdown_core::{Task, TaskList};

const DOCUMENT_HEADER: &str = "# Tasks";

const PENDING_SIGN: &str = "☐";
const COMPLETED_SIGN: &str = "☒";

/// Render the full document for a snapshot.
#[must_use]
pub fn render_snapshot(lists: &[TaskList]) -> String {
    let mut out = String::new();
    out.push_str(DOCUMENT_HEADER);
    out.push('\n');

    for list in lists {
        out.push('\n');
        out.push_str("## ");
        out.push_str(&list.title);
        out.push('\n');

        if !list.tasks.is_empty() {
            out.push('\n');
            render_tasks(&list.tasks, "", &mut out);
        }
    }

    out
}

/// Render one sibling group as an ordered list under `indent`.
///
/// When any sibling carries notes the whole group switches to the spaced
/// (loose) form, so note paragraphs attach unambiguously to their item.
fn render_tasks(tasks: &[Task], indent: &str, out: &mut String) {
    let has_notes = tasks.iter().any(|t| !t.notes.is_empty());
    // Wide enough for the largest marker in the group, minimum "1.  ".
    let marker_width = format!("{}.", tasks.len()).len().max(3);
    let child_indent = format!("{indent}{}", " ".repeat(marker_width + 1));

    for (i, task) in tasks.iter().enumerate() {
        if has_notes && i > 0 {
            out.push('\n');
        }

        let marker = format!("{}.", i + 1);
        let sign = if task.completed() { COMPLETED_SIGN } else { PENDING_SIGN };
        out.push_str(&format!(
            "{indent}{marker:<width$} {sign} {title}\n",
            width = marker_width,
            title = task.title
        ));

        if !task.notes.is_empty() {
            out.push('\n');
            for line in task.notes.lines() {
                if line.trim().is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&child_indent);
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        if !task.subtasks.is_empty() {
            if has_notes {
                out.push('\n');
            }
            render_tasks(&task.subtasks, &child_indent, out);
        }
    }
}
