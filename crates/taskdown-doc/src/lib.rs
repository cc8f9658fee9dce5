//! Markdown document format for taskdown.
//!
//! The editable document is plain markdown with a fixed shape: an `# Tasks`
//! header, one `## <list title>` section per task list, tasks as ordered-list
//! items prefixed with `☐` (pending) or `☒` (completed), free-form note
//! paragraphs under a task's title, and subtasks as nested ordered lists.
//!
//! [`render_snapshot`] produces the document shown to the user before
//! editing; [`parse_document`] is its inverse and is the only place where a
//! malformed document is rejected, before any remote call happens.

pub mod error;
pub mod parse;
pub mod render;

pub use error::{DocError, DocResult};
pub use parse::parse_document;
pub use render::render_snapshot;

#[cfg(test)]
mod round_trip_tests {
    use super::*;
    use taskdown_core::{Task, TaskList, TaskStatus};

    #[test]
    fn render_then_parse_preserves_content() {
        let snapshot = vec![
            TaskList {
                id: "l1".into(),
                title: "Groceries".into(),
                tasks: vec![
                    Task {
                        id: "t1".into(),
                        title: "Milk".into(),
                        status: TaskStatus::Pending,
                        ..Task::default()
                    },
                    Task {
                        id: "t2".into(),
                        title: "Bread".into(),
                        notes: "Wholegrain if possible.".into(),
                        status: TaskStatus::Completed,
                        position: 1,
                        ..Task::default()
                    },
                ],
            },
            TaskList {
                id: "l2".into(),
                title: "Chores".into(),
                tasks: vec![Task {
                    id: "t3".into(),
                    title: "Vacuum".into(),
                    status: TaskStatus::Pending,
                    subtasks: vec![
                        Task {
                            title: "Living room".into(),
                            status: TaskStatus::Pending,
                            ..Task::default()
                        },
                        Task {
                            title: "Hallway".into(),
                            status: TaskStatus::Completed,
                            position: 1,
                            ..Task::default()
                        },
                    ],
                    ..Task::default()
                }],
            },
        ];

        let parsed = parse_document(&render_snapshot(&snapshot)).unwrap();

        assert_eq!(parsed.len(), snapshot.len());
        for (a, b) in parsed.iter().zip(&snapshot) {
            assert!(a.content_eq(b), "list '{}' did not survive", b.title);
        }
        // Remote identifiers never round-trip through the document.
        assert!(parsed[0].id.is_empty());
        assert!(parsed[0].tasks[0].id.is_empty());
    }
}
