//! Markdown → snapshot parsing.
//!
//! The inverse of [`crate::render`]: walks the CommonMark event stream with
//! source offsets so note paragraphs keep their original markdown verbatim
//! instead of being re-rendered from events. Only ordered lists form tasks;
//! every other block under a task item is note content.

use crate::error::{DocError, DocResult};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::ops::Range;
use taskdown_core::{Snapshot, Task, TaskList, TaskStatus};

type Spanned<'a> = (Event<'a>, Range<usize>);

const PENDING_SIGN: char = '☐';
const COMPLETED_SIGN: char = '☒';

/// Parse an edited document into a snapshot.
///
/// Structure errors (content before the first `##` heading, top-level blocks
/// that are neither headings nor ordered lists) are rejected here, before
/// anything touches the network.
pub fn parse_document(text: &str) -> DocResult<Snapshot> {
    let events: Vec<Spanned> = Parser::new_ext(text, Options::empty())
        .into_offset_iter()
        .collect();

    let mut lists: Snapshot = Vec::new();
    let mut i = 0;

    while i < events.len() {
        match &events[i].0 {
            // The document header; carries no data.
            Event::Start(Tag::Heading { level: HeadingLevel::H1, .. }) => {
                i = skip_element(&events, i);
            }
            Event::Start(Tag::Heading { level: HeadingLevel::H2, .. }) => {
                let (title, next) = collect_inline(&events, i);
                i = next;

                let mut list = TaskList::new(title.trim());
                if let Some((Event::Start(Tag::List(Some(_))), _)) = events.get(i) {
                    let (tasks, next) = parse_task_group(text, &events, i)?;
                    list.tasks = tasks;
                    i = next;
                }
                lists.push(list);
            }
            Event::Start(Tag::Heading { .. }) => {
                return Err(DocError::parse(format!(
                    "unexpected heading depth at byte {}; task lists use '##'",
                    events[i].1.start
                )));
            }
            other => {
                return Err(DocError::parse(format!(
                    "unexpected top-level content at byte {}: {other:?}",
                    events[i].1.start
                )));
            }
        }
    }

    Ok(lists)
}

/// Parse one ordered list of task items; `start` sits on the list's start
/// event. Positions are assigned densely in document order.
fn parse_task_group(
    text: &str,
    events: &[Spanned],
    start: usize,
) -> DocResult<(Vec<Task>, usize)> {
    let mut tasks = Vec::new();
    let mut i = start + 1;

    loop {
        match events.get(i).map(|(event, _)| event) {
            Some(Event::Start(Tag::Item)) => {
                let (task, next) = parse_task_item(text, events, i)?;
                tasks.push(task);
                i = next;
            }
            Some(Event::End(TagEnd::List(_))) => {
                i += 1;
                break;
            }
            _ => return Err(DocError::parse("unterminated task list".to_string())),
        }
    }

    for (rank, task) in tasks.iter_mut().enumerate() {
        task.position = rank as u64;
    }
    Ok((tasks, i))
}

/// Parse one list item: status sign and title, optional note blocks, and an
/// optional nested ordered list of subtasks.
fn parse_task_item(text: &str, events: &[Spanned], start: usize) -> DocResult<(Task, usize)> {
    let mut title: Option<String> = None;
    let mut note_blocks: Vec<String> = Vec::new();
    let mut subtasks: Vec<Task> = Vec::new();
    let mut i = start + 1;

    loop {
        let Some((event, range)) = events.get(i) else {
            return Err(DocError::parse("unterminated task item".to_string()));
        };

        match event {
            Event::End(TagEnd::Item) => {
                i += 1;
                break;
            }
            Event::Start(Tag::List(Some(_))) => {
                let (nested, next) = parse_task_group(text, events, i)?;
                subtasks = nested;
                i = next;
            }
            Event::Start(Tag::Paragraph) if title.is_none() => {
                let (inline, next) = collect_inline(events, i);
                title = Some(inline);
                i = next;
            }
            Event::Start(tag) if !is_inline_tag(tag) => {
                // Paragraphs past the first, unordered lists, quotes, code:
                // all note content, kept as written.
                note_blocks.push(dedent_continuation(slice(text, range)));
                i = skip_element(events, i);
            }
            _ if title.is_none() => {
                // Tight item: inline title content without a wrapping
                // paragraph.
                let (inline, next) = collect_tight_inline(events, i);
                title = Some(inline);
                i = next;
            }
            _ => {
                // Stray inline content after the title.
                note_blocks.push(slice(text, range).trim_end().to_string());
                i += 1;
            }
        }
    }

    let (status, task_title) = split_status(&title.unwrap_or_default());
    Ok((
        Task {
            id: String::new(),
            title: task_title,
            notes: note_blocks.join("\n\n"),
            position: 0,
            status,
            subtasks,
        },
        i,
    ))
}

/// Advance past the element whose start event sits at `start`.
fn skip_element(events: &[Spanned], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < events.len() {
        match &events[i].0 {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    events.len()
}

/// Flatten the inline content of the element starting at `start` into plain
/// text. Inline markup is dropped, inline code keeps its backticks, soft and
/// hard breaks become spaces.
fn collect_inline(events: &[Spanned], start: usize) -> (String, usize) {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut i = start;
    while i < events.len() {
        match &events[i].0 {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return (out, i + 1);
                }
            }
            Event::Text(t) => out.push_str(t),
            Event::Code(code) => {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
        i += 1;
    }
    (out, events.len())
}

/// Like [`collect_inline`] but for content that sits directly inside a tight
/// list item: stops (without consuming) at the first block-level start or at
/// the item's end.
fn collect_tight_inline(events: &[Spanned], start: usize) -> (String, usize) {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut i = start;
    while i < events.len() {
        match &events[i].0 {
            Event::Start(tag) => {
                if !is_inline_tag(tag) && depth == 0 {
                    break;
                }
                depth += 1;
            }
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Text(t) => out.push_str(t),
            Event::Code(code) => {
                out.push('`');
                out.push_str(code);
                out.push('`');
            }
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
        i += 1;
    }
    (out, i)
}

fn is_inline_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

/// Split the leading status sign off an item's inline text. No recognizable
/// sign means the status is unknown and the whole text is the title.
fn split_status(raw: &str) -> (TaskStatus, String) {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix(PENDING_SIGN) {
        (TaskStatus::Pending, rest.trim_start().to_string())
    } else if let Some(rest) = trimmed.strip_prefix(COMPLETED_SIGN) {
        (TaskStatus::Completed, rest.trim_start().to_string())
    } else {
        (TaskStatus::Unknown, trimmed.to_string())
    }
}

fn slice<'a>(text: &'a str, range: &Range<usize>) -> &'a str {
    &text[range.start..range.end]
}

/// Strip the list-item indentation that continuation lines of a block carry
/// in the source. The first line starts mid-line and is kept as-is.
fn dedent_continuation(block: &str) -> String {
    let block = block.trim_end();
    let mut lines = block.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };
    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = first.to_string();
    for line in rest {
        out.push('\n');
        if !line.trim().is_empty() {
            out.push_str(&line[indent.min(line.len())..]);
        }
    }
    out
}
