//! Physical to logical line segmentation.
//!
//! Creole lets a paragraph wrap over several source lines. Continuation lines
//! are joined onto their head with a single space until something that starts
//! a new block appears. Fenced lines are never joined.

use crate::state::Fence;

/// One or more physical lines treated as a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    pub(crate) text: String,
    /// Zero-based index of the last physical line absorbed.
    pub(crate) source_line: usize,
}

pub(crate) fn segment(markup: &str) -> Vec<LogicalLine> {
    let physical: Vec<&str> = markup.split('\n').collect();
    let mut lines = Vec::with_capacity(physical.len());
    let mut fence: Option<Fence> = None;
    let mut index = 0;

    while index < physical.len() {
        let mut text = physical[index].to_owned();
        let mut last = index;

        if can_head_paragraph(&text) {
            match fence {
                None if text.starts_with("{{{") => fence = Some(Fence::Preformatted),
                None if text.starts_with("[[[") => fence = Some(Fence::Code),
                None => {
                    while let Some(next) = physical
                        .get(last + 1)
                        .map(|line| line.trim())
                        .filter(|line| !starts_block(line))
                    {
                        text.push(' ');
                        text.push_str(next);
                        last += 1;
                    }
                }
                Some(open) if text.starts_with(open.closer()) => fence = None,
                Some(_) => {}
            }
        }

        lines.push(LogicalLine {
            text,
            source_line: last,
        });
        index = last + 1;
    }

    lines
}

fn can_head_paragraph(line: &str) -> bool {
    !line.is_empty() && line != "\r" && !line.starts_with('=')
}

/// Whether a trimmed line ends the paragraph above it.
fn starts_block(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.starts_with(['#', '*', '=', '|'])
        || trimmed.starts_with("{{{")
        || trimmed.starts_with("[[[")
        || trimmed.starts_with("----")
}
