//! Block-level rendering.
//!
//! [`CreoleRenderer`] walks the logical lines of a page, keeping track of open
//! lists, tables and verbatim blocks, and hands the text of each block to the
//! inline processor.

use crate::config::ParserConfig;
use crate::html::{NBSP, Tag, escape_html};
use crate::inline::InlineProcessor;
use crate::lines::segment;
use crate::link::LinkResolver;
use crate::scanner::find_unescaped;
use crate::state::{BlockState, Fence, ListKind};

/// Prefix of the id stamped on every paragraph.
const PARAGRAPH_ID_PREFIX: &str = "CreoleLine";

/// Creole to HTML renderer.
///
/// Holds only borrowed, read-only configuration, so a renderer can be shared
/// across threads and reused for any number of pages.
///
/// # Example
///
/// ```
/// use creole_renderer::{CreoleRenderer, ParserConfig};
///
/// let config = ParserConfig::default();
/// let html = CreoleRenderer::new(&config).render("**Bold** text");
/// assert_eq!(html, "<P id=\"CreoleLine0\"><STRONG>Bold</STRONG> text\n</P>");
/// ```
#[derive(Clone, Copy)]
pub struct CreoleRenderer<'a> {
    config: &'a ParserConfig,
    resolver: Option<&'a dyn LinkResolver>,
}

impl<'a> CreoleRenderer<'a> {
    #[must_use]
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            resolver: None,
        }
    }

    /// Consult `resolver` for every wiki link.
    #[must_use]
    pub fn with_link_resolver(mut self, resolver: &'a dyn LinkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Render a whole page.
    ///
    /// Never fails: malformed markup degrades to literal text or unbalanced
    /// inline tags.
    #[must_use]
    pub fn render(&self, markup: &str) -> String {
        let lines = segment(markup);
        let mut block = BlockRenderer {
            config: self.config,
            inline: InlineProcessor::new(self.config, self.resolver),
            state: BlockState::default(),
            out: String::with_capacity(markup.len() * 2),
        };

        block.open_paragraph(0);
        let sentinel = lines.len().saturating_sub(1);
        for (index, line) in lines.iter().enumerate() {
            let next_source_line = lines.get(index + 1).map_or(sentinel, |l| l.source_line);
            block.line(&line.text, next_source_line);
        }
        block.finish()
    }
}

struct BlockRenderer<'a> {
    config: &'a ParserConfig,
    inline: InlineProcessor<'a>,
    state: BlockState,
    out: String,
}

impl BlockRenderer<'_> {
    fn line(&mut self, raw: &str, next_source_line: usize) {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim_start_matches(' ');

        if let Some(fence) = self.state.fence {
            self.fenced_line(fence, line, trimmed);
            return;
        }

        if self.state.in_table && !trimmed.is_empty() && !trimmed.starts_with('|') {
            self.close_table();
        }

        if trimmed.trim().is_empty() {
            self.close_lists();
            self.out.push_str(Tag::Paragraph.close());
            self.out.push('\n');
            self.open_paragraph(next_source_line);
        } else if trimmed.starts_with('*') {
            self.bullet_line(line, trimmed);
        } else if trimmed.starts_with('#') {
            self.close_list(ListKind::Bullet);
            self.list_item(trimmed, ListKind::Ordered);
        } else if trimmed.starts_with('=') {
            self.close_lists();
            let heading = self.inline.headings(line);
            let html = self.inline.process(&heading);
            self.out.push_str(&html);
        } else if !self.state.in_table && trimmed.starts_with("|=") {
            self.close_lists();
            self.state.in_table = true;
            self.table_header(trimmed);
        } else if self.state.in_table && trimmed.starts_with('|') {
            self.table_row(trimmed);
        } else if trimmed == "{{{" {
            self.open_fence(Fence::Preformatted);
        } else if is_code_opener(trimmed) {
            self.open_fence(Fence::Code);
        } else {
            self.text_line(line);
        }
    }

    /// `<P id="CreoleLine{n}">`, stamping the id into the configured tag.
    fn open_paragraph(&mut self, source_line: usize) {
        let start = self.config.start_tag(Tag::Paragraph);
        let stamped = start.replacen(
            "<P",
            &format!("<P id=\"{PARAGRAPH_ID_PREFIX}{source_line}\""),
            1,
        );
        self.out.push_str(&stamped);
    }

    fn text_line(&mut self, line: &str) {
        let html = self.inline.process(line);
        self.out.push_str(&html);
        self.out.push('\n');
    }

    /// `**` at the very start of a line is bold text, not a nested list,
    /// unless a bullet list is already open.
    fn bullet_line(&mut self, line: &str, trimmed: &str) {
        if self.state.depth(ListKind::Bullet) == 0 && trimmed[1..].starts_with('*') {
            self.text_line(line);
        } else {
            self.close_list(ListKind::Ordered);
            self.list_item(trimmed, ListKind::Bullet);
        }
    }

    fn list_item(&mut self, trimmed: &str, kind: ListKind) {
        let level = trimmed.bytes().take_while(|&b| b == kind.marker()).count();
        let text = &trimmed[level..];
        let tag = kind.tag();

        let depth = self.state.depth_mut(kind);
        while *depth > level {
            self.out.push_str(tag.close());
            self.out.push('\n');
            *depth -= 1;
        }
        while *depth < level {
            self.out.push_str(self.config.start_tag(tag));
            self.out.push('\n');
            *depth += 1;
        }

        let html = self.inline.process(text);
        self.out.push_str(self.config.start_tag(Tag::ListItem));
        self.out.push_str(&html);
        self.out.push_str(Tag::ListItem.close());
        self.out.push('\n');
    }

    fn close_list(&mut self, kind: ListKind) {
        let depth = self.state.depth_mut(kind);
        while *depth > 0 {
            self.out.push_str(kind.tag().close());
            self.out.push('\n');
            *depth -= 1;
        }
    }

    fn close_lists(&mut self) {
        self.close_list(ListKind::Ordered);
        self.close_list(ListKind::Bullet);
    }

    fn close_table(&mut self) {
        self.out.push_str(Tag::Table.close());
        self.state.in_table = false;
    }

    fn table_header(&mut self, row: &str) {
        for tag in [Tag::Table, Tag::TableHead] {
            self.out.push_str(self.config.start_tag(tag));
        }
        self.out.push('\n');
        self.out.push_str(self.config.start_tag(Tag::TableRow));
        self.out.push('\n');

        let mut next = find_unescaped(row, "|=", 0);
        while let Some(start) = next {
            let content = start + 2;
            next = find_unescaped(row, "|=", start + 1);
            let cell = match next {
                Some(end) => &row[content..end],
                None => row[content..].trim_end_matches('|'),
            };
            let html = if cell.trim().is_empty() {
                NBSP.to_owned()
            } else {
                self.inline.process(cell)
            };
            self.cell(&html);
        }

        self.out.push_str(Tag::TableRow.close());
        self.out.push('\n');
        self.out.push_str(Tag::TableHead.close());
        self.out.push('\n');
    }

    /// A body row. A trailing cell after the last `|` counts when it is not
    /// blank.
    fn table_row(&mut self, row: &str) {
        self.out.push_str(self.config.start_tag(Tag::TableRow));

        let mut next = find_unescaped(row, "|", 0);
        while let Some(bar) = next {
            let content = bar + 1;
            next = find_unescaped(row, "|", content);
            let cell = match next {
                Some(end) => &row[content..end],
                None if row[content..].trim().is_empty() => break,
                None => &row[content..],
            };
            let html = self.inline.process(cell);
            let html = html.trim();
            self.cell(if html.is_empty() { NBSP } else { html });
        }

        self.out.push_str(Tag::TableRow.close());
    }

    fn cell(&mut self, html: &str) {
        self.out.push_str(self.config.start_tag(Tag::TableCell));
        self.out.push_str(html);
        self.out.push_str(Tag::TableCell.close());
    }

    fn open_fence(&mut self, fence: Fence) {
        self.out.push_str(self.config.start_tag(fence.tag()));
        self.state.fence = Some(fence);
    }

    fn close_fence(&mut self, fence: Fence) {
        self.out.push_str(fence.tag().close());
        self.out.push('\n');
        self.state.fence = None;
    }

    fn fenced_line(&mut self, fence: Fence, line: &str, trimmed: &str) {
        if trimmed.starts_with(fence.closer()) {
            self.close_fence(fence);
            return;
        }
        match fence {
            Fence::Preformatted => self.out.push_str(line),
            Fence::Code => {
                self.out.push_str(&escape_html(line));
                self.out.push_str(self.config.start_tag(Tag::LineBreak));
            }
        }
        self.out.push('\n');
    }

    /// Close whatever is still open and apply tab expansion.
    fn finish(mut self) -> String {
        if let Some(fence) = self.state.fence {
            self.close_fence(fence);
        }
        self.close_lists();
        if self.state.in_table {
            self.close_table();
        }
        self.out.push_str(Tag::Paragraph.close());
        self.config.expand_tabs(self.out)
    }
}

/// `[[[code`, possibly with more text after the keyword.
fn is_code_opener(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("[[[")
        .is_some_and(|rest| rest.starts_with("code"))
}
