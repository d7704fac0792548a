//! Block-level state carried from one logical line to the next.

use crate::html::Tag;

/// Kind of verbatim block currently open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fence {
    /// `{{{` ... `}}}`, lines copied through unescaped.
    Preformatted,
    /// `[[[code` ... `]]]`, lines HTML-escaped.
    Code,
}

impl Fence {
    /// Line prefix that ends the block.
    pub(crate) const fn closer(self) -> &'static str {
        match self {
            Self::Preformatted => "}}}",
            Self::Code => "]]]",
        }
    }

    pub(crate) const fn tag(self) -> Tag {
        match self {
            Self::Preformatted => Tag::Preformatted,
            Self::Code => Tag::Code,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    pub(crate) const fn marker(self) -> u8 {
        match self {
            Self::Bullet => b'*',
            Self::Ordered => b'#',
        }
    }

    pub(crate) const fn tag(self) -> Tag {
        match self {
            Self::Bullet => Tag::UnorderedList,
            Self::Ordered => Tag::OrderedList,
        }
    }
}

/// Open lists, table and fence.
#[derive(Debug, Default)]
pub(crate) struct BlockState {
    bullet_depth: usize,
    ordered_depth: usize,
    pub(crate) in_table: bool,
    pub(crate) fence: Option<Fence>,
}

impl BlockState {
    pub(crate) fn depth(&self, kind: ListKind) -> usize {
        match kind {
            ListKind::Bullet => self.bullet_depth,
            ListKind::Ordered => self.ordered_depth,
        }
    }

    pub(crate) fn depth_mut(&mut self, kind: ListKind) -> &mut usize {
        match kind {
            ListKind::Bullet => &mut self.bullet_depth,
            ListKind::Ordered => &mut self.ordered_depth,
        }
    }
}
