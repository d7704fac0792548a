//! HTML vocabulary emitted by the renderer.
//!
//! Output uses upper-case tags, the convention of the wiki pages this renderer
//! reproduces. Start tags can be overridden per [`ParserConfig`](crate::ParserConfig);
//! close tags are fixed.

use crate::link::{LinkDescription, LinkTarget};

/// Rendered in place of an empty table cell.
pub(crate) const NBSP: &str = "&nbsp;";

/// Style attribute marking a link whose target page does not exist.
pub(crate) const UNKNOWN_LINK_STYLE: &str =
    "style='border-bottom:1px dashed #000000; text-decoration:none'";

/// An element the renderer can emit.
///
/// [`Tag::markup`] is the default start tag and the key under which an
/// override is looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Preformatted,
    Code,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Strong,
    Emphasis,
    Underline,
    Superscript,
    Subscript,
    Deleted,
    LineBreak,
    HorizontalRule,
    Teletype,
}

impl Tag {
    /// Every tag, in the order they are documented.
    pub const ALL: [Self; 25] = [
        Self::Paragraph,
        Self::UnorderedList,
        Self::OrderedList,
        Self::ListItem,
        Self::Table,
        Self::TableHead,
        Self::TableRow,
        Self::TableCell,
        Self::Preformatted,
        Self::Code,
        Self::Heading1,
        Self::Heading2,
        Self::Heading3,
        Self::Heading4,
        Self::Heading5,
        Self::Heading6,
        Self::Strong,
        Self::Emphasis,
        Self::Underline,
        Self::Superscript,
        Self::Subscript,
        Self::Deleted,
        Self::LineBreak,
        Self::HorizontalRule,
        Self::Teletype,
    ];

    /// Default start tag.
    #[must_use]
    pub const fn markup(self) -> &'static str {
        match self {
            Self::Paragraph => "<P>",
            Self::UnorderedList => "<UL>",
            Self::OrderedList => "<OL>",
            Self::ListItem => "<LI>",
            Self::Table => "<TABLE>",
            Self::TableHead => "<THEAD>",
            Self::TableRow => "<TR>",
            Self::TableCell => "<TD>",
            Self::Preformatted => "<PRE>",
            Self::Code => "<CODE>",
            Self::Heading1 => "<H1>",
            Self::Heading2 => "<H2>",
            Self::Heading3 => "<H3>",
            Self::Heading4 => "<H4>",
            Self::Heading5 => "<H5>",
            Self::Heading6 => "<H6>",
            Self::Strong => "<STRONG>",
            Self::Emphasis => "<EM>",
            Self::Underline => "<U>",
            Self::Superscript => "<SUP>",
            Self::Subscript => "<SUB>",
            Self::Deleted => "<DEL>",
            Self::LineBreak => "<BR />",
            Self::HorizontalRule => "<HR />",
            Self::Teletype => "<TT>",
        }
    }

    /// Close tag, empty for void elements.
    #[must_use]
    pub const fn close(self) -> &'static str {
        match self {
            Self::Paragraph => "</P>",
            Self::UnorderedList => "</UL>",
            Self::OrderedList => "</OL>",
            Self::ListItem => "</LI>",
            Self::Table => "</TABLE>",
            Self::TableHead => "</THEAD>",
            Self::TableRow => "</TR>",
            Self::TableCell => "</TD>",
            Self::Preformatted => "</PRE>",
            Self::Code => "</CODE>",
            Self::Heading1 => "</H1>",
            Self::Heading2 => "</H2>",
            Self::Heading3 => "</H3>",
            Self::Heading4 => "</H4>",
            Self::Heading5 => "</H5>",
            Self::Heading6 => "</H6>",
            Self::Strong => "</STRONG>",
            Self::Emphasis => "</EM>",
            Self::Underline => "</U>",
            Self::Superscript => "</SUP>",
            Self::Subscript => "</SUB>",
            Self::Deleted => "</DEL>",
            Self::LineBreak | Self::HorizontalRule => "",
            Self::Teletype => "</TT>",
        }
    }

    /// Look a tag up by its default start markup.
    #[must_use]
    pub fn from_markup(markup: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.markup() == markup)
    }
}

/// Escape `& < > " '` for inclusion in HTML text.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Anchor for a resolved wiki link.
///
/// Both attribute slots are always present, so an internal link carries two
/// spaces before `>`.
pub(crate) fn anchor(link: &LinkDescription) -> String {
    let target = if link.target == LinkTarget::External {
        "target=_blank "
    } else {
        ""
    };
    let style = if link.target == LinkTarget::Unknown {
        UNKNOWN_LINK_STYLE
    } else {
        ""
    };
    format!(
        r#"<A href="{}" {target} {style}>{}</A>"#,
        link.href, link.text
    )
}

/// Anchor for a bare URL found in running text.
pub(crate) fn free_link_anchor(url: &str) -> String {
    format!(r#"<A target=_blank href="{url}">{url}</A>"#)
}

pub(crate) fn image(src: &str, alt: &str) -> String {
    format!("<IMG src='{src}' alt='{alt}'/>")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_tag_lookup_by_markup() {
        assert_eq!(Tag::from_markup("<STRONG>"), Some(Tag::Strong));
        assert_eq!(Tag::from_markup("<BR />"), Some(Tag::LineBreak));
        assert_eq!(Tag::from_markup("<strong>"), None);
    }

    #[test]
    fn test_void_tags_have_no_close() {
        assert_eq!(Tag::LineBreak.close(), "");
        assert_eq!(Tag::HorizontalRule.close(), "");
        assert_eq!(Tag::Teletype.close(), "</TT>");
    }

    #[test]
    fn test_internal_anchor_keeps_empty_attribute_slots() {
        let mut link = LinkDescription::new("Home", "Home");
        link.target = LinkTarget::Internal;
        assert_eq!(anchor(&link), r#"<A href="Home"  >Home</A>"#);
    }

    #[test]
    fn test_external_anchor() {
        let link = LinkDescription::new("http://x.org", "X");
        assert_eq!(anchor(&link), r#"<A href="http://x.org" target=_blank  >X</A>"#);
    }

    #[test]
    fn test_unknown_anchor() {
        let mut link = LinkDescription::new("Missing", "Missing");
        link.target = LinkTarget::Unknown;
        assert_eq!(
            anchor(&link),
            format!(r#"<A href="Missing"  {UNKNOWN_LINK_STYLE}>Missing</A>"#)
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(image("a.png", "A"), "<IMG src='a.png' alt='A'/>");
    }
}
