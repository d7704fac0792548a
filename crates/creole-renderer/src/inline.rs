//! Inline transforms applied to a single fragment of text.
//!
//! Passes run in a fixed order, each over the output of the previous one:
//! bracketed formatting, line breaks, horizontal rule, bare URLs, images,
//! wiki links, inline verbatim, and finally tilde removal. Image alt text and
//! link labels are run through the whole pipeline recursively.

use crate::config::ParserConfig;
use crate::html::{self, Tag};
use crate::link::{LinkDescription, LinkResolver};
use crate::scanner::{Region, find_unescaped};

/// Delimiters that wrap text in an element, in application order.
const FORMATTING: [(&str, Tag); 6] = [
    ("**", Tag::Strong),
    ("//", Tag::Emphasis),
    ("__", Tag::Underline),
    ("^^", Tag::Superscript),
    (",,", Tag::Subscript),
    ("--", Tag::Deleted),
];

/// Heading delimiters, longest first so `==` is not read as two `=`.
const HEADINGS: [(&str, Tag); 6] = [
    ("======", Tag::Heading6),
    ("=====", Tag::Heading5),
    ("====", Tag::Heading4),
    ("===", Tag::Heading3),
    ("==", Tag::Heading2),
    ("=", Tag::Heading1),
];

const FREE_LINK_SCHEMES: [&str; 3] = ["ftp:", "http:", "https:"];

const LINE_BREAK: &str = "\\\\";
const HORIZONTAL_RULE: &str = "----";

pub(crate) struct InlineProcessor<'a> {
    config: &'a ParserConfig,
    resolver: Option<&'a dyn LinkResolver>,
}

impl<'a> InlineProcessor<'a> {
    pub(crate) fn new(config: &'a ParserConfig, resolver: Option<&'a dyn LinkResolver>) -> Self {
        Self { config, resolver }
    }

    /// Run every inline pass over `fragment`.
    pub(crate) fn process(&self, fragment: &str) -> String {
        let mut markup = fragment.to_owned();
        for (token, tag) in FORMATTING {
            markup = self.bracket(markup, token, tag);
        }
        markup = self.line_breaks(markup);
        markup = self.horizontal_rule(markup);
        for scheme in FREE_LINK_SCHEMES {
            markup = free_links(markup, scheme);
        }
        markup = self.images(markup);
        markup = self.wiki_links(markup);
        markup = self.inline_verbatim(markup);
        unescape_tildes(&markup)
    }

    /// Wrap `= ... =` style headings. The result still needs [`Self::process`].
    pub(crate) fn headings(&self, line: &str) -> String {
        HEADINGS
            .into_iter()
            .fold(line.to_owned(), |markup, (token, tag)| {
                self.bracket(markup, token, tag)
            })
    }

    /// Replace each `token ... token` pair with `tag`.
    ///
    /// An opener without a closer wraps the rest of the fragment. Empty pairs
    /// are left alone.
    fn bracket(&self, mut markup: String, token: &str, tag: Tag) -> String {
        let open = self.config.start_tag(tag);
        let close = tag.close();
        let mut next = find_unescaped(&markup, token, 0);

        while let Some(start) = next {
            if tag == Tag::Emphasis && follows_url_scheme(&markup, start) {
                next = find_unescaped(&markup, token, start + 1);
                continue;
            }

            let inner = start + token.len();
            let Some(end) = find_unescaped(&markup, token, inner) else {
                markup = format!("{}{open}{}{close}", &markup[..start], &markup[inner..]);
                break;
            };

            if end > inner {
                let text = &markup[inner..end];
                let resume = start + open.len() + text.len() + close.len();
                markup = format!(
                    "{}{open}{text}{close}{}",
                    &markup[..start],
                    &markup[end + token.len()..]
                );
                next = find_unescaped(&markup, token, resume);
            } else {
                next = find_unescaped(&markup, token, end + 1);
            }
        }

        markup
    }

    fn line_breaks(&self, mut markup: String) -> String {
        let br = self.config.start_tag(Tag::LineBreak);
        let mut next = find_unescaped(&markup, LINE_BREAK, 0);
        while let Some(pos) = next {
            markup.replace_range(pos..pos + LINE_BREAK.len(), br);
            next = find_unescaped(&markup, LINE_BREAK, pos);
        }
        markup
    }

    fn horizontal_rule(&self, markup: String) -> String {
        match markup.strip_prefix(HORIZONTAL_RULE) {
            Some(rest) => format!("{}{rest}", self.config.start_tag(Tag::HorizontalRule)),
            None => markup,
        }
    }

    fn images(&self, mut markup: String) -> String {
        let (opener, closer) = (Region::Image.opener(), Region::Image.closer());
        let mut next = find_unescaped(&markup, opener, 0);

        while let Some(start) = next {
            let Some(end) = find_unescaped(&markup, closer, start).filter(|&end| end > start) else {
                break;
            };
            let content = &markup[start + opener.len()..end];
            let img = match split_label(content) {
                Some((src, alt)) => html::image(src, &self.process(alt)),
                None => html::image(content, content),
            };
            markup.replace_range(start..end + closer.len(), &img);
            next = find_unescaped(&markup, opener, start + opener.len());
        }

        markup
    }

    fn wiki_links(&self, mut markup: String) -> String {
        let (opener, closer) = (Region::Link.opener(), Region::Link.closer());
        let mut next = find_unescaped(&markup, opener, 0);

        while let Some(start) = next {
            let Some(end) = find_unescaped(&markup, closer, start).filter(|&end| end > start) else {
                break;
            };
            let anchor = self.anchor(&markup[start + opener.len()..end]);
            markup.replace_range(start..end + closer.len(), &anchor);
            next = find_unescaped(&markup, opener, start + opener.len());
        }

        markup
    }

    fn anchor(&self, content: &str) -> String {
        let mut link = match split_label(content) {
            Some((destination, label)) => LinkDescription::new(destination, self.process(label)),
            None => LinkDescription::new(content, content),
        };
        if let Some(href) = self.config.interwiki_href(&link.href) {
            link.href = href;
        }
        if let Some(resolver) = self.resolver {
            resolver.resolve(&mut link);
        }
        html::anchor(&link)
    }

    /// `{{{text}}}` inside a line becomes teletype text. The search is plain,
    /// escapes do not apply.
    fn inline_verbatim(&self, mut markup: String) -> String {
        let (opener, closer) = (Region::Fence.opener(), Region::Fence.closer());
        let open = self.config.start_tag(Tag::Teletype);
        let close = Tag::Teletype.close();
        let mut next = markup.find(opener);

        while let Some(start) = next {
            let Some(end) = find_from(&markup, closer, start) else {
                break;
            };
            markup = format!(
                "{}{open}{}{close}{}",
                &markup[..start],
                &markup[start + opener.len()..end],
                &markup[end + closer.len()..]
            );
            next = find_from(&markup, opener, start);
        }

        markup
    }
}

/// Plain substring search starting at byte offset `from`.
fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .find(needle)
        .map(|offset| from + offset)
}

/// Split link or image content at its first `|`. A leading `|` is not a
/// separator.
fn split_label(content: &str) -> Option<(&str, &str)> {
    match content.find('|') {
        Some(0) | None => None,
        Some(pos) => Some((&content[..pos], &content[pos + 1..])),
    }
}

/// Whether the `//` at `pos` is the one in `http://` and friends.
fn follows_url_scheme(markup: &str, pos: usize) -> bool {
    let before = &markup.as_bytes()[..pos];
    ["https:", "http:", "ftp:"].iter().any(|scheme| {
        before.len() >= scheme.len()
            && before[before.len() - scheme.len()..].eq_ignore_ascii_case(scheme.as_bytes())
    })
}

/// Turn bare URLs starting with `scheme` into anchors. A URL runs to the next
/// whitespace or the end of the fragment.
fn free_links(mut markup: String, scheme: &str) -> String {
    let mut next = find_unescaped(&markup, scheme, 0);

    while let Some(start) = next {
        match free_link_end(&markup, start) {
            Some(end) => {
                let anchor = html::free_link_anchor(&markup[start..end]);
                markup.replace_range(start..end, &anchor);
                next = find_unescaped(&markup, scheme, start + anchor.len());
            }
            None => {
                let anchor = html::free_link_anchor(&markup[start..]);
                markup.replace_range(start.., &anchor);
                break;
            }
        }
    }

    markup
}

/// End of the URL starting at `start`: the first unescaped space, or any other
/// whitespace character, whichever comes first.
fn free_link_end(markup: &str, start: usize) -> Option<usize> {
    let space = find_unescaped(markup, " ", start);
    let other = markup[start..]
        .find(|c: char| c.is_whitespace() && c != ' ')
        .map(|offset| start + offset);
    match (space, other) {
        (Some(space), Some(other)) => Some(space.min(other)),
        (space, other) => space.or(other),
    }
}

/// Drop escape tildes. `~~` yields one literal tilde, a tilde before
/// whitespace is kept, and the last two characters are never examined.
fn unescape_tildes(markup: &str) -> String {
    let mut chars: Vec<char> = markup.chars().collect();
    let mut next = chars.iter().position(|&c| c == '~');

    while let Some(pos) = next {
        if pos + 2 >= chars.len() {
            break;
        }
        let resume = if chars[pos + 1] == '~' {
            chars.remove(pos + 1);
            pos + 1
        } else if chars[pos + 1].is_whitespace() {
            pos + 1
        } else {
            chars.remove(pos);
            pos
        };
        next = chars[resume..]
            .iter()
            .position(|&c| c == '~')
            .map(|offset| resume + offset);
    }

    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::link::LinkTarget;

    fn inline(fragment: &str) -> String {
        let config = ParserConfig::default();
        InlineProcessor::new(&config, None).process(fragment)
    }

    #[test]
    fn test_strong() {
        assert_eq!(inline("**bold** text"), "<STRONG>bold</STRONG> text");
    }

    #[test]
    fn test_every_formatting_delimiter() {
        assert_eq!(
            inline("//a// __b__ ^^c^^ ,,d,, --e--"),
            "<EM>a</EM> <U>b</U> <SUP>c</SUP> <SUB>d</SUB> <DEL>e</DEL>"
        );
    }

    #[test]
    fn test_nested_formatting() {
        assert_eq!(
            inline("**bold //both//**"),
            "<STRONG>bold <EM>both</EM></STRONG>"
        );
    }

    #[test]
    fn test_repeated_pairs() {
        assert_eq!(
            inline("**a** and **b**"),
            "<STRONG>a</STRONG> and <STRONG>b</STRONG>"
        );
    }

    #[test]
    fn test_unterminated_delimiter_wraps_rest() {
        assert_eq!(inline("a **b c"), "a <STRONG>b c</STRONG>");
    }

    #[test]
    fn test_empty_pair_left_alone() {
        assert_eq!(inline("a **** b"), "a **** b");
    }

    #[test]
    fn test_escaped_delimiter_is_literal() {
        let html = inline("~**not bold**");
        assert!(html.starts_with("**not bold"), "{html}");
        assert!(!html.contains("<STRONG>not bold"), "{html}");
    }

    #[test]
    fn test_url_slashes_are_not_emphasis() {
        assert_eq!(
            inline("see http://x.org now"),
            r#"see <A target=_blank href="http://x.org">http://x.org</A> now"#
        );
    }

    #[test]
    fn test_url_scheme_check_is_case_insensitive() {
        assert!(!inline("HTTP://x.org").contains("<EM>"));
    }

    #[test]
    fn test_free_link_at_end() {
        assert_eq!(
            inline("go ftp://f.org/a"),
            r#"go <A target=_blank href="ftp://f.org/a">ftp://f.org/a</A>"#
        );
    }

    #[test]
    fn test_two_free_links() {
        assert_eq!(
            inline("http://a.org http://b.org"),
            r#"<A target=_blank href="http://a.org">http://a.org</A> <A target=_blank href="http://b.org">http://b.org</A>"#
        );
    }

    #[test]
    fn test_free_link_ends_at_tab() {
        assert_eq!(
            inline("http://x.org\tnext"),
            "<A target=_blank href=\"http://x.org\">http://x.org</A>\tnext"
        );
    }

    #[test]
    fn test_line_break() {
        assert_eq!(inline("a\\\\b\\\\c"), "a<BR />b<BR />c");
    }

    #[test]
    fn test_horizontal_rule_only_at_start() {
        assert_eq!(inline("----"), "<HR />");
        assert_eq!(inline("a ---- b"), "a ---- b");
    }

    #[test]
    fn test_headings() {
        let config = ParserConfig::default();
        let processor = InlineProcessor::new(&config, None);
        assert_eq!(processor.headings("== Title =="), "<H2> Title </H2>");
        assert_eq!(processor.headings("=== Sub"), "<H3> Sub</H3>");
    }

    #[test]
    fn test_image_with_alt() {
        assert_eq!(inline("{{a.png|An //a//}}"), "<IMG src='a.png' alt='An <EM>a</EM>'/>");
    }

    #[test]
    fn test_image_without_alt() {
        assert_eq!(inline("{{a.png}}"), "<IMG src='a.png' alt='a.png'/>");
    }

    #[test]
    fn test_formatting_skips_image_content() {
        assert_eq!(
            inline("{{a**b.png}} **x**"),
            "<IMG src='a**b.png' alt='a**b.png'/> <STRONG>x</STRONG>"
        );
    }

    #[test]
    fn test_internal_link() {
        assert_eq!(inline("[[Home]]"), r#"<A href="Home" target=_blank  >Home</A>"#);
    }

    #[test]
    fn test_link_label_is_rendered() {
        assert_eq!(
            inline("[[Home|**start**]]"),
            r#"<A href="Home" target=_blank  ><STRONG>start</STRONG></A>"#
        );
    }

    #[test]
    fn test_leading_pipe_is_not_a_separator() {
        assert_eq!(inline("[[|x]]"), r#"<A href="|x" target=_blank  >|x</A>"#);
    }

    #[test]
    fn test_formatting_skips_link_destination() {
        assert_eq!(
            inline("[[a//b]] //c//"),
            r#"<A href="a//b" target=_blank  >a//b</A> <EM>c</EM>"#
        );
    }

    #[test]
    fn test_interwiki_link() {
        let config = ParserConfig::new().with_interwiki("wp", "http://en.wikipedia.org/wiki/");
        let html = InlineProcessor::new(&config, None).process("[[wp:Rust]]");
        assert_eq!(
            html,
            r#"<A href="http://en.wikipedia.org/wiki/Rust" target=_blank  >wp:Rust</A>"#
        );
    }

    #[test]
    fn test_resolver_sees_link_after_interwiki() {
        let config = ParserConfig::new().with_interwiki("wp", "W/");
        let resolver = |link: &mut LinkDescription| {
            assert_eq!(link.link, "wp:Rust");
            assert_eq!(link.href, "W/Rust");
            assert_eq!(link.target, LinkTarget::External);
            link.target = LinkTarget::Internal;
            link.text = "Rust".to_owned();
        };
        let html = InlineProcessor::new(&config, Some(&resolver)).process("[[wp:Rust]]");
        assert_eq!(html, r#"<A href="W/Rust"  >Rust</A>"#);
    }

    #[test]
    fn test_inline_verbatim() {
        assert_eq!(inline("x {{{**raw**}}} y"), "x <TT>**raw**</TT> y");
    }

    #[test]
    fn test_teletype_override() {
        let config = ParserConfig::new().with_tag("<TT>", "<KBD>");
        let html = InlineProcessor::new(&config, None).process("{{{a}}}");
        assert_eq!(html, "<KBD>a</TT>");
    }

    #[test]
    fn test_unescape_tildes() {
        assert_eq!(unescape_tildes("a~~b"), "a~b");
        assert_eq!(unescape_tildes("~xyz"), "xyz");
        assert_eq!(unescape_tildes("a~ b"), "a~ b");
        assert_eq!(unescape_tildes("ab~c"), "ab~c");
    }

    #[test]
    fn test_tilde_before_whitespace_terminates() {
        assert_eq!(unescape_tildes("~ ~ ~ end"), "~ ~ ~ end");
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(inline("**grüße** ~ü"), "<STRONG>grüße</STRONG> ~ü");
    }
}
