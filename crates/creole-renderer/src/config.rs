//! Renderer options.

use std::collections::HashMap;

use crate::html::{NBSP, Tag};

/// Default number of `&nbsp;` emitted per tab.
pub const DEFAULT_TAB_STOP: usize = 7;

/// Options shared by every render.
///
/// Read-only once built, so one value can back any number of concurrent
/// renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Start tag overrides keyed by default markup, e.g. `"<STRONG>"`.
    tags: HashMap<String, String>,
    /// Interwiki scheme to URL prefix.
    interwiki: HashMap<String, String>,
    tab_stop: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tags: HashMap::new(),
            interwiki: HashMap::new(),
            tab_stop: DEFAULT_TAB_STOP,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the start tag emitted for `default`, e.g. `"<P>"`.
    ///
    /// Replacement markup is emitted before later inline passes run, so it
    /// should not contain Creole delimiters.
    #[must_use]
    pub fn with_tag(mut self, default: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.tags.insert(default.into(), replacement.into());
        self
    }

    #[must_use]
    pub fn with_tags<K, V>(mut self, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Map links written `scheme:rest` to `prefix` followed by `rest`.
    #[must_use]
    pub fn with_interwiki(mut self, scheme: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.interwiki.insert(scheme.into(), prefix.into());
        self
    }

    #[must_use]
    pub fn with_interwikis<K, V>(mut self, interwiki: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.interwiki
            .extend(interwiki.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Number of `&nbsp;` per tab. Zero leaves tabs as they are.
    #[must_use]
    pub fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = tab_stop;
        self
    }

    #[must_use]
    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Start tag to emit for `tag`, honouring overrides.
    pub(crate) fn start_tag(&self, tag: Tag) -> &str {
        self.tags
            .get(tag.markup())
            .map_or(tag.markup(), String::as_str)
    }

    /// Expand `scheme:rest` through the interwiki map.
    pub(crate) fn interwiki_href(&self, href: &str) -> Option<String> {
        let (scheme, rest) = href.split_once(':')?;
        if scheme.is_empty() {
            return None;
        }
        self.interwiki
            .get(scheme)
            .map(|prefix| format!("{prefix}{rest}"))
    }

    pub(crate) fn expand_tabs(&self, html: String) -> String {
        if self.tab_stop == 0 || !html.contains('\t') {
            return html;
        }
        html.replace('\t', &NBSP.repeat(self.tab_stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tab_stop() {
        assert_eq!(ParserConfig::default().tab_stop(), 7);
    }

    #[test]
    fn test_start_tag_override() {
        let config = ParserConfig::new().with_tag("<STRONG>", "<B>");
        assert_eq!(config.start_tag(Tag::Strong), "<B>");
        assert_eq!(config.start_tag(Tag::Emphasis), "<EM>");
    }

    #[test]
    fn test_with_tags_extends() {
        let config = ParserConfig::new()
            .with_tag("<EM>", "<I>")
            .with_tags([("<U>", "<INS>")]);
        assert_eq!(config.start_tag(Tag::Emphasis), "<I>");
        assert_eq!(config.start_tag(Tag::Underline), "<INS>");
    }

    #[test]
    fn test_interwiki_href() {
        let config = ParserConfig::new().with_interwiki("wp", "http://en.wikipedia.org/wiki/");
        assert_eq!(
            config.interwiki_href("wp:Rust").as_deref(),
            Some("http://en.wikipedia.org/wiki/Rust")
        );
        assert_eq!(config.interwiki_href("other:Rust"), None);
        assert_eq!(config.interwiki_href("Rust"), None);
        assert_eq!(config.interwiki_href(":Rust"), None);
    }

    #[test]
    fn test_interwiki_splits_at_first_colon() {
        let config = ParserConfig::new().with_interwikis([("wp", "P/")]);
        assert_eq!(config.interwiki_href("wp:a:b").as_deref(), Some("P/a:b"));
    }

    #[test]
    fn test_expand_tabs() {
        let config = ParserConfig::new().with_tab_stop(2);
        assert_eq!(config.expand_tabs("a\tb".to_owned()), "a&nbsp;&nbsp;b");
    }

    #[test]
    fn test_zero_tab_stop_keeps_tabs() {
        let config = ParserConfig::new().with_tab_stop(0);
        assert_eq!(config.expand_tabs("a\tb".to_owned()), "a\tb");
    }
}
