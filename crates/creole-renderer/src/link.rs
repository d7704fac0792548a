//! Wiki link descriptions and the resolution hook.

/// How a link should be presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkTarget {
    /// A page inside the wiki.
    Internal,
    /// Opens in a new browsing context. Links start out with this target.
    #[default]
    External,
    /// A wiki page that does not exist yet.
    Unknown,
}

/// A `[[...]]` link on its way to becoming an anchor.
///
/// `text` is already rendered HTML when the link had a `|` label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkDescription {
    /// Destination as written, before interwiki expansion.
    pub link: String,
    /// Destination the anchor points at.
    pub href: String,
    /// Anchor content.
    pub text: String,
    pub target: LinkTarget,
}

impl LinkDescription {
    /// An external link whose `href` starts out equal to `link`.
    pub fn new(link: impl Into<String>, text: impl Into<String>) -> Self {
        let link = link.into();
        Self {
            href: link.clone(),
            link,
            text: text.into(),
            target: LinkTarget::External,
        }
    }
}

/// Hook consulted for every wiki link before its anchor is emitted.
///
/// Implementations may rewrite `href` and `text` or change the target.
pub trait LinkResolver: Send + Sync {
    fn resolve(&self, link: &mut LinkDescription);
}

impl<F> LinkResolver for F
where
    F: Fn(&mut LinkDescription) + Send + Sync,
{
    fn resolve(&self, link: &mut LinkDescription) {
        self(link);
    }
}
