//! Escape-aware delimiter search.
//!
//! Links, images and the two fenced forms may carry markup of their own, so a
//! search for an inline delimiter steps over those bracketed regions. A search
//! for one of the region markers themselves does not, which is how the link and
//! image transforms find their own brackets.
//!
//! Every offset handled here is a byte offset. All tokens are ASCII, so a match
//! always lands on a `char` boundary.

/// Bracketed region stepped over by [`find_unescaped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Region {
    /// `{{{ ... }}}`
    Fence,
    /// `[[[ ... ]]]`
    Code,
    /// `[[ ... ]]`
    Link,
    /// `{{ ... }}`
    Image,
}

impl Region {
    /// Regions in the order they are tested at each scan position.
    const PRECEDENCE: [Self; 4] = [Self::Fence, Self::Code, Self::Link, Self::Image];

    pub(crate) const fn opener(self) -> &'static str {
        match self {
            Self::Fence => "{{{",
            Self::Code => "[[[",
            Self::Link => "[[",
            Self::Image => "{{",
        }
    }

    pub(crate) const fn closer(self) -> &'static str {
        match self {
            Self::Fence => "}}}",
            Self::Code => "]]]",
            Self::Link => "]]",
            Self::Image => "}}",
        }
    }

    /// A search for the region's own markers must be able to see them.
    fn is_skipped_for(self, token: &str) -> bool {
        token != self.opener() && token != self.closer()
    }

    /// Offset just past the closer of a region opening at `pos`.
    ///
    /// The closer search starts at the opener itself.
    fn end(self, markup: &str, pos: usize) -> Option<usize> {
        let closer = self.closer();
        markup
            .get(pos..)?
            .find(closer)
            .map(|offset| pos + offset + closer.len())
    }
}

/// Find the first qualifying occurrence of `token` at or after `start`.
///
/// The scan always begins at offset 0 so that region boundaries are the same
/// whatever `start` is; matches before `start` are simply not returned.
/// Returns `None` when there is no such occurrence.
pub(crate) fn find_unescaped(markup: &str, token: &str, start: usize) -> Option<usize> {
    let bytes = markup.as_bytes();
    let needle = token.as_bytes();
    let last = bytes.len().checked_sub(needle.len())?;

    let mut pos = 0;
    while pos <= last {
        if let Some(next) = skip_region(markup, token, pos) {
            pos = next;
            continue;
        }
        if bytes[pos..].starts_with(needle) && !is_escaped(bytes, pos) && pos >= start {
            return Some(pos);
        }
        pos += 1;
    }
    None
}

/// If a closed region the search must step over opens at `pos`, return the
/// offset just past it.
fn skip_region(markup: &str, token: &str, pos: usize) -> Option<usize> {
    let rest = &markup.as_bytes()[pos..];
    Region::PRECEDENCE
        .into_iter()
        .filter(|region| region.is_skipped_for(token))
        .filter(|region| rest.starts_with(region.opener().as_bytes()))
        .find_map(|region| region.end(markup, pos))
}

/// A match is escaped by a single `~` right before it. `~~` is a literal tilde
/// and escapes nothing.
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    match pos {
        0 => false,
        1 => bytes[0] == b'~',
        _ => bytes[pos - 1] == b'~' && bytes[pos - 2] != b'~',
    }
}
