//! Creole wiki markup to HTML.
//!
//! This crate provides [`CreoleRenderer`], which turns one page of Creole
//! markup into an HTML fragment. Besides standard Creole it understands
//! underline (`__`), superscript (`^^`), subscript (`,,`), strikethrough
//! (`--`), inline and block `{{{ }}}` verbatim, and `[[[code ... ]]]` blocks.
//!
//! # Architecture
//!
//! Rendering runs in three layers:
//! - the line segmenter joins wrapped physical lines into logical lines
//! - the block renderer tracks open lists, tables and fences across lines
//! - the inline processor rewrites the text of a single line or cell
//!
//! All delimiter searches go through one escape-aware scanner that steps over
//! links, images and verbatim spans.
//!
//! Output uses upper-case legacy tags. Start tags can be replaced through
//! [`ParserConfig`], and every wiki link passes through an optional
//! [`LinkResolver`] before it is written.
//!
//! Rendering never fails. Unterminated delimiters close at the end of their
//! fragment, and anything unrecognised is passed through as text.
//!
//! # Example
//!
//! ```
//! use creole_renderer::{CreoleRenderer, LinkDescription, LinkTarget, ParserConfig};
//!
//! let config = ParserConfig::new().with_interwiki("wp", "https://en.wikipedia.org/wiki/");
//! let internal = |link: &mut LinkDescription| {
//!     if !link.href.contains("://") {
//!         link.target = LinkTarget::Internal;
//!     }
//! };
//! let html = CreoleRenderer::new(&config)
//!     .with_link_resolver(&internal)
//!     .render("See [[wp:Rust|//Rust//]] and [[Home]].");
//! assert!(html.contains(r#"<A href="https://en.wikipedia.org/wiki/Rust" target=_blank  ><EM>Rust</EM></A>"#));
//! assert!(html.contains(r#"<A href="Home"  >Home</A>"#));
//! ```

mod config;
mod html;
mod inline;
mod lines;
mod link;
mod renderer;
mod scanner;
mod state;

pub use config::{DEFAULT_TAB_STOP, ParserConfig};
pub use html::{Tag, escape_html};
pub use link::{LinkDescription, LinkResolver, LinkTarget};
pub use renderer::CreoleRenderer;

/// Render `markup` with the default configuration and no link resolver.
#[must_use]
pub fn to_html(markup: &str) -> String {
    CreoleRenderer::new(&ParserConfig::default()).render(markup)
}
