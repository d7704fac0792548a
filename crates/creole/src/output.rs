//! Colored status lines on stderr.
//!
//! Stdout is reserved for rendered HTML, so every message goes to stderr.

use console::{Style, Term};

#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Good,
    Bad,
    Emphasis,
}

impl Tone {
    fn style(self) -> Option<Style> {
        match self {
            Self::Plain => None,
            Self::Good => Some(Style::new().green()),
            Self::Bad => Some(Style::new().red()),
            Self::Emphasis => Some(Style::new().cyan().bold()),
        }
    }
}

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, tone: Tone, msg: &str) {
        let _ = match tone.style() {
            Some(style) => self.term.write_line(&style.apply_to(msg).to_string()),
            None => self.term.write_line(msg),
        };
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Tone::Good, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Bad, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.line(Tone::Emphasis, msg);
    }

    /// Whether a progress bar would be visible.
    pub(crate) fn is_term(&self) -> bool {
        self.term.is_term()
    }
}
