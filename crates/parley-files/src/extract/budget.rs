/// Character allowance shared by the units of one extraction
///
/// Units (a whole text file, a PDF page, a Word paragraph) are admitted in
/// order. A unit that does not fit is clipped to whatever is left and the
/// budget is spent; nothing is admitted after that.
#[derive(Debug, Clone)]
pub(crate) struct TextBudget {
    remaining: usize,
    exhausted: bool,
}

/// What the budget let through for one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admitted<'a> {
    Whole(&'a str),
    Clipped(&'a str),
}

impl<'a> Admitted<'a> {
    pub(crate) fn text(self) -> &'a str {
        match self {
            Self::Whole(text) | Self::Clipped(text) => text,
        }
    }

    pub(crate) fn is_clipped(self) -> bool {
        matches!(self, Self::Clipped(_))
    }
}

impl TextBudget {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            exhausted: false,
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Admit one unit of text
    ///
    /// `separator` is the cost charged after a unit that fits whole, such as
    /// the newline that will join it to the next one.
    pub(crate) fn admit<'a>(&mut self, text: &'a str, separator: usize) -> Admitted<'a> {
        if self.exhausted {
            return Admitted::Clipped("");
        }

        let chars = text.chars().count();
        if chars > self.remaining {
            let kept = clip(text, self.remaining);
            self.remaining = 0;
            self.exhausted = true;
            return Admitted::Clipped(kept);
        }

        self.remaining = self.remaining.saturating_sub(chars + separator);
        Admitted::Whole(text)
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters
pub(crate) fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
