//! In-memory whitelist of authorized cards.

use cardplug_core::CardId;

/// Set of cards allowed to switch the outlet on.
///
/// Membership is what matters; entries additionally keep the order in which
/// they were first seen so that rendering a loaded file reproduces it exactly.
/// Equality compares membership only.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    cards: Vec<CardId>,
}

impl PartialEq for Whitelist {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|card| other.contains(card))
    }
}

impl Eq for Whitelist {}

/// Line of a whitelist file that was not a valid card identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub content: String,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, card: &CardId) -> bool {
        self.cards.iter().any(|c| c == card)
    }

    /// Return a copy of this set with `card` inserted.
    ///
    /// The receiver is left untouched; the caller adopts the returned set only
    /// once it has been saved. Adding a card that is already present yields an
    /// identical set.
    #[must_use]
    pub fn added(&self, card: CardId) -> Self {
        let mut next = self.clone();
        next.insert(card);
        next
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardId> {
        self.cards.iter()
    }

    fn insert(&mut self, card: CardId) -> bool {
        if self.contains(&card) {
            return false;
        }
        self.cards.push(card);
        true
    }

    /// Parse the newline-delimited file format.
    ///
    /// Blank lines are ignored, `\r\n` endings are accepted, duplicates
    /// collapse into one entry. Lines that are not card identifiers are
    /// returned alongside the set instead of failing the whole parse.
    pub fn parse(text: &str) -> (Self, Vec<SkippedLine>) {
        let mut whitelist = Self::new();
        let mut skipped = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            match CardId::parse(line) {
                Ok(card) => {
                    whitelist.insert(card);
                }
                Err(_) => skipped.push(SkippedLine {
                    line: index + 1,
                    content: line.to_string(),
                }),
            }
        }

        (whitelist, skipped)
    }

    /// Render the file format: one lowercase identifier per `\n`-terminated line.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cards.len() * 16);
        for card in &self.cards {
            out.push_str(card.as_str());
            out.push('\n');
        }
        out
    }
}

impl FromIterator<CardId> for Whitelist {
    fn from_iter<T: IntoIterator<Item = CardId>>(iter: T) -> Self {
        let mut whitelist = Self::new();
        for card in iter {
            whitelist.insert(card);
        }
        whitelist
    }
}
