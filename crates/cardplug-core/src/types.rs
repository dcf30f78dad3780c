use crate::{
    Result,
    constants::{MAX_UID_BYTES, MIN_UID_BYTES},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Normalized proximity card identifier.
///
/// Each raw UID byte is rendered as two lowercase hex digits, concatenated in
/// scan order, so `[0xAA, 0x11, 0xBB, 0x22]` becomes `"aa11bb22"`.
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when comparing identifiers during authorization.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Build an identifier from the raw bytes produced by a reader.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardFormat` if the UID is empty or longer than
    /// [`MAX_UID_BYTES`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let len = raw.len();
        if !(MIN_UID_BYTES..=MAX_UID_BYTES).contains(&len) {
            return Err(Error::InvalidCardFormat(format!(
                "UID must be {MIN_UID_BYTES}-{MAX_UID_BYTES} bytes, got {len}"
            )));
        }

        Ok(CardId(raw.iter().map(|b| format!("{b:02x}")).collect()))
    }

    /// Parse an identifier from text such as a whitelist line.
    ///
    /// The input is trimmed and lowercased before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardFormat` if the text is empty, has an odd
    /// number of digits, or contains non-hex characters.
    pub fn parse(text: &str) -> Result<Self> {
        let normalized = text.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(Error::InvalidCardFormat("empty card id".to_string()));
        }

        if !normalized.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidCardFormat(format!(
                "card id must be hexadecimal: {normalized}"
            )));
        }

        if normalized.len() % 2 != 0 {
            return Err(Error::InvalidCardFormat(format!(
                "card id must have an even number of digits: {normalized}"
            )));
        }

        if normalized.len() / 2 > MAX_UID_BYTES {
            return Err(Error::InvalidCardFormat(format!(
                "card id longer than {MAX_UID_BYTES} bytes: {normalized}"
            )));
        }

        Ok(CardId(normalized))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardId::parse(s)
    }
}

impl TryFrom<String> for CardId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        CardId::parse(&value)
    }
}

impl From<CardId> for String {
    fn from(card: CardId) -> Self {
        card.0
    }
}

/// Constant-time comparison implementation for CardId
impl PartialEq for CardId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for CardId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Cards allowed to open an enrollment window.
///
/// Supplied by configuration and fixed for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterSet {
    cards: Vec<CardId>,
}

impl MasterSet {
    /// Create a master set, collapsing duplicates.
    pub fn new(cards: impl IntoIterator<Item = CardId>) -> Self {
        let mut unique: Vec<CardId> = Vec::new();
        for card in cards {
            if !unique.contains(&card) {
                unique.push(card);
            }
        }
        Self { cards: unique }
    }

    /// Returns `true` if the card carries master privilege.
    #[must_use]
    pub fn contains(&self, card: &CardId) -> bool {
        self.cards.iter().any(|master| master == card)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardId> {
        self.cards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0xAA, 0x11, 0xBB, 0x22], "aa11bb22")]
    #[case(&[0x04, 0x0A, 0x00, 0xFF], "040a00ff")]
    #[case(&[0x01], "01")]
    #[case(&[0x04, 0xAB, 0xCD, 0xEF, 0x12, 0x34, 0x56], "04abcdef123456")]
    fn test_card_id_from_bytes(#[case] raw: &[u8], #[case] expected: &str) {
        let card = CardId::from_bytes(raw).unwrap();
        assert_eq!(card.as_str(), expected);
    }

    #[test]
    fn test_card_id_from_empty_bytes() {
        assert!(CardId::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_card_id_from_oversized_bytes() {
        assert!(CardId::from_bytes(&[0u8; MAX_UID_BYTES + 1]).is_err());
    }

    #[rstest]
    #[case("aa11bb22", "aa11bb22")]
    #[case("AA11BB22", "aa11bb22")]
    #[case("  ffff0001\r", "ffff0001")]
    fn test_card_id_parse_valid(#[case] input: &str, #[case] expected: &str) {
        let card: CardId = input.parse().unwrap();
        assert_eq!(card.as_str(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("   ")] // whitespace only
    #[case("abc")] // odd length
    #[case("zz11bb22")] // non-hex
    #[case("aa11 bb22")] // inner space
    fn test_card_id_parse_invalid(#[case] input: &str) {
        let result: Result<CardId> = input.parse();
        assert!(matches!(result, Err(Error::InvalidCardFormat(_))));
    }

    #[test]
    fn test_card_id_bytes_and_text_agree() {
        let scanned = CardId::from_bytes(&[0xCC, 0x33, 0xDD, 0x44]).unwrap();
        let stored = CardId::parse("CC33DD44").unwrap();
        assert_eq!(scanned, stored);
    }

    #[test]
    fn test_card_id_serde_rejects_malformed() {
        #[derive(Deserialize)]
        struct Holder {
            card: CardId,
        }

        let ok: Holder = toml::from_str(r#"card = "FFFF0001""#).unwrap();
        assert_eq!(ok.card.as_str(), "ffff0001");

        let bad: std::result::Result<Holder, _> = toml::from_str(r#"card = "xyz""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_master_set_membership() {
        let masters = MasterSet::new([
            CardId::parse("ffff0001").unwrap(),
            CardId::parse("FFFF0001").unwrap(),
        ]);

        assert_eq!(masters.len(), 1);
        assert!(masters.contains(&CardId::parse("ffff0001").unwrap()));
        assert!(!masters.contains(&CardId::parse("aa11bb22").unwrap()));
    }
}
