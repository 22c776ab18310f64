use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SET_ID_LEN: usize = 24;
const MAX_NUMBER_LEN: usize = 16;
const MAX_TAG_LEN: usize = 32;

/// Compound key naming one priceable catalog item.
///
/// The set id is normalized to lowercase and the item number to uppercase so
/// that `SWSH4-183` and `swsh4-183` name the same card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemIdentity {
    set_id: String,
    number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl ItemIdentity {
    pub fn new(set_id: &str, number: &str) -> Result<Self, ValidationError> {
        let set_id = set_id.trim();
        if set_id.is_empty() {
            return Err(ValidationError::EmptySetId);
        }
        let number = number.trim();
        if number.is_empty() {
            return Err(ValidationError::EmptyItemNumber);
        }

        let set_id = set_id.to_ascii_lowercase();
        validate_field("set id", &set_id, MAX_SET_ID_LEN, |ch| {
            ch.is_ascii_alphanumeric() || ch == '.' || ch == '_'
        })?;

        let number = number.to_ascii_uppercase();
        validate_field("item number", &number, MAX_NUMBER_LEN, |ch| {
            ch.is_ascii_alphanumeric() || ch == '/'
        })?;

        Ok(Self {
            set_id,
            number,
            variant: None,
            language: None,
        })
    }

    /// Parses a `<set>-<number>` key such as `swsh4-183`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let Some((set_id, number)) = input.trim().split_once('-') else {
            return Err(ValidationError::InvalidItemKey {
                value: input.to_owned(),
            });
        };
        Self::new(set_id, number)
    }

    pub fn with_variant(mut self, variant: &str) -> Result<Self, ValidationError> {
        self.variant = Some(normalize_tag("variant", variant)?);
        Ok(self)
    }

    pub fn with_language(mut self, language: &str) -> Result<Self, ValidationError> {
        self.language = Some(normalize_tag("language", language)?);
        Ok(self)
    }

    pub fn set_id(&self) -> &str {
        &self.set_id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Lookup key used by fixture-backed feeds (`<set>-<number>`, lowercase).
    pub fn key(&self) -> String {
        format!("{}-{}", self.set_id, self.number.to_ascii_lowercase())
    }
}

impl Display for ItemIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.set_id, self.number)?;
        if let Some(variant) = &self.variant {
            write!(f, " ({variant})")?;
        }
        if let Some(language) = &self.language {
            write!(f, " [{language}]")?;
        }
        Ok(())
    }
}

impl FromStr for ItemIdentity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

fn validate_field(
    field: &'static str,
    value: &str,
    max: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::ItemFieldTooLong { field, len, max });
    }

    for (index, ch) in value.chars().enumerate() {
        if !allowed(ch) {
            return Err(ValidationError::ItemFieldInvalidChar { field, ch, index });
        }
    }

    Ok(())
}

fn normalize_tag(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::InvalidConfig {
            key: field,
            value: value.to_owned(),
        });
    }
    validate_field(field, &normalized, MAX_TAG_LEN, |ch| {
        ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
    })?;
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_key() {
        let item = ItemIdentity::parse(" SWSH4-183 ").expect("key should parse");
        assert_eq!(item.set_id(), "swsh4");
        assert_eq!(item.number(), "183");
        assert_eq!(item.key(), "swsh4-183");
    }

    #[test]
    fn keeps_promo_numbers_lookup_friendly() {
        let item = ItemIdentity::parse("swsh12-tg05").expect("key should parse");
        assert_eq!(item.number(), "TG05");
        assert_eq!(item.key(), "swsh12-tg05");
    }

    #[test]
    fn rejects_key_without_separator() {
        let err = ItemIdentity::parse("base1").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidItemKey { .. }));
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(matches!(
            ItemIdentity::parse("-4"),
            Err(ValidationError::EmptySetId)
        ));
        assert!(matches!(
            ItemIdentity::parse("base1-"),
            Err(ValidationError::EmptyItemNumber)
        ));
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = ItemIdentity::new("base 1", "4").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::ItemFieldInvalidChar { ch: ' ', .. }
        ));
    }

    #[test]
    fn variant_and_language_distinguish_items() {
        let plain = ItemIdentity::parse("base1-4").expect("valid");
        let first_edition = plain
            .clone()
            .with_variant("1st-Edition")
            .expect("valid variant")
            .with_language("EN")
            .expect("valid language");

        assert_ne!(plain, first_edition);
        assert_eq!(first_edition.key(), plain.key());
        assert_eq!(first_edition.to_string(), "base1-4 (1st-edition) [en]");
    }
}
