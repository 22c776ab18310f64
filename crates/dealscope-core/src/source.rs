use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers of the bundled pricing sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Tcgplayer,
    Ebay,
}

impl ProviderId {
    pub const ALL: [Self; 2] = [Self::Tcgplayer, Self::Ebay];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcgplayer => "tcgplayer",
            Self::Ebay => "ebay",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tcgplayer" => Ok(Self::Tcgplayer),
            "ebay" => Ok(Self::Ebay),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" TCGPlayer ".parse::<ProviderId>(), Ok(ProviderId::Tcgplayer));
        assert_eq!("ebay".parse::<ProviderId>(), Ok(ProviderId::Ebay));
    }

    #[test]
    fn rejects_unknown_source() {
        let err = "cardmarket".parse::<ProviderId>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
