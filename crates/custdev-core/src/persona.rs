//! Persona classes that select a response-shaping strategy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name fragments checked in order; the first one found in a segment name wins.
const NAME_RULES: &[(&str, PersonaClass)] = &[
    ("Студенты", PersonaClass::PriceSensitive),
    ("Родители", PersonaClass::ConvenienceFocused),
    ("Предприниматели", PersonaClass::InnovationFocused),
];

/// Closed set of response-shaping strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaClass {
    /// Leans towards the first (cheapest) options.
    PriceSensitive,
    /// Leans towards the middle and last options.
    ConvenienceFocused,
    /// Leans heavily towards the last (newest) option.
    InnovationFocused,
    /// Near-uniform with random jitter.
    Balanced,
}

impl PersonaClass {
    /// Classify a segment by substring match on its name.
    pub fn classify(name: &str) -> Self {
        NAME_RULES
            .iter()
            .find(|(fragment, _)| name.contains(fragment))
            .map(|&(_, class)| class)
            .unwrap_or(Self::Balanced)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceSensitive => "price-sensitive",
            Self::ConvenienceFocused => "convenience-focused",
            Self::InnovationFocused => "innovation-focused",
            Self::Balanced => "balanced",
        }
    }
}

impl fmt::Display for PersonaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown persona class: {0}")]
pub struct UnknownPersonaClass(pub String);

impl FromStr for PersonaClass {
    type Err = UnknownPersonaClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-sensitive" => Ok(Self::PriceSensitive),
            "convenience-focused" => Ok(Self::ConvenienceFocused),
            "innovation-focused" => Ok(Self::InnovationFocused),
            "balanced" => Ok(Self::Balanced),
            other => Err(UnknownPersonaClass(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_names() {
        assert_eq!(
            PersonaClass::classify("Студенты 18–22"),
            PersonaClass::PriceSensitive
        );
        assert_eq!(
            PersonaClass::classify("Родители 29–40"),
            PersonaClass::ConvenienceFocused
        );
        assert_eq!(
            PersonaClass::classify("Предприниматели 25–45"),
            PersonaClass::InnovationFocused
        );
        assert_eq!(
            PersonaClass::classify("Молодые специалисты 23–28"),
            PersonaClass::Balanced
        );
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            PersonaClass::classify("Предприниматели и Студенты"),
            PersonaClass::PriceSensitive
        );
        assert_eq!(
            PersonaClass::classify("Студенты-Предприниматели"),
            PersonaClass::PriceSensitive
        );
        assert_eq!(
            PersonaClass::classify("Предприниматели, Родители"),
            PersonaClass::ConvenienceFocused
        );
    }

    #[test]
    fn match_is_case_sensitive() {
        // "студенты" (lowercase) is not the trigger fragment.
        assert_eq!(PersonaClass::classify("студенты"), PersonaClass::Balanced);
    }

    #[test]
    fn string_roundtrip() {
        for class in [
            PersonaClass::PriceSensitive,
            PersonaClass::ConvenienceFocused,
            PersonaClass::InnovationFocused,
            PersonaClass::Balanced,
        ] {
            assert_eq!(class.as_str().parse::<PersonaClass>().unwrap(), class);
        }
        assert!("premium".parse::<PersonaClass>().is_err());
    }
}
