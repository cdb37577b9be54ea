use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Coarse mood the user picks when rating a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sentiment {
    /// "Loved it"
    Loved,
    /// "It was fine"
    Fine,
    /// "Didn't like it"
    Disliked,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Loved, Sentiment::Fine, Sentiment::Disliked];

    /// Label shown to the user for this mood
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Loved => "Loved it",
            Sentiment::Fine => "It was fine",
            Sentiment::Disliked => "Didn't like it",
        }
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Loved => write!(f, "loved"),
            Sentiment::Fine => write!(f, "fine"),
            Sentiment::Disliked => write!(f, "disliked"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// Accepts both the short names and the user-facing labels, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "loved" | "loved it" => Ok(Sentiment::Loved),
            "fine" | "it was fine" => Ok(Sentiment::Fine),
            "disliked" | "didn't like it" | "didnt like it" => Ok(Sentiment::Disliked),
            other => Err(format!("unknown sentiment: {}", other)),
        }
    }
}

impl TryFrom<String> for Sentiment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Presentation-only banding of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    Skip,
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::S => write!(f, "S-Tier"),
            Tier::A => write!(f, "A-Tier"),
            Tier::B => write!(f, "B-Tier"),
            Tier::C => write!(f, "C-Tier"),
            Tier::Skip => write!(f, "Skip"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_names() {
        assert_eq!("loved".parse::<Sentiment>().unwrap(), Sentiment::Loved);
        assert_eq!("FINE".parse::<Sentiment>().unwrap(), Sentiment::Fine);
        assert_eq!("Disliked".parse::<Sentiment>().unwrap(), Sentiment::Disliked);
    }

    #[test]
    fn test_parse_labels() {
        for sentiment in Sentiment::ALL {
            assert_eq!(sentiment.label().parse::<Sentiment>().unwrap(), sentiment);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!("meh".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_sentiment_serde() {
        let json = serde_json::to_string(&Sentiment::Disliked).unwrap();
        assert_eq!(json, "\"disliked\"");

        let parsed: Sentiment = serde_json::from_str("\"Loved it\"").unwrap();
        assert_eq!(parsed, Sentiment::Loved);
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::S.to_string(), "S-Tier");
        assert_eq!(Tier::Skip.to_string(), "Skip");
    }
}
