//! Tag-encoding convention: structured metadata folded into plain Moodle
//! tag texts with a prefix-and-value scheme. Encode and decode share this
//! one definition so the round trip cannot drift.

/// A structured metadata value carried as a generic tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Week(String),
    Year(String),
    /// Holds the full paper name ("Paper 1"); the encoded form carries only
    /// the part after the "Paper" word.
    Paper(String),
    MainTopic(String),
    SubTopic(String),
}

impl Tag {
    pub fn encode(&self) -> String {
        match self {
            Tag::Week(week) => format!("Week_{week}"),
            Tag::Year(year) => format!("Year_{year}"),
            Tag::Paper(paper) => format!("Paper_{}", strip_paper_word(paper)),
            Tag::MainTopic(topic) => format!("MainTopic_{}", underscored(topic)),
            Tag::SubTopic(topic) => format!("SubTopic_{}", underscored(topic)),
        }
    }

    /// Reverse of [`Tag::encode`]; `None` for tag texts outside the scheme.
    pub fn decode(raw: &str) -> Option<Tag> {
        if let Some(rest) = raw.strip_prefix("Week_") {
            Some(Tag::Week(rest.to_string()))
        } else if let Some(rest) = raw.strip_prefix("Year_") {
            Some(Tag::Year(rest.to_string()))
        } else if let Some(rest) = raw.strip_prefix("Paper_") {
            Some(Tag::Paper(format!("Paper {rest}")))
        } else if let Some(rest) = raw.strip_prefix("MainTopic_") {
            Some(Tag::MainTopic(spaced(rest)))
        } else if let Some(rest) = raw.strip_prefix("SubTopic_") {
            Some(Tag::SubTopic(spaced(rest)))
        } else {
            None
        }
    }
}

/// Whitespace runs become single underscores.
fn underscored(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join("_")
}

fn spaced(value: &str) -> String {
    value.replace('_', " ")
}

/// Drop a leading case-insensitive "Paper" word plus surrounding whitespace,
/// leaving just the paper number.
fn strip_paper_word(paper: &str) -> String {
    let trimmed = paper.trim();
    let rest = trimmed
        .get(..5)
        .filter(|head| head.eq_ignore_ascii_case("paper"))
        .map(|_| trimmed[5..].trim_start())
        .unwrap_or(trimmed);
    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_topic_round_trips_spaces() {
        let tag = Tag::MainTopic("Particles and Waves".to_string());
        let encoded = tag.encode();
        assert_eq!(encoded, "MainTopic_Particles_and_Waves");
        assert_eq!(Tag::decode(&encoded), Some(tag));
    }

    #[test]
    fn paper_strips_and_restores_prefix() {
        let tag = Tag::Paper("Paper 1".to_string());
        let encoded = tag.encode();
        assert_eq!(encoded, "Paper_1");
        assert_eq!(Tag::decode(&encoded), Some(tag));
    }

    #[test]
    fn week_and_year_pass_through() {
        assert_eq!(Tag::Week("5".to_string()).encode(), "Week_5");
        assert_eq!(Tag::decode("Year_2025"), Some(Tag::Year("2025".to_string())));
    }

    #[test]
    fn sub_topic_keeps_punctuation() {
        let tag = Tag::SubTopic("Simple Harmonic Motion (SHM)".to_string());
        let encoded = tag.encode();
        assert_eq!(encoded, "SubTopic_Simple_Harmonic_Motion_(SHM)");
        assert_eq!(Tag::decode(&encoded), Some(tag));
    }

    #[test]
    fn unknown_prefixes_decode_to_none() {
        assert_eq!(Tag::decode("Difficulty_hard"), None);
        assert_eq!(Tag::decode(""), None);
    }
}
