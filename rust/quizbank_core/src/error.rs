//! Error types for the codec, normalizer, storage port and entry validation.

use std::fmt;

use thiserror::Error;

/// Failure while turning a Moodle XML document back into questions.
///
/// `Malformed`/`Attr` cover documents that do not parse at all; the two
/// empty variants distinguish "no question elements" from "question elements
/// present but none reconstructible".
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid XML format")]
    Malformed(#[from] quick_xml::Error),

    #[error("invalid XML attribute")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("no questions found in the XML file")]
    NoQuestions,

    #[error("no valid questions with images found in the XML file")]
    NoUsableQuestions,
}

/// Failure while re-encoding an uploaded image. Callers fall back to the
/// unmodified original bytes; this error is logged, never shown to the user.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("unsupported content type: {0}")]
    UnsupportedType(String),
}

/// Failure in the snapshot store collaborator. Load failures degrade to an
/// empty question set.
#[derive(Debug, Error)]
#[error("snapshot store error: {0}")]
pub struct StorageError(pub String);

/// Form fields checked for presence at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Image,
    CorrectAnswer,
    Week,
    Year,
    Paper,
    MainTopic,
    SubTopic1,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::Image => "image",
            Field::CorrectAnswer => "correctAnswer",
            Field::Week => "week",
            Field::Year => "year",
            Field::Paper => "paper",
            Field::MainTopic => "mainTopic",
            Field::SubTopic1 => "subTopic1",
        }
    }
}

/// Per-field messages collected by draft validation. Surfaced inline by the
/// form layer; nothing is committed while this is non-empty.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    entries: Vec<(Field, &'static str)>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: Field, message: &'static str) {
        self.entries.push((field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.entries.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Field-keyed message map for the form layer.
    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(f, m)| (f.key().to_string(), serde_json::Value::from(*m)))
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self
            .entries
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.key(), msg))
            .collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
