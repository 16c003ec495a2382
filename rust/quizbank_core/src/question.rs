//! Question entity, entry draft and presentation helpers.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Field, ValidationErrors};
use crate::image::NormalizedImage;

/// One of the four fixed answer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    A,
    B,
    C,
    D,
}

impl Answer {
    pub const ALL: [Answer; 4] = [Answer::A, Answer::B, Answer::C, Answer::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::A => "A",
            Answer::B => "B",
            Answer::C => "C",
            Answer::D => "D",
        }
    }

    pub fn parse(raw: &str) -> Option<Answer> {
        match raw.trim() {
            "A" => Some(Answer::A),
            "B" => Some(Answer::B),
            "C" => Some(Answer::C),
            "D" => Some(Answer::D),
            _ => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize the optional answer as its letter, or `""` when unset, so the
/// persisted snapshot keeps the original field shape.
mod answer_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Answer;

    pub fn serialize<S>(value: &Option<Answer>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(|a| a.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Answer>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Answer::parse(&raw))
    }
}

/// The unit of export, import and undo. Never mutated outside a snapshot
/// transition; edits replace the whole value under the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub idnumber: String,
    pub generated_image_file_name: String,
    pub image_data_url: String,
    /// Always the tail of `image_data_url` after its first comma.
    pub image_base64: String,
    pub original_image_file_name: String,
    #[serde(with = "answer_repr")]
    pub correct_answer: Option<Answer>,
    pub week: String,
    pub year: String,
    pub paper: String,
    pub main_topic: String,
    pub sub_topic1: String,
    #[serde(default)]
    pub sub_topic2: String,
}

/// Interactive entry form state. Topic setters implement the cascade resets
/// so every editing surface shares them.
#[derive(Debug, Clone, Default)]
pub struct QuestionDraft {
    pub image: Option<NormalizedImage>,
    pub correct_answer: Option<Answer>,
    pub week: String,
    pub year: String,
    pub paper: String,
    pub main_topic: String,
    pub sub_topic1: String,
    pub sub_topic2: String,
}

impl QuestionDraft {
    /// Pre-fill a draft from an existing question for editing.
    pub fn from_question(question: &Question, image: NormalizedImage) -> Self {
        Self {
            image: Some(image),
            correct_answer: question.correct_answer,
            week: question.week.clone(),
            year: question.year.clone(),
            paper: question.paper.clone(),
            main_topic: question.main_topic.clone(),
            sub_topic1: question.sub_topic1.clone(),
            sub_topic2: question.sub_topic2.clone(),
        }
    }

    /// Changing paper invalidates everything below it.
    pub fn set_paper(&mut self, paper: impl Into<String>) {
        self.paper = paper.into();
        self.main_topic.clear();
        self.sub_topic1.clear();
        self.sub_topic2.clear();
    }

    /// Changing main topic invalidates both subtopics.
    pub fn set_main_topic(&mut self, main_topic: impl Into<String>) {
        self.main_topic = main_topic.into();
        self.sub_topic1.clear();
        self.sub_topic2.clear();
    }

    /// Changing sub topic 1 invalidates sub topic 2.
    pub fn set_sub_topic1(&mut self, sub_topic1: impl Into<String>) {
        self.sub_topic1 = sub_topic1.into();
        self.sub_topic2.clear();
    }

    /// Sub topic 2 must differ from sub topic 1; an equal value clears it.
    pub fn set_sub_topic2(&mut self, sub_topic2: impl Into<String>) {
        let value = sub_topic2.into();
        self.sub_topic2 = if value == self.sub_topic1 { String::new() } else { value };
    }

    /// Required-field presence check. Reports every missing field at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.image.is_none() {
            errors.push(Field::Image, "Please add an image");
        }
        if self.correct_answer.is_none() {
            errors.push(Field::CorrectAnswer, "Please select the correct answer");
        }
        if self.week.trim().is_empty() {
            errors.push(Field::Week, "Week is required");
        }
        if self.year.trim().is_empty() {
            errors.push(Field::Year, "Year is required");
        }
        if self.paper.trim().is_empty() {
            errors.push(Field::Paper, "Paper is required");
        }
        if self.main_topic.trim().is_empty() {
            errors.push(Field::MainTopic, "Main topic is required");
        }
        if self.sub_topic1.trim().is_empty() {
            errors.push(Field::SubTopic1, "Sub topic 1 is required");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build a question numbered with the current epoch second.
    pub fn build(self) -> Result<Question, ValidationErrors> {
        self.build_numbered(unix_timestamp().to_string())
    }

    /// Build with an explicit `idnumber` (bulk batches offset a shared base;
    /// edits keep the original number).
    pub fn build_numbered(self, idnumber: String) -> Result<Question, ValidationErrors> {
        self.validate()?;
        let Some(image) = self.image else {
            let mut errors = ValidationErrors::default();
            errors.push(Field::Image, "Please add an image");
            return Err(errors);
        };

        let id = Uuid::new_v4().to_string();
        let extension = file_extension(&image.name);
        let file_name = format!("{}_{}.{}", idnumber, &id[..8], extension);
        let image_base64 = image
            .data_uri
            .split_once(',')
            .map(|(_, payload)| payload.to_string())
            .unwrap_or_default();

        Ok(Question {
            id,
            idnumber,
            generated_image_file_name: file_name,
            image_data_url: image.data_uri,
            image_base64,
            original_image_file_name: image.name,
            correct_answer: self.correct_answer,
            week: self.week,
            year: self.year,
            paper: self.paper,
            main_topic: self.main_topic,
            sub_topic1: self.sub_topic1,
            sub_topic2: self.sub_topic2,
        })
    }
}

pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn file_extension(name: &str) -> &str {
    match name.rsplit('.').next() {
        Some(ext) if !ext.is_empty() => ext,
        _ => "png",
    }
}

fn numeric(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Presentation order: ascending week, then ascending idnumber, both
/// compared numerically.
pub fn sorted(questions: &[Question]) -> Vec<Question> {
    let mut out = questions.to_vec();
    out.sort_by(|a, b| {
        numeric(&a.week)
            .cmp(&numeric(&b.week))
            .then_with(|| numeric(&a.idnumber).cmp(&numeric(&b.idnumber)))
    });
    out
}

/// Group questions by week, weeks in ascending numeric order, questions in
/// insertion order within each week.
pub fn by_week(questions: &[Question]) -> Vec<(String, Vec<Question>)> {
    let mut groups: Vec<(String, Vec<Question>)> = Vec::new();
    for q in questions {
        match groups.iter_mut().find(|(week, _)| *week == q.week) {
            Some((_, list)) => list.push(q.clone()),
            None => groups.push((q.week.clone(), vec![q.clone()])),
        }
    }
    groups.sort_by_key(|(week, _)| numeric(week));
    groups
}
