//! Snapshot persistence port. The working set is saved as a JSON array of
//! questions under a single well-known key; the browser shell backs this
//! with localStorage, tests with [`MemoryStore`].

use crate::error::StorageError;
use crate::question::Question;

pub const STORAGE_KEY: &str = "moodle-questions";

/// Key-value collaborator owning the persisted snapshot.
pub trait SnapshotStore {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&mut self, snapshot: &str) -> Result<(), StorageError>;
}

pub fn encode_snapshot(questions: &[Question]) -> String {
    serde_json::to_string(questions).unwrap_or_else(|_| "[]".to_string())
}

/// Unparsable payloads degrade to an empty set; never an error.
pub fn decode_snapshot(raw: &str) -> Vec<Question> {
    match serde_json::from_str(raw) {
        Ok(questions) => questions,
        Err(err) => {
            log::warn!("failed to decode stored snapshot: {err}");
            Vec::new()
        }
    }
}

pub fn load_questions(store: &dyn SnapshotStore) -> Vec<Question> {
    match store.load() {
        Ok(Some(raw)) => decode_snapshot(&raw),
        Ok(None) => Vec::new(),
        Err(err) => {
            log::warn!("failed to load snapshot: {err}");
            Vec::new()
        }
    }
}

pub fn save_questions(store: &mut dyn SnapshotStore, questions: &[Question]) {
    if let Err(err) = store.save(&encode_snapshot(questions)) {
        log::warn!("failed to save snapshot: {err}");
    }
}

/// In-memory store used by tests and headless callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StorageError> {
        self.slot = Some(snapshot.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::NormalizedImage;
    use crate::question::{Answer, QuestionDraft};

    fn sample_question() -> Question {
        let mut draft = QuestionDraft {
            image: Some(NormalizedImage {
                name: "q.png".to_string(),
                mime: "image/png".to_string(),
                bytes: vec![1, 2, 3],
                data_uri: "data:image/png;base64,AQID".to_string(),
            }),
            correct_answer: Some(Answer::C),
            week: "1".to_string(),
            year: "2025".to_string(),
            ..QuestionDraft::default()
        };
        draft.set_paper("Paper 2");
        draft.set_main_topic("Thermal Physics");
        draft.set_sub_topic1("Ideal gases");
        draft.build().unwrap()
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let question = sample_question();
        let mut store = MemoryStore::default();
        save_questions(&mut store, std::slice::from_ref(&question));

        let loaded = load_questions(&store);
        assert_eq!(loaded, vec![question]);
    }

    #[test]
    fn missing_snapshot_loads_as_empty() {
        let store = MemoryStore::default();
        assert!(load_questions(&store).is_empty());
    }

    #[test]
    fn unparsable_snapshot_loads_as_empty() {
        let mut store = MemoryStore::default();
        store.save("not json at all").unwrap();
        assert!(load_questions(&store).is_empty());
    }

    #[test]
    fn persisted_field_names_match_the_original_shape() {
        let json = encode_snapshot(&[sample_question()]);
        for key in [
            "\"id\"",
            "\"idnumber\"",
            "\"generatedImageFileName\"",
            "\"imageDataUrl\"",
            "\"imageBase64\"",
            "\"originalImageFileName\"",
            "\"correctAnswer\"",
            "\"mainTopic\"",
            "\"subTopic1\"",
            "\"subTopic2\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }
}
