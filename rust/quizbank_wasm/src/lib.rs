use quizbank_core::error::ValidationErrors;
use quizbank_core::image::{self, NormalizedImage, RawImage};
use quizbank_core::question::{Answer, QuestionDraft};
use quizbank_core::{taxonomy, BankCore};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct Bank {
    core: BankCore,
    /// Images staged for the bulk workflow, already normalized, in the
    /// order the shell added them.
    bulk: Vec<NormalizedImage>,
}

#[wasm_bindgen]
impl Bank {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Bank {
        Bank { core: BankCore::new_empty(), bulk: Vec::new() }
    }

    pub fn new_empty() -> Bank { Self::new() }

    /// Seed from the persisted snapshot; unparsable input yields an empty bank.
    pub fn from_json(json: String) -> Bank {
        Bank { core: BankCore::from_snapshot_json(&json), bulk: Vec::new() }
    }

    pub fn to_json(&self) -> String { self.core.to_snapshot_json() }

    /// Well-known key the shell persists the snapshot under.
    pub fn storage_key(&self) -> String {
        quizbank_core::storage::STORAGE_KEY.to_string()
    }

    /// Current questions in presentation order (week, then idnumber).
    pub fn sorted_json(&self) -> String {
        serde_json::to_string(&self.core.sorted_questions()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn question_count(&self) -> usize { self.core.questions().len() }

    // Image staging (uploads and clipboard paste go through the same path)
    pub fn stage_image(&self, name: String, mime: String, bytes: Vec<u8>) -> String {
        self.core.stage_image(&RawImage { name, mime, bytes }).data_uri
    }

    /// Order a multi-select before staging: digit runs compare numerically.
    pub fn sort_file_names(&self, names_json: String) -> String {
        let mut names: Vec<String> = serde_json::from_str(&names_json).unwrap_or_default();
        names.sort_by(|a, b| image::file_name_cmp(a, b));
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }

    // Single-entry workflow
    #[allow(clippy::too_many_arguments)]
    pub fn add_question(
        &mut self,
        image_name: String,
        image_mime: String,
        image_bytes: Vec<u8>,
        correct_answer: String,
        week: String,
        year: String,
        paper: String,
        main_topic: String,
        sub_topic1: String,
        sub_topic2: String,
    ) -> Result<String, JsValue> {
        let image = self.core.stage_image(&RawImage {
            name: image_name,
            mime: image_mime,
            bytes: image_bytes,
        });
        let draft = draft_from_fields(
            image, &correct_answer, week, year, paper, main_topic, sub_topic1, sub_topic2,
        );
        self.core.submit_draft(draft).map_err(validation_js)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_question(
        &mut self,
        id: String,
        image_name: String,
        image_mime: String,
        image_bytes: Vec<u8>,
        correct_answer: String,
        week: String,
        year: String,
        paper: String,
        main_topic: String,
        sub_topic1: String,
        sub_topic2: String,
    ) -> Result<bool, JsValue> {
        let image = self.core.stage_image(&RawImage {
            name: image_name,
            mime: image_mime,
            bytes: image_bytes,
        });
        let draft = draft_from_fields(
            image, &correct_answer, week, year, paper, main_topic, sub_topic1, sub_topic2,
        );
        self.core.update_question(&id, draft).map_err(validation_js)
    }

    // Bulk workflow: stage images, then submit one metadata row per image
    pub fn add_bulk_image(&mut self, name: String, mime: String, bytes: Vec<u8>) -> String {
        let staged = self.core.stage_image(&RawImage { name, mime, bytes });
        let data_uri = staged.data_uri.clone();
        self.bulk.push(staged);
        data_uri
    }

    pub fn remove_bulk_image(&mut self, index: usize) {
        if index < self.bulk.len() {
            self.bulk.remove(index);
        }
    }

    pub fn bulk_count(&self) -> usize { self.bulk.len() }

    pub fn clear_bulk(&mut self) { self.bulk.clear(); }

    /// `rows_json` is an array of field objects, one per staged image, in
    /// staging order. All-or-nothing: either every row validates and one
    /// commit appends the whole batch, or nothing changes.
    pub fn submit_bulk(&mut self, rows_json: String) -> Result<usize, JsValue> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(&rows_json)
            .map_err(|e| JsValue::from_str(&format!("invalid metadata rows: {e}")))?;
        if rows.len() != self.bulk.len() {
            return Err(JsValue::from_str("metadata rows do not match staged images"));
        }

        let drafts: Vec<QuestionDraft> = self
            .bulk
            .iter()
            .zip(&rows)
            .map(|(image, row)| {
                let field = |key: &str| {
                    row.get(key).and_then(|v| v.as_str()).unwrap_or("").to_string()
                };
                draft_from_fields(
                    image.clone(),
                    &field("correctAnswer"),
                    field("week"),
                    field("year"),
                    field("paper"),
                    field("mainTopic"),
                    field("subTopic1"),
                    field("subTopic2"),
                )
            })
            .collect();

        let ids = self.core.submit_bulk(drafts).map_err(validation_js)?;
        self.bulk.clear();
        Ok(ids.len())
    }

    // Import/export
    pub fn import_xml(&mut self, xml: String) -> Result<usize, JsValue> {
        self.core.import_xml(&xml).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn export_xml(&self) -> String { self.core.export_xml() }

    pub fn export_file_name(&self) -> String {
        quizbank_core::import_export::EXPORT_FILE_NAME.to_string()
    }

    // History
    pub fn undo(&mut self) { let _ = self.core.undo(); }
    pub fn redo(&mut self) { let _ = self.core.redo(); }
    pub fn can_undo(&self) -> bool { self.core.can_undo() }
    pub fn can_redo(&self) -> bool { self.core.can_redo() }

    // Taxonomy accessors for the selector cascade
    pub fn papers(&self) -> String { to_json_list(taxonomy::papers()) }

    pub fn main_topics(&self, paper: String) -> String {
        to_json_list(taxonomy::main_topics(&paper))
    }

    pub fn sub_topic1_list(&self, paper: String, main_topic: String) -> String {
        to_json_list(taxonomy::sub_topic1_list(&paper, &main_topic).to_vec())
    }

    pub fn sub_topic2_choices(&self, paper: String, main_topic: String, sub_topic1: String) -> String {
        to_json_list(taxonomy::sub_topic2_choices(&paper, &main_topic, &sub_topic1))
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::too_many_arguments)]
fn draft_from_fields(
    image: NormalizedImage,
    correct_answer: &str,
    week: String,
    year: String,
    paper: String,
    main_topic: String,
    sub_topic1: String,
    sub_topic2: String,
) -> QuestionDraft {
    let mut draft = QuestionDraft {
        image: Some(image),
        correct_answer: Answer::parse(correct_answer),
        week,
        year,
        ..QuestionDraft::default()
    };
    draft.set_paper(paper);
    draft.set_main_topic(main_topic);
    draft.set_sub_topic1(sub_topic1);
    draft.set_sub_topic2(sub_topic2);
    draft
}

fn validation_js(errors: ValidationErrors) -> JsValue {
    JsValue::from_str(&errors.to_json())
}

fn to_json_list(values: Vec<&'static str>) -> String {
    serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_sanity() {
        let mut bank = Bank::new_empty();
        // Undecodable bytes still stage via the passthrough fallback.
        let id = bank
            .add_question(
                "q1.png".to_string(),
                "image/png".to_string(),
                vec![1, 2, 3, 4],
                "B".to_string(),
                "1".to_string(),
                "2025".to_string(),
                "Paper 1".to_string(),
                "Electricity".to_string(),
                "Resistivity".to_string(),
                String::new(),
            )
            .unwrap();
        assert!(!id.is_empty());
        assert!(bank.export_xml().contains("<question type=\"multichoice\">"));
        assert!(bank.can_undo());
    }
}
