pub mod error;
pub mod history;
pub mod image;
pub mod import_export;
pub mod question;
pub mod storage;
pub mod tags;
pub mod taxonomy;

use std::sync::Arc;

use crate::error::{ImportError, ValidationErrors};
use crate::history::History;
use crate::image::{NormalizeOptions, NormalizedImage, RawImage};
use crate::question::{Question, QuestionDraft};

/// A full, immutable question list at one point in edit history. Commits
/// always pass a structurally new `Arc`, so undo restores the identical
/// snapshot value.
pub type Snapshot = Arc<Vec<Question>>;

/// Owns the question-set history and orchestrates the entry, import and
/// export workflows against it. The current snapshot is the single source
/// of truth for every rendering surface.
#[derive(Debug)]
pub struct BankCore {
    history: History<Snapshot>,
    normalize_options: NormalizeOptions,
}

impl Default for BankCore {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl BankCore {
    pub fn new_empty() -> Self {
        Self::with_questions(Vec::new())
    }

    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            history: History::new(Arc::new(questions)),
            normalize_options: NormalizeOptions::default(),
        }
    }

    /// Seed from a persisted snapshot; unparsable input degrades to empty.
    pub fn from_snapshot_json(json: &str) -> Self {
        Self::with_questions(storage::decode_snapshot(json))
    }

    pub fn to_snapshot_json(&self) -> String {
        storage::encode_snapshot(self.questions())
    }

    pub fn questions(&self) -> &[Question] {
        self.history.current()
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(self.history.current())
    }

    pub fn sorted_questions(&self) -> Vec<Question> {
        question::sorted(self.questions())
    }

    pub fn by_week(&self) -> Vec<(String, Vec<Question>)> {
        question::by_week(self.questions())
    }

    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions().iter().find(|q| q.id == id)
    }

    /// Normalize an uploaded or pasted image; if re-encoding fails the
    /// original bytes are used verbatim and the failure is only logged.
    pub fn stage_image(&self, raw: &RawImage) -> NormalizedImage {
        match image::normalize(raw, &self.normalize_options) {
            Ok(normalized) => normalized,
            Err(err) => {
                log::warn!("image normalization failed for {}: {err}", raw.name);
                image::passthrough(raw)
            }
        }
    }

    /// Stage a batch in deterministic order: ascending by filename with
    /// digit runs compared numerically, processed sequentially.
    pub fn stage_images(&self, mut files: Vec<RawImage>) -> Vec<NormalizedImage> {
        image::sort_for_batch(&mut files);
        files.iter().map(|raw| self.stage_image(raw)).collect()
    }

    /// Single-entry submission: validate, build, commit current + new.
    pub fn submit_draft(&mut self, draft: QuestionDraft) -> Result<String, ValidationErrors> {
        let question = draft.build()?;
        let id = question.id.clone();
        let mut next = self.questions().to_vec();
        next.push(question);
        self.history.commit(Arc::new(next));
        Ok(id)
    }

    /// Bulk submission: one shared timestamp base, per-index offset, one
    /// commit appending every question. Nothing is committed unless every
    /// entry validates.
    pub fn submit_bulk(&mut self, drafts: Vec<QuestionDraft>) -> Result<Vec<String>, ValidationErrors> {
        for draft in &drafts {
            draft.validate()?;
        }

        let base = question::unix_timestamp();
        let mut next = self.questions().to_vec();
        let mut ids = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let question = draft.build_numbered((base + index as u64).to_string())?;
            ids.push(question.id.clone());
            next.push(question);
        }
        self.history.commit(Arc::new(next));
        Ok(ids)
    }

    /// Replace a question in place: same `id`, `idnumber` preserved from
    /// the original, everything else rebuilt from the draft. Returns false
    /// for an unknown id.
    pub fn update_question(&mut self, id: &str, draft: QuestionDraft) -> Result<bool, ValidationErrors> {
        let Some(existing) = self.find(id) else {
            return Ok(false);
        };
        let idnumber = existing.idnumber.clone();

        let mut rebuilt = draft.build_numbered(idnumber)?;
        rebuilt.id = id.to_string();

        let next: Vec<Question> = self
            .questions()
            .iter()
            .map(|q| if q.id == id { rebuilt.clone() } else { q.clone() })
            .collect();
        self.history.commit(Arc::new(next));
        Ok(true)
    }

    /// Import a quiz document and commit it as a full replacement of the
    /// question list (not an append). Errors leave the current snapshot
    /// untouched; a successful import is undoable like any other edit.
    pub fn import_xml(&mut self, xml: &str) -> Result<usize, ImportError> {
        let questions = import_export::from_moodle_xml(xml)?;
        let count = questions.len();
        self.history.commit(Arc::new(questions));
        Ok(count)
    }

    pub fn export_xml(&self) -> String {
        import_export::to_moodle_xml(self.questions())
    }

    pub fn undo(&mut self) -> &[Question] {
        self.history.undo()
    }

    pub fn redo(&mut self) -> &[Question] {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
