//! Moodle XML codec: question list → quiz document and back.
//!
//! Export builds the document directly; import walks the events with
//! quick-xml. Both sides share the tag convention in [`crate::tags`], which
//! is what makes the round trip safe. The internal `id` is never written to
//! XML, so re-importing an export regenerates every `id` while preserving
//! `idnumber` and all tagged metadata.

use html_escape::{encode_double_quoted_attribute, encode_text};
use quick_xml::events::Event;
use quick_xml::Reader;
use uuid::Uuid;

use crate::error::ImportError;
use crate::question::{Answer, Question};
use crate::tags::Tag;

/// Moodle's placeholder for files embedded alongside the question text.
const PLUGINFILE_PREFIX: &str = "@@PLUGINFILE@@";

/// Download name for exported documents.
pub const EXPORT_FILE_NAME: &str = "questions.xml";

/// Serialize questions to a Moodle quiz document.
///
/// Questions without image data are skipped silently; an export with zero
/// `<question>` elements is still a valid document.
pub fn to_moodle_xml(questions: &[Question]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<quiz>\n");
    for question in questions {
        if question.image_base64.is_empty() {
            continue;
        }
        write_question(&mut xml, question);
    }
    xml.push_str("</quiz>\n");
    xml
}

fn write_question(out: &mut String, q: &Question) {
    let img_src = format!("{}/{}", PLUGINFILE_PREFIX, q.generated_image_file_name);

    let mut body = String::new();
    if !q.main_topic.is_empty() {
        body.push_str(&format!("<p>Main Topic: {}</p>", encode_text(&q.main_topic)));
    }
    if !q.sub_topic1.is_empty() {
        body.push_str(&format!("<p>Sub Topic 1: {}</p>", encode_text(&q.sub_topic1)));
    }
    if !q.sub_topic2.trim().is_empty() {
        body.push_str(&format!("<p>Sub Topic 2: {}</p>", encode_text(&q.sub_topic2)));
    }
    body.push_str(&format!(
        "<p><img src=\"{}\" alt=\"Question {}\" width=\"auto\" height=\"auto\" style=\"max-width: 100%;\"></p>",
        img_src, q.idnumber
    ));

    out.push_str("  <question type=\"multichoice\">\n");
    out.push_str(&format!("    <name><text>{}</text></name>\n", encode_text(&q.idnumber)));
    out.push_str("    <questiontext format=\"html\">\n");
    out.push_str(&format!("      <text><![CDATA[{body}]]></text>\n"));
    out.push_str(&format!(
        "      <file name=\"{}\" path=\"/\" encoding=\"base64\">{}</file>\n",
        encode_double_quoted_attribute(&q.generated_image_file_name),
        q.image_base64
    ));
    out.push_str("    </questiontext>\n");
    out.push_str("    <generalfeedback format=\"html\"><text></text></generalfeedback>\n");
    out.push_str("    <defaultgrade>1.0000000</defaultgrade>\n");
    out.push_str("    <penalty>0.3333333</penalty>\n");
    out.push_str("    <hidden>0</hidden>\n");
    out.push_str(&format!("    <idnumber>{}</idnumber>\n", encode_text(&q.idnumber)));

    out.push_str("    <tags>\n");
    for tag in question_tags(q) {
        out.push_str(&format!("      <tag><text>{}</text></tag>\n", encode_text(&tag.encode())));
    }
    out.push_str("    </tags>\n");

    out.push_str("    <single>true</single>\n");
    out.push_str("    <shuffleanswers>false</shuffleanswers>\n");
    out.push_str("    <answernumbering>ABCD</answernumbering>\n");
    out.push_str("    <showstandardinstruction>0</showstandardinstruction>\n");
    out.push_str("    <correctfeedback format=\"html\"><text>Correct!</text></correctfeedback>\n");
    out.push_str(
        "    <partiallycorrectfeedback format=\"html\"><text>Partially correct.</text></partiallycorrectfeedback>\n",
    );
    out.push_str("    <incorrectfeedback format=\"html\"><text>Incorrect.</text></incorrectfeedback>\n");
    out.push_str("    <shownumcorrect/>\n");

    for option in Answer::ALL {
        let fraction = if q.correct_answer == Some(option) { "100" } else { "0" };
        out.push_str(&format!(
            "    <answer fraction=\"{fraction}\" format=\"html\">\n      <text>{option}</text>\n      <feedback format=\"html\"><text></text></feedback>\n    </answer>\n"
        ));
    }
    out.push_str("  </question>\n");
}

fn question_tags(q: &Question) -> Vec<Tag> {
    let mut tags = Vec::new();
    if !q.week.is_empty() {
        tags.push(Tag::Week(q.week.clone()));
    }
    if !q.year.is_empty() {
        tags.push(Tag::Year(q.year.clone()));
    }
    if !q.paper.is_empty() {
        tags.push(Tag::Paper(q.paper.clone()));
    }
    if !q.main_topic.is_empty() {
        tags.push(Tag::MainTopic(q.main_topic.clone()));
    }
    if !q.sub_topic1.is_empty() {
        tags.push(Tag::SubTopic(q.sub_topic1.clone()));
    }
    if !q.sub_topic2.trim().is_empty() {
        tags.push(Tag::SubTopic(q.sub_topic2.clone()));
    }
    tags
}

/// Parse a quiz document back into questions.
///
/// Non-multichoice questions are skipped; multichoice questions without an
/// embedded image payload are dropped. A document with no `<question>`
/// elements, or one where nothing survives, is an error and leaves the
/// caller's state untouched.
pub fn from_moodle_xml(xml: &str) -> Result<Vec<Question>, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut questions: Vec<Question> = Vec::new();
    let mut saw_question_element = false;
    let mut current: Option<PartialQuestion> = None;
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "question" => {
                        saw_question_element = true;
                        let qtype = e
                            .try_get_attribute("type")?
                            .map(|a| a.unescape_value())
                            .transpose()?
                            .unwrap_or_default();
                        current = (qtype == "multichoice").then(PartialQuestion::default);
                    }
                    "answer" => {
                        if let Some(partial) = current.as_mut() {
                            let fraction = e
                                .try_get_attribute("fraction")?
                                .map(|a| a.unescape_value())
                                .transpose()?
                                .unwrap_or_default();
                            partial.in_correct_answer = fraction == "100";
                        }
                    }
                    "file" => {
                        if let Some(partial) = current.as_mut() {
                            if let Some(attr) = e.try_get_attribute("name")? {
                                partial.file_name = Some(attr.unescape_value()?.into_owned());
                            }
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Event::End(e) => {
                path.pop();
                if e.name().as_ref() == b"question" {
                    if let Some(question) = current.take().and_then(PartialQuestion::finish) {
                        questions.push(question);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(partial) = current.as_mut() {
                    let text = t.unescape()?.into_owned();
                    partial.accept_text(&path, text);
                }
            }
            // The rendered HTML body; rebuilt from metadata on export.
            Event::CData(_) => {}
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_question_element {
        return Err(ImportError::NoQuestions);
    }
    if questions.is_empty() {
        return Err(ImportError::NoUsableQuestions);
    }
    Ok(questions)
}

#[derive(Debug, Default)]
struct PartialQuestion {
    idnumber: String,
    tags: Vec<String>,
    correct: Option<Answer>,
    in_correct_answer: bool,
    base64: String,
    file_name: Option<String>,
}

impl PartialQuestion {
    fn accept_text(&mut self, path: &[String], text: String) {
        let last = path.last().map(String::as_str);
        let parent = path
            .len()
            .checked_sub(2)
            .and_then(|i| path.get(i))
            .map(String::as_str);

        match (parent, last) {
            (_, Some("idnumber")) => {
                if self.idnumber.is_empty() {
                    self.idnumber = text;
                }
            }
            (Some("tag"), Some("text")) => self.tags.push(text),
            // Only the answer's own <text>, not its nested feedback.
            (Some("answer"), Some("text")) => {
                if self.in_correct_answer {
                    self.correct = Answer::parse(&text);
                }
            }
            (_, Some("file")) => self.base64.push_str(text.trim()),
            _ => {}
        }
    }

    fn finish(self) -> Option<Question> {
        if self.base64.is_empty() {
            return None;
        }

        let file_name = self
            .file_name
            .unwrap_or_else(|| format!("{}.png", self.idnumber));
        let mime = mime_for(&file_name);

        let mut week = String::new();
        let mut year = String::new();
        let mut paper = String::new();
        let mut main_topic = String::new();
        let mut sub_topics: Vec<String> = Vec::new();
        for raw in &self.tags {
            match Tag::decode(raw) {
                Some(Tag::Week(w)) if week.is_empty() => week = w,
                Some(Tag::Year(y)) if year.is_empty() => year = y,
                Some(Tag::Paper(p)) if paper.is_empty() => paper = p,
                Some(Tag::MainTopic(t)) if main_topic.is_empty() => main_topic = t,
                Some(Tag::SubTopic(s)) => sub_topics.push(s),
                _ => {}
            }
        }

        let mut sub_topics = sub_topics.into_iter();
        Some(Question {
            id: Uuid::new_v4().to_string(),
            idnumber: self.idnumber,
            generated_image_file_name: file_name.clone(),
            image_data_url: format!("data:{};base64,{}", mime, self.base64),
            image_base64: self.base64,
            original_image_file_name: file_name,
            correct_answer: self.correct,
            week,
            year,
            paper,
            main_topic,
            sub_topic1: sub_topics.next().unwrap_or_default(),
            sub_topic2: sub_topics.next().unwrap_or_default(),
        })
    }
}

/// Extension heuristic; the original MIME type is not stored in the XML, so
/// anything that is not jpg/jpeg comes back as PNG.
fn mime_for(file_name: &str) -> &'static str {
    if file_name.ends_with(".jpg") || file_name.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::NormalizedImage;
    use crate::question::QuestionDraft;

    fn make_question(idnumber: &str, week: &str, answer: Answer) -> Question {
        let mut draft = QuestionDraft {
            image: Some(NormalizedImage {
                name: "scan.png".to_string(),
                mime: "image/png".to_string(),
                bytes: vec![1, 2, 3],
                data_uri: "data:image/png;base64,AQID".to_string(),
            }),
            correct_answer: Some(answer),
            week: week.to_string(),
            year: "2025".to_string(),
            ..QuestionDraft::default()
        };
        draft.set_paper("Paper 1");
        draft.set_main_topic("Particles and Waves");
        draft.set_sub_topic1("Particles");
        draft.set_sub_topic2("Progressive and stationary waves");
        draft.build_numbered(idnumber.to_string()).unwrap()
    }

    #[test]
    fn export_skips_questions_without_image_data() {
        let mut q = make_question("100", "1", Answer::A);
        q.image_base64.clear();
        let xml = to_moodle_xml(&[q]);
        assert!(!xml.contains("<question"));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<quiz>\n"));
        assert!(xml.ends_with("</quiz>\n"));
    }

    #[test]
    fn export_marks_exactly_one_answer_correct() {
        let xml = to_moodle_xml(&[make_question("100", "1", Answer::C)]);
        assert_eq!(xml.matches("fraction=\"100\"").count(), 1);
        assert_eq!(xml.matches("fraction=\"0\"").count(), 3);
        assert!(xml.contains("<answer fraction=\"100\" format=\"html\">\n      <text>C</text>"));
    }

    #[test]
    fn export_encodes_tags_with_the_shared_convention() {
        let xml = to_moodle_xml(&[make_question("100", "5", Answer::A)]);
        assert!(xml.contains("<tag><text>Week_5</text></tag>"));
        assert!(xml.contains("<tag><text>Year_2025</text></tag>"));
        assert!(xml.contains("<tag><text>Paper_1</text></tag>"));
        assert!(xml.contains("<tag><text>MainTopic_Particles_and_Waves</text></tag>"));
        assert!(xml.contains("<tag><text>SubTopic_Particles</text></tag>"));
        assert!(xml.contains("<tag><text>SubTopic_Progressive_and_stationary_waves</text></tag>"));
    }

    #[test]
    fn export_embeds_file_and_pluginfile_reference() {
        let q = make_question("100", "1", Answer::A);
        let xml = to_moodle_xml(std::slice::from_ref(&q));
        assert!(xml.contains(&format!("@@PLUGINFILE@@/{}", q.generated_image_file_name)));
        assert!(xml.contains(&format!(
            "<file name=\"{}\" path=\"/\" encoding=\"base64\">AQID</file>",
            q.generated_image_file_name
        )));
    }

    #[test]
    fn round_trip_preserves_everything_except_id() {
        let original = vec![
            make_question("1700000001", "2", Answer::B),
            make_question("1700000002", "7", Answer::D),
        ];
        let xml = to_moodle_xml(&original);
        let imported = from_moodle_xml(&xml).unwrap();

        assert_eq!(imported.len(), original.len());
        for (before, after) in original.iter().zip(&imported) {
            assert_ne!(before.id, after.id);
            assert_eq!(before.idnumber, after.idnumber);
            assert_eq!(before.week, after.week);
            assert_eq!(before.year, after.year);
            assert_eq!(before.paper, after.paper);
            assert_eq!(before.main_topic, after.main_topic);
            assert_eq!(before.sub_topic1, after.sub_topic1);
            assert_eq!(before.sub_topic2, after.sub_topic2);
            assert_eq!(before.correct_answer, after.correct_answer);
            assert_eq!(before.image_base64, after.image_base64);
        }
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(matches!(
            from_moodle_xml("<quiz><question type="),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert!(matches!(from_moodle_xml("<quiz></quiz>"), Err(ImportError::NoQuestions)));
    }

    #[test]
    fn other_question_types_are_skipped() {
        let xml = r#"<quiz>
            <question type="essay"><name><text>essay</text></name></question>
        </quiz>"#;
        assert!(matches!(from_moodle_xml(xml), Err(ImportError::NoUsableQuestions)));
    }

    #[test]
    fn multichoice_without_payload_is_dropped() {
        let xml = r#"<quiz>
            <question type="multichoice">
              <idnumber>123</idnumber>
              <questiontext format="html"><text>no image here</text></questiontext>
            </question>
        </quiz>"#;
        assert!(matches!(from_moodle_xml(xml), Err(ImportError::NoUsableQuestions)));
    }

    #[test]
    fn missing_file_name_falls_back_to_idnumber() {
        let xml = r#"<quiz>
            <question type="multichoice">
              <idnumber>123</idnumber>
              <questiontext format="html">
                <file path="/" encoding="base64">AQID</file>
              </questiontext>
            </question>
        </quiz>"#;
        let imported = from_moodle_xml(xml).unwrap();
        assert_eq!(imported[0].generated_image_file_name, "123.png");
        assert!(imported[0].image_data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn jpeg_extension_drives_the_mime_heuristic() {
        let xml = r#"<quiz>
            <question type="multichoice">
              <idnumber>9</idnumber>
              <questiontext format="html">
                <file name="9_ab12cd34.jpg" path="/" encoding="base64">AQID</file>
              </questiontext>
            </question>
        </quiz>"#;
        let imported = from_moodle_xml(xml).unwrap();
        assert!(imported[0].image_data_url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn unanswered_import_leaves_correct_answer_unset() {
        let xml = r#"<quiz>
            <question type="multichoice">
              <idnumber>9</idnumber>
              <questiontext format="html">
                <file name="9.png" path="/" encoding="base64">AQID</file>
              </questiontext>
              <answer fraction="0" format="html"><text>A</text></answer>
              <answer fraction="0" format="html"><text>B</text></answer>
            </question>
        </quiz>"#;
        let imported = from_moodle_xml(xml).unwrap();
        assert_eq!(imported[0].correct_answer, None);
    }
}
