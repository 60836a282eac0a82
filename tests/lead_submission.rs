//! Lead submission scenarios with mocked storage and notification backends.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tarteel::leads::{submit_lead, LeadStore, Notifier};
use tarteel::model::LeadRecord;
use tarteel::{TarteelError, TarteelResult};

struct RecordingStore {
    rows: RefCell<Vec<Vec<String>>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
        }
    }
}

impl LeadStore for RecordingStore {
    fn append(&self, row: &[String]) -> TarteelResult<usize> {
        self.rows.borrow_mut().push(row.to_vec());
        // Row 1 is the header row, data starts at 2.
        Ok(self.rows.borrow().len() + 1)
    }
}

struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, record: &LeadRecord, labels: &BTreeMap<String, String>) -> TarteelResult<()> {
        self.messages
            .borrow_mut()
            .push(format!("{}: {:?}", record.lead.contact, labels));
        Ok(())
    }
}

struct BrokenNotifier;

impl Notifier for BrokenNotifier {
    fn notify(
        &self,
        _record: &LeadRecord,
        _labels: &BTreeMap<String, String>,
    ) -> TarteelResult<()> {
        Err(TarteelError::Notification("bot is down".to_owned()))
    }
}

fn sample_wire_record() -> LeadRecord {
    serde_json::from_str(
        r#"{
            "timestamp": "2026-08-27T09:30:00Z",
            "leadData": {"name": "Yusuf", "contact": "+7 900 000-00-00"},
            "answers": {
                "q1_age": "age_26_35",
                "q2_gender": "male",
                "q4_level": "forgot",
                "q5_frequency": "few_times_week",
                "q6_where": "mosque",
                "q7_learning_style": "with_mentor",
                "q9_important": "meaning",
                "q10_inspiration": "after_prayer",
                "q11_why": "confident_reading",
                "q13_duration": "15_20_min",
                "q14_reminders": "2_3_week",
                "q15_inspiration_source": "progress"
            },
            "analysisResult": {
                "message_type": "chapter",
                "score_percent": 83.5,
                "correct_count": 5,
                "total_count": 6
            }
        }"#,
    )
    .expect("wire-format lead parses")
}

#[test]
fn lead_row_follows_the_nineteen_column_layout() {
    let store = RecordingStore::new();
    let record = sample_wire_record();

    let receipt = submit_lead(&store, None, &record).expect("submission succeeds");
    assert!(receipt.success);
    assert_eq!(receipt.row, 2);

    let rows = store.rows.borrow();
    let row = &rows[0];
    assert_eq!(row.len(), 19);

    assert_eq!(row[0], "2026-08-27T09:30:00Z");
    assert_eq!(row[1], "Yusuf");
    assert_eq!(row[2], "+7 900 000-00-00");
    assert_eq!(row[3], "26-35");
    assert_eq!(row[4], "Male");
    assert_eq!(row[5], "Took a course but forgot a lot");
    assert_eq!(row[6], "A few times a week");

    // Chapter analysis fills columns Q and R, single-verse column P stays empty.
    assert_eq!(row[15], "");
    assert_eq!(row[16], "5/6");
    assert_eq!(row[17], "83.5");

    let answers_json: serde_json::Value =
        serde_json::from_str(&row[18]).expect("final column is the labels as JSON");
    assert_eq!(answers_json["q9_important"], "Understanding the meaning of the verses");
}

#[test]
fn unmapped_answer_codes_are_written_through_verbatim() {
    let store = RecordingStore::new();
    let mut record = sample_wire_record();
    record
        .answers
        .insert("q4_level".to_owned(), "level_added_in_v2".to_owned());

    submit_lead(&store, None, &record).expect("submission succeeds");
    let rows = store.rows.borrow();
    assert_eq!(rows[0][5], "level_added_in_v2");
}

#[test]
fn missing_answers_leave_their_columns_empty() {
    let store = RecordingStore::new();
    let mut record = sample_wire_record();
    record.answers.clear();
    record.analysis = None;

    submit_lead(&store, None, &record).expect("submission succeeds");
    let rows = store.rows.borrow();
    let row = &rows[0];
    assert_eq!(row.len(), 19, "layout is fixed regardless of answers");
    assert!(row[3..18].iter().all(String::is_empty));
    assert_eq!(row[18], "{}");
}

#[test]
fn notifier_receives_labelled_answers() {
    let store = RecordingStore::new();
    let notifier = RecordingNotifier {
        messages: RefCell::new(Vec::new()),
    };
    let record = sample_wire_record();

    submit_lead(&store, Some(&notifier), &record).expect("submission succeeds");

    let messages = notifier.messages.borrow();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("+7 900 000-00-00"));
    assert!(
        messages[0].contains("With a mentor and feedback"),
        "notifier sees labels, not codes: {}",
        messages[0]
    );
}

#[test]
fn broken_notifier_never_loses_the_lead() {
    let store = RecordingStore::new();
    let record = sample_wire_record();

    let receipt =
        submit_lead(&store, Some(&BrokenNotifier), &record).expect("storage succeeded");
    assert!(receipt.success);
    assert_eq!(store.rows.borrow().len(), 1, "row was still appended");
}

#[test]
fn single_verse_analysis_uses_its_own_column() {
    let store = RecordingStore::new();
    let mut record = sample_wire_record();
    record.analysis = Some(
        serde_json::from_str(r#"{"message_type": "text", "score_percent": 97.0}"#)
            .expect("analysis parses"),
    );

    submit_lead(&store, None, &record).expect("submission succeeds");
    let rows = store.rows.borrow();
    let row = &rows[0];
    assert_eq!(row[15], "97");
    assert_eq!(row[16], "");
    assert_eq!(row[17], "");
}
