//! Lead capture: spreadsheet persistence plus a best-effort chat ping.
//!
//! The spreadsheet append is the primary effect and its failure fails the
//! submission. The chat notification is advisory only; any failure there
//! is logged and swallowed so a flaky bot never loses a lead.

use std::collections::BTreeMap;

use crate::error::{TarteelError, TarteelResult};
use crate::model::{LeadReceipt, LeadRecord, MessageType};

/// Questionnaire answer codes and their human-readable labels.
///
/// Codes arrive from the intake form verbatim; anything not listed here is
/// written through unchanged so a form revision cannot silently drop data.
pub const ANSWER_LABELS: &[(&str, &str)] = &[
    // q1_age
    ("age_under18", "Under 18"),
    ("age_18_25", "18-25"),
    ("age_26_35", "26-35"),
    ("age_36_45", "36-45"),
    ("age_over45", "Over 45"),
    // q2_gender
    ("male", "Male"),
    ("female", "Female"),
    // q4_level
    ("basics", "Studied only the basics"),
    ("forgot", "Took a course but forgot a lot"),
    ("know_no_practice", "Knows the rules confidently but does not practice"),
    ("practice_improve", "Practices but wants to improve pronunciation"),
    // q5_frequency
    ("daily", "Daily"),
    ("few_times_week", "A few times a week"),
    ("sometimes", "Sometimes"),
    ("rarely", "Hardly reads at the moment"),
    // q6_where
    ("home", "At home, independently"),
    ("mosque", "At the mosque"),
    ("online_group", "In an online group / with a mentor"),
    ("not_regular", "Not reading regularly yet"),
    // q7_learning_style
    ("self_paced", "Self-paced, at a convenient time"),
    ("with_mentor", "With a mentor and feedback"),
    ("in_group", "In a group with other participants"),
    ("short_videos", "Through short videos and exercises"),
    // q9_important
    ("spiritual", "The spiritual feeling of closeness to Allah"),
    ("beauty", "Beauty and correctness of recitation"),
    ("discipline", "Discipline and regularity"),
    ("meaning", "Understanding the meaning of the verses"),
    // q10_inspiration
    ("after_prayer", "After prayer"),
    ("morning", "In the morning"),
    ("evening", "In the evening before sleep"),
    ("friday_ramadan", "On Friday / during Ramadan"),
    ("when_mood", "When in the mood"),
    // q11_why
    ("spiritual_connection", "Wants to strengthen the spiritual connection with Allah"),
    ("family_example", "Wants to set an example for family and children"),
    ("confident_reading", "Wants to read confidently and beautifully"),
    ("refresh_knowledge", "Wants to refresh and consolidate knowledge"),
    // q13_duration
    ("5_10_min", "5-10 minutes a day"),
    ("15_20_min", "15-20 minutes a day"),
    ("one_long", "One long lesson a week"),
    ("auto_remind", "Wants automatic reminders"),
    // q14_reminders
    ("2_3_week", "Yes, 2-3 times a week"),
    ("new_tasks", "Only for new assignments"),
    ("no_self", "No, prefers self-control"),
    // q15_inspiration_source
    ("progress", "Progress and results"),
    ("quran_hadith", "Words from the Quran and hadiths"),
    ("others_examples", "Examples of other students"),
    ("voice_beauty", "Voice and beauty of recitation"),
];

/// Label for an answer code; unmapped codes pass through verbatim.
#[must_use]
pub fn answer_label(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    ANSWER_LABELS
        .iter()
        .find(|(key, _)| *key == code)
        .map_or_else(|| code.to_owned(), |(_, label)| (*label).to_owned())
}

#[must_use]
pub fn convert_answers_to_labels(
    answers: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    answers
        .iter()
        .map(|(key, value)| (key.clone(), answer_label(value)))
        .collect()
}

/// Destination for lead rows. Returns the row index the lead landed in.
pub trait LeadStore {
    fn append(&self, row: &[String]) -> TarteelResult<usize>;
}

/// Advisory notification channel for fresh leads.
pub trait Notifier {
    fn notify(&self, record: &LeadRecord, labels: &BTreeMap<String, String>) -> TarteelResult<()>;
}

/// Persist a lead and ping the notification channel.
pub fn submit_lead(
    store: &dyn LeadStore,
    notifier: Option<&dyn Notifier>,
    record: &LeadRecord,
) -> TarteelResult<LeadReceipt> {
    let labels = convert_answers_to_labels(&record.answers);
    let row_data = build_row(record, &labels)?;

    let row = store.append(&row_data)?;
    tracing::info!(row, "lead saved");

    if let Some(notifier) = notifier {
        if let Err(err) = notifier.notify(record, &labels) {
            tracing::warn!(error = %err, "lead notification failed, lead is saved");
        }
    }

    Ok(LeadReceipt {
        success: true,
        row,
        message: format!("lead saved to row {row}"),
    })
}

/// Fixed 19-column row layout: timestamp, contact info, the labelled
/// questionnaire answers, analysis summary columns, and the raw answer
/// map as JSON in the final column.
pub fn build_row(
    record: &LeadRecord,
    labels: &BTreeMap<String, String>,
) -> TarteelResult<Vec<String>> {
    let answer = |key: &str| labels.get(key).cloned().unwrap_or_default();

    let mut row = vec![
        record.timestamp.clone(),
        record.lead.name.clone(),
        record.lead.contact.clone(),
        answer("q1_age"),
        answer("q2_gender"),
        answer("q4_level"),
        answer("q5_frequency"),
        answer("q6_where"),
        answer("q7_learning_style"),
        answer("q9_important"),
        answer("q10_inspiration"),
        answer("q11_why"),
        answer("q13_duration"),
        answer("q14_reminders"),
        answer("q15_inspiration_source"),
        String::new(), // single-verse score percent
        String::new(), // correct verses / total
        String::new(), // chapter score percent
        serde_json::to_string(labels)?,
    ];

    if let Some(analysis) = &record.analysis {
        let is_single_verse = analysis.message_type == Some(MessageType::Text)
            || (analysis.score_percent.is_some() && analysis.total_count.is_none());
        if is_single_verse {
            if let Some(percent) = analysis.score_percent {
                row[15] = format_percent(percent);
            }
        }

        let is_chapter = analysis.message_type == Some(MessageType::Chapter)
            || (analysis.correct_count.is_some() && analysis.total_count.is_some());
        if is_chapter {
            row[16] = format!(
                "{}/{}",
                analysis.correct_count.unwrap_or(0),
                analysis.total_count.unwrap_or(0)
            );
            if let Some(percent) = analysis.score_percent {
                row[17] = format_percent(percent);
            }
        }
    }

    Ok(row)
}

fn format_percent(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}

/// Row-append store backed by a spreadsheet web endpoint.
///
/// The endpoint receives `{"sheet_id": ..., "values": [row]}` and answers
/// with `{"row": n}`. Any transport or non-2xx failure maps to
/// [`TarteelError::Storage`].
pub struct SheetsApiStore {
    client: reqwest::blocking::Client,
    endpoint_url: String,
    sheet_id: String,
}

impl SheetsApiStore {
    pub fn new(endpoint_url: String, sheet_id: String) -> TarteelResult<Self> {
        if endpoint_url.trim().is_empty() || sheet_id.trim().is_empty() {
            return Err(TarteelError::Storage(
                "spreadsheet endpoint URL and sheet id must be configured".to_owned(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint_url,
            sheet_id,
        })
    }
}

impl LeadStore for SheetsApiStore {
    fn append(&self, row: &[String]) -> TarteelResult<usize> {
        let payload = serde_json::json!({
            "sheet_id": self.sheet_id,
            "values": [row],
        });
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&payload)
            .send()
            .map_err(|err| TarteelError::Storage(format!("append request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(TarteelError::Storage(format!(
                "spreadsheet endpoint returned {status}: {preview}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|err| TarteelError::Storage(format!("unreadable append response: {err}")))?;
        Ok(body
            .get("row")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as usize)
    }
}

/// Telegram bot notification with an HTML summary of the lead.
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> TarteelResult<Self> {
        if bot_token.trim().is_empty() || chat_id.trim().is_empty() {
            return Err(TarteelError::Notification(
                "telegram bot token and chat id must be configured".to_owned(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
        })
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, record: &LeadRecord, labels: &BTreeMap<String, String>) -> TarteelResult<()> {
        let message = render_notification(record, labels);
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|err| TarteelError::Notification(format!("send failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TarteelError::Notification(format!(
                "telegram returned {status}"
            )));
        }
        tracing::info!("lead notification sent");
        Ok(())
    }
}

fn render_notification(record: &LeadRecord, labels: &BTreeMap<String, String>) -> String {
    let field = |key: &str| labels.get(key).map(String::as_str).unwrap_or_default();
    let joined = |parts: &[&str]| -> String {
        parts
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    };

    let age_gender = joined(&[field("q1_age"), field("q2_gender")]);
    let reading = joined(&[field("q5_frequency"), field("q6_where")]);

    format!(
        "<b>New lead</b>\n\
         <b>Contact:</b> {contact}\n\
         <b>{name}:</b> {age_gender}\n\n\
         <b>Knowledge level:</b> {level}\n\
         <b>Reads the Quran:</b> {reading}\n\
         <b>Learns:</b> {style}\n\
         <b>Values in tajweed:</b> {important}\n\
         <b>Motivation:</b> {why}",
        contact = record.lead.contact,
        name = record.lead.name,
        level = field("q4_level"),
        style = field("q7_learning_style"),
        important = field("q9_important"),
        why = field("q11_why"),
    )
}
