//! Read-only reference-text store.
//!
//! Holds every chapter's verses in two forms: a normalized form (diacritics
//! stripped, used for comparison) and a display form (diacritics retained,
//! shown to the user). The store is constructed once from a JSON file and
//! injected wherever reference text is needed; it never mutates after load,
//! so sharing it across concurrent checks is safe.
//!
//! Expected JSON shape, chapter and verse numbers as string keys:
//!
//! ```json
//! { "1": { "1": ["normalized text", "display text"], "2": "..." } }
//! ```
//!
//! A bare string verse entry is accepted and used for both forms.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{TarteelError, TarteelResult};

/// A single verse in both comparison and display forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseText {
    pub normalized: String,
    pub display: String,
}

/// Verse number → verse text, ordered.
pub type ChapterVerses = BTreeMap<u32, VerseText>;

/// Chapter number → verses; the checker's breakdown input shape.
pub type VerseInfo = BTreeMap<u32, ChapterVerses>;

#[derive(Debug, Clone, Default)]
pub struct QuranStore {
    chapters: BTreeMap<u32, ChapterVerses>,
}

impl QuranStore {
    /// Load the store from a JSON file on disk.
    pub fn load_from_path(path: &Path) -> TarteelResult<Self> {
        let raw = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;
        let store = Self::from_value(&value)?;
        tracing::info!(
            path = %path.display(),
            chapters = store.chapters.len(),
            "loaded reference text store"
        );
        Ok(store)
    }

    /// Build the store from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> TarteelResult<Self> {
        let root = value.as_object().ok_or_else(|| {
            TarteelError::InvalidRequest("reference data root is not a JSON object".to_owned())
        })?;

        let mut chapters = BTreeMap::new();
        for (chapter_key, verses_value) in root {
            let chapter_number = parse_number(chapter_key, "chapter")?;
            let verses_obj = verses_value.as_object().ok_or_else(|| {
                TarteelError::InvalidRequest(format!(
                    "chapter {chapter_number} is not a JSON object"
                ))
            })?;

            let mut verses = BTreeMap::new();
            for (verse_key, verse_value) in verses_obj {
                let verse_number = parse_number(verse_key, "verse")?;
                verses.insert(verse_number, parse_verse(verse_value, chapter_number, verse_number)?);
            }
            chapters.insert(chapter_number, verses);
        }

        Ok(Self { chapters })
    }

    #[must_use]
    pub fn chapter(&self, chapter: u32) -> Option<&ChapterVerses> {
        self.chapters.get(&chapter)
    }

    /// Single verse lookup; absence is a [`TarteelError::ReferenceNotFound`].
    pub fn verse(&self, chapter: u32, verse: u32) -> TarteelResult<&VerseText> {
        self.chapters
            .get(&chapter)
            .and_then(|verses| verses.get(&verse))
            .ok_or_else(|| {
                TarteelError::ReferenceNotFound(format!("chapter {chapter}, verse {verse}"))
            })
    }

    /// The chapter's full text as space-joined verses, in both forms.
    ///
    /// With `skip_basmalah` the opening formula (verse 1) is excluded, the
    /// usual arrangement for whole-chapter scoring.
    pub fn full_chapter_texts(
        &self,
        chapter: u32,
        skip_basmalah: bool,
    ) -> TarteelResult<(String, String)> {
        let verses = self.chapter_verses(chapter, skip_basmalah)?;
        let normalized: Vec<&str> = verses.values().map(|v| v.normalized.as_str()).collect();
        let display: Vec<&str> = verses.values().map(|v| v.display.as_str()).collect();
        Ok((normalized.join(" "), display.join(" ")))
    }

    /// Breakdown input for a whole-chapter check over this one chapter.
    pub fn verse_info_for_chapter(
        &self,
        chapter: u32,
        skip_basmalah: bool,
    ) -> TarteelResult<VerseInfo> {
        let verses = self.chapter_verses(chapter, skip_basmalah)?;
        let mut info = BTreeMap::new();
        info.insert(chapter, verses);
        Ok(info)
    }

    fn chapter_verses(&self, chapter: u32, skip_basmalah: bool) -> TarteelResult<ChapterVerses> {
        let verses = self
            .chapters
            .get(&chapter)
            .ok_or_else(|| TarteelError::ReferenceNotFound(format!("chapter {chapter}")))?;
        let verses: ChapterVerses = verses
            .iter()
            .filter(|(number, _)| !(skip_basmalah && **number == 1))
            .map(|(number, text)| (*number, text.clone()))
            .collect();
        if verses.is_empty() {
            return Err(TarteelError::ReferenceNotFound(format!(
                "chapter {chapter} has no verses to check"
            )));
        }
        Ok(verses)
    }
}

fn parse_number(key: &str, what: &str) -> TarteelResult<u32> {
    key.parse::<u32>()
        .map_err(|_| TarteelError::InvalidRequest(format!("{what} key is not a number: {key:?}")))
}

fn parse_verse(value: &Value, chapter: u32, verse: u32) -> TarteelResult<VerseText> {
    match value {
        // [normalized, display, (optional) transliteration]
        Value::Array(parts) => {
            let normalized = parts.first().and_then(Value::as_str).ok_or_else(|| {
                TarteelError::InvalidRequest(format!(
                    "chapter {chapter} verse {verse}: missing normalized form"
                ))
            })?;
            let display = parts.get(1).and_then(Value::as_str).unwrap_or(normalized);
            Ok(VerseText {
                normalized: normalized.to_owned(),
                display: display.to_owned(),
            })
        }
        Value::String(text) => Ok(VerseText {
            normalized: text.clone(),
            display: text.clone(),
        }),
        _ => Err(TarteelError::InvalidRequest(format!(
            "chapter {chapter} verse {verse}: expected array or string"
        ))),
    }
}
