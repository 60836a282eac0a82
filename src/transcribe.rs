//! Speech-to-text over an external inference endpoint.
//!
//! Transcription failures come back on two channels and they are not
//! interchangeable:
//!
//! * Operational failures (network, timeout, non-2xx, unreadable body)
//!   return `Ok` with a transcript that starts with [`ERROR_SENTINEL`].
//!   The checker downgrades these to an error-status result instead of
//!   aborting the whole check.
//! * Contract violations (missing endpoint URL or API key) return `Err`,
//!   because no amount of retrying fixes a misconfigured deployment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::error::{TarteelError, TarteelResult};

/// Prefix marking an operational transcription failure inside an `Ok` value.
pub const ERROR_SENTINEL: &str = "[ERROR]";

/// Wall-clock limit for one inference call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub trait Transcriber {
    /// Transcribe a prepared WAV file into raw (unnormalized) text.
    fn transcribe(&self, wav: &Path) -> TarteelResult<String>;
}

/// Whether a transcript carries the operational-failure sentinel.
#[must_use]
pub fn is_error_transcript(transcript: &str) -> bool {
    transcript.starts_with(ERROR_SENTINEL)
}

/// HTTP client against a hosted inference endpoint that accepts raw WAV
/// bytes and answers with JSON.
#[derive(Debug)]
pub struct HttpTranscriber {
    client: reqwest::blocking::Client,
    endpoint_url: String,
    api_key: String,
}

impl HttpTranscriber {
    pub fn new(endpoint_url: String, api_key: String) -> TarteelResult<Self> {
        if endpoint_url.trim().is_empty() {
            return Err(TarteelError::Transcription(
                "transcription endpoint URL is not configured".to_owned(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(TarteelError::Transcription(
                "transcription API key is not configured".to_owned(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint_url,
            api_key,
        })
    }

    fn post_wav(&self, bytes: Vec<u8>) -> Result<String, String> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(bytes)
            .send()
            .map_err(|err| format!("request failed: {err}"))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| format!("unreadable response body: {err}"))?;
        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            return Err(format!("endpoint returned {status}: {preview}"));
        }
        Ok(body)
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&self, wav: &Path) -> TarteelResult<String> {
        let bytes = fs::read(wav)?;
        tracing::info!(
            path = %wav.display(),
            bytes = bytes.len(),
            "sending audio for transcription"
        );

        match self.post_wav(bytes) {
            Ok(body) => Ok(extract_transcript(&body)),
            Err(reason) => {
                tracing::warn!(reason = %reason, "transcription call failed");
                Ok(format!("{ERROR_SENTINEL} {reason}"))
            }
        }
    }
}

/// Pull the transcript out of whatever JSON shape the endpoint returns.
///
/// Hosted inference backends disagree on the field name, so accept the
/// common ones, a bare JSON string, or the first element of an array.
/// Anything unrecognized is passed through verbatim so the caller can at
/// least see what came back.
fn extract_transcript(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_owned();
    };
    transcript_from_value(&value).unwrap_or_else(|| value.to_string())
}

fn transcript_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_owned()),
        Value::Object(map) => ["text", "transcription", "output"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(transcript_from_value),
        Value::Array(items) => items.first().and_then(transcript_from_value),
        _ => None,
    }
}
