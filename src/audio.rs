//! Audio preparation ahead of transcription.
//!
//! The transcription endpoint expects mono 16 kHz 16-bit PCM WAV. Anything
//! else (ogg voice notes, mp3, m4a) is converted with ffmpeg into the work
//! directory; files already carrying a `.wav` extension pass through as-is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{TarteelError, TarteelResult};
use crate::process::run_command_with_timeout;

pub fn prepare_wav(input: &Path, work_dir: &Path) -> TarteelResult<PathBuf> {
    prepare_wav_with_timeout(input, work_dir, ffmpeg_timeout())
}

pub(crate) fn prepare_wav_with_timeout(
    input: &Path,
    work_dir: &Path,
    timeout: Duration,
) -> TarteelResult<PathBuf> {
    if !input.exists() {
        return Err(TarteelError::InvalidRequest(format!(
            "input file does not exist: {}",
            input.display()
        )));
    }
    if !input.is_file() {
        return Err(TarteelError::InvalidRequest(format!(
            "input path is not a file: {}",
            input.display()
        )));
    }

    let already_wav = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if already_wav {
        tracing::debug!(path = %input.display(), "input already wav, skipping conversion");
        return Ok(input.to_path_buf());
    }

    let output = work_dir.join("prepared_16k_mono.wav");
    let args = vec![
        "-hide_banner".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-y".to_owned(),
        "-i".to_owned(),
        input.display().to_string(),
        "-ar".to_owned(),
        "16000".to_owned(),
        "-ac".to_owned(),
        "1".to_owned(),
        "-c:a".to_owned(),
        "pcm_s16le".to_owned(),
        output.display().to_string(),
    ];
    run_command_with_timeout("ffmpeg", &args, None, Some(timeout))?;
    tracing::debug!(
        input = %input.display(),
        output = %output.display(),
        "converted input to 16k mono wav"
    );
    Ok(output)
}

fn ffmpeg_timeout() -> Duration {
    let fallback = Duration::from_secs(180);
    let Ok(raw) = std::env::var("TARTEEL_FFMPEG_TIMEOUT_MS") else {
        return fallback;
    };
    raw.parse::<u64>().map(Duration::from_millis).unwrap_or(fallback)
}
