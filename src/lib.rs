#![forbid(unsafe_code)]

pub mod align;
pub mod audio;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod leads;
pub mod logging;
pub mod model;
pub mod process;
pub mod quran;
pub mod similarity;
pub mod text;
pub mod transcribe;

pub use checker::{RecitationChecker, THRESHOLD_CORRECT, THRESHOLD_PARTIAL};
pub use error::{TarteelError, TarteelResult};
pub use model::{ApiResult, CheckStatus, ScoreResult};
pub use quran::QuranStore;
pub use transcribe::{Transcriber, ERROR_SENTINEL};
