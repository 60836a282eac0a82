use std::io::Read;

use clap::Parser;
use serde_json::json;

use tarteel::checker::RecitationChecker;
use tarteel::cli::{CheckArgs, Cli, Command, SubmitLeadArgs};
use tarteel::config::Config;
use tarteel::error::TarteelResult;
use tarteel::format::format_api_result;
use tarteel::leads::{submit_lead, Notifier, SheetsApiStore, TelegramNotifier};
use tarteel::model::LeadRecord;
use tarteel::quran::QuranStore;
use tarteel::audio;
use tarteel::transcribe::HttpTranscriber;

fn main() {
    tarteel::logging::init();

    if let Err(error) = run() {
        let envelope = json!({
            "success": false,
            "error": error.to_string(),
            "code": error.error_code(),
        });
        println!("{envelope}");
        std::process::exit(1);
    }
}

fn run() -> TarteelResult<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Check(args) => run_check(&config, &args),
        Command::SubmitLead(args) => run_submit_lead(&config, &args),
    }
}

fn run_check(config: &Config, args: &CheckArgs) -> TarteelResult<()> {
    let store = QuranStore::load_from_path(&config.quran_data_path)?;
    let transcriber = HttpTranscriber::new(config.endpoint_url.clone(), config.api_key.clone())?;
    let checker = RecitationChecker::new(&transcriber);

    let work_dir = tempfile::tempdir()?;
    let wav = audio::prepare_wav(&args.audio, work_dir.path())?;

    let api_result = if let Some(verse) = args.verse {
        let reference = store.verse(args.chapter, verse)?.normalized.clone();
        let result = checker.check(&wav, &reference, None);
        format_api_result(&result, true, args.chapter)
    } else {
        // Whole-chapter checks skip the opening formula.
        let (reference, _display) = store.full_chapter_texts(args.chapter, true)?;
        let verse_info = store.verse_info_for_chapter(args.chapter, true)?;
        let result = checker.check(&wav, &reference, Some(&verse_info));
        format_api_result(&result, false, args.chapter)
    };

    print_json(&api_result, args.pretty)
}

fn run_submit_lead(config: &Config, args: &SubmitLeadArgs) -> TarteelResult<()> {
    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().lock().read_to_string(&mut buf)?;
            buf
        }
    };
    let mut record: LeadRecord = serde_json::from_str(&raw)?;
    if record.timestamp.trim().is_empty() {
        record.timestamp = chrono::Utc::now().to_rfc3339();
    }

    let store = SheetsApiStore::new(config.sheets_api_url.clone(), config.sheet_id.clone())?;
    let notifier: Option<TelegramNotifier> = if config.telegram_configured() {
        Some(TelegramNotifier::new(
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
        )?)
    } else {
        tracing::warn!("telegram is not configured, skipping lead notification");
        None
    };

    let receipt = submit_lead(
        &store,
        notifier.as_ref().map(|n| n as &dyn Notifier),
        &record,
    )?;
    print_json(&receipt, args.pretty)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> TarteelResult<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
