use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tarteel")]
#[command(about = "Quran recitation scoring against reference verses, with lead capture")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Transcribe a recitation recording and score it against reference text.
    Check(CheckArgs),
    /// Persist an intake-form lead and send the chat notification.
    SubmitLead(SubmitLeadArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the recitation audio file.
    pub audio: PathBuf,

    /// Chapter number to check against.
    #[arg(long, default_value_t = 1)]
    pub chapter: u32,

    /// Check a single verse instead of the whole chapter.
    #[arg(long)]
    pub verse: Option<u32>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct SubmitLeadArgs {
    /// Read the lead JSON from a file instead of stdin.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Pretty-print the JSON receipt.
    #[arg(long)]
    pub pretty: bool,
}
