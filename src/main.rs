mod chapters;
mod cli;
mod document;
mod error;
mod file_utils;
mod frame_builder;
mod frames;
mod logger;
mod metadata;
mod timestamp;

use crate::{
    cli::{Cli, LogConfig, TagConfig},
    error::TaggerError,
};
use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(&LogConfig::from_cli(&cli));

    if cli.frames {
        print!("{}", frames_help());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            let is_usage = err
                .downcast_ref::<TaggerError>()
                .map(TaggerError::is_usage)
                .unwrap_or(false);
            if is_usage {
                eprintln!("{}", Cli::command().render_help());
                eprint!("{}", frames_help());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mp3 = cli.mp3file.as_deref().context("no MP3 file given")?;
    let json = cli.jsonfile.as_deref().context("no JSON file given")?;
    let config = TagConfig::from_cli(cli);
    tracing::debug!("default text encoding: {}", config.encoding.code());

    file_utils::validate_inputs(mp3, json)?;

    // Fail on an unreadable MP3 before the JSON is even opened.
    let mut tag = metadata::load_cleared(mp3)?;
    let document = document::load(json)?;
    tracing::debug!("{} entries in {}", document.len(), json.display());

    let report = metadata::populate(&mut tag, &document, &config)?;
    let written = metadata::save(&tag, mp3, config.output)?;

    tracing::info!(
        "Wrote {} frame(s) ({} chapter(s)) to {}",
        report.frames,
        report.chapters,
        written.display()
    );
    if !report.skipped.is_empty() {
        tracing::warn!("Skipped: {}", report.skipped.join(", "));
    }

    Ok(())
}

/// The settable frames, the chapter list layout and the timestamp format.
fn frames_help() -> String {
    let mut help = String::from("Frames:\n");
    for line in frames::describe_frames() {
        help.push_str(&format!("  {}\n", line));
    }
    help.push_str(
        "CTOC takes a list of chapters: \
         [{\"start\": ..., \"end\": ..., \"sub_frames\": {...}}, ...]\n",
    );
    help.push_str(&format!("Timestamps: {}\n", timestamp::FORMAT_HINT));
    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_help_lists_frames_and_formats() {
        let help = frames_help();
        assert!(help.starts_with("Frames:\n"));
        assert!(help.contains("  TIT2"));
        assert!(help.contains("CTOC takes a list of chapters: [{\"start\""));
        assert!(help.contains(timestamp::FORMAT_HINT));
    }

    #[test]
    fn test_usage_help_names_arguments() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("--no-overwrite"));
        assert!(help.contains("--frames"));
    }
}
