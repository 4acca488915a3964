use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::frames::TextEncoding;

#[derive(Parser, Debug)]
#[command(name = "mp3tagger")]
#[command(version = "0.1.0")]
#[command(about = "Write ID3v2.3 tags and chapters from a JSON file into an MP3 file")]
#[command(after_help = "Run with --frames to list the frame identifiers that can be set.")]
pub struct Cli {
    /// MP3 file to tag
    #[arg(value_name = "PATH-TO-MP3", required_unless_present = "frames")]
    pub mp3file: Option<PathBuf>,

    /// JSON file describing the frames
    #[arg(value_name = "PATH-TO-JSON", required_unless_present = "frames")]
    pub jsonfile: Option<PathBuf>,

    /// Do not overwrite the MP3 file; tag a `<name>_tagged.mp3` copy instead
    #[arg(short = 'n', long = "no-overwrite", default_value_t = false)]
    pub no_overwrite: bool,

    /// Default text encoding code: 0 Latin-1, 1 UTF-16, 2 UTF-16BE, 3 UTF-8.
    /// ID3v2.3 stores 2 and 3 as UTF-16.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub encoding: u8,

    /// List the supported frame identifiers and exit
    #[arg(long, default_value_t = false)]
    pub frames: bool,

    /// Show debug output
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = OutputFormat::Text)]
    pub log_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the tag gets written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Overwrite,
    /// Copy the MP3 to `<stem>_tagged.mp3` and tag the copy.
    TaggedCopy,
}

/// Settings threaded through frame construction and saving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TagConfig {
    pub encoding: TextEncoding,
    pub output: OutputMode,
}

impl TagConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            encoding: TextEncoding::from_code(cli.encoding).unwrap_or_default(),
            output: if cli.no_overwrite {
                OutputMode::TaggedCopy
            } else {
                OutputMode::Overwrite
            },
        }
    }
}

/// Logging settings derived from CLI flags
#[derive(Clone, Copy, Debug)]
pub struct LogConfig {
    pub quiet: bool,
    pub verbose: bool,
    pub format: OutputFormat,
}

impl LogConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            quiet: cli.quiet,
            verbose: cli.verbose,
            format: cli.log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_paths() {
        let cli = Cli::try_parse_from(["mp3tagger", "song.mp3", "tags.json"]).unwrap();
        assert_eq!(cli.mp3file, Some(PathBuf::from("song.mp3")));
        assert_eq!(cli.jsonfile, Some(PathBuf::from("tags.json")));
        assert_eq!(TagConfig::from_cli(&cli), TagConfig::default());
    }

    #[test]
    fn test_no_overwrite_and_encoding() {
        let cli =
            Cli::try_parse_from(["mp3tagger", "song.mp3", "tags.json", "-n", "--encoding", "1"])
                .unwrap();
        let config = TagConfig::from_cli(&cli);
        assert_eq!(config.output, OutputMode::TaggedCopy);
        assert_eq!(config.encoding, TextEncoding::Utf16);
    }

    #[test]
    fn test_too_few_arguments() {
        assert!(Cli::try_parse_from(["mp3tagger", "song.mp3"]).is_err());
        assert!(
            Cli::try_parse_from(["mp3tagger", "song.mp3", "tags.json", "--encoding", "4"]).is_err()
        );
    }

    #[test]
    fn test_frames_listing_needs_no_paths() {
        let cli = Cli::try_parse_from(["mp3tagger", "--frames"]).unwrap();
        assert!(cli.frames);
        assert!(cli.mp3file.is_none());
    }
}
