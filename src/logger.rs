use tracing_subscriber::EnvFilter;

use crate::cli::{LogConfig, OutputFormat};

/// Filter used when `RUST_LOG` is not set.
fn default_directive(config: &LogConfig) -> &'static str {
    if config.quiet {
        "error"
    } else if config.verbose {
        "mp3tagger=debug,warn"
    } else {
        "mp3tagger=info,warn"
    }
}

/// Install the global tracing subscriber. Text output is kept plain
/// (no timestamps or targets) since this is an interactive tool.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = match config.format {
        OutputFormat::Json => builder.json().try_init(),
        OutputFormat::Text => builder.without_time().compact().try_init(),
    };

    if let Err(err) = result {
        eprintln!("logging already initialized: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(quiet: bool, verbose: bool) -> LogConfig {
        LogConfig { quiet, verbose, format: OutputFormat::Text }
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(&config(true, false)), "error");
        assert_eq!(default_directive(&config(false, true)), "mp3tagger=debug,warn");
        assert_eq!(default_directive(&config(false, false)), "mp3tagger=info,warn");
    }
}
