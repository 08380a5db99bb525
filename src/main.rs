//! logscope - Indexed Log File Filtering
//!
//! Prints the lines of a log file that match a pattern, using the same indexing
//! and filtering core a viewer would.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use logscope::{AccessStrategy, Config, FilterOptions, LineIndexedFile, PatternFilter};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG controls verbosity)
    env_logger::init();

    let matches = build_cli().get_matches();

    let file_path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .context("file argument is required")?,
    );

    let mut config = load_config(matches.get_one::<String>("config"))?;
    apply_overrides(&mut config, &matches);

    let mut file = LineIndexedFile::with_config(config.reader.clone());
    file.open(&file_path)
        .with_context(|| format!("Failed to open {}", file_path.display()))?;
    let file = Arc::new(file);

    let filter = PatternFilter::with_options(config.filter.clone());
    if let Some(pattern) = matches.get_one::<String>("filter") {
        filter
            .set_pattern(pattern)
            .with_context(|| format!("Invalid pattern {:?}", pattern))?;
    }

    let result = if matches.get_flag("background") {
        filter.filter_async(Arc::clone(&file)).await?
    } else {
        filter.filter(file.as_ref())
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if matches.get_flag("count") {
        writeln!(out, "{}", result.len())?;
    } else {
        let numbered = matches.get_flag("line-number");
        for &index in result.indices() {
            if numbered {
                write!(out, "{}:", index + 1)?;
            }
            out.write_all(file.get_line(index))?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;

    Ok(())
}

fn build_cli() -> Command {
    Command::new("logscope")
        .version(logscope::VERSION)
        .about("Print the lines of a log file that match a pattern")
        .long_about(
            "logscope memory-maps a log file, indexes its lines once, and prints the \
             lines matching a regular expression. Without a pattern every line is printed.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the log file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("filter")
                .short('e')
                .long("filter")
                .value_name("PATTERN")
                .help("Only print lines matching PATTERN"),
        )
        .arg(
            Arg::new("ignore-case")
                .short('i')
                .long("ignore-case")
                .action(ArgAction::SetTrue)
                .help("Match letters regardless of case"),
        )
        .arg(
            Arg::new("fixed-strings")
                .short('F')
                .long("fixed-strings")
                .action(ArgAction::SetTrue)
                .help("Treat PATTERN as a literal string"),
        )
        .arg(
            Arg::new("word")
                .short('w')
                .long("word")
                .action(ArgAction::SetTrue)
                .help("Only match whole words"),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .long("count")
                .action(ArgAction::SetTrue)
                .help("Print only the number of matching lines"),
        )
        .arg(
            Arg::new("line-number")
                .short('n')
                .long("line-number")
                .action(ArgAction::SetTrue)
                .help("Prefix each line with its 1-based line number"),
        )
        .arg(
            Arg::new("background")
                .long("background")
                .action(ArgAction::SetTrue)
                .help("Run the filter pass on a background thread"),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .value_name("STRATEGY")
                .value_parser(["auto", "mmap", "buffered", "windowed"])
                .help("How file content is loaded"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Read settings from a TOML file"),
        )
}

/// Command-line flags override config file settings
fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(strategy) = matches.get_one::<String>("strategy") {
        config.reader.strategy = match strategy.as_str() {
            "mmap" => AccessStrategy::MemoryMapped,
            "buffered" => AccessStrategy::Buffered,
            "windowed" => AccessStrategy::Windowed,
            _ => AccessStrategy::Auto,
        };
    }

    let filter: &mut FilterOptions = &mut config.filter;
    if matches.get_flag("ignore-case") {
        filter.case_insensitive = true;
    }
    if matches.get_flag("fixed-strings") {
        filter.regex_mode = false;
    }
    if matches.get_flag("word") {
        filter.whole_word = true;
    }
}

#[cfg(feature = "config")]
fn load_config(path: Option<&String>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(std::path::Path::new(path))?,
        None => Config::load_default()?,
    };
    Ok(config)
}

#[cfg(not(feature = "config"))]
fn load_config(path: Option<&String>) -> Result<Config> {
    if path.is_some() {
        anyhow::bail!("--config requires logscope to be built with the `config` feature");
    }
    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!logscope::VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let matches = build_cli()
            .try_get_matches_from(["logscope", "-i", "-F", "--strategy", "buffered", "app.log"])
            .unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &matches);

        assert_eq!(config.reader.strategy, AccessStrategy::Buffered);
        assert!(config.filter.case_insensitive);
        assert!(!config.filter.regex_mode);
        assert!(!config.filter.whole_word);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result = build_cli().try_get_matches_from(["logscope", "--strategy", "zip", "a.log"]);
        assert!(result.is_err());
    }
}
