use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use schema_scanner::config::{self, CliOverrides};
use schema_scanner::file_utils;
use schema_scanner::{SchemaProcessor, Strategy};

/// Report the int and float fields of BaseModel subclasses in a Python tree
#[derive(Debug, Parser)]
#[command(name = "schema_scanner", version, about)]
struct Cli {
    /// Directory to scan recursively
    root_path: Option<PathBuf>,

    /// TOML file with scan options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extraction backend
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Base class name that marks a schema class
    #[arg(short, long)]
    marker: Option<String>,

    /// Source file extension
    #[arg(long)]
    extension: Option<String>,

    /// Visit files sorted by name
    #[arg(long, overrides_with = "unsorted")]
    sorted: bool,

    /// Visit files in filesystem order
    #[arg(long, overrides_with = "sorted")]
    unsorted: bool,

    /// Follow symbolic links
    #[arg(long, overrides_with = "no_follow_links")]
    follow_links: bool,

    /// Do not follow symbolic links
    #[arg(long, overrides_with = "follow_links")]
    no_follow_links: bool,

    /// Show a progress bar on stderr
    #[arg(long, overrides_with = "no_progress")]
    progress: bool,

    /// Hide the progress bar
    #[arg(long, overrides_with = "progress")]
    no_progress: bool,

    /// Indentation width of the report
    #[arg(long)]
    indent: Option<usize>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            root_path: self.root_path.clone(),
            strategy: self.strategy,
            marker: self.marker.clone(),
            extension: self.extension.clone(),
            sort_paths: flag_pair(self.sorted, self.unsorted),
            follow_links: flag_pair(self.follow_links, self.no_follow_links),
            show_progress: flag_pair(self.progress, self.no_progress),
            indent: self.indent,
        }
    }
}

/// `Some` only when one of an on/off flag pair was given
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = config::resolve_options(cli.config.as_deref(), &cli.overrides())?;
    let indent = options.indent;

    let mut processor = SchemaProcessor::new(options)?;
    let result = processor.scan()?;

    let json = result
        .report
        .to_json(indent)
        .context("Failed to serialize report")?;

    match &cli.output {
        Some(path) => {
            file_utils::write_string_to_file(path, &json)?;
            info!("Wrote report to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_pairs() {
        let cli = Cli::parse_from(["schema_scanner", "src", "--unsorted", "--no-follow-links", "--progress"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.root_path, Some(PathBuf::from("src")));
        assert_eq!(overrides.sort_paths, Some(false));
        assert_eq!(overrides.follow_links, Some(false));
        assert_eq!(overrides.show_progress, Some(true));
    }

    #[test]
    fn test_last_flag_of_a_pair_wins() {
        let cli = Cli::parse_from(["schema_scanner", "--unsorted", "--sorted", "--no-progress"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.sort_paths, Some(true));
        assert_eq!(overrides.show_progress, Some(false));
        assert_eq!(overrides.follow_links, None);
        assert_eq!(overrides.root_path, None);
    }
}
