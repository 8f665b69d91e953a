mod aggregate;
mod config;
mod output;
mod youtube;

pub const USER_AGENT: &str = concat!("vidsweep/", env!("CARGO_PKG_VERSION"));

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use config::SearchConfig;
use youtube::YouTubeClient;

/// Search YouTube videos by keyword and save deduplicated results as CSV.
#[derive(Parser, Debug)]
#[command(name = "vidsweep", version)]
struct Cli {
    /// Path to configuration file
    config_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vidsweep=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = SearchConfig::load(&cli.config_file)
        .inspect_err(|e| tracing::error!("configuration error: {e}"))?;
    write_summary(&mut io::stdout().lock(), &config)?;

    let http = Client::builder().build()?;
    let client = YouTubeClient::new(http, config.timeout);

    let records = aggregate::run(&client, &config)
        .await
        .inspect_err(|e| tracing::error!("search run failed: {e}"))?;

    output::write_csv(&config.output_file, &records)
        .inspect_err(|e| tracing::error!("failed to write results: {e}"))?;

    info!(records = records.len(), "run complete");
    println!();
    println!(
        "Saved {} videos to {}",
        records.len(),
        config.output_file.display()
    );
    println!("Done.");
    Ok(())
}

fn write_summary(out: &mut impl Write, config: &SearchConfig) -> io::Result<()> {
    writeln!(out, "Configuration:")?;
    writeln!(out, "   Using API Key: {}", config.api_key.masked())?;
    writeln!(out, "   Using max_results of: {}", config.max_results)?;
    writeln!(out, "   Using search terms:")?;
    for term in &config.terms {
        writeln!(out, "     -{term}")?;
    }
    writeln!(out, "   Results to be saved in: {}", config.output_file.display())?;
    writeln!(out)?;
    writeln!(out, "Starting...")?;
    writeln!(out)?;

    if let Some(path) = &config.exclude_file {
        writeln!(
            out,
            "Excluding previously seen videos listed in: {}",
            path.display()
        )?;
        // an unreadable list is reported by the run itself
        if let Ok(ids) = aggregate::read_exclusions(path) {
            for id in ids {
                writeln!(out, "-- Excluding video_id: {id}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use youtube::ApiKey;

    fn config(exclude_file: Option<PathBuf>) -> SearchConfig {
        SearchConfig {
            terms: vec!["catsA".into(), "catsB".into()],
            max_results: 2,
            api_key: ApiKey::new("AIzaSecret9876"),
            output_file: PathBuf::from("out.csv"),
            exclude_file,
            timeout: Duration::from_secs(1),
        }
    }

    fn summary(config: &SearchConfig) -> String {
        let mut buf = Vec::new();
        write_summary(&mut buf, config).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_masks_key_and_lists_terms() {
        let text = summary(&config(None));
        assert!(text.contains("Using API Key: ****9876"));
        assert!(!text.contains("AIzaSecret"));
        assert!(text.contains("     -catsA\n     -catsB\n"));
        assert!(text.contains("Results to be saved in: out.csv"));
        assert!(!text.contains("Excluding"));
    }

    #[test]
    fn summary_lists_each_excluded_id_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.txt");
        std::fs::write(&path, "vid2\n\nvid1\n").unwrap();

        let text = summary(&config(Some(path)));
        assert!(text.contains("Excluding previously seen videos listed in:"));
        assert!(text.contains("-- Excluding video_id: vid2\n-- Excluding video_id: vid1\n"));
    }

    #[test]
    fn summary_with_unreadable_exclusion_list_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let text = summary(&config(Some(dir.path().join("absent.txt"))));
        assert!(text.contains("Excluding previously seen videos listed in:"));
        assert!(!text.contains("-- Excluding video_id"));
    }
}
