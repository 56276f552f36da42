use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde_json::Value;
use std::path::PathBuf;

use transcode_settings::config::AppConfig;
use transcode_settings::job;
use transcode_settings::ui::{status_code, UiContext, WidgetRegistry};
use transcode_settings::Settings;

/// transcode-settings - inspect how job settings bind to a widget layout
#[derive(Parser, Debug)]
#[command(name = "transcode-settings")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Widget layout file (JSON list of widgets)
    #[arg(short = 'l', long = "layout", value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Print settings on a single line
    #[arg(long)]
    compact: bool,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read every widget of the layout into a settings tree
    Read,
    /// Push KEY=VALUE pairs into the layout's widgets and print the result.
    /// VALUE is parsed as JSON, falling back to a plain string.
    Set {
        #[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, Value)>,
    },
    /// Print the job skeleton with every section created
    Skeleton,
}

/// Parse "KEY=VALUE" into a key and a JSON value
fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected format: KEY=VALUE, got: {}", s))?;
    if key.is_empty() {
        return Err(format!("Missing key in: {}", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    let pretty = config.output.pretty && !cli.compact;

    match &cli.command {
        Command::Skeleton => print_settings(&skeleton(), pretty),
        Command::Read => {
            let mut ctx = UiContext::new(load_layout(&cli, &config)?);
            ctx.read_all();
            print_settings(&ctx.settings, pretty)
        }
        Command::Set { assignments } => {
            let mut ctx = UiContext::new(load_layout(&cli, &config)?);
            let mut failed = 0;
            for (key, value) in assignments {
                let status = status_code(&ctx.ui_update(Some(key.as_str()), Some(value)));
                if status != 0 {
                    failed += 1;
                }
                eprintln!("{}: {}", key, status);
            }
            print_settings(&ctx.settings, pretty)?;
            if failed > 0 {
                bail!("{} of {} keys have no widget", failed, assignments.len());
            }
            Ok(())
        }
    }
}

fn load_layout(cli: &Cli, config: &AppConfig) -> Result<WidgetRegistry> {
    let path = cli
        .layout
        .clone()
        .or_else(|| config.default_layout.clone())
        .context("No layout given (use --layout or set default_layout in the config)")?;
    let registry = WidgetRegistry::load_layout(&path)?;
    info!("Loaded {} widgets from {}", registry.len(), path.display());
    Ok(registry)
}

/// A settings tree with every job section created
fn skeleton() -> Settings {
    let mut settings = Settings::new();
    job::title_settings(&mut settings);
    job::job_video_settings(&mut settings);
    job::job_audio_list(&mut settings);
    job::job_subtitle_list(&mut settings);
    job::job_subtitle_search(&mut settings);
    job::job_metadata_settings(&mut settings);
    job::job_filter_list(&mut settings);
    job::job_chapter_list(&mut settings);
    job::job_mp4_settings(&mut settings);
    job::job_range_settings(&mut settings);
    job::job_par_settings(&mut settings);
    settings
}

fn print_settings(settings: &Settings, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(settings)?
    } else {
        serde_json::to_string(settings)?
    };
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("VideoQualitySlider=22").unwrap(), ("VideoQualitySlider".into(), json!(22)));
        assert_eq!(parse_assignment("VideoEncoder=x265").unwrap(), ("VideoEncoder".into(), json!("x265")));
        assert_eq!(parse_assignment("dest=a=b").unwrap(), ("dest".into(), json!("a=b")));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_skeleton_sections() {
        let settings = skeleton();
        let job = settings.get("Job").unwrap();
        assert_eq!(job["Subtitle"]["Search"], json!({"Enable": false}));
        assert_eq!(job["Filters"]["FilterList"], json!([]));
        assert!(settings.get("Title").unwrap().is_object());
    }
}
