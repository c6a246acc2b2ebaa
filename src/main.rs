use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};

use forest_stories::batch::{BatchOptionsBuilder, BatchRunner};
use forest_stories::config::{Config, DEFAULT_CONFIG_PATH};
use forest_stories::engines::coqui::CoquiBackend;
use forest_stories::story;
use forest_stories::voices::{VoiceCategory, VoiceRegistry};

/// Narrated forest stories with random Coqui TTS voices
#[derive(Parser)]
#[command(name = "forest-stories", version)]
struct Cli {
    /// JSON config file; defaults apply when it is missing or invalid
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List voice models per category and what is known about them
    List,
    /// Generate stories: [count] [male|female|any] [gpu] [output <dir>]
    Generate {
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    story::validate_templates()?;
    let mut config = Config::load(&cli.config);

    match cli.command {
        Command::List => list_models(&config.registry()),
        Command::Generate { args } => {
            config.apply_args(&args);

            let options = BatchOptionsBuilder::default()
                .story_count(config.story_count)
                .category(config.voice_category)
                .output_dir(config.output_dir(Local::now()))
                .use_accelerator(config.use_accelerator)
                .cooldown(config.cooldown())
                .build()?;

            let backend = CoquiBackend::with_bin(config.tts_bin.clone());
            let mut runner = BatchRunner::new(backend, config.registry(), options);
            let report = runner.run()?;

            if report.records.is_empty() {
                if config.story_count > 0 {
                    std::process::exit(1);
                }
                return Ok(());
            }

            println!(
                "\nSuccessfully generated {} of {} stories",
                report.records.len(),
                config.story_count
            );
            let output_dir = std::fs::canonicalize(&report.output_dir)
                .unwrap_or_else(|_| report.output_dir.clone());
            println!("Output directory: {}", output_dir.display());
            if !report.newly_unusable.is_empty() {
                println!("Skipped unusable models: {}", report.newly_unusable.join(", "));
            }
        }
    }

    Ok(())
}

fn list_models(registry: &VoiceRegistry) {
    println!("Available voice models by category:");
    println!("{}", "=".repeat(50));

    for category in VoiceCategory::ALL {
        println!("\n{} voices:", category.as_str().to_uppercase());
        for model in registry.models(category) {
            let status = if registry.is_unusable(model) {
                "unusable"
            } else {
                "ok"
            };
            let speakers = match registry.speaker_range(model) {
                Some(range) if registry.is_multi_speaker(model) => format!(
                    " [multi-speaker {}{}..{}{}]",
                    range.prefix, range.min, range.prefix, range.max
                ),
                None if registry.is_multi_speaker(model) => {
                    " [multi-speaker, no speaker range]".to_string()
                }
                _ => String::new(),
            };
            println!("  {status:<8} {model}{speakers}");
        }
    }

    let unusable = registry.unusable();
    if !unusable.is_empty() {
        println!("\nModels known to fail loading:");
        for model in unusable {
            println!("  {model}");
        }
    }
}
