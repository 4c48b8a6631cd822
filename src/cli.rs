//! Command line front end
//!
//! Thin wrapper over [`MidiCommands`]: parse arguments, run the commands,
//! print results. All domain work happens in the library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::config::AppConfig;
use crate::commands::files::suggest_output_path;
use crate::commands::logging::init_logging;
use crate::commands::midi::MidiCommands;
use crate::midi::FileSummary;

/// Uniformly speed up or slow down Standard MIDI Files
#[derive(Parser, Debug)]
#[command(name = "tempo-scale")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show summary information for a MIDI file
    Info {
        /// Input MIDI file
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scale playback speed and write a new MIDI file
    Scale {
        /// Input MIDI file
        input: PathBuf,

        /// Speed factor (>1 faster, <1 slower); config default when omitted
        #[arg(short, long)]
        speed: Option<f64>,

        /// Output file (defaults to <input>_<speed>x.mid)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print before/after summaries as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run_with(cli: Cli) -> ExitCode {
    let config = match cli.config.as_deref().map(AppConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let commands = MidiCommands::new(config.speed);
    let result = match cli.command {
        Commands::Info { input, json } => info(&commands, &input, json),
        Commands::Scale {
            input,
            speed,
            output,
            json,
        } => scale(&commands, &input, speed, output, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn info(commands: &MidiCommands, input: &std::path::Path, json: bool) -> Result<(), String> {
    let summary = commands.load_midi(input)?;
    if json {
        println!("{}", to_json(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn scale(
    commands: &MidiCommands,
    input: &std::path::Path,
    speed: Option<f64>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let speed = speed.unwrap_or(commands.speed_limits().default);
    let before = commands.load_midi(input)?;
    let message = commands.adjust_speed(speed)?;
    let after = commands.get_midi_info()?;

    let output = output.unwrap_or_else(|| suggest_output_path(input, speed));
    commands.save_midi(&output)?;

    if json {
        let report = serde_json::json!({
            "input": input,
            "output": output,
            "speed": speed,
            "before": before,
            "after": after,
        });
        println!("{}", to_json(&report)?);
    } else {
        println!("{}", message);
        println!("Before: {:.2}s, after: {:.2}s", before.duration_seconds, after.duration_seconds);
        println!("Saved to {}", output.display());
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Processing failed: {}", e))
}

fn print_summary(summary: &FileSummary) {
    println!("Duration:               {:.2}s", summary.duration_seconds);
    println!("Format:                 {}", summary.format.type_number());
    println!("Ticks per quarter:      {}", summary.ticks_per_quarter);
    println!("Tracks:                 {}", summary.num_tracks);
    println!("Instruments:            {}", summary.num_instruments);
    println!("Notes:                  {}", summary.num_notes);
    println!("Tempo changes:          {}", summary.num_tempo_changes);
    println!("Key signature changes:  {}", summary.num_key_signature_changes);
    println!("Initial tempo:          {:.1} BPM", summary.initial_bpm);
}
