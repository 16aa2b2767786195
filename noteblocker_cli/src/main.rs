// noteblocker CLI — convert a MIDI file into noteblock `setblock` commands.
//
// Reads a Standard MIDI File, runs the conversion pipeline, and writes one
// `setblock` command per line, in build order, to a file (for example a
// datapack `.mcfunction`) or to stdout (for piping into a server console).
// Logs go to stderr so stdout stays clean.
//
// Usage:
//   noteblocker <MIDI_FILE> [OPTIONS]
//     --x/--y/--z <N>            Build origin (default: 0 0 0, or config)
//     --direction <DIR>          north/east/south/west (default: south)
//     --tempo-mod <F>            Tempo modifier, > 0 (default: 1.0)
//     --repeater-fix <on|off>    Reverse repeater facing (default: on)
//     --command-delay-ms <N>     Pause between commands (default: 0)
//     --config <FILE>            JSON ConvertConfig; flags override it
//     --output <FILE>            Write commands here instead of stdout
//     --dump-layout <FILE>       Also write the lane layout as JSON
//
// Set RUST_LOG (e.g. `RUST_LOG=debug`) for more detail.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use noteblocker_core::event::TempoModifier;
use noteblocker_core::execute::CommandWriter;
use noteblocker_core::placement::{Direction, FacingTable};
use noteblocker_core::{Conversion, ConvertConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "noteblocker")]
#[command(about = "Convert a MIDI file into noteblock setblock commands", long_about = None)]
struct Cli {
    /// MIDI file to convert
    midi_file: PathBuf,

    /// Origin X coordinate
    #[arg(long, allow_negative_numbers = true)]
    x: Option<i32>,

    /// Origin Y coordinate (blocks occupy Y to Y+2)
    #[arg(long, allow_negative_numbers = true)]
    y: Option<i32>,

    /// Origin Z coordinate
    #[arg(long, allow_negative_numbers = true)]
    z: Option<i32>,

    /// Direction the structure grows in (north, east, south, west)
    #[arg(long)]
    direction: Option<Direction>,

    /// Tempo modifier; 2.0 plays twice as fast (must be > 0)
    #[arg(long = "tempo-mod")]
    tempo_mod: Option<f64>,

    /// Place repeaters with reversed facing, for servers that flip them (on/off)
    #[arg(long, value_parser = parse_on_off)]
    repeater_fix: Option<bool>,

    /// Pause between commands, in milliseconds
    #[arg(long)]
    command_delay_ms: Option<u64>,

    /// JSON config file; command-line flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write commands to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the lane layout as JSON to this file
    #[arg(long)]
    dump_layout: Option<PathBuf>,
}

fn parse_on_off(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<ConvertConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };
    if let Some(x) = cli.x {
        config.origin.x = x;
    }
    if let Some(y) = cli.y {
        config.origin.y = y;
    }
    if let Some(z) = cli.z {
        config.origin.z = z;
    }
    if let Some(direction) = cli.direction {
        config.direction = direction;
    }
    if let Some(tempo) = cli.tempo_mod {
        config.tempo_modifier = TempoModifier::new(tempo)?;
    }
    if let Some(fix) = cli.repeater_fix {
        config.facing_table = if fix {
            FacingTable::Corrected
        } else {
            FacingTable::Literal
        };
    }
    if let Some(delay) = cli.command_delay_ms {
        config.command_delay_ms = delay;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(cli)?;
    info!(
        origin = %config.origin,
        direction = %config.direction,
        tempo_modifier = config.tempo_modifier.get(),
        facing_table = ?config.facing_table,
        "converting {}",
        cli.midi_file.display()
    );

    info!("reading file");
    let raw = noteblocker_midi::load(&cli.midi_file)?;

    info!("generating structure");
    let conversion = Conversion::run(&raw, &config);

    if let Some(path) = &cli.dump_layout {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, &conversion.structure)?;
        info!("wrote lane layout to {}", path.display());
    }

    info!(count = conversion.instructions.len(), "building blocks");
    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = CommandWriter::new(sink);
    let placed = conversion.build(&mut writer, config.command_delay())?;

    info!(placed, "done");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut message = e.to_string();
            let mut source = e.source();
            while let Some(cause) = source {
                let cause_text = cause.to_string();
                if !message.contains(&cause_text) {
                    message.push_str(": ");
                    message.push_str(&cause_text);
                }
                source = cause.source();
            }
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
