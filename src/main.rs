use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use formatter::{render, DigitalScoreFormatter};

mod batch;
mod error;
mod extractor;
mod formatter;
mod score_note;
#[cfg(test)]
mod test_helpers;

#[derive(Parser, Debug)]
#[command(version, about = "Convert MIDI files into digital score text files")]
struct Args {
    #[arg(short, long, default_value = "midi", help = "Directory scanned for .mid files")]
    input_dir: PathBuf,

    #[arg(
        short,
        long,
        default_value = "songs",
        help = "Directory the .txt scores are written to"
    )]
    output_dir: PathBuf,

    #[arg(
        short,
        long,
        help = "Convert a single MIDI file and print its score to stdout"
    )]
    midi_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(midi_file) = args.midi_file {
        log::info!("MIDI FILE: {}", midi_file.display());
        let notes = batch::convert_file(&midi_file)
            .with_context(|| format!("convert {}", midi_file.display()))?;
        print!("{}", render(&notes, &DigitalScoreFormatter::new()));
        return Ok(());
    }

    let report = batch::run_batch(&args.input_dir, &args.output_dir).with_context(|| {
        format!(
            "convert {} into {}",
            args.input_dir.display(),
            args.output_dir.display()
        )
    })?;
    log::info!(
        "Converted {} file(s), {} failed",
        report.converted.len(),
        report.failed.len()
    );
    if !report.failed.is_empty() {
        bail!("{} file(s) failed to convert", report.failed.len());
    }

    Ok(())
}
