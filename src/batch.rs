use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use midi_file::MidiFile;

use crate::error::{ConvertError, Result};
use crate::extractor::Extractor;
use crate::formatter::{render, DigitalScoreFormatter};
use crate::score_note::ScoreNote;

const MIDI_EXT: &str = "mid";
const SCORE_EXT: &str = "txt";
const SMPTE_DIVISION_BIT: u16 = 0x8000;

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ConvertError)>,
}

pub fn convert_file(path: &Path) -> Result<Vec<ScoreNote>> {
    let data = fs::read(path).map_err(|source| io_error(path, source))?;
    check_division(&data)?;
    let midi_file = MidiFile::read(data.as_slice())?;
    Ok(Extractor::new(midi_file)?.run())
}

/// Rejects timecode and zero divisions from the raw header, which the parser
/// would otherwise fail on opaquely or clamp to a single tick per beat.
fn check_division(data: &[u8]) -> Result<()> {
    // MThd, length, format, ntrks, division
    if data.len() < 14 || &data[..4] != b"MThd" {
        return Ok(());
    }
    let division = u16::from_be_bytes([data[12], data[13]]);
    if division & SMPTE_DIVISION_BIT != 0 {
        return Err(ConvertError::UnsupportedDivision(format!(
            "SMPTE timecode {:#06x}",
            division
        )));
    }
    if division == 0 {
        return Err(ConvertError::UnsupportedDivision(
            "zero ticks per quarter note".to_string(),
        ));
    }
    Ok(())
}

pub fn collect_midi_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut midis = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| io_error(dir, source))? {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        let is_midi = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MIDI_EXT));
        if is_midi && path.is_file() {
            midis.push(path);
        }
    }
    midis.sort();
    Ok(midis)
}

pub fn output_path(dest_dir: &Path, midi_path: &Path) -> PathBuf {
    let mut name = midi_path
        .file_stem()
        .unwrap_or(midi_path.as_os_str())
        .to_os_string();
    name.push(".");
    name.push(SCORE_EXT);
    dest_dir.join(name)
}

/// Writes through a sibling temporary file so the destination is either
/// fully written or left untouched.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents)
        .map_err(|source| io_error(&tmp_path, source))
        .and_then(|()| fs::rename(&tmp_path, path).map_err(|source| io_error(path, source)))
        .inspect_err(|_| {
            let _ = fs::remove_file(&tmp_path);
        })
}

fn convert_into(
    midi_path: &Path,
    dest_dir: &Path,
    written: &mut HashSet<PathBuf>,
) -> Result<PathBuf> {
    let out = output_path(dest_dir, midi_path);
    if written.contains(&out) {
        log::warn!(
            "{} maps to {}, already written in this batch",
            midi_path.display(),
            out.display()
        );
        return Err(ConvertError::DuplicateOutput { path: out });
    }
    let notes = convert_file(midi_path)?;
    write_atomically(&out, &render(&notes, &DigitalScoreFormatter::new()))?;
    written.insert(out.clone());
    Ok(out)
}

pub fn run_batch(src_dir: &Path, dest_dir: &Path) -> Result<BatchReport> {
    fs::create_dir_all(dest_dir).map_err(|source| io_error(dest_dir, source))?;

    let mut report = BatchReport::default();
    let mut written = HashSet::new();
    for midi_path in collect_midi_files(src_dir)? {
        match convert_into(&midi_path, dest_dir, &mut written) {
            Ok(out) => {
                log::info!("Converted {} -> {}", midi_path.display(), out.display());
                report.converted.push(midi_path);
            }
            Err(err) => {
                log::error!("Failed to convert {}: {}", midi_path.display(), err);
                report.failed.push((midi_path, err));
            }
        }
    }
    Ok(report)
}

fn io_error(path: &Path, source: std::io::Error) -> ConvertError {
    ConvertError::Io {
        path: path.to_path_buf(),
        source,
    }
}
