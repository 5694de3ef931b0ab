use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("MIDI parse error: {0}")]
    Parse(#[from] midi_file::Error),

    #[error("unsupported MIDI division: {0}")]
    UnsupportedDivision(String),

    #[error("output {} already written by another input", path.display())]
    DuplicateOutput { path: PathBuf },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
