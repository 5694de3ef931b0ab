use crate::score_note::ScoreNote;

mod digital_score_formatter;

pub use digital_score_formatter::DigitalScoreFormatter;

pub trait ScoreFormatter {
    fn format(&self, note: &ScoreNote) -> String;
}

/// Formats every note on its own newline-terminated line.
pub fn render(notes: &[ScoreNote], formatter: &impl ScoreFormatter) -> String {
    notes
        .iter()
        .map(|note| formatter.format(note) + "\n")
        .collect()
}
