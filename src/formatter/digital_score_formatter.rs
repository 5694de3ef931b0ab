use crate::formatter::ScoreFormatter;
use crate::score_note::ScoreNote;

pub struct DigitalScoreFormatter {}

impl DigitalScoreFormatter {
    pub fn new() -> Self {
        Self {}
    }
}

impl ScoreFormatter for DigitalScoreFormatter {
    fn format(&self, note: &ScoreNote) -> String {
        // 1,1,0,64,0.0,0.5
        format!(
            "{track},{channel},{instrument},{pitch},{start},{duration}",
            track = note.track,
            channel = note.channel,
            instrument = note.instrument,
            pitch = note.pitch,
            start = format_seconds(note.start),
            duration = format_seconds(note.duration),
        )
    }
}

// shortest round-trip form, always with a fractional part
fn format_seconds(seconds: f64) -> String {
    format!("{:?}", seconds)
}
