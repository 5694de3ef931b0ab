#[derive(Debug, Clone, PartialEq)]
pub struct ScoreNote {
    pub track: usize,  // 1-based
    pub channel: u8,   // 1-based
    pub instrument: u8,
    pub pitch: u8,
    pub start: f64,    // in seconds
    pub duration: f64, // in seconds
}
