use std::path::PathBuf;

/// Builds a Standard MIDI File with the given raw division word. Each track is given
/// as raw event bytes (delta times included); the end-of-track meta event is
/// appended automatically.
pub fn smf(division: u16, tracks: &[&[u8]]) -> Vec<u8> {
    let format: u16 = if tracks.len() > 1 { 1 } else { 0 };
    let mut bytes = b"MThd".to_vec();
    bytes.extend(6u32.to_be_bytes());
    bytes.extend(format.to_be_bytes());
    bytes.extend((tracks.len() as u16).to_be_bytes());
    bytes.extend(division.to_be_bytes());
    for track in tracks {
        let mut data = track.to_vec();
        data.extend([0x00, 0xFF, 0x2F, 0x00]);
        bytes.extend(b"MTrk");
        bytes.extend((data.len() as u32).to_be_bytes());
        bytes.extend(data);
    }
    bytes
}

/// A fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("midi2score-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
