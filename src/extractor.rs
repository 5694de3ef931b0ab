use midi_file::core::Message;
use midi_file::file::{Division, Event, MetaEvent};
use midi_file::MidiFile;

use crate::error::{ConvertError, Result};
use crate::score_note::ScoreNote;

// microseconds per second
const MICROS_PER_SEC: f64 = 1_000_000.0;
// 120 BPM, applied regardless of any tempo events in the file
const FIXED_TEMPO_MICROS_PER_QN: u32 = 500_000;

pub struct Extractor {
    midi_file: MidiFile,
    ticks_per_beat: u16,
}

impl Extractor {
    pub fn new(midi_file: MidiFile) -> Result<Self> {
        let ticks_per_beat = match midi_file.header().division() {
            Division::QuarterNote(qtr) => qtr.get(),
            Division::Smpte(smpte) => {
                return Err(ConvertError::UnsupportedDivision(format!(
                    "SMPTE {:?}",
                    smpte
                )))
            }
        };
        log::debug!("Quarter Note Division: {}", ticks_per_beat);

        Ok(Self {
            midi_file,
            ticks_per_beat,
        })
    }

    pub fn run(&self) -> Vec<ScoreNote> {
        let mut results: Vec<ScoreNote> = Vec::new();
        for (index, track) in self.midi_file.tracks().enumerate() {
            let mut notes = TrackNotes::new(index + 1);
            for track_event in track.events() {
                notes.process(
                    track_event.delta_time(),
                    &TrackMessage::from(track_event.event()),
                );
            }
            results.extend(notes.finish(self.ticks_per_beat));
        }

        sort_by_start(&mut results);
        results
    }
}

/// The parts of a track event the score cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackMessage {
    ProgramChange(u8),
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
    TempoChange(u32),
    Other,
}

impl From<&Event> for TrackMessage {
    fn from(event: &Event) -> Self {
        match event {
            Event::Midi(Message::ProgramChange(program)) => {
                TrackMessage::ProgramChange(program.program().get())
            }
            Event::Midi(Message::NoteOn(note)) => TrackMessage::NoteOn {
                channel: note.channel().get(), // midi_file is 0-based
                pitch: note.note_number().get(),
                velocity: note.velocity().get(),
            },
            Event::Midi(Message::NoteOff(note)) => TrackMessage::NoteOff {
                pitch: note.note_number().get(),
            },
            Event::Meta(MetaEvent::SetTempo(tempo)) => TrackMessage::TempoChange(tempo.get()),
            _ => TrackMessage::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lifecycle {
    Open,
    Closed { end_tick: u64 },
}

#[derive(Debug)]
struct PendingNote {
    channel: u8,
    instrument: u8,
    pitch: u8,
    start_tick: u64,
    lifecycle: Lifecycle,
}

/// Note pairing state for a single track.
///
/// Notes are kept in note-on order. A note-off closes the most recently
/// opened note of the same pitch that is still open; notes never closed
/// are dropped by [`TrackNotes::finish`].
#[derive(Debug)]
pub struct TrackNotes {
    track: usize,
    ticks: u64,
    current_instrument: u8,
    notes: Vec<PendingNote>,
}

impl TrackNotes {
    pub fn new(track: usize) -> Self {
        Self {
            track,
            ticks: 0,
            current_instrument: 0,
            notes: Vec::new(),
        }
    }

    pub fn process(&mut self, delta_time: u32, message: &TrackMessage) {
        self.ticks += u64::from(delta_time);
        match *message {
            TrackMessage::ProgramChange(program) => self.current_instrument = program,
            TrackMessage::NoteOn {
                channel,
                pitch,
                velocity,
            } if velocity > 0 => self.notes.push(PendingNote {
                channel: channel + 1,
                instrument: self.current_instrument,
                pitch,
                start_tick: self.ticks,
                lifecycle: Lifecycle::Open,
            }),
            TrackMessage::NoteOn { pitch, .. } | TrackMessage::NoteOff { pitch } => {
                self.close(pitch)
            }
            TrackMessage::TempoChange(micros_per_qn) => {
                log::debug!(
                    "-- Ignoring tempo change on track {}: {} BPM",
                    self.track,
                    MICROS_PER_SEC / micros_per_qn as f64 * 60.0
                );
            }
            TrackMessage::Other => {}
        }
    }

    fn close(&mut self, pitch: u8) {
        let ticks = self.ticks;
        match self
            .notes
            .iter_mut()
            .rev()
            .find(|note| note.pitch == pitch && note.lifecycle == Lifecycle::Open)
        {
            Some(note) => note.lifecycle = Lifecycle::Closed { end_tick: ticks },
            None => log::trace!(
                "-- Unmatched note-off on track {}: pitch {} at tick {}",
                self.track,
                pitch,
                ticks
            ),
        }
    }

    pub fn finish(self, ticks_per_beat: u16) -> Vec<ScoreNote> {
        let open = self
            .notes
            .iter()
            .filter(|note| note.lifecycle == Lifecycle::Open)
            .count();
        if open > 0 {
            log::warn!(
                "Track {}: dropping {} note(s) without a matching note-off",
                self.track,
                open
            );
        }

        let track = self.track;
        self.notes
            .into_iter()
            .filter_map(|note| match note.lifecycle {
                Lifecycle::Open => None,
                Lifecycle::Closed { end_tick } => Some(ScoreNote {
                    track,
                    channel: note.channel,
                    instrument: note.instrument,
                    pitch: note.pitch,
                    start: round_seconds(ticks_to_seconds(note.start_tick, ticks_per_beat)),
                    duration: round_seconds(ticks_to_seconds(
                        end_tick - note.start_tick,
                        ticks_per_beat,
                    )),
                }),
            })
            .collect()
    }
}

/// Stable sort, so notes starting together keep their extraction order.
pub fn sort_by_start(notes: &mut [ScoreNote]) {
    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
}

fn ticks_to_seconds(ticks: u64, ticks_per_beat: u16) -> f64 {
    // MIDI tempo is in microseconds per quarter note
    let tempo_in_secs = FIXED_TEMPO_MICROS_PER_QN as f64 / MICROS_PER_SEC;
    ticks as f64 * tempo_in_secs / ticks_per_beat as f64
}

// rounds the exact binary value in decimal, to 4 places
fn round_seconds(seconds: f64) -> f64 {
    format!("{:.4}", seconds).parse().unwrap_or(seconds)
}
