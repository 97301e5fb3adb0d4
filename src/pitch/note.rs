//! Frequency to note mapping on the equal-tempered scale.
//!
//! Notes are MIDI-style integer indices: A4 (440 Hz) is 69, middle C is 60.
//! All functions expect a positive finite frequency; the display filters
//! anything else out before it gets here.

pub const A4_FREQUENCY: f64 = 440.0;
pub const A4_NOTE: i32 = 69;

/// Number of pitch classes, and the number of rows on the display.
pub const PITCH_CLASSES: usize = 12;

pub const NOTE_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One color per pitch class, walking round the hue wheel from C.
const NOTE_COLORS: [[u8; 3]; PITCH_CLASSES] = [
    [229, 57, 53],
    [244, 121, 31],
    [251, 192, 45],
    [192, 202, 51],
    [124, 179, 66],
    [67, 160, 71],
    [0, 150, 136],
    [0, 172, 193],
    [30, 136, 229],
    [57, 73, 171],
    [142, 36, 170],
    [216, 27, 96],
];

/// Equal-tempered frequency of `note`.
pub fn note_frequency(note: i32) -> f64 {
    A4_FREQUENCY * 2f64.powf((note - A4_NOTE) as f64 / 12.0)
}

/// Nearest note to `frequency`, rounding to the closest semitone.
pub fn note_from_frequency(frequency: f64) -> i32 {
    let semitones = 12.0 * (frequency / A4_FREQUENCY).log2();
    semitones.round() as i32 + A4_NOTE
}

/// Signed deviation of `frequency` from `note` in cents (100 per semitone).
pub fn cents_offset(frequency: f64, note: i32) -> f64 {
    1200.0 * (frequency / note_frequency(note)).log2()
}

/// Octave-independent note identity in `0..12`, C = 0.
pub fn pitch_class(note: i32) -> usize {
    note.rem_euclid(PITCH_CLASSES as i32) as usize
}

pub fn note_name(note: i32) -> &'static str {
    NOTE_NAMES[pitch_class(note)]
}

pub fn color_for_note(note: i32) -> [u8; 3] {
    NOTE_COLORS[pitch_class(note)]
}
