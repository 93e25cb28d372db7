//! Answer lookup tables keyed by question kind.
//!
//! Answers arrive as localized (Vietnamese) labels. Each known kind maps its
//! labels to a small integer score; `likert5` and `rating` additionally send
//! the numeric code instead of the label.

use super::types::Polarity;

pub const KIND_YESNO: &str = "yesno";
pub const KIND_LIKERT5: &str = "likert5";
pub const KIND_FREQUENCY: &str = "frequency";
pub const KIND_RATING: &str = "rating";

const YESNO_SCORES: &[(&str, i32)] = &[("Có", 1), ("Không", 0)];

const LIKERT5_SCORES: &[(&str, i32)] = &[
    ("Rất không thích", 1),
    ("Không thích", 2),
    ("Bình thường", 3),
    ("Rất thích", 4),
    ("Cực kỳ thích", 5),
];

const FREQUENCY_SCORES: &[(&str, i32)] = &[
    ("Không bao giờ", 1),
    ("Hiếm khi", 2),
    ("Thỉnh thoảng", 3),
    ("Thường xuyên", 4),
    ("Luôn luôn", 5),
];

const RATING_SCORES: &[(&str, i32)] = &[
    ("Rất tệ", 1),
    ("Tệ", 2),
    ("Bình thường", 3),
    ("Tốt", 4),
    ("Rất tốt", 5),
];

const LIKERT5_CODES: &[(&str, &str)] = &[
    ("Rất không thích", "1"),
    ("Không thích", "2"),
    ("Bình thường", "3"),
    ("Rất thích", "4"),
    ("Cực kỳ thích", "5"),
];

const RATING_CODES: &[(&str, &str)] = &[
    ("Rất tệ", "1"),
    ("Tệ", "2"),
    ("Bình thường", "3"),
    ("Tốt", "4"),
    ("Rất tốt", "5"),
];

// No kind is reverse-keyed today; add `(kind, Polarity::Neg)` entries here.
const KIND_POLARITY: &[(&str, Polarity)] = &[
    (KIND_YESNO, Polarity::Pos),
    (KIND_LIKERT5, Polarity::Pos),
    (KIND_FREQUENCY, Polarity::Pos),
    (KIND_RATING, Polarity::Pos),
];

fn find<T: Copy>(table: &[(&str, T)], label: &str) -> Option<T> {
    let label = label.trim();
    table.iter().find(|(k, _)| *k == label).map(|(_, v)| *v)
}

fn score_table(kind: &str) -> Option<&'static [(&'static str, i32)]> {
    match kind {
        KIND_YESNO => Some(YESNO_SCORES),
        KIND_LIKERT5 => Some(LIKERT5_SCORES),
        KIND_FREQUENCY => Some(FREQUENCY_SCORES),
        KIND_RATING => Some(RATING_SCORES),
        _ => None,
    }
}

fn code_table(kind: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match kind {
        KIND_LIKERT5 => Some(LIKERT5_CODES),
        KIND_RATING => Some(RATING_CODES),
        _ => None,
    }
}

/// Polarity for a kind. Unknown kinds score positively.
pub fn polarity_for(kind: &str) -> Polarity {
    find(KIND_POLARITY, kind).unwrap_or(Polarity::Pos)
}

/// Integer score of `answer` under `kind`; 0 when the label is not mapped.
pub fn score_for(kind: &str, answer: &str) -> i32 {
    score_table(kind)
        .and_then(|table| find(table, answer))
        .unwrap_or(0)
}

/// Value sent as `ans`: the numeric code for coded kinds, the raw text otherwise.
///
/// A coded kind with an unmapped label falls back to the raw text.
pub fn answer_value(kind: &str, answer: &str) -> String {
    code_table(kind)
        .and_then(|table| find(table, answer))
        .map(str::to_string)
        .unwrap_or_else(|| answer.to_string())
}
