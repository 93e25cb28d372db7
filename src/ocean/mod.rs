//! Big Five (OCEAN) trait scores and their normalization.
//!
//! Scores are held as fractions in `[0, 1]`. Remote services emit either
//! fractions or whole percentages, so every score crossing a service
//! boundary goes through [`normalize`] before it is stored or forwarded.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Threshold above which a trait value is read as a percentage.
pub const PERCENT_THRESHOLD: f64 = 1.0;

/// One of the five OCEAN dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    /// Openness to experience.
    O,
    /// Conscientiousness.
    C,
    /// Extraversion.
    E,
    /// Agreeableness.
    A,
    /// Neuroticism.
    N,
}

impl Trait {
    /// All traits in canonical O, C, E, A, N order.
    pub const ALL: [Trait; 5] = [Trait::O, Trait::C, Trait::E, Trait::A, Trait::N];

    /// Single-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::O => "O",
            Self::C => "C",
            Self::E => "E",
            Self::A => "A",
            Self::N => "N",
        }
    }

    /// Parse a trait code. Accepts the letter in either case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "O" | "o" => Some(Self::O),
            "C" | "c" => Some(Self::C),
            "E" | "e" => Some(Self::E),
            "A" | "a" => Some(Self::A),
            "N" | "n" => Some(Self::N),
            _ => None,
        }
    }

    /// Full English name of the trait.
    pub fn name(&self) -> &'static str {
        match self {
            Self::O => "Openness",
            Self::C => "Conscientiousness",
            Self::E => "Extraversion",
            Self::A => "Agreeableness",
            Self::N => "Neuroticism",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Five OCEAN trait scores.
///
/// Replaced as a whole; there is deliberately no per-field setter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OceanScore {
    /// Openness.
    #[serde(rename = "O")]
    pub o: f64,
    /// Conscientiousness.
    #[serde(rename = "C")]
    pub c: f64,
    /// Extraversion.
    #[serde(rename = "E")]
    pub e: f64,
    /// Agreeableness.
    #[serde(rename = "A")]
    pub a: f64,
    /// Neuroticism.
    #[serde(rename = "N")]
    pub n: f64,
}

impl OceanScore {
    /// Build a score from raw values, fractions or percentages.
    pub fn new(o: f64, c: f64, e: f64, a: f64, n: f64) -> Self {
        Self { o, c, e, a, n }
    }

    /// Midpoint score (50% on every trait) assigned to a fresh session.
    pub fn neutral() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5, 0.5)
    }

    /// Read the value for one trait.
    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::O => self.o,
            Trait::C => self.c,
            Trait::E => self.e,
            Trait::A => self.a,
            Trait::N => self.n,
        }
    }

    /// Values in O, C, E, A, N order.
    pub fn to_array(&self) -> [f64; 5] {
        [self.o, self.c, self.e, self.a, self.n]
    }

    /// Whether every field already lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        self.to_array().iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Normalized copy of this score. See [`normalize`].
    pub fn normalized(&self) -> Self {
        normalize(*self)
    }
}

impl Default for OceanScore {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Scale a single trait value: anything above 1 is a percentage.
///
/// The comparison is strict, so exactly `1.0` stays `1.0`. Values above 100
/// are divided but not clamped.
pub fn normalize_value(value: f64) -> f64 {
    if value > PERCENT_THRESHOLD {
        value / 100.0
    } else {
        value
    }
}

/// Bring every field of `ocean` onto the fractional scale.
pub fn normalize(ocean: OceanScore) -> OceanScore {
    OceanScore {
        o: normalize_value(ocean.o),
        c: normalize_value(ocean.c),
        e: normalize_value(ocean.e),
        a: normalize_value(ocean.a),
        n: normalize_value(ocean.n),
    }
}
