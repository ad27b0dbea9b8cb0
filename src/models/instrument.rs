//! Instrument and skill vocabularies.
//!
//! The instrument set is closed: every teacher, student and room refers to
//! one of [`Instrument::ALL`]. Sets of instruments are stored as a bitmask so
//! compatibility checks are a single AND.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An instrument taught, learned, or supported by room equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Instrument {
    Piano,
    Guitar,
    Violin,
    Drums,
}

impl Instrument {
    /// Every instrument, in index order.
    pub const ALL: [Instrument; 4] = [
        Instrument::Piano,
        Instrument::Guitar,
        Instrument::Violin,
        Instrument::Drums,
    ];

    /// Number of distinct instruments.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
            Instrument::Violin => "Violin",
            Instrument::Drums => "Drums",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a name outside a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary} '{value}'")]
pub struct UnknownName {
    /// Vocabulary that was searched ("instrument", "skill level").
    pub vocabulary: &'static str,
    /// The rejected input.
    pub value: String,
}

impl FromStr for Instrument {
    type Err = UnknownName;

    /// Case-insensitive parse of an instrument name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownName {
                vocabulary: "instrument",
                value: trimmed.to_string(),
            })
    }
}

/// A set of instruments, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentSet(u8);

impl InstrumentSet {
    /// The empty set.
    pub const EMPTY: InstrumentSet = InstrumentSet(0);

    /// Adds an instrument.
    #[inline]
    pub fn insert(&mut self, instrument: Instrument) {
        self.0 |= 1 << instrument.index();
    }

    /// Whether the set contains `instrument`.
    #[inline]
    pub fn contains(self, instrument: Instrument) -> bool {
        self.0 & (1 << instrument.index()) != 0
    }

    /// Number of instruments in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates members in index order.
    pub fn iter(self) -> impl Iterator<Item = Instrument> {
        Instrument::ALL.into_iter().filter(move |i| self.contains(*i))
    }
}

impl FromIterator<Instrument> for InstrumentSet {
    fn from_iter<T: IntoIterator<Item = Instrument>>(iter: T) -> Self {
        let mut set = InstrumentSet::EMPTY;
        for instrument in iter {
            set.insert(instrument);
        }
        set
    }
}

/// Student proficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Rank in `1..=3`.
    pub fn rank(self) -> u8 {
        match self {
            SkillLevel::Beginner => 1,
            SkillLevel::Intermediate => 2,
            SkillLevel::Advanced => 3,
        }
    }

    /// Rank scaled into `(0, 1]`.
    pub fn normalized(self) -> f32 {
        f32::from(self.rank()) / 3.0
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

impl FromStr for SkillLevel {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        [
            SkillLevel::Beginner,
            SkillLevel::Intermediate,
            SkillLevel::Advanced,
        ]
        .into_iter()
        .find(|l| l.name().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| UnknownName {
            vocabulary: "skill level",
            value: trimmed.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_parse() {
        assert_eq!("Piano".parse::<Instrument>().unwrap(), Instrument::Piano);
        assert_eq!(" drums ".parse::<Instrument>().unwrap(), Instrument::Drums);
        let err = "Kazoo".parse::<Instrument>().unwrap_err();
        assert_eq!(err.value, "Kazoo");
        assert_eq!(err.vocabulary, "instrument");
    }

    #[test]
    fn test_instrument_set() {
        let set: InstrumentSet = [Instrument::Guitar, Instrument::Drums].into_iter().collect();
        assert!(set.contains(Instrument::Guitar));
        assert!(!set.contains(Instrument::Piano));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Instrument::Guitar, Instrument::Drums]
        );
        assert!(InstrumentSet::EMPTY.is_empty());
    }

    #[test]
    fn test_skill_normalization() {
        assert!((SkillLevel::Beginner.normalized() - 1.0 / 3.0).abs() < 1e-6);
        assert!((SkillLevel::Advanced.normalized() - 1.0).abs() < 1e-6);
        assert_eq!(
            "intermediate".parse::<SkillLevel>().unwrap(),
            SkillLevel::Intermediate
        );
        assert!("Expert".parse::<SkillLevel>().is_err());
    }
}
