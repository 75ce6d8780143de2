//! Index functions for the perceptron table and the local history table.
//!
//! A [HashingScheme] selects one [IndexPlan]: which signals are combined to
//! select a perceptron, and which are combined to select a local history
//! register. The same plan is used for prediction and for training, so both
//! always touch the same entries.

use serde::{ Deserialize, Serialize };
use crate::error::ConfigError;

/// The signals (and how they are combined) used to form an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IndexSource {
    Pc,
    Ghr,
    Local,
    PcXorGhr,
    PcXorLocal,
    LocalXorGhr,
    PcXorLocalXorGhr,
}
impl IndexSource {
    /// Combine the program counter, global history, and local history.
    #[inline(always)]
    pub fn combine(self, pc: u64, ghr: u64, local: u64) -> u64 {
        match self {
            Self::Pc               => pc,
            Self::Ghr              => ghr,
            Self::Local            => local,
            Self::PcXorGhr         => pc ^ ghr,
            Self::PcXorLocal       => pc ^ local,
            Self::LocalXorGhr      => local ^ ghr,
            Self::PcXorLocalXorGhr => pc ^ local ^ ghr,
        }
    }

    /// Combine the inputs and reduce them into an index for a table with
    /// 'size' entries.
    #[inline(always)]
    pub fn index(self, pc: u64, ghr: u64, local: u64, size: usize) -> usize {
        (self.combine(pc, ghr, local) % size as u64) as usize
    }

    /// Returns 'true' if the local history feeds this index.
    pub fn uses_local(self) -> bool {
        matches!(self, Self::Local | Self::PcXorLocal
            | Self::LocalXorGhr | Self::PcXorLocalXorGhr)
    }
}

/// The pair of index functions selected by a [HashingScheme].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct IndexPlan {
    /// Selects a row in the perceptron table
    pub perceptron: IndexSource,

    /// Selects a register in the local history table
    pub lht: IndexSource,
}
impl IndexPlan {
    /// The plan used for any scheme number outside of `1..=9`.
    pub const FALLBACK: Self = Self {
        perceptron: IndexSource::PcXorGhr,
        lht: IndexSource::PcXorGhr,
    };

    const fn new(perceptron: IndexSource, lht: IndexSource) -> Self {
        Self { perceptron, lht }
    }

    /// Return the plan for some raw scheme number.
    pub fn for_raw(raw: u64) -> Self {
        use IndexSource::*;
        match raw {
            1 => Self::new(Pc,               Pc),
            2 => Self::new(PcXorGhr,         Pc),
            3 => Self::new(Local,            PcXorGhr),
            4 => Self::new(Pc,               Pc),
            5 => Self::new(Ghr,              PcXorGhr),
            6 => Self::new(PcXorLocal,       Pc),
            7 => Self::new(PcXorGhr,         Pc),
            8 => Self::new(LocalXorGhr,      PcXorGhr),
            9 => Self::new(PcXorLocalXorGhr, Pc),
            _ => Self::FALLBACK,
        }
    }

    /// Index into a local history table with 'size' entries.
    ///
    /// None of the plans select a local history register with the local
    /// history itself.
    #[inline(always)]
    pub fn lht_index(&self, pc: u64, ghr: u64, size: usize) -> usize {
        debug_assert!(!self.lht.uses_local());
        self.lht.index(pc, ghr, 0, size)
    }

    /// Index into a perceptron table with 'size' rows.
    #[inline(always)]
    pub fn perceptron_index(&self, pc: u64, ghr: u64, local: u64, size: usize)
        -> usize
    {
        self.perceptron.index(pc, ghr, local, size)
    }
}

/// A validated hashing scheme number in `1..=9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct HashingScheme(u8);
impl HashingScheme {
    pub const MIN: u64 = 1;
    pub const MAX: u64 = 9;

    /// Iterate over all valid schemes.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(|x| Self(x as u8))
    }

    pub fn get(&self) -> u64 { self.0 as u64 }

    pub fn plan(&self) -> IndexPlan {
        IndexPlan::for_raw(self.get())
    }
}

impl TryFrom<u64> for HashingScheme {
    type Error = ConfigError;
    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(ConfigError::HashingScheme(raw))
        }
    }
}
impl From<HashingScheme> for u64 {
    fn from(x: HashingScheme) -> u64 { x.get() }
}

impl std::fmt::Display for HashingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HashingScheme {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.trim().parse()
            .map_err(|_| ConfigError::Unparsable(s.to_string()))?;
        Self::try_from(raw)
    }
}
