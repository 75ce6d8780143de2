//! Types for representing branches and branch outcomes.

use serde::{ Deserialize, Serialize };

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn from_bool(b: bool) -> Self {
        match b {
            true => Self::T,
            false => Self::N,
        }
    }

    pub fn is_taken(self) -> bool {
        matches!(self, Self::T)
    }

    /// The bipolar encoding of this outcome (taken is +1, not-taken is -1).
    pub fn sign(self) -> i32 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }

    /// The value shifted into a history register.
    pub fn bit(self) -> u64 {
        self as u64
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        Self::from_bool(x)
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool {
        x.is_taken()
    }
}

/// Coarse classification of a branch, used to stratify statistics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize)]
pub enum BranchClass {
    /// A direct branch or jump that is neither a call nor a return.
    Conditional,
    /// A procedure call (direct or indirect).
    Call,
    /// A return instruction.
    Return,
    /// An indirect branch that is neither a call nor a return.
    Indirect,
}

/// Attributes of a branch instruction, as reported by the front end that
/// observed it.
///
/// These are informational only: no predictor consumes them.
#[repr(C)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub struct BranchFlags(pub u32);
impl BranchFlags {
    pub const DIRECT: u32   = 1 << 0;
    pub const INDIRECT: u32 = 1 << 1;
    pub const CALL: u32     = 1 << 2;
    pub const RETURN: u32   = 1 << 3;
    pub const FORWARD: u32  = 1 << 4;

    /// Only these bits carry meaning.
    const MASK: u32 = 0b1_1111;

    pub fn new(bits: u32) -> Self {
        Self(bits & Self::MASK)
    }

    /// Flags for a direct branch with a known target.
    pub fn direct(pc: usize, tgt: usize, call: bool) -> Self {
        let mut bits = Self::DIRECT;
        if tgt > pc { bits |= Self::FORWARD; }
        if call { bits |= Self::CALL; }
        Self(bits)
    }

    /// Flags for an indirect branch. These are always considered backward.
    pub fn indirect(call: bool) -> Self {
        let mut bits = Self::INDIRECT;
        if call { bits |= Self::CALL; }
        Self(bits)
    }

    /// Flags for a return instruction.
    pub fn ret() -> Self { Self(Self::RETURN) }

    pub fn bits(&self) -> u32 { self.0 }
    pub fn is_direct(&self) -> bool { self.0 & Self::DIRECT != 0 }
    pub fn is_indirect(&self) -> bool { self.0 & Self::INDIRECT != 0 }
    pub fn is_call(&self) -> bool { self.0 & Self::CALL != 0 }
    pub fn is_return(&self) -> bool { self.0 & Self::RETURN != 0 }
    pub fn is_forward(&self) -> bool { self.0 & Self::FORWARD != 0 }
    pub fn is_backward(&self) -> bool { !self.is_forward() }

    pub fn class(&self) -> BranchClass {
        if self.is_return() {
            BranchClass::Return
        } else if self.is_call() {
            BranchClass::Call
        } else if self.is_indirect() {
            BranchClass::Indirect
        } else {
            BranchClass::Conditional
        }
    }
}

impl std::fmt::Debug for BranchFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "BranchFlags({:05b})", self.0)
    }
}


/// A single resolved branch, as produced by some trace source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BranchEvent {
    /// The program counter value for this branch
    pub pc: usize,

    /// The resolved outcome
    pub outcome: Outcome,

    /// Attributes of the branch instruction
    pub flags: BranchFlags,
}
impl BranchEvent {
    pub fn new(pc: usize, outcome: Outcome, flags: BranchFlags) -> Self {
        Self { pc, outcome, flags }
    }

    /// An event without any attribute flags.
    pub fn bare(pc: usize, outcome: Outcome) -> Self {
        Self::new(pc, outcome, BranchFlags::default())
    }

    pub fn is_taken(&self) -> bool {
        self.outcome.is_taken()
    }

    pub fn class(&self) -> BranchClass {
        self.flags.class()
    }
}
