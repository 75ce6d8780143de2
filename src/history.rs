//! Fixed-width branch history registers.

use crate::branch::Outcome;

/// The widest history that fits in a register.
pub const MAX_HISTORY_BITS: usize = 64;

/// Return a mask covering the low `len` bits.
pub fn history_mask(len: usize) -> u64 {
    assert!(len <= MAX_HISTORY_BITS);
    if len == MAX_HISTORY_BITS { u64::MAX } else { (1u64 << len) - 1 }
}

/// Shift an outcome into some history value, keeping the low `len` bits.
#[inline(always)]
pub fn shift_history(history: u64, len: usize, outcome: Outcome) -> u64 {
    ((history << 1) | outcome.bit()) & history_mask(len)
}

/// A register recording the most recent `len` branch outcomes.
///
/// Bit 0 is the most recent outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryRegister {
    bits: u64,
    len: usize,
    mask: u64,
}

// NOTE: This presents the register with the most-significant (oldest) bit
// on the left and the most recent outcome on the right.
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = (0..self.len).rev()
            .map(|i| if self.bit(i) { '1' } else { '0' })
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        Self { bits: 0, len, mask: history_mask(len) }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn bits(&self) -> u64 { self.bits }

    /// Returns the value of bit 'i' (where bit 0 is the newest outcome).
    pub fn bit(&self, i: usize) -> bool {
        i < self.len && (self.bits >> i) & 1 != 0
    }

    /// Shift in a new outcome. The oldest outcome is discarded.
    #[inline(always)]
    pub fn push(&mut self, outcome: Outcome) {
        self.bits = ((self.bits << 1) | outcome.bit()) & self.mask;
    }

    /// Reset all bits to zero.
    pub fn clear(&mut self) { self.bits = 0; }
}


/// A table of per-branch history registers, all of the same length.
#[derive(Clone, Debug)]
pub struct LocalHistoryTable {
    data: Vec<u64>,
    len: usize,
}
impl LocalHistoryTable {
    /// Create a table with 'size' registers of 'len' bits each.
    pub fn new(size: usize, len: usize) -> Self {
        assert!(len <= MAX_HISTORY_BITS);
        Self { data: vec![0; size], len }
    }

    /// Number of registers in the table.
    pub fn size(&self) -> usize { self.data.len() }

    /// Length of each register in bits.
    pub fn history_len(&self) -> usize { self.len }

    pub fn read(&self, idx: usize) -> u64 { self.data[idx] }

    /// Store the history observed at 'idx' with a new outcome shifted in.
    ///
    /// The caller passes the value it read at prediction time so that the
    /// entry written is always derived from the entry that was read.
    pub fn write(&mut self, idx: usize, history: u64, outcome: Outcome) {
        self.data[idx] = shift_history(history, self.len, outcome);
    }

    pub fn as_slice(&self) -> &[u64] { &self.data }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::branch::Outcome::*;

    #[test]
    fn register_masks_to_length() {
        let mut ghr = HistoryRegister::new(4);
        for _ in 0..10 { ghr.push(T); }
        assert_eq!(ghr.bits(), 0b1111);
        ghr.push(N);
        assert_eq!(ghr.bits(), 0b1110);
        assert!(!ghr.bit(0));
        assert!(ghr.bit(3));
        assert!(!ghr.bit(4));
        assert_eq!(format!("{}", ghr), "1110");
    }

    #[test]
    fn zero_length_register_is_always_zero() {
        let mut ghr = HistoryRegister::new(0);
        ghr.push(T);
        ghr.push(T);
        assert_eq!(ghr.bits(), 0);
        assert!(ghr.is_empty());
        assert_eq!(format!("{}", ghr), "");
    }

    #[test]
    fn full_width_register() {
        let mut ghr = HistoryRegister::new(64);
        for _ in 0..64 { ghr.push(T); }
        assert_eq!(ghr.bits(), u64::MAX);
        ghr.push(N);
        assert_eq!(ghr.bits(), u64::MAX - 1);
        assert_eq!(shift_history(u64::MAX, 64, N), u64::MAX - 1);
    }

    #[test]
    fn local_history_table() {
        let mut lht = LocalHistoryTable::new(8, 3);
        let h = lht.read(5);
        lht.write(5, h, T);
        let h = lht.read(5);
        lht.write(5, h, N);
        let h = lht.read(5);
        lht.write(5, h, T);
        let h = lht.read(5);
        lht.write(5, h, T);
        assert_eq!(lht.read(5), 0b011);
        assert!(lht.as_slice().iter().enumerate().all(|(i, v)| i == 5 || *v == 0));
    }
}
