//! Sources of branch events.
//!
//! A [Trace] is a finite, ordered list of [BranchEvent] which can be
//! replayed any number of times. Traces are read from files in one of two
//! formats:
//!
//! - Text: one event per line, `<pc> <taken> [flags]`. The program counter
//!   is hexadecimal when prefixed with `0x` and decimal otherwise. The
//!   outcome is one of `1`/`0`/`T`/`N`. Flags are hexadecimal. Blank lines
//!   and lines beginning with `#` are ignored.
//! - Binary (`.bin`): 16-byte little-endian records of
//!   `{ pc: u64, flags: u32, taken: u32 }`.

pub mod synthetic;
pub use synthetic::*;

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::branch::*;
use crate::error::{ Error, Result };

/// Size of a record in a binary trace.
pub const BINARY_RECORD_SIZE: usize = 16;

/// A list of branch events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    name: String,
    data: Vec<BranchEvent>,
}
impl Trace {
    pub fn new(name: impl ToString, data: Vec<BranchEvent>) -> Self {
        Self { name: name.to_string(), data }
    }

    /// Read a trace from a file. Files with the extension `.bin` are read as
    /// binary traces, and everything else is read as text.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = fs::read(path)?;
        let shown = path.display().to_string();
        let data = if path.extension().is_some_and(|e| e == "bin") {
            parse_binary(&bytes, &shown)?
        } else {
            parse_text(&String::from_utf8_lossy(&bytes), &shown)?
        };
        debug!(path = %shown, entries = data.len(), "loaded trace");
        Ok(Self { name, data })
    }

    pub fn name(&self) -> &str { &self.name }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.data.len() }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchEvent] { &self.data }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[BranchEvent] {
        &self.data[..limit.min(self.data.len())]
    }

    /// Iterate over the events in program order.
    pub fn iter(&self) -> impl Iterator<Item = BranchEvent> + '_ {
        self.data.iter().copied()
    }

    /// Write this trace in the text format.
    pub fn write_text(&self, mut w: impl Write) -> Result<()> {
        for e in self.data.iter() {
            let t = if e.is_taken() { 1 } else { 0 };
            writeln!(w, "{:#x} {} {:#04x}", e.pc, t, e.flags.bits())?;
        }
        Ok(())
    }

    /// Write this trace in the binary format.
    pub fn write_binary(&self, mut w: impl Write) -> Result<()> {
        for e in self.data.iter() {
            let mut rec = [0u8; BINARY_RECORD_SIZE];
            rec[0..8].copy_from_slice(&(e.pc as u64).to_le_bytes());
            rec[8..12].copy_from_slice(&e.flags.bits().to_le_bytes());
            rec[12..16].copy_from_slice(&(e.outcome as u32).to_le_bytes());
            w.write_all(&rec)?;
        }
        Ok(())
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a single number, hexadecimal when prefixed with `0x`.
fn parse_num(s: &str) -> Option<u64> {
    if let Some(hex) = strip_hex_prefix(s) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn parse_outcome(s: &str) -> Option<Outcome> {
    match s {
        "1" | "T" | "t" => Some(Outcome::T),
        "0" | "N" | "n" => Some(Outcome::N),
        _ => None,
    }
}

/// Parse a trace in the text format. 'path' is only used to report errors.
pub fn parse_text(text: &str, path: &str) -> Result<Vec<BranchEvent>> {
    let mut res = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |msg: &str| Error::TraceParse {
            path: path.to_string(),
            line: lineno + 1,
            msg: msg.to_string(),
        };

        let mut fields = line.split_whitespace();
        let pc = fields.next().and_then(parse_num)
            .ok_or_else(|| err("invalid program counter"))?;
        let outcome = fields.next().and_then(parse_outcome)
            .ok_or_else(|| err("invalid outcome (expected 0, 1, N, or T)"))?;
        let flags = match fields.next() {
            None => BranchFlags::default(),
            Some(f) => {
                let f = strip_hex_prefix(f).unwrap_or(f);
                let bits = u32::from_str_radix(f, 16)
                    .map_err(|_| err("invalid flags"))?;
                BranchFlags::new(bits)
            },
        };
        if fields.next().is_some() {
            return Err(err("unexpected trailing fields"));
        }
        res.push(BranchEvent::new(pc as usize, outcome, flags));
    }
    Ok(res)
}

/// Parse a trace in the binary format. 'path' is only used to report errors.
pub fn parse_binary(bytes: &[u8], path: &str) -> Result<Vec<BranchEvent>> {
    if bytes.len() % BINARY_RECORD_SIZE != 0 {
        return Err(Error::TraceLength {
            path: path.to_string(),
            len: bytes.len(),
            record: BINARY_RECORD_SIZE,
        });
    }
    let res = bytes.chunks_exact(BINARY_RECORD_SIZE).map(|rec| {
        let mut pc = [0u8; 8];
        let mut flags = [0u8; 4];
        let mut taken = [0u8; 4];
        pc.copy_from_slice(&rec[0..8]);
        flags.copy_from_slice(&rec[8..12]);
        taken.copy_from_slice(&rec[12..16]);
        BranchEvent::new(
            u64::from_le_bytes(pc) as usize,
            Outcome::from(u32::from_le_bytes(taken) != 0),
            BranchFlags::new(u32::from_le_bytes(flags)),
        )
    }).collect();
    Ok(res)
}
