//! Register dump parsing and register-name aliasing.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// ABI mnemonics indexed by register number.
pub const REG_ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Register identifier parse errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterParseError {
    #[error("unknown register name '{0}'")]
    Unknown(String),
    #[error("register index {0} out of range (0-31)")]
    OutOfRange(u32),
}

/// A general-purpose register, identified by its index.
///
/// Every spelling the harness accepts resolves to the same identifier:
/// `a0`, `x10`, `R10` and `10` are all register 10, `fp` and `s0` are both
/// register 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterId(u8);

impl RegisterId {
    /// Number of general-purpose registers.
    pub const COUNT: usize = 32;

    /// Return value register `a0`.
    pub const A0: Self = Self(10);

    /// Second argument register `a1`.
    pub const A1: Self = Self(11);

    /// Create from an index, `None` if out of range.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Register index.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// ABI mnemonic (`a0`, `sp`, ...).
    pub const fn abi_name(self) -> &'static str {
        REG_ABI_NAMES[self.0 as usize]
    }

    /// Name used in the simulator's register dump (`R10`).
    pub fn dump_name(self) -> String {
        format!("R{}", self.0)
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl FromStr for RegisterId {
    type Err = RegisterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "fp" {
            return Ok(Self(8));
        }
        if let Some((index, _)) = (0u8..).zip(REG_ABI_NAMES).find(|&(_, name)| name == s) {
            return Ok(Self(index));
        }

        let digits = s.strip_prefix(['x', 'X', 'r', 'R']).unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RegisterParseError::Unknown(s.to_string()));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| RegisterParseError::Unknown(s.to_string()))?;
        u8::try_from(index)
            .ok()
            .and_then(Self::new)
            .ok_or(RegisterParseError::OutOfRange(index))
    }
}

/// Register state reported by one simulator run.
///
/// Keeps every dumped name as written, plus an alias table for the 32
/// general-purpose registers so that any spelling of a GPR resolves to the
/// value written last under any of its names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterSet {
    named: FxHashMap<String, u64>,
    gpr: [Option<u64>; RegisterId::COUNT],
}

impl RegisterSet {
    /// Create an empty register set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a register dump. Same as [`parse_registers`].
    pub fn parse(text: &str) -> Self {
        parse_registers(text)
    }

    fn insert(&mut self, name: &str, value: u64) {
        if let Ok(id) = name.parse::<RegisterId>() {
            self.gpr[id.index() as usize] = Some(value);
        }
        self.named.insert(name.to_string(), value);
    }

    /// Look up a register by any accepted spelling.
    ///
    /// GPR spellings go through the alias table; anything else (`PC`, CSR
    /// names) must match a dumped name exactly.
    pub fn get(&self, name: &str) -> Option<u64> {
        match name.parse::<RegisterId>() {
            Ok(id) => self.gpr(id),
            Err(_) => self.named.get(name).copied(),
        }
    }

    /// Value of a general-purpose register.
    pub fn gpr(&self, id: RegisterId) -> Option<u64> {
        self.gpr[id.index() as usize]
    }

    /// Number of distinct names seen in the dump.
    pub fn len(&self) -> usize {
        self.named.len()
    }

    /// Whether the dump contained no register tokens.
    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }

    /// Dumped names, sorted for stable diagnostics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for RegisterSet {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name.as_ref(), value);
        }
        set
    }
}

/// Extract every `<name>:0x<hex>` token from the text.
///
/// Later tokens overwrite earlier ones. Values that do not fit in 64 bits
/// are skipped.
pub fn parse_registers(text: &str) -> RegisterSet {
    let pattern = REG_PATTERN
        .get_or_init(|| Regex::new(r"([A-Za-z0-9_]+):0x([0-9a-fA-F]+)").unwrap());

    let mut set = RegisterSet::new();
    for caps in pattern.captures_iter(text) {
        let (Some(name), Some(hex)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Ok(value) = u64::from_str_radix(hex.as_str(), 16) {
            set.insert(name.as_str(), value);
        }
    }
    set
}

static REG_PATTERN: OnceLock<Regex> = OnceLock::new();
