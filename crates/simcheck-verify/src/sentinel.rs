//! Sentinel protocol: classify a run from a magic value in one register.

use simcheck_output::{RegisterId, RegisterSet};

use crate::Verdict;

/// Magic value-based PASS/FAIL classification.
///
/// The conformance environment writes `0x600d << 12` on success and
/// `0xbad << 16` on failure. With `strip_trailing_zeros` the raw value is
/// shifted right until its lowest hex nibble is non-zero, then the low
/// `mask_bits` bits are compared against the two sentinels. Bits above the
/// mask never influence the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelProtocol {
    /// Register holding the marker.
    pub register: RegisterId,
    /// Normalised marker meaning PASS.
    pub pass: u64,
    /// Normalised marker meaning FAIL.
    pub fail: u64,
    /// Width of the compared low bits (1-64).
    pub mask_bits: u32,
    /// Drop trailing zero hex nibbles before masking.
    pub strip_trailing_zeros: bool,
}

impl Default for SentinelProtocol {
    fn default() -> Self {
        Self {
            register: RegisterId::A1,
            pass: 0x600d,
            fail: 0x0bad,
            mask_bits: 16,
            strip_trailing_zeros: true,
        }
    }
}

impl SentinelProtocol {
    /// Set the marker register.
    #[must_use]
    pub const fn with_register(mut self, register: RegisterId) -> Self {
        self.register = register;
        self
    }

    /// Set the PASS and FAIL sentinels.
    #[must_use]
    pub const fn with_sentinels(mut self, pass: u64, fail: u64) -> Self {
        self.pass = pass;
        self.fail = fail;
        self
    }

    /// Set the compared bit width, clamped to 1-64.
    #[must_use]
    pub fn with_mask_bits(mut self, bits: u32) -> Self {
        self.mask_bits = bits.clamp(1, 64);
        self
    }

    /// Enable or disable trailing-zero normalisation.
    #[must_use]
    pub const fn with_strip_trailing_zeros(mut self, strip: bool) -> Self {
        self.strip_trailing_zeros = strip;
        self
    }

    /// Normalise a raw register value into the compared marker.
    pub const fn marker(&self, raw: u64) -> u64 {
        let mut value = raw;
        if self.strip_trailing_zeros && value != 0 {
            value >>= (value.trailing_zeros() / 4) * 4;
        }
        if self.mask_bits >= 64 {
            value
        } else {
            value & ((1u64 << self.mask_bits) - 1)
        }
    }

    /// Classify a run from its register dump.
    pub fn classify(&self, registers: &RegisterSet) -> Verdict {
        let dump_name = self.register.dump_name();
        let Some(raw) = registers.gpr(self.register) else {
            tracing::debug!(register = %dump_name, "no result marker in register dump");
            return Verdict::error(format!(
                "simulator produced no result marker in {dump_name} \
                 (likely crashed, trapped early, or unsupported binary format)"
            ));
        };

        let marker = self.marker(raw);
        if marker == self.marker(self.pass) {
            Verdict::pass(format!("pass marker in {dump_name} ({raw:#010x})"))
        } else if marker == self.marker(self.fail) {
            Verdict::fail(format!("fail marker in {dump_name} ({raw:#010x})"))
        } else {
            Verdict::error(format!(
                "unrecognized marker {raw:#010x} in {dump_name} \
                 (possible ISA mismatch or undefined behavior in test binary)"
            ))
        }
    }
}
