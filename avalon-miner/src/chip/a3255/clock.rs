//! Hash clock PLL configuration.
//!
//! The hash unit clock is `XCLKIN * (F+1) / ((R+1) * 2^OD)` for input
//! divider R, feedback divider F and output divider OD. The datasheet
//! bounds each stage; a configuration outside those bounds can leave the
//! chip hashing at garbage rates with no error indication, so every
//! parameter set is validated before a clock word is ever produced.

use thiserror::Error;

/// External reference clock feeding the PLL, in MHz.
pub const XCLKIN_MHZ: f64 = 25.0;

// Control flags in the clock configuration word.
const FLAG_RESERVED_ONE: u32 = 1 << 0; // reserved, must be 1
const FLAG_CONFIG_EFFECTIVE: u32 = 1 << 1; // apply the configuration in this transaction
const FLAG_FREQ_CHANGE: u32 = 1 << 2; // divider values changed
const FLAG_DIV2: u32 = 1 << 4; // divide the working clock by 2
// Bit 3 gates the hash clock, bit 5 switches to raw XCLKIN and bit 6
// disables the clock-out pad; all stay clear in normal operation.

const R_SHIFT: u32 = 16; // bits 20:16
const F_SHIFT: u32 = 21; // bits 27:21
const OD_SHIFT: u32 = 28; // bits 29:28

const R_MAX: u8 = 0x1f;
const F_MAX: u8 = 0x7f;
const OD_MAX: u8 = 0x03;

/// Packed clock configuration word, ready for transmission. Only
/// obtainable through [`ClockParams::clock_word`], so holding one implies
/// the dividers were valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockWord(u32);

impl ClockWord {
    pub fn bits(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("divider fields overflow: R={r} F={f} OD={od}")]
    FieldOverflow { r: u8, f: u8, od: u8 },

    #[error("PLL reference {mhz} MHz outside 10-50 MHz (R={r})")]
    ReferenceOutOfRange { r: u8, mhz: f64 },

    #[error("output clock {mhz} MHz outside 62.5-1000 MHz")]
    OutputOutOfRange { mhz: f64 },

    #[error("PLL feedback clock {mhz} MHz outside 500-1000 MHz")]
    FeedbackOutOfRange { mhz: f64 },
}

/// PLL divider settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockParams {
    /// Input divider R, bits 20:16 of the clock word.
    pub input_div: u8,
    /// Feedback divider F, bits 27:21.
    pub feedback_div: u8,
    /// Output divider OD, bits 29:28; divides by `2^OD`.
    pub output_div: u8,
}

impl Default for ClockParams {
    /// 250 MHz operating point: a 500 MHz PLL halved by the output stage.
    fn default() -> Self {
        Self {
            input_div: 0,
            feedback_div: 19,
            output_div: 1,
        }
    }
}

impl ClockParams {
    /// Working clock frequency these dividers produce, in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        XCLKIN_MHZ * (self.feedback_div as f64 + 1.0)
            / ((self.input_div as f64 + 1.0) * f64::from(1u32 << self.output_div.min(OD_MAX)))
    }

    /// Check the dividers against the datasheet limits for each PLL
    /// stage: reference `XCLKIN/(R+1)` in 10..=50 MHz, feedback
    /// `XCLKIN*(F+1)/(R+1)` in 500..=1000 MHz, output in 62.5..=1000 MHz.
    pub fn validate(&self) -> Result<(), ClockError> {
        let (r, f, od) = (self.input_div, self.feedback_div, self.output_div);
        if r > R_MAX || f > F_MAX || od > OD_MAX {
            return Err(ClockError::FieldOverflow { r, f, od });
        }

        let reference = XCLKIN_MHZ / (r as f64 + 1.0);
        if !(10.0..=50.0).contains(&reference) {
            return Err(ClockError::ReferenceOutOfRange { r, mhz: reference });
        }

        let output = self.frequency_mhz();
        if !(62.5..=1000.0).contains(&output) {
            return Err(ClockError::OutputOutOfRange { mhz: output });
        }

        let feedback = XCLKIN_MHZ * (f as f64 + 1.0) / (r as f64 + 1.0);
        if !(500.0..=1000.0).contains(&feedback) {
            return Err(ClockError::FeedbackOutOfRange { mhz: feedback });
        }

        Ok(())
    }

    /// Validate and pack the clock configuration word.
    pub fn clock_word(&self) -> Result<ClockWord, ClockError> {
        self.validate()?;
        Ok(ClockWord(
            FLAG_RESERVED_ONE
                | FLAG_CONFIG_EFFECTIVE
                | FLAG_FREQ_CHANGE
                | FLAG_DIV2
                | (self.input_div as u32) << R_SHIFT
                | (self.feedback_div as u32) << F_SHIFT
                | (self.output_div as u32) << OD_SHIFT,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_point_packs_documented_pattern() {
        let word = ClockParams::default().clock_word().unwrap().bits();

        // Flags 0, 1, 2 and 4 set; 3, 5, 6, 7 clear.
        assert_eq!(word & 0xff, 0b0001_0111);
        // R=0, F=19, OD=1 at their field offsets.
        assert_eq!((word >> 16) & 0x1f, 0);
        assert_eq!((word >> 21) & 0x7f, 19);
        assert_eq!((word >> 28) & 0x3, 1);
        assert_eq!(word, 0x1260_0017);
    }

    #[test]
    fn default_point_runs_at_250_mhz() {
        let params = ClockParams::default();
        assert!((params.frequency_mhz() - 250.0).abs() < f64::EPSILON);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn reference_stage_bound_is_enforced() {
        // 25/(2+1) = 8.33 MHz, below the 10 MHz floor.
        let params = ClockParams {
            input_div: 2,
            ..Default::default()
        };
        assert!(matches!(
            params.clock_word(),
            Err(ClockError::ReferenceOutOfRange { r: 2, .. })
        ));
    }

    #[test]
    fn feedback_stage_bound_is_enforced() {
        // 25*11 = 275 MHz, below the 500 MHz floor (output stage is fine).
        let params = ClockParams {
            input_div: 0,
            feedback_div: 10,
            output_div: 0,
        };
        assert!(matches!(
            params.clock_word(),
            Err(ClockError::FeedbackOutOfRange { .. })
        ));
    }

    #[test]
    fn output_stage_bound_is_enforced() {
        // 25*51 = 1275 MHz straight through the output stage.
        let params = ClockParams {
            input_div: 0,
            feedback_div: 50,
            output_div: 0,
        };
        assert!(matches!(
            params.clock_word(),
            Err(ClockError::OutputOutOfRange { .. })
        ));
    }

    #[test]
    fn oversized_divider_fields_are_rejected() {
        let params = ClockParams {
            input_div: 32,
            ..Default::default()
        };
        assert!(matches!(
            params.clock_word(),
            Err(ClockError::FieldOverflow { .. })
        ));
    }
}
