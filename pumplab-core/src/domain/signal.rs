//! Binary position signal.
//!
//! `Long` on day `i` means "hold a long position starting on day `i + 1`".
//! Serialized as `0` / `1` so chart payloads stay compact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Signal {
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn is_long(self) -> bool {
        matches!(self, Signal::Long)
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }
}

impl From<bool> for Signal {
    fn from(long: bool) -> Self {
        if long {
            Signal::Long
        } else {
            Signal::Flat
        }
    }
}

impl From<Signal> for u8 {
    fn from(signal: Signal) -> Self {
        signal.as_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signal must be 0 or 1, got {0}")]
pub struct InvalidSignal(pub u8);

impl TryFrom<u8> for Signal {
    type Error = InvalidSignal;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(InvalidSignal(other)),
        }
    }
}

/// Number of `Flat -> Long` or `Long -> Flat` switches in a series.
pub fn count_switches(signals: &[Signal]) -> usize {
    signals.windows(2).filter(|w| w[0] != w[1]).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Signal::Long).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Signal::Flat).unwrap(), "0");
        let parsed: Vec<Signal> = serde_json::from_str("[0,1,1,0]").unwrap();
        assert_eq!(
            parsed,
            vec![Signal::Flat, Signal::Long, Signal::Long, Signal::Flat]
        );
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(serde_json::from_str::<Signal>("2").is_err());
        assert_eq!(Signal::try_from(7), Err(InvalidSignal(7)));
    }

    #[test]
    fn switches_counted() {
        use Signal::*;
        assert_eq!(count_switches(&[Flat, Long, Long, Flat, Long]), 3);
        assert_eq!(count_switches(&[Flat; 4]), 0);
        assert_eq!(count_switches(&[]), 0);
    }
}
