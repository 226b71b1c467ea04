//! Envelope (bounding box) used by spatial filters.

use serde::{Deserialize, Serialize};

/// An axis-aligned envelope in the coordinate units of its reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    /// Create a new envelope from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build an envelope from four coordinate strings: minx, miny, maxx, maxy.
    pub fn from_parts(parts: &[&str]) -> Result<Self, EnvelopeParseError> {
        if parts.len() != 4 {
            return Err(EnvelopeParseError::WrongCoordinateCount(parts.len()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| EnvelopeParseError::InvalidNumber(part.to_string()))?;
        }

        let envelope = Self::new(values[0], values[1], values[2], values[3]);
        if envelope.min_x > envelope.max_x || envelope.min_y > envelope.max_y {
            return Err(EnvelopeParseError::InvertedCorners);
        }
        Ok(envelope)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeParseError {
    #[error("Expected 4 coordinates (minx,miny,maxx,maxy), got {0}")]
    WrongCoordinateCount(usize),

    #[error("Invalid number in envelope: {0}")]
    InvalidNumber(String),

    #[error("Lower corner exceeds upper corner")]
    InvertedCorners,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let env = Envelope::from_parts(&["0.0", "1.5", "60", "61.5"]).unwrap();
        assert_eq!(env.min_x, 0.0);
        assert_eq!(env.min_y, 1.5);
        assert_eq!(env.max_x, 60.0);
        assert_eq!(env.max_y, 61.5);
    }

    #[test]
    fn test_wrong_count() {
        let err = Envelope::from_parts(&["0", "0", "1"]).unwrap_err();
        assert_eq!(err, EnvelopeParseError::WrongCoordinateCount(3));
    }

    #[test]
    fn test_invalid_number() {
        assert!(matches!(
            Envelope::from_parts(&["0", "x", "1", "1"]),
            Err(EnvelopeParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_inverted() {
        assert_eq!(
            Envelope::from_parts(&["10", "10", "5", "5"]).unwrap_err(),
            EnvelopeParseError::InvertedCorners
        );
    }
}
