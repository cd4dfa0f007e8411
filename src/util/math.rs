//! Numeric helpers for threshold and index validation.

use crate::util::{DecodeError, DecodeResult};

/// Checks that a threshold lies in the open interval (0, 1).
pub(crate) fn check_open_unit(name: &'static str, value: f32) -> DecodeResult<f32> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(DecodeError::InvalidThreshold { name, value })
    }
}

/// Checks that a threshold lies in [0, 1).
///
/// Zero is admitted here so that any positive overlap suppresses.
pub(crate) fn check_half_open_unit(name: &'static str, value: f32) -> DecodeResult<f32> {
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DecodeError::InvalidThreshold { name, value })
    }
}

/// Converts a signed tensor index into `usize` if it addresses `0..len`.
pub(crate) fn index_in(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&idx| idx < len)
}

#[cfg(test)]
mod tests {
    use super::{check_half_open_unit, check_open_unit, index_in};

    #[test]
    fn open_unit_rejects_bounds_and_nan() {
        assert!(check_open_unit("t", 0.5).is_ok());
        assert!(check_open_unit("t", 0.0).is_err());
        assert!(check_open_unit("t", 1.0).is_err());
        assert!(check_open_unit("t", f32::NAN).is_err());
    }

    #[test]
    fn half_open_unit_admits_zero() {
        assert!(check_half_open_unit("t", 0.0).is_ok());
        assert!(check_half_open_unit("t", 1.0).is_err());
        assert!(check_half_open_unit("t", -0.1).is_err());
        assert!(check_half_open_unit("t", f32::NAN).is_err());
    }

    #[test]
    fn index_in_rejects_negative_and_overflow() {
        assert_eq!(index_in(3, 4), Some(3));
        assert_eq!(index_in(4, 4), None);
        assert_eq!(index_in(-1, 4), None);
    }
}
