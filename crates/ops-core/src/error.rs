use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("invalid dimensionality: expected {expected} dimensions, got {actual}")]
    InvalidDimensionality { expected: usize, actual: usize },
    #[error("transform failure: {0}")]
    TransformFailure(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("out of bounds")]
    OutOfBounds,
    #[error("invalid stride")]
    InvalidStride,
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `Ok(())` when `actual == expected`, otherwise
    /// [`Error::InvalidDimensionality`].
    pub fn check_dims(expected: usize, actual: usize) -> Result<(), Error> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::InvalidDimensionality { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_messages() {
        let e = Error::InvalidDimensionality {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            e.to_string(),
            "invalid dimensionality: expected 2 dimensions, got 3"
        );
        assert_eq!(
            Error::TransformFailure("empty extent".into()).to_string(),
            "transform failure: empty extent"
        );
    }

    #[test]
    fn check_dims_reports_both_sides() {
        assert_eq!(Error::check_dims(2, 2), Ok(()));
        assert_eq!(
            Error::check_dims(2, 1),
            Err(Error::InvalidDimensionality {
                expected: 2,
                actual: 1
            })
        );
    }
}
