use derive_more::Display;

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Error {
    #[display("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[display("presentation is not a chain complex: M·N ≠ 0")]
    NotAChainComplex,

    #[display("vector is not a cycle")]
    NotACycle,

    #[display("vector is not a boundary")]
    NotABoundary,

    #[display("matrix does not send cycles to cycles")]
    NotACycleMap,

    #[display("homomorphism is not invertible")]
    NotInvertible,

    #[display("reduced matrix is not realizable by a chain map")]
    NotRealizable,

    #[display("groups are incompatible: {_0}")]
    IncompatibleGroups(String),

    #[display("not a torsion linking form: {_0}")]
    NotALinkingForm(String),
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn ensure_len(actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = Error::DimensionMismatch { expected: 3, actual: 2 };
        assert_eq!(e.to_string(), "dimension mismatch: expected 3, got 2");

        let e = Error::NotALinkingForm("range is not cyclic".into());
        assert_eq!(e.to_string(), "not a torsion linking form: range is not cyclic");
    }

    #[test]
    fn ensure() {
        assert_eq!(ensure_len(2, 2), Ok(()));
        assert_eq!(ensure_len(1, 2), Err(Error::DimensionMismatch { expected: 2, actual: 1 }));
    }
}
