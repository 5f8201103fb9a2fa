//! Errors
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error
#[derive(Debug, Error)]
pub enum Error {
    /// MPI could not be initialised
    #[error("MPI could not be initialised")]
    MpiInit,
    /// Neither a local nor a global size was given
    #[error("either a local or a global size must be given")]
    MissingSize,
    /// Local sizes do not add up to the requested global size
    #[error("local sizes add up to {local} but a global size of {global} was requested")]
    SizeMismatch {
        /// Sum of the local sizes
        local: usize,
        /// Requested global size
        global: usize,
    },
    /// A size is not a multiple of the block size
    #[error("size {size} is not a multiple of the block size {block_size}")]
    BlockSize {
        /// Size
        size: usize,
        /// Block size
        block_size: usize,
    },
    /// Global index outside of a vector
    #[error("index {index} is out of bounds for size {size}")]
    IndexOutOfBounds {
        /// Index
        index: usize,
        /// Size
        size: usize,
    },
    /// Index that must be owned by this rank is owned elsewhere
    #[error("index {index} is not owned by rank {rank}")]
    NonLocalIndex {
        /// Global index
        index: usize,
        /// Rank of this process
        rank: usize,
    },
    /// A rank outside of the communicator
    #[error("rank {rank} is not valid for a communicator of size {size}")]
    InvalidRank {
        /// Rank
        rank: usize,
        /// Communicator size
        size: usize,
    },
    /// Two lists that must have equal length do not
    #[error("length mismatch: {0} and {1}")]
    LengthMismatch(usize, usize),
    /// A redistribution plan broke one of its own invariants
    #[error("inconsistent redistribution plan: {0}")]
    InconsistentPlan(String),
    /// A collective operation failed on another rank
    #[error("operation failed on another rank")]
    RemoteFailure,
    /// Insert and add operations were mixed before assembly
    #[error("insert and add values cannot be mixed before assembly")]
    MixedInsertMode,
    /// Adding was requested for an element type that only supports inserting
    #[error("adding values is not supported for this element type")]
    AddUnsupported,
    /// Vector layouts do not match
    #[error("vector layouts do not match")]
    LayoutMismatch,
    /// Unknown particle field
    #[error("unknown field `{0}`")]
    MissingField(String),
    /// Error from a numerical routine
    #[error(transparent)]
    Numerical(#[from] NumericalError),
    /// A field could not be parsed as a number
    #[error("cannot parse `{field}` as a number")]
    Parse {
        /// The offending field
        field: String,
        /// Source
        #[source]
        source: std::num::ParseFloatError,
    },
    /// Wrong number of fields on a line
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Expected number of fields
        expected: usize,
        /// Number of fields found
        found: usize,
    },
    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// RON serialisation error
    #[cfg(feature = "serde")]
    #[error(transparent)]
    RonWrite(#[from] ron::Error),
    /// RON parse error
    #[cfg(feature = "serde")]
    #[error(transparent)]
    RonRead(#[from] ron::error::SpannedError),
}

/// Error codes of the numerical routines
///
/// The codes follow the errno table that numerical libraries in the GSL
/// tradition use, so that [NumericalError::code] values can be compared with
/// their documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NumericalError {
    /// Iteration has not converged
    #[error("iteration has not converged")]
    Continue,
    /// Failure
    #[error("failure")]
    Failure,
    /// Input domain error
    #[error("input domain error")]
    Domain,
    /// Output range error
    #[error("output range error")]
    Range,
    /// Invalid pointer
    #[error("invalid pointer")]
    Fault,
    /// Invalid argument supplied by user
    #[error("invalid argument supplied by user")]
    Invalid,
    /// Generic failure
    #[error("generic failure")]
    Failed,
    /// Factorization failed
    #[error("factorization failed")]
    Factor,
    /// Sanity check failed
    #[error("sanity check failed")]
    Sanity,
    /// Allocation failed
    #[error("allocation failed")]
    NoMem,
    /// Problem with user-supplied function
    #[error("problem with user-supplied function")]
    BadFunc,
    /// Iterative process is out of control
    #[error("iterative process is out of control")]
    Runaway,
    /// Exceeded max number of iterations
    #[error("exceeded max number of iterations")]
    MaxIter,
    /// Tried to divide by zero
    #[error("tried to divide by zero")]
    ZeroDiv,
    /// User specified an invalid tolerance
    #[error("user specified an invalid tolerance")]
    BadTol,
    /// Failed to reach the specified tolerance
    #[error("failed to reach the specified tolerance")]
    Tol,
    /// Underflow
    #[error("underflow")]
    Underflow,
    /// Overflow
    #[error("overflow")]
    Overflow,
    /// Loss of accuracy
    #[error("loss of accuracy")]
    Loss,
    /// Failed because of roundoff error
    #[error("failed because of roundoff error")]
    Round,
    /// Lengths are not conformant
    #[error("lengths are not conformant")]
    BadLen,
    /// Matrix not square
    #[error("matrix not square")]
    NotSquare,
    /// Apparent singularity detected
    #[error("apparent singularity detected")]
    Singular,
    /// Integral or series is divergent
    #[error("integral or series is divergent")]
    Diverge,
    /// Requested feature is not supported by the hardware
    #[error("requested feature is not supported by the hardware")]
    Unsupported,
    /// Requested feature not implemented
    #[error("requested feature not implemented")]
    Unimplemented,
    /// Cache limit exceeded
    #[error("cache limit exceeded")]
    Cache,
    /// Table limit exceeded
    #[error("table limit exceeded")]
    Table,
    /// Iteration is not making progress towards solution
    #[error("iteration is not making progress towards solution")]
    NoProgress,
    /// Jacobian evaluations are not improving the solution
    #[error("jacobian evaluations are not improving the solution")]
    NoProgressJacobian,
    /// Cannot reach the specified tolerance in F
    #[error("cannot reach the specified tolerance in F")]
    TolF,
    /// Cannot reach the specified tolerance in X
    #[error("cannot reach the specified tolerance in X")]
    TolX,
    /// Cannot reach the specified tolerance in gradient
    #[error("cannot reach the specified tolerance in gradient")]
    TolG,
    /// End of file
    #[error("end of file")]
    Eof,
}

const CODES: [NumericalError; 34] = [
    NumericalError::Continue,
    NumericalError::Failure,
    NumericalError::Domain,
    NumericalError::Range,
    NumericalError::Fault,
    NumericalError::Invalid,
    NumericalError::Failed,
    NumericalError::Factor,
    NumericalError::Sanity,
    NumericalError::NoMem,
    NumericalError::BadFunc,
    NumericalError::Runaway,
    NumericalError::MaxIter,
    NumericalError::ZeroDiv,
    NumericalError::BadTol,
    NumericalError::Tol,
    NumericalError::Underflow,
    NumericalError::Overflow,
    NumericalError::Loss,
    NumericalError::Round,
    NumericalError::BadLen,
    NumericalError::NotSquare,
    NumericalError::Singular,
    NumericalError::Diverge,
    NumericalError::Unsupported,
    NumericalError::Unimplemented,
    NumericalError::Cache,
    NumericalError::Table,
    NumericalError::NoProgress,
    NumericalError::NoProgressJacobian,
    NumericalError::TolF,
    NumericalError::TolX,
    NumericalError::TolG,
    NumericalError::Eof,
];

impl NumericalError {
    /// The numeric error code
    ///
    /// Zero is reserved for success and never returned.
    pub fn code(&self) -> i32 {
        match self {
            Self::Continue => -2,
            Self::Failure => -1,
            e => CODES.iter().position(|c| c == e).map_or(-1, |p| p as i32 - 1),
        }
    }

    /// The error for a numeric code, if there is one
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -2 => Some(Self::Continue),
            -1 => Some(Self::Failure),
            c if c > 0 => CODES.get(c as usize + 1).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(NumericalError::Continue.code(), -2);
        assert_eq!(NumericalError::Failure.code(), -1);
        assert_eq!(NumericalError::Domain.code(), 1);
        assert_eq!(NumericalError::MaxIter.code(), 11);
        assert_eq!(NumericalError::BadTol.code(), 13);
        assert_eq!(NumericalError::Round.code(), 18);
        assert_eq!(NumericalError::BadLen.code(), 19);
        assert_eq!(NumericalError::Eof.code(), 32);
    }

    #[test]
    fn test_from_code() {
        for e in CODES {
            assert_eq!(NumericalError::from_code(e.code()), Some(e));
        }
        assert_eq!(NumericalError::from_code(0), None);
        assert_eq!(NumericalError::from_code(33), None);
        assert_eq!(NumericalError::from_code(-3), None);
    }

    #[test]
    fn test_messages() {
        let e: Error = NumericalError::Domain.into();
        assert_eq!(e.to_string(), "input domain error");
        assert_eq!(
            Error::FieldCount {
                expected: 3,
                found: 2
            }
            .to_string(),
            "expected 3 fields, found 2"
        );
    }
}
