use std::fmt;
use std::io;

//===========================================================================//

/// An error encountered while restoring a save state.  When a restore fails
/// with any of these errors, the state being restored into is left exactly
/// as it was.
#[derive(Debug)]
pub enum StateError {
    /// The stream could not be read, or ended early.
    Io(io::Error),
    /// The stream does not start with the save state magic number.
    BadMagic,
    /// The stream was saved from a different mapper.
    MapperMismatch {
        /// The name of the mapper being restored into.
        expected: String,
        /// The name of the mapper recorded in the stream.
        found: String,
    },
    /// A required field is absent from the stream.
    MissingField {
        /// The name of the missing field.
        name: String,
    },
    /// A field is present, but holds a different type than expected.
    WrongType {
        /// The name of the mistyped field.
        name: String,
    },
    /// A field holds a value that can't be applied (for example, a RAM image
    /// whose size doesn't match the cartridge).
    InvalidValue {
        /// The name of the invalid field.
        name: String,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            StateError::Io(error) => {
                write!(f, "unreadable save state: {error}")
            }
            StateError::BadMagic => f.write_str("not a save state"),
            StateError::MapperMismatch { expected, found } => write!(
                f,
                "save state is for mapper {found}, but cartridge uses \
                 {expected}"
            ),
            StateError::MissingField { name } => {
                write!(f, "save state is missing field {name:?}")
            }
            StateError::WrongType { name } => {
                write!(f, "save state field {name:?} has the wrong type")
            }
            StateError::InvalidValue { name } => {
                write!(f, "save state field {name:?} has an invalid value")
            }
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for StateError {
    fn from(error: io::Error) -> StateError {
        StateError::Io(error)
    }
}

//===========================================================================//
