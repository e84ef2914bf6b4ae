//! Facilities for saving and restoring mapper state as a byte stream.
//!
//! A save state is a header followed by a [`FieldSet`]: an ordered list of
//! named, typed fields.  Fields are matched up by name when restoring, so a
//! stream written by a newer revision of a mapper (with extra fields, or
//! fields of unknown types) can still be read by an older one.

mod binary;
mod error;
mod field;

pub use binary::BinaryIo;
pub use error::StateError;
pub use field::{FieldSet, FieldValue};

use std::io;

//===========================================================================//

/// The magic number at the start of every save state stream.
pub const STATE_MAGIC: &[u8; 4] = b"CBST";

/// The stream format version written by this library.
pub const STATE_VERSION: u8 = 1;

//===========================================================================//

/// A decoded save state: the name of the mapper it was taken from, plus the
/// fields describing that mapper's state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaveState {
    /// The stream format version the state was written with.
    pub version: u8,
    /// The name of the mapper the state was taken from.
    pub mapper: String,
    /// The saved fields, in the order they were written.
    pub fields: FieldSet,
}

impl SaveState {
    /// Returns a new save state for the named mapper, using the current
    /// stream format version.
    pub fn new(mapper: &str, fields: FieldSet) -> SaveState {
        SaveState { version: STATE_VERSION, mapper: mapper.to_string(), fields }
    }

    /// Writes this save state to a stream.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(STATE_MAGIC)?;
        self.version.write_to(writer)?;
        self.mapper.write_to(writer)?;
        self.fields.write_to(writer)
    }

    /// Reads a complete save state from a stream.  Nothing is applied
    /// anywhere; a stream that is truncated or malformed anywhere fails as a
    /// whole.
    pub fn read_from<R: io::BufRead>(
        reader: &mut R,
    ) -> Result<SaveState, StateError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != STATE_MAGIC {
            return Err(StateError::BadMagic);
        }
        let version = u8::read_from(reader)?;
        if version > STATE_VERSION {
            log::warn!(
                "reading save state version {version} with a version \
                 {STATE_VERSION} reader"
            );
        }
        let mapper = String::read_from(reader)?;
        let fields = FieldSet::read_from(reader)?;
        Ok(SaveState { version, mapper, fields })
    }

    /// Returns the fields of this state, after checking that it was taken
    /// from the named mapper.
    pub fn fields_for(&self, mapper: &str) -> Result<&FieldSet, StateError> {
        if self.mapper != mapper {
            return Err(StateError::MapperMismatch {
                expected: mapper.to_string(),
                found: self.mapper.clone(),
            });
        }
        Ok(&self.fields)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{FieldSet, STATE_MAGIC, SaveState, StateError};
    use std::io;

    fn make_state() -> SaveState {
        let mut fields = FieldSet::new();
        fields.push_u8("prg_reg", 0x05);
        SaveState::new("LH32", fields)
    }

    #[test]
    fn header_layout() {
        let mut data: Vec<u8> = Vec::new();
        make_state().write_to(&mut data).unwrap();
        assert_eq!(&data[..4], STATE_MAGIC);
        assert_eq!(data[4], 1);
        assert_eq!(&data[5..10], b"\x04LH32");
    }

    #[test]
    fn round_trip() {
        let state = make_state();
        let mut data: Vec<u8> = Vec::new();
        state.write_to(&mut data).unwrap();
        assert_eq!(SaveState::read_from(&mut data.as_slice()).unwrap(), state);
    }

    #[test]
    fn every_truncation_fails() {
        let mut data: Vec<u8> = Vec::new();
        make_state().write_to(&mut data).unwrap();
        for len in 0..data.len() {
            let result = SaveState::read_from(&mut &data[..len]);
            assert!(
                matches!(result, Err(StateError::Io(ref error))
                         if error.kind() == io::ErrorKind::UnexpectedEof),
                "truncated to {len} bytes: {result:?}"
            );
        }
    }

    #[test]
    fn bad_magic() {
        let data = b"NES\x1a\x01\x00\x00";
        assert!(matches!(
            SaveState::read_from(&mut &data[..]),
            Err(StateError::BadMagic)
        ));
    }

    #[test]
    fn newer_versions_are_readable() {
        let mut state = make_state();
        state.version = 7;
        state.fields.push_bytes("added_later", &[1, 2, 3, 4]);
        let mut data: Vec<u8> = Vec::new();
        state.write_to(&mut data).unwrap();
        let parsed = SaveState::read_from(&mut data.as_slice()).unwrap();
        assert_eq!(parsed.version, 7);
        let fields = parsed.fields_for("LH32").unwrap();
        assert_eq!(fields.get_u8("prg_reg").unwrap(), 0x05);
    }

    #[test]
    fn mapper_mismatch() {
        let state = make_state();
        assert!(matches!(
            state.fields_for("MMC3"),
            Err(StateError::MapperMismatch { .. })
        ));
    }
}

//===========================================================================//
