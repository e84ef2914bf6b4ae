use super::{BinaryIo, StateError};
use std::io;

//===========================================================================//

const TAG_U8: u8 = 0;
const TAG_U16: u8 = 1;
const TAG_U32: u8 = 2;
const TAG_BOOL: u8 = 3;
const TAG_BYTES: u8 = 4;

//===========================================================================//

/// The value of one named field in a save state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    /// An 8-bit register.
    U8(u8),
    /// A 16-bit register.
    U16(u16),
    /// A 32-bit register.
    U32(u32),
    /// A flag.
    Bool(bool),
    /// A block of bytes, such as a RAM image or a register file.
    Bytes(Vec<u8>),
    /// A field of a type this version doesn't know about.  Its payload is
    /// kept as-is so that the field can be skipped.
    Unknown {
        /// The type tag recorded in the stream.
        tag: u8,
        /// The raw payload.
        payload: Vec<u8>,
    },
}

impl FieldValue {
    fn tag(&self) -> u8 {
        match self {
            FieldValue::U8(_) => TAG_U8,
            FieldValue::U16(_) => TAG_U16,
            FieldValue::U32(_) => TAG_U32,
            FieldValue::Bool(_) => TAG_BOOL,
            FieldValue::Bytes(_) => TAG_BYTES,
            FieldValue::Unknown { tag, .. } => *tag,
        }
    }

    fn payload(&self) -> io::Result<Vec<u8>> {
        let mut payload = Vec::new();
        match self {
            FieldValue::U8(value) => value.write_to(&mut payload)?,
            FieldValue::U16(value) => value.write_to(&mut payload)?,
            FieldValue::U32(value) => value.write_to(&mut payload)?,
            FieldValue::Bool(value) => value.write_to(&mut payload)?,
            FieldValue::Bytes(bytes) => payload.extend_from_slice(bytes),
            FieldValue::Unknown { payload: raw, .. } => {
                payload.extend_from_slice(raw)
            }
        }
        Ok(payload)
    }

    fn decode(tag: u8, payload: Vec<u8>) -> io::Result<FieldValue> {
        fn exact<T: BinaryIo>(payload: &[u8]) -> io::Result<T> {
            let mut reader = payload;
            let value = T::read_from(&mut reader)?;
            if !reader.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "trailing bytes in field payload",
                ));
            }
            Ok(value)
        }
        Ok(match tag {
            TAG_U8 => FieldValue::U8(exact(&payload)?),
            TAG_U16 => FieldValue::U16(exact(&payload)?),
            TAG_U32 => FieldValue::U32(exact(&payload)?),
            TAG_BOOL => FieldValue::Bool(exact(&payload)?),
            TAG_BYTES => FieldValue::Bytes(payload),
            _ => FieldValue::Unknown { tag, payload },
        })
    }
}

//===========================================================================//

/// An ordered list of named, typed fields.
///
/// Fields are written in the order they were added, and looked up by name
/// when read back, so a reader can skip over fields added by newer
/// versions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldSet {
    fields: Vec<(String, FieldValue)>,
}

impl FieldSet {
    /// Returns an empty field set.
    pub fn new() -> FieldSet {
        FieldSet { fields: Vec::new() }
    }

    /// Appends a field.  If a field of the same name already exists, it is
    /// replaced in place.
    pub fn push(&mut self, name: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Appends an 8-bit field.
    pub fn push_u8(&mut self, name: &str, value: u8) {
        self.push(name, FieldValue::U8(value));
    }

    /// Appends a 16-bit field.
    pub fn push_u16(&mut self, name: &str, value: u16) {
        self.push(name, FieldValue::U16(value));
    }

    /// Appends a 32-bit field.
    pub fn push_u32(&mut self, name: &str, value: u32) {
        self.push(name, FieldValue::U32(value));
    }

    /// Appends a boolean field.
    pub fn push_bool(&mut self, name: &str, value: bool) {
        self.push(name, FieldValue::Bool(value));
    }

    /// Appends a byte-block field.
    pub fn push_bytes(&mut self, name: &str, value: &[u8]) {
        self.push(name, FieldValue::Bytes(value.to_vec()));
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over the fields, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the field with the given name, if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    fn require(&self, name: &str) -> Result<&FieldValue, StateError> {
        self.get(name)
            .ok_or_else(|| StateError::MissingField { name: name.to_string() })
    }

    fn wrong_type(name: &str) -> StateError {
        StateError::WrongType { name: name.to_string() }
    }

    /// Returns the value of a required 8-bit field.
    pub fn get_u8(&self, name: &str) -> Result<u8, StateError> {
        match self.require(name)? {
            FieldValue::U8(value) => Ok(*value),
            _ => Err(FieldSet::wrong_type(name)),
        }
    }

    /// Returns the value of a required 16-bit field.
    pub fn get_u16(&self, name: &str) -> Result<u16, StateError> {
        match self.require(name)? {
            FieldValue::U16(value) => Ok(*value),
            _ => Err(FieldSet::wrong_type(name)),
        }
    }

    /// Returns the value of a required 32-bit field.
    pub fn get_u32(&self, name: &str) -> Result<u32, StateError> {
        match self.require(name)? {
            FieldValue::U32(value) => Ok(*value),
            _ => Err(FieldSet::wrong_type(name)),
        }
    }

    /// Returns the value of a required boolean field.
    pub fn get_bool(&self, name: &str) -> Result<bool, StateError> {
        match self.require(name)? {
            FieldValue::Bool(value) => Ok(*value),
            _ => Err(FieldSet::wrong_type(name)),
        }
    }

    /// Returns the contents of a required byte-block field.
    pub fn get_bytes(&self, name: &str) -> Result<&[u8], StateError> {
        match self.require(name)? {
            FieldValue::Bytes(bytes) => Ok(bytes),
            _ => Err(FieldSet::wrong_type(name)),
        }
    }

    /// Returns the contents of a required byte-block field, which must be
    /// exactly `N` bytes long.
    pub fn get_array<const N: usize>(
        &self,
        name: &str,
    ) -> Result<[u8; N], StateError> {
        <[u8; N]>::try_from(self.get_bytes(name)?)
            .map_err(|_| StateError::InvalidValue { name: name.to_string() })
    }
}

impl BinaryIo for FieldSet {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<FieldSet> {
        let count = usize::read_from(reader)?;
        let mut fields = FieldSet::new();
        for _ in 0..count {
            let name = String::read_from(reader)?;
            let tag = u8::read_from(reader)?;
            let payload = Vec::<u8>::read_from(reader)?;
            fields.push(&name, FieldValue::decode(tag, payload)?);
        }
        Ok(fields)
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.fields.len().write_to(writer)?;
        for (name, value) in self.fields.iter() {
            name.write_to(writer)?;
            value.tag().write_to(writer)?;
            value.payload()?.write_to(writer)?;
        }
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
