use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::io::{self, Read};

//===========================================================================//

/// A trait for types that can be stored in a save state stream.
pub trait BinaryIo: Sized {
    /// Reads a value of this type from the stream.
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self>;

    /// Writes this value into the stream.
    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()>;
}

impl BinaryIo for bool {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        match u8::read_from(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected bool, found {byte}"),
            )),
        }
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        (*self as u8).write_to(writer)
    }
}

impl BinaryIo for u8 {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        reader.read_u8()
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(*self)
    }
}

impl BinaryIo for u16 {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        reader.read_u16::<LittleEndian>()
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(*self)
    }
}

impl BinaryIo for u32 {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        reader.read_u32::<LittleEndian>()
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(*self)
    }
}

/// Lengths and counts are stored as variable-length integers: seven bits
/// per byte, least significant group first, with the high bit set on every
/// byte but the last.
impl BinaryIo for usize {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        let mut digits: Vec<u8> = Vec::new();
        loop {
            let byte = reader.read_u8()?;
            digits.push(byte & 0x7f);
            if byte <= 0x7f {
                break;
            }
        }
        let value = BigUint::from_radix_le(&digits, 0x80).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "invalid integer")
        })?;
        value.to_usize().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected usize, found {value}"),
            )
        })
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut digits: Vec<u8> = BigUint::from(*self).to_radix_le(0x80);
        for digit in digits.iter_mut().rev().skip(1) {
            *digit |= 0x80;
        }
        writer.write_all(&digits)
    }
}

impl BinaryIo for String {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        let bytes = Vec::<u8>::read_from(reader)?;
        String::from_utf8(bytes)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.len().write_to(writer)?;
        writer.write_all(self.as_bytes())
    }
}

impl BinaryIo for Vec<u8> {
    fn read_from<R: io::BufRead>(reader: &mut R) -> io::Result<Self> {
        let len = usize::read_from(reader)?;
        // `len` is untrusted until that many bytes have actually arrived.
        let mut data: Vec<u8> = Vec::new();
        reader.by_ref().take(len as u64).read_to_end(&mut data)?;
        if data.len() < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {len} bytes, found {}", data.len()),
            ));
        }
        Ok(data)
    }

    fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.len().write_to(writer)?;
        writer.write_all(self)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::BinaryIo;
    use std::fmt::Debug;
    use std::io;

    fn round_trip<T: BinaryIo + Debug + Eq>(original: T) {
        let mut data: Vec<u8> = Vec::new();
        original.write_to(&mut data).expect("write_to");
        let parsed = T::read_from(&mut data.as_slice()).expect("read_from");
        assert_eq!(parsed, original);
    }

    #[test]
    fn round_trip_usize() {
        round_trip(0usize);
        round_trip(127usize);
        round_trip(128usize);
        round_trip(0x2000usize);
        round_trip(1_000_000_000usize);
    }

    #[test]
    fn usize_encoding() {
        let mut data: Vec<u8> = Vec::new();
        0x2000usize.write_to(&mut data).unwrap();
        assert_eq!(data, vec![0x80, 0x40]);
    }

    #[test]
    fn little_endian_integers() {
        let mut data: Vec<u8> = Vec::new();
        0x1234u16.write_to(&mut data).unwrap();
        0xdeadbeefu32.write_to(&mut data).unwrap();
        assert_eq!(data, vec![0x34, 0x12, 0xef, 0xbe, 0xad, 0xde]);
    }

    #[test]
    fn invalid_bool() {
        let error = bool::read_from(&mut [2u8].as_slice()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_bytes() {
        let mut data: Vec<u8> = Vec::new();
        b"hello".to_vec().write_to(&mut data).unwrap();
        data.truncate(4);
        let error = Vec::<u8>::read_from(&mut data.as_slice()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn huge_length_prefix() {
        let mut data: Vec<u8> = Vec::new();
        (usize::MAX >> 1).write_to(&mut data).unwrap();
        data.extend_from_slice(b"abc");
        let error = Vec::<u8>::read_from(&mut data.as_slice()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
        let error = String::read_from(&mut data.as_slice()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn unterminated_usize() {
        let error = usize::read_from(&mut [0x80u8, 0x80].as_slice())
            .unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn strings() {
        round_trip(String::new());
        round_trip("lh32".to_string());
    }
}

//===========================================================================//
