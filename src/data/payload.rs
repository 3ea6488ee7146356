use std::io::{ErrorKind, Read};

use log::debug;

use crate::error::Result;

/// Byte order of the 4-byte channel counts.
///
/// The format itself does not record it; files were written in the producing
/// machine's native order, which for LSRM software is little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
    /// Whatever the running platform uses.
    Native,
}

impl ByteOrder {
    pub fn decode(self, bytes: [u8; 4]) -> i32 {
        match self {
            ByteOrder::LittleEndian => i32::from_le_bytes(bytes),
            ByteOrder::BigEndian => i32::from_be_bytes(bytes),
            ByteOrder::Native => i32::from_ne_bytes(bytes),
        }
    }

    pub fn encode(self, value: i32) -> [u8; 4] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
            ByteOrder::Native => value.to_ne_bytes(),
        }
    }
}

/// Decode channel counts until the stream runs out.
///
/// A trailing block shorter than 4 bytes is dropped silently.
pub fn decode_payload<R: Read>(mut reader: R, byte_order: ByteOrder) -> Result<Vec<i32>> {
    let mut data = Vec::new();
    let mut block = [0u8; 4];
    loop {
        let filled = read_block(&mut reader, &mut block)?;
        if filled < block.len() {
            if filled > 0 {
                debug!(
                    "ignoring {filled} trailing payload byte(s) after {} channels",
                    data.len()
                );
            }
            break;
        }
        data.push(byte_order.decode(block));
    }
    Ok(data)
}

/// Fill `block` as far as the reader allows; returns the number of bytes read.
fn read_block<R: Read>(reader: &mut R, block: &mut [u8; 4]) -> Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match reader.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;

    /// Hands out at most one byte per `read` call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn single_negative_channel() {
        let bytes = (-7i32).to_le_bytes().to_vec();
        let data = decode_payload(Cursor::new(bytes), ByteOrder::LittleEndian).unwrap();
        assert_eq!(data, vec![-7]);
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        let mut bytes = (-7i32).to_ne_bytes().to_vec();
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let data = decode_payload(Cursor::new(bytes), ByteOrder::Native).unwrap();
        assert_eq!(data, vec![-7]);
    }

    #[test]
    fn empty_payload() {
        let data = decode_payload(Cursor::new(Vec::new()), ByteOrder::default()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn big_endian_order() {
        let data =
            decode_payload(Cursor::new(vec![0, 0, 1, 2]), ByteOrder::BigEndian).unwrap();
        assert_eq!(data, vec![258]);
    }

    #[test]
    fn short_reads_are_reassembled() {
        let mut bytes = Vec::new();
        for v in [1i32, i32::MAX, i32::MIN] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let data = decode_payload(Trickle(Cursor::new(bytes)), ByteOrder::LittleEndian).unwrap();
        assert_eq!(data, vec![1, i32::MAX, i32::MIN]);
    }

    proptest! {
        #[test]
        fn channel_count_is_byte_count_div_4(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let data = decode_payload(Cursor::new(bytes.clone()), ByteOrder::LittleEndian).unwrap();
            prop_assert_eq!(data.len(), bytes.len() / 4);
        }
    }
}
