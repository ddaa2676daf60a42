//! Big-endian cursor shared by the payload and VAA decoders.

use super::errors::{BridgeError, BridgeResult};
use super::value_objects::WireAddress;
use primitive_types::U256;

pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> BridgeResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| BridgeError::truncated(what))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self, what: &str) -> BridgeResult<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &str) -> BridgeResult<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self, what: &str) -> BridgeResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_be_bytes(buf))
    }

    pub(crate) fn u64(&mut self, what: &str) -> BridgeResult<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_be_bytes(buf))
    }

    pub(crate) fn bytes32(&mut self, what: &str) -> BridgeResult<[u8; 32]> {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.take(32, what)?);
        Ok(buf)
    }

    pub(crate) fn address(&mut self, what: &str) -> BridgeResult<WireAddress> {
        self.bytes32(what).map(WireAddress)
    }

    pub(crate) fn u256(&mut self, what: &str) -> BridgeResult<U256> {
        Ok(U256::from_big_endian(self.take(32, what)?))
    }

    pub(crate) fn array<const N: usize>(&mut self, what: &str) -> BridgeResult<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, what)?);
        Ok(buf)
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

pub(crate) fn u256_bytes(value: U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sequence() {
        let mut bytes = vec![7u8, 0x01, 0x02];
        bytes.extend_from_slice(&u256_bytes(U256::from(1000)));
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.u8("a").unwrap(), 7);
        assert_eq!(reader.u16("b").unwrap(), 0x0102);
        assert_eq!(reader.u256("c").unwrap(), U256::from(1000));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_truncated() {
        let mut reader = Reader::new(&[1, 2, 3]);
        let err = reader.u32("sequence").unwrap_err();
        assert!(err.to_string().contains("sequence"));
    }
}
