use super::{A3dParseContext, A3dParseError, Result};
use log::trace;
use nom::Err;

pub const ROOT_BLOCK_SIGNATURE: u32 = 1;
pub const MESH_BLOCK_SIGNATURE: u32 = 2;
pub const TRANSFORM_BLOCK_SIGNATURE: u32 = 3;
pub const MATERIAL_BLOCK_SIGNATURE: u32 = 4;
pub const OBJECT_BLOCK_SIGNATURE: u32 = 5;

/// How the word after a block signature is interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockScheme {
    /// Variant 2: the word is reserved and the block has no trailing padding.
    Reserved,
    /// Variant 3: the word is the payload length in bytes, and `padding_for(length)` filler
    /// bytes follow the payload.
    Length,
}

/// The two words every block starts with. Both schemes share this shape, they only differ in
/// what `word` means.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub signature: u32,
    pub word: u32,
    /// Absolute position of the signature.
    pub offset: usize,
}

impl BlockHeader {
    pub fn length(&self, scheme: BlockScheme) -> Option<u32> {
        match scheme {
            BlockScheme::Reserved => None,
            BlockScheme::Length => Some(self.word),
        }
    }
}

impl<'a> A3dParseContext<'a> {
    /// Reads a block header and checks its signature against `expected`.
    pub(crate) fn block_header(&self, input: &'a [u8], expected: u32) -> Result<'a, BlockHeader> {
        let offset = self.offset(input);
        let (input, signature) = self.read::<u32>(input)?;
        if signature != expected {
            return Err(Err::Failure(A3dParseError::InvalidBlockSignature {
                expected,
                found: signature,
                offset,
            }));
        }
        let (input, word) = self.read::<u32>(input)?;

        Ok((
            input,
            BlockHeader {
                signature,
                word,
                offset,
            },
        ))
    }

    /// Realigns the stream once a block's payload has been read.
    pub(crate) fn block_trailer(
        &self,
        input: &'a [u8],
        header: &BlockHeader,
        scheme: BlockScheme,
    ) -> Result<'a, ()> {
        match header.length(scheme) {
            Some(length) => self.skip_padding(input, length as usize),
            None => Ok((input, ())),
        }
    }

    /// Reads a counted block: header, `u32` record count, the payload produced by `payload`,
    /// then the trailer.
    pub(crate) fn framed_block<T, F>(
        &self,
        input: &'a [u8],
        expected: u32,
        scheme: BlockScheme,
        payload: F,
    ) -> Result<'a, T>
    where
        F: FnOnce(&'a [u8], u32) -> Result<'a, T>,
    {
        let (input, header) = self.block_header(input, expected)?;
        let (input, count) = self.read::<u32>(input)?;
        trace!(
            "block {} at offset {}: {} records, length {:?}",
            header.signature,
            header.offset,
            count,
            header.length(scheme)
        );

        let (input, value) = payload(input, count)?;
        let (input, _) = self.block_trailer(input, &header, scheme)?;

        Ok((input, value))
    }

    /// Runs `record` `count` times.
    pub(crate) fn records<T, F>(&self, input: &'a [u8], count: u32, record: F) -> Result<'a, Vec<T>>
    where
        F: Fn(&'a [u8]) -> Result<'a, T>,
    {
        // Grows as records decode; a forged count runs out of input first.
        let mut values = Vec::new();
        let mut next_input = input;
        for _ in 0..count {
            let (input, value) = record(next_input)?;
            values.push(value);
            next_input = input;
        }

        Ok((next_input, values))
    }
}
