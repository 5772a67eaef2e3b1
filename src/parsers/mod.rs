pub mod a3d;
mod assembler;
pub mod block;
pub mod primitive;
mod records;

use nom::{
    error::{ErrorKind, ParseError},
    IResult,
};
use std::{io, str::Utf8Error};
use thiserror::Error;

type Result<'a, T> = IResult<&'a [u8], T, A3dParseError>;

/// Errors that can happen while decoding an A3D file.
///
/// Every variant is fatal: the decode stops at the first error and no partial `Scene` is returned.
/// Variants raised by the decoder itself carry the absolute byte `offset` where the malformed data
/// starts. `NomError` is kept for failures coming out of nom combinators that have no better
/// description.
#[derive(Debug, Error)]
pub enum A3dParseError {
    #[error("nom error: {kind:?}")]
    NomError {
        kind: ErrorKind,
        other: Option<Box<A3dParseError>>,
    },
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    /// The file doesn't start with `b"A3D\0"`.
    #[error("invalid A3D signature {found:?}")]
    InvalidSignature { found: Vec<u8> },
    /// A known version the decoder refuses to guess a layout for (version 1).
    #[error("A3D version {version} is not supported")]
    UnsupportedVersion { version: u16 },
    #[error("unknown A3D version {version}")]
    UnknownVersion { version: u16 },
    #[error("invalid block signature at offset {offset}: expected {expected}, found {found}")]
    InvalidBlockSignature {
        expected: u32,
        found: u32,
        offset: usize,
    },
    #[error("unknown vertex buffer type {found} at offset {offset}")]
    UnknownVertexBufferType { found: u32, offset: usize },
    /// Fewer bytes are left than a field declares.
    #[error("truncated stream at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidEncoding {
        offset: usize,
        #[source]
        source: Utf8Error,
    },
    /// A submesh index points past the end of its mesh's vertex buffers.
    #[error("index {index} at offset {offset} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u16,
        vertex_count: u32,
        offset: usize,
    },
}

impl ParseError<&[u8]> for A3dParseError {
    fn from_error_kind(_input: &[u8], kind: ErrorKind) -> Self {
        A3dParseError::NomError { kind, other: None }
    }

    fn append(_input: &[u8], kind: ErrorKind, other: Self) -> Self {
        A3dParseError::NomError {
            kind,
            other: Some(Box::new(other)),
        }
    }
}

/// Keeps the whole file around so errors raised deep inside a record can be located.
///
/// Every parser in this module takes the remaining input as a suffix of `data`, which makes the
/// absolute offset of any position `data.len() - input.len()`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct A3dParseContext<'a> {
    data: &'a [u8],
}

impl<'a> A3dParseContext<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn offset(&self, input: &[u8]) -> usize {
        self.data.len() - input.len()
    }
}
