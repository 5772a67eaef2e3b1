use super::{
    assembler::assemble,
    block::{BlockHeader, ROOT_BLOCK_SIGNATURE},
    records::{V2, V3},
    A3dParseContext, A3dParseError, Result,
};
use crate::scene::{FileVersion, Scene};
use log::debug;
use nom::{bytes::complete::take, Err};
use std::{fs::File, io::Read, path::Path, result::Result as StdResult};

pub const A3D_SIGNATURE: &[u8; 4] = b"A3D\0";

/// How the two words after the file signature are read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EntryPoint {
    /// `major:u16 minor:u16`, dispatching on `major`. The root block header is framed by the
    /// selected variant.
    #[default]
    Versioned,
    /// `variant:u16 reserved:u16` followed directly by the root block header, which is checked
    /// before dispatching on `variant`.
    Variant,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub entry_point: EntryPoint,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }
}

type SceneDecoder =
    for<'a> fn(&A3dParseContext<'a>, &'a [u8], FileVersion, Option<BlockHeader>) -> Result<'a, Scene>;

enum FormatSupport {
    Unsupported,
    Supported(SceneDecoder),
}

/// Every version the decoder knows about. Adding a version means adding a row here and a codec.
static FORMATS: &[(u16, FormatSupport)] = &[
    (1, FormatSupport::Unsupported),
    (2, FormatSupport::Supported(assemble::<V2>)),
    (3, FormatSupport::Supported(assemble::<V3>)),
];

fn scene_decoder(version: u16) -> StdResult<SceneDecoder, A3dParseError> {
    match FORMATS.iter().find(|(known, _)| *known == version) {
        Some((_, FormatSupport::Supported(decoder))) => Ok(*decoder),
        Some((_, FormatSupport::Unsupported)) => {
            Err(A3dParseError::UnsupportedVersion { version })
        }
        None => Err(A3dParseError::UnknownVersion { version }),
    }
}

impl<'a> A3dParseContext<'a> {
    fn signature(&self, input: &'a [u8]) -> Result<'a, ()> {
        let (rest, found) = take::<_, _, ()>(A3D_SIGNATURE.len())(input)
            .map_err(|_| self.truncated(input, A3D_SIGNATURE.len()))?;
        if found != A3D_SIGNATURE {
            return Err(Err::Failure(A3dParseError::InvalidSignature {
                found: found.to_vec(),
            }));
        }

        Ok((rest, ()))
    }

    fn file_version(&self, input: &'a [u8]) -> Result<'a, FileVersion> {
        let (input, major) = self.read::<u16>(input)?;
        let (input, minor) = self.read::<u16>(input)?;

        Ok((input, FileVersion { major, minor }))
    }

    pub(crate) fn scene(&self, input: &'a [u8], options: DecodeOptions) -> Result<'a, Scene> {
        let (input, _) = self.signature(input)?;
        let (input, version) = self.file_version(input)?;
        debug!("reading A3D version {}.{}", version.major, version.minor);

        let (input, root) = match options.entry_point {
            EntryPoint::Versioned => (input, None),
            EntryPoint::Variant => {
                let (input, root) = self.block_header(input, ROOT_BLOCK_SIGNATURE)?;
                (input, Some(root))
            }
        };

        let decoder = scene_decoder(version.major).map_err(Err::Failure)?;
        decoder(self, input, version, root)
    }
}

/// Decodes a complete A3D file held in memory.
pub fn decode(data: &[u8]) -> StdResult<Scene, A3dParseError> {
    decode_with(data, DecodeOptions::default())
}

pub fn decode_with(data: &[u8], options: DecodeOptions) -> StdResult<Scene, A3dParseError> {
    let ctx = A3dParseContext::new(data);

    match ctx.scene(data, options) {
        Ok((rest, scene)) => {
            if !rest.is_empty() {
                debug!("ignoring {} bytes after the root block", rest.len());
            }
            Ok(scene)
        }
        Err(Err::Failure(e)) | Err(Err::Error(e)) => Err(e),
        Err(Err::Incomplete(..)) => Err(A3dParseError::TruncatedStream {
            offset: data.len(),
            needed: 1,
            available: 0,
        }),
    }
}

impl Scene {
    /// Reads `data` to the end and decodes it.
    pub fn from_data<T: Read>(data: T) -> StdResult<Self, A3dParseError> {
        Scene::from_data_with(data, DecodeOptions::default())
    }

    pub fn from_data_with<T: Read>(
        mut data: T,
        options: DecodeOptions,
    ) -> StdResult<Self, A3dParseError> {
        let mut buffer = Vec::new();
        data.read_to_end(&mut buffer)?;

        decode_with(&buffer, options)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> StdResult<Self, A3dParseError> {
        Scene::from_path_with(path, DecodeOptions::default())
    }

    pub fn from_path_with<P: AsRef<Path>>(
        path: P,
        options: DecodeOptions,
    ) -> StdResult<Self, A3dParseError> {
        let file = File::open(path)?;
        Scene::from_data_with(file, options)
    }
}
