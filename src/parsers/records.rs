//! Per-record decoders for both format variants.
//!
//! Each decoder reads exactly one record and returns it fully built. The `RecordCodec` trait
//! bundles one variant's decoders so the assembler can be written once for both variants.

use super::{block::BlockScheme, A3dParseContext, A3dParseError, Result};
use crate::scene::{
    Material, Mesh, MeshBounds, Object, SceneFormat, Submesh, SubmeshMaterial, VertexBuffer,
    VertexBufferType,
};
use log::trace;
use nom::Err;
use std::convert::TryInto;

/// Marks an empty material slot in a variant 2 submesh.
const NO_MATERIAL_V2: u16 = 0xFFFF;

/// A transform as stored in the stream. It only gets its id once the whole transform block has
/// been read.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransformRecord {
    pub name: Option<String>,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

/// The record layouts of one format variant.
pub(crate) trait RecordCodec {
    const FORMAT: SceneFormat;
    const BLOCK_SCHEME: BlockScheme;

    fn material<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Material>;
    fn mesh<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Mesh>;
    fn transform<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, TransformRecord>;
    fn object<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Object>;

    /// The key a transform is stored under, given the id word read for it and its position in
    /// the transform block.
    fn transform_key(declared_id: u32, index: u32) -> u32;
}

pub(crate) struct V2;

pub(crate) struct V3;

impl RecordCodec for V2 {
    const FORMAT: SceneFormat = SceneFormat::V2;
    const BLOCK_SCHEME: BlockScheme = BlockScheme::Reserved;

    fn material<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Material> {
        let (input, name) = ctx.null_terminated_string(input)?;
        let (input, color) = ctx.read_f32s::<3>(input)?;
        let (input, diffuse_map) = ctx.null_terminated_string(input)?;

        trace!("material {:?} color {:?} diffuse map {:?}", name, color, diffuse_map);
        Ok((
            input,
            Material {
                name,
                color,
                diffuse_map,
            },
        ))
    }

    fn mesh<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Mesh> {
        let (input, (vertex_count, vertex_buffers)) = ctx.vertex_buffers(input)?;
        let (input, submesh_count) = ctx.read::<u32>(input)?;
        let (input, submeshes) =
            ctx.records(input, submesh_count, |input| ctx.submesh_v2(input, vertex_count))?;

        trace!(
            "mesh with {} vertices, {} buffers, {} submeshes",
            vertex_count,
            vertex_buffers.len(),
            submeshes.len()
        );
        Ok((
            input,
            Mesh {
                name: None,
                bounds: None,
                vertex_count,
                vertex_buffers,
                submeshes,
            },
        ))
    }

    fn transform<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, TransformRecord> {
        ctx.transform_body(input, None)
    }

    fn object<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Object> {
        let (input, name) = ctx.null_terminated_string(input)?;
        let (input, mesh_id) = ctx.read::<u32>(input)?;
        let (input, transform_id) = ctx.read::<u32>(input)?;

        trace!("object {:?} mesh {} transform {}", name, mesh_id, transform_id);
        Ok((
            input,
            Object {
                name,
                mesh_id,
                transform_id,
                material_ids: None,
            },
        ))
    }

    fn transform_key(declared_id: u32, _index: u32) -> u32 {
        declared_id
    }
}

impl RecordCodec for V3 {
    const FORMAT: SceneFormat = SceneFormat::V3;
    const BLOCK_SCHEME: BlockScheme = BlockScheme::Length;

    fn material<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Material> {
        let (input, name) = ctx.length_prefixed_string(input)?;
        let (input, color) = ctx.read_f32s::<3>(input)?;
        let (input, diffuse_map) = ctx.length_prefixed_string(input)?;

        trace!("material {:?} color {:?} diffuse map {:?}", name, color, diffuse_map);
        Ok((
            input,
            Material {
                name,
                color,
                diffuse_map,
            },
        ))
    }

    fn mesh<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Mesh> {
        let (input, name) = ctx.length_prefixed_string(input)?;
        let (input, bbox_a) = ctx.read_f32s::<3>(input)?;
        let (input, bbox_b) = ctx.read_f32s::<3>(input)?;
        // Unidentified float.
        let (input, _) = ctx.skip(input, 4)?;

        let (input, (vertex_count, vertex_buffers)) = ctx.vertex_buffers(input)?;
        let (input, submesh_count) = ctx.read::<u32>(input)?;
        let (input, submeshes) =
            ctx.records(input, submesh_count, |input| ctx.submesh_v3(input, vertex_count))?;

        trace!(
            "mesh {:?} with {} vertices, {} buffers, {} submeshes",
            name,
            vertex_count,
            vertex_buffers.len(),
            submeshes.len()
        );
        Ok((
            input,
            Mesh {
                name: Some(name),
                bounds: Some(MeshBounds { bbox_a, bbox_b }),
                vertex_count,
                vertex_buffers,
                submeshes,
            },
        ))
    }

    fn transform<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, TransformRecord> {
        let (input, name) = ctx.length_prefixed_string(input)?;
        ctx.transform_body(input, Some(name))
    }

    fn object<'a>(ctx: &A3dParseContext<'a>, input: &'a [u8]) -> Result<'a, Object> {
        let (input, mesh_id) = ctx.read::<u32>(input)?;
        let (input, transform_id) = ctx.read::<u32>(input)?;
        let (input, material_count) = ctx.read::<u32>(input)?;
        let (input, material_ids) = ctx.read_fixed::<i32>(input, material_count as usize)?;

        trace!(
            "object mesh {} transform {} materials {:?}",
            mesh_id,
            transform_id,
            material_ids
        );
        Ok((
            input,
            Object {
                name: String::new(),
                mesh_id,
                transform_id,
                material_ids: Some(
                    material_ids
                        .into_iter()
                        .map(|id| id.try_into().ok())
                        .collect(),
                ),
            },
        ))
    }

    /// The declared id word is not used: variant 3 objects address transforms by position.
    fn transform_key(_declared_id: u32, index: u32) -> u32 {
        index
    }
}

impl<'a> A3dParseContext<'a> {
    /// Vertex count, buffer count, then the buffers. Shared by both variants.
    fn vertex_buffers(&self, input: &'a [u8]) -> Result<'a, (u32, Vec<VertexBuffer>)> {
        let (input, vertex_count) = self.read::<u32>(input)?;
        let (input, buffer_count) = self.read::<u32>(input)?;
        let (input, buffers) =
            self.records(input, buffer_count, |input| self.vertex_buffer(input, vertex_count))?;

        Ok((input, (vertex_count, buffers)))
    }

    fn vertex_buffer(&self, input: &'a [u8], vertex_count: u32) -> Result<'a, VertexBuffer> {
        let offset = self.offset(input);
        let (input, raw_type) = self.read::<u32>(input)?;
        let buffer_type = VertexBufferType::from_raw(raw_type).ok_or_else(|| {
            Err::Failure(A3dParseError::UnknownVertexBufferType {
                found: raw_type,
                offset,
            })
        })?;

        let float_count = (vertex_count as usize)
            .checked_mul(buffer_type.arity())
            .ok_or_else(|| self.truncated(input, usize::MAX))?;
        let (input, data) = self.read_fixed::<f32>(input, float_count)?;

        Ok((input, VertexBuffer { buffer_type, data }))
    }

    /// `u32` face count, the faces as `u16` triples, one `u32` smoothing group per face, then a
    /// `u16` material id.
    fn submesh_v2(&self, input: &'a [u8], vertex_count: u32) -> Result<'a, Submesh> {
        let (input, face_count) = self.read::<u32>(input)?;
        let face_count = face_count as usize;
        let index_count = face_count
            .checked_mul(3)
            .ok_or_else(|| self.truncated(input, usize::MAX))?;

        let (input, indices) = self.indices(input, index_count, vertex_count)?;
        let (input, smoothing_groups) = self.read_fixed::<u32>(input, face_count)?;
        let (input, material_id) = self.read::<u16>(input)?;

        Ok((
            input,
            Submesh {
                indices,
                smoothing_groups: Some(smoothing_groups),
                material: SubmeshMaterial::Inline(if material_id == NO_MATERIAL_V2 {
                    None
                } else {
                    Some(material_id)
                }),
            },
        ))
    }

    /// `u32` index count (not a face count), the `u16` indices, then padding to 4 bytes.
    fn submesh_v3(&self, input: &'a [u8], vertex_count: u32) -> Result<'a, Submesh> {
        let (input, index_count) = self.read::<u32>(input)?;
        let index_count = index_count as usize;

        let (input, indices) = self.indices(input, index_count, vertex_count)?;
        let (input, _) = self.skip_padding(input, index_count * 2)?;

        Ok((
            input,
            Submesh {
                indices,
                smoothing_groups: None,
                material: SubmeshMaterial::ObjectSlot,
            },
        ))
    }

    /// Reads `count` indices and fails on the first one that is past the end of the vertex
    /// buffers.
    fn indices(&self, input: &'a [u8], count: usize, vertex_count: u32) -> Result<'a, Vec<u16>> {
        let start = self.offset(input);
        let (input, indices) = self.read_fixed::<u16>(input, count)?;

        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, index)| u32::from(**index) >= vertex_count)
        {
            return Err(Err::Failure(A3dParseError::IndexOutOfRange {
                index,
                vertex_count,
                offset: start + position * 2,
            }));
        }

        Ok((input, indices))
    }

    /// Position, x-y-z-w rotation and scale. Identical in both variants once the name is read.
    fn transform_body(
        &self,
        input: &'a [u8],
        name: Option<String>,
    ) -> Result<'a, TransformRecord> {
        let (input, position) = self.read_f32s::<3>(input)?;
        let (input, rotation) = self.read_f32s::<4>(input)?;
        let (input, scale) = self.read_f32s::<3>(input)?;

        trace!(
            "transform {:?} position {:?} rotation {:?} scale {:?}",
            name,
            position,
            rotation,
            scale
        );
        Ok((
            input,
            TransformRecord {
                name,
                position,
                rotation,
                scale,
            },
        ))
    }
}
