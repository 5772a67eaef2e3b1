use super::{
    block::{
        BlockHeader, MATERIAL_BLOCK_SIGNATURE, MESH_BLOCK_SIGNATURE, OBJECT_BLOCK_SIGNATURE,
        ROOT_BLOCK_SIGNATURE, TRANSFORM_BLOCK_SIGNATURE,
    },
    records::{RecordCodec, TransformRecord},
    A3dParseContext, Result,
};
use crate::scene::{FileVersion, Scene, Transform};
use linked_hash_map::LinkedHashMap;
use log::{debug, warn};

/// Decodes the root block and everything in it with the layouts of codec `C`.
///
/// `root` is the already-read root block header when the caller had to read it before knowing
/// the variant. Otherwise it is read here.
pub(crate) fn assemble<'a, C: RecordCodec>(
    ctx: &A3dParseContext<'a>,
    input: &'a [u8],
    version: FileVersion,
    root: Option<BlockHeader>,
) -> Result<'a, Scene> {
    let (input, root) = match root {
        Some(root) => (input, root),
        None => ctx.block_header(input, ROOT_BLOCK_SIGNATURE)?,
    };
    debug!(
        "reading {:?} root block at offset {}, length {:?}",
        C::FORMAT,
        root.offset,
        root.length(C::BLOCK_SCHEME)
    );

    let (input, materials) =
        ctx.framed_block(input, MATERIAL_BLOCK_SIGNATURE, C::BLOCK_SCHEME, |input, count| {
            debug!("reading {} materials", count);
            ctx.records(input, count, |input| C::material(ctx, input))
        })?;

    let (input, meshes) =
        ctx.framed_block(input, MESH_BLOCK_SIGNATURE, C::BLOCK_SCHEME, |input, count| {
            debug!("reading {} meshes", count);
            ctx.records(input, count, |input| C::mesh(ctx, input))
        })?;

    let (input, (transforms, declared_transform_ids)) = ctx.framed_block(
        input,
        TRANSFORM_BLOCK_SIGNATURE,
        C::BLOCK_SCHEME,
        |input, count| {
            debug!("reading {} transforms", count);
            let (input, records) = ctx.records(input, count, |input| C::transform(ctx, input))?;
            // One id word per transform, stored after all of the transform records.
            let (input, declared_ids) = ctx.read_fixed::<u32>(input, records.len())?;
            let transforms = key_transforms::<C>(records, &declared_ids);

            Ok((input, (transforms, declared_ids)))
        },
    )?;

    let (input, objects) =
        ctx.framed_block(input, OBJECT_BLOCK_SIGNATURE, C::BLOCK_SCHEME, |input, count| {
            debug!("reading {} objects", count);
            ctx.records(input, count, |input| C::object(ctx, input))
        })?;

    let (input, _) = ctx.block_trailer(input, &root, C::BLOCK_SCHEME)?;

    let scene = Scene::new(
        C::FORMAT,
        version,
        materials,
        meshes,
        transforms,
        declared_transform_ids,
        objects,
    );
    for reference in scene.dangling_references() {
        warn!("unresolved reference in {:?} scene: {:?}", C::FORMAT, reference);
    }

    Ok((input, scene))
}

/// Pairs every transform with its key. A key declared twice keeps the transform read last.
fn key_transforms<C: RecordCodec>(
    records: Vec<TransformRecord>,
    declared_ids: &[u32],
) -> LinkedHashMap<u32, Transform> {
    let mut transforms = LinkedHashMap::new();

    for (index, (record, &declared_id)) in records.into_iter().zip(declared_ids).enumerate() {
        let id = C::transform_key(declared_id, index as u32);
        let TransformRecord {
            name,
            position,
            rotation,
            scale,
        } = record;

        let previous = transforms.insert(
            id,
            Transform {
                id,
                name,
                position,
                rotation,
                scale,
            },
        );
        if previous.is_some() {
            debug!("transform id {} declared more than once, keeping the last", id);
        }
    }

    transforms
}
