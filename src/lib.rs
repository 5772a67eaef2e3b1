//! # A3D - A crate for decoding .a3d scene files
//!
//! ## Example
//!
//! ```ignore
//! use a3d::Scene;
//!
//! /// Prints the name and position of every object
//! fn main() {
//!     let scene = Scene::from_path("model.a3d").expect("decode model.a3d");
//!
//!     for object in scene.objects() {
//!         let name = scene.object_display_name(object);
//!         let position = scene.object_transform(object).map(|t| t.position);
//!
//!         println!("\"{}\" at {:?}", name, position);
//!     }
//! }
//! ```
//!
//! ## The .a3d file
//!
//! An .a3d file is a small container for a static 3D scene: a list of materials, a list of meshes
//! (vertex buffers plus indexed submeshes), a table of rigid transforms and a list of objects that
//! tie one mesh to one transform. Everything is little-endian. The file starts with the signature
//! `b"A3D\0"` and two `u16` words, followed by a root block that contains four blocks in a fixed
//! order:
//!
//! ```text
//! File          := "A3D\0" major:u16 minor:u16 RootBlock
//! RootBlock     := 1:u32 word:u32 MaterialBlock MeshBlock TransformBlock ObjectBlock
//! MaterialBlock := 4:u32 word:u32 count:u32 Material{count}
//! MeshBlock     := 2:u32 word:u32 count:u32 Mesh{count}
//! TransformBlock:= 3:u32 word:u32 count:u32 Transform{count} id:u32{count}
//! ObjectBlock   := 5:u32 word:u32 count:u32 Object{count}
//! ```
//!
//! There are three revisions of the format. They share the block structure above but lay out
//! their records differently:
//!
//! * **Version 2** uses null-terminated strings, stores a material index inside every submesh,
//!   counts submesh indices in faces and keeps one smoothing group per face. The `word` after
//!   each block signature is reserved.
//! * **Version 3** uses length-prefixed strings padded to 4 bytes, names meshes and transforms,
//!   stores a pair of bounding vectors per mesh, counts submesh indices directly and moves the
//!   material assignment to the objects (one material slot per submesh). The `word` after each
//!   block signature is the block's length, and the block is followed by enough padding to
//!   realign the stream to 4 bytes.
//! * **Version 1** is not documented anywhere and decoding it fails with
//!   `A3dParseError::UnsupportedVersion`.
//!
//! ### Transform ids
//!
//! After the transform records each version stores one extra `u32` per transform. Version 2
//! files use these words as the ids objects refer to transforms by. Version 3 files store them as
//! well, but their objects refer to transforms by position in the block, so that is what this
//! crate keys them by. The raw words are available through `Scene::declared_transform_ids`.
//!
//! ### Entry points
//!
//! Some tools read the two words after the signature as a `major.minor` version, others read them
//! as a `variant` and a reserved word and check the root block signature before looking at the
//! variant. Both are supported, see `DecodeOptions` and `EntryPoint`.
//!
//! ## This crate
//!
//! Decoding happens in a single forward pass over the input. Either the whole file decodes and
//! you get a `Scene`, or decoding stops at the first problem and you get an `A3dParseError` that
//! says what was expected, what was found and at which byte offset. No partially decoded scene is
//! ever returned.
//!
//! Submesh indices are checked against their mesh's vertex count while decoding. Ids that link
//! objects to meshes, transforms and materials are not: real files carry id words whose meaning
//! is ambiguous, so unresolved ids are logged as warnings and can be listed with
//! `Scene::dangling_references`.
//!
//! Turning a `Scene` into an engine's or an editor's own representation is left to the user. The
//! `Scene` only offers read access: vertex buffers grouped by semantic, faces, resolved submesh
//! materials and a display name fallback for objects that don't store a name.
//!
//! ### Logging
//!
//! The decoder logs through the `log` facade. Block boundaries are logged at the debug level and
//! single records at the trace level. Install any logger to see them.
//!
//! ### Limitations
//!
//! This crate does not support writing .a3d files and does not validate the geometry itself
//! (winding, manifoldness, degenerate faces).

pub mod parsers;
pub mod scene;

pub use parsers::{
    a3d::{decode, decode_with, DecodeOptions, EntryPoint},
    A3dParseError,
};
pub use scene::{
    DanglingReference, FileVersion, Material, Mesh, MeshBounds, Object, Scene, SceneFormat,
    Submesh, SubmeshMaterial, Transform, VertexBuffer, VertexBufferType,
};
