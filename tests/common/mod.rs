//! Builds synthetic .a3d files byte by byte.

#![allow(dead_code)]

pub const ROOT: u32 = 1;
pub const MESH: u32 = 2;
pub const TRANSFORM: u32 = 3;
pub const MATERIAL: u32 = 4;
pub const OBJECT: u32 = 5;

pub const COORDINATE: u32 = 1;
pub const UV1: u32 = 2;
pub const NORMAL1: u32 = 3;

pub const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Layout {
    V2,
    V3,
}

pub fn padding(length: usize) -> usize {
    (4 - length % 4) % 4
}

#[derive(Default)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32s(&mut self, values: &[f32]) -> &mut Self {
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn pad(&mut self, n: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + n, 0);
        self
    }

    pub fn cstr(&mut self, s: &str) -> &mut Self {
        self.raw(s.as_bytes()).raw(&[0])
    }

    pub fn lpstr(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32).raw(s.as_bytes()).pad(padding(s.len()))
    }

    pub fn string(&mut self, layout: Layout, s: &str) -> &mut Self {
        match layout {
            Layout::V2 => self.cstr(s),
            Layout::V3 => self.lpstr(s),
        }
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.bytes, Vec::new())
    }
}

/// A counted block. In the V3 layout the length word covers the count and the records, plus
/// `extra_length`, and the block is followed by the padding that length calls for.
pub fn block(layout: Layout, signature: u32, count: u32, records: &[u8], extra_length: u32) -> Vec<u8> {
    let mut w = Writer::new();
    match layout {
        Layout::V2 => {
            w.u32(signature).u32(0).u32(count).raw(records);
        }
        Layout::V3 => {
            let length = 4 + records.len() as u32 + extra_length;
            w.u32(signature)
                .u32(length)
                .u32(count)
                .raw(records)
                .pad(padding(length as usize));
        }
    }
    w.finish()
}

/// Signature, version words and the root block wrapping `blocks`.
pub fn file(layout: Layout, version: (u16, u16), blocks: &[Vec<u8>], root_extra_length: u32) -> Vec<u8> {
    let payload: Vec<u8> = blocks.concat();
    let mut w = Writer::new();
    w.raw(b"A3D\0").u16(version.0).u16(version.1).u32(ROOT);
    match layout {
        Layout::V2 => {
            w.u32(0).raw(&payload);
        }
        Layout::V3 => {
            let length = payload.len() as u32 + root_extra_length;
            w.u32(length).raw(&payload).pad(padding(length as usize));
        }
    }
    w.finish()
}

pub fn material(layout: Layout, name: &str, color: [f32; 3], diffuse_map: &str) -> Vec<u8> {
    Writer::new()
        .string(layout, name)
        .f32s(&color)
        .string(layout, diffuse_map)
        .finish()
}

fn vertex_buffers(w: &mut Writer, vertex_count: u32, buffers: &[(u32, &[f32])]) {
    w.u32(vertex_count).u32(buffers.len() as u32);
    for (buffer_type, data) in buffers {
        w.u32(*buffer_type).f32s(data);
    }
}

pub fn submesh_v2(faces: &[[u16; 3]], smoothing_groups: &[u32], material_id: u16) -> Vec<u8> {
    let mut w = Writer::new();
    w.u32(faces.len() as u32);
    for face in faces {
        w.u16(face[0]).u16(face[1]).u16(face[2]);
    }
    for group in smoothing_groups {
        w.u32(*group);
    }
    w.u16(material_id).finish()
}

pub fn submesh_v3(indices: &[u16]) -> Vec<u8> {
    let mut w = Writer::new();
    w.u32(indices.len() as u32);
    for index in indices {
        w.u16(*index);
    }
    w.pad(padding(indices.len() * 2)).finish()
}

pub fn mesh_v2(vertex_count: u32, buffers: &[(u32, &[f32])], submeshes: &[Vec<u8>]) -> Vec<u8> {
    let mut w = Writer::new();
    vertex_buffers(&mut w, vertex_count, buffers);
    w.u32(submeshes.len() as u32).raw(&submeshes.concat()).finish()
}

pub fn mesh_v3(
    name: &str,
    bbox_a: [f32; 3],
    bbox_b: [f32; 3],
    vertex_count: u32,
    buffers: &[(u32, &[f32])],
    submeshes: &[Vec<u8>],
) -> Vec<u8> {
    let mut w = Writer::new();
    w.lpstr(name).f32s(&bbox_a).f32s(&bbox_b).f32s(&[0.25]);
    vertex_buffers(&mut w, vertex_count, buffers);
    w.u32(submeshes.len() as u32).raw(&submeshes.concat()).finish()
}

pub fn transform(layout: Layout, name: &str, position: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Vec<u8> {
    let mut w = Writer::new();
    if layout == Layout::V3 {
        w.lpstr(name);
    }
    w.f32s(&position).f32s(&rotation).f32s(&scale).finish()
}

/// Transform records followed by one declared id word per transform.
pub fn transforms(records: &[Vec<u8>], declared_ids: &[u32]) -> Vec<u8> {
    let mut w = Writer::new();
    w.raw(&records.concat());
    for id in declared_ids {
        w.u32(*id);
    }
    w.finish()
}

pub fn object_v2(name: &str, mesh_id: u32, transform_id: u32) -> Vec<u8> {
    Writer::new().cstr(name).u32(mesh_id).u32(transform_id).finish()
}

pub fn object_v3(mesh_id: u32, transform_id: u32, material_ids: &[i32]) -> Vec<u8> {
    let mut w = Writer::new();
    w.u32(mesh_id).u32(transform_id).u32(material_ids.len() as u32);
    for id in material_ids {
        w.i32(*id);
    }
    w.finish()
}

/// One red material, one triangle mesh using it, one identity transform and one object.
pub fn single_triangle_v2() -> Vec<u8> {
    let layout = Layout::V2;
    file(
        layout,
        (2, 0),
        &[
            block(layout, MATERIAL, 1, &material(layout, "Red", [1.0, 0.0, 0.0], ""), 0),
            block(
                layout,
                MESH,
                1,
                &mesh_v2(3, &[(COORDINATE, &TRIANGLE[..])], &[submesh_v2(&[[0, 1, 2]], &[0], 0)]),
                0,
            ),
            block(
                layout,
                TRANSFORM,
                1,
                &transforms(
                    &[transform(layout, "", [0.0; 3], IDENTITY_ROTATION, [1.0; 3])],
                    &[0],
                ),
                0,
            ),
            block(layout, OBJECT, 1, &object_v2("Triangle", 0, 0), 0),
        ],
        0,
    )
}

/// A v3 scene with two materials, a named and an unnamed mesh, two named transforms whose declared ids
/// don't match their positions, and two objects using per-submesh material slots.
pub fn hull_and_turret_v3(material_block_extra: u32, root_extra: u32) -> Vec<u8> {
    let layout = Layout::V3;
    let materials = [
        material(layout, "Hull", [0.5, 0.5, 0.5], "hull.webp"),
        material(layout, "Glass", [0.0, 0.5, 1.0], ""),
    ]
    .concat();
    let quad: [f32; 12] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
    let uvs: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let meshes = [
        mesh_v3(
            "hull",
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
            4,
            &[(COORDINATE, &quad[..]), (UV1, &uvs[..])],
            &[submesh_v3(&[0, 1, 2]), submesh_v3(&[0, 2, 3])],
        ),
        mesh_v3(
            "",
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
            3,
            &[(COORDINATE, &TRIANGLE[..])],
            &[submesh_v3(&[0, 1, 2])],
        ),
    ]
    .concat();
    let transform_records = [
        transform(layout, "hull_root", [0.0; 3], IDENTITY_ROTATION, [1.0; 3]),
        transform(layout, "turret_mount", [0.0, 2.0, 0.0], IDENTITY_ROTATION, [1.0; 3]),
    ];
    let objects = [object_v3(0, 0, &[0, 1]), object_v3(1, 1, &[-1])].concat();

    file(
        layout,
        (3, 0),
        &[
            block(layout, MATERIAL, 2, &materials, material_block_extra),
            block(layout, MESH, 2, &meshes, 0),
            block(layout, TRANSFORM, 2, &transforms(&transform_records, &[5, 9]), 0),
            block(layout, OBJECT, 2, &objects, 0),
        ],
        root_extra,
    )
}
