use linked_hash_map::LinkedHashMap;

/// The on-disk revision a `Scene` was decoded from. Each revision has its own record layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SceneFormat {
    /// Null-terminated strings, inline submesh materials, declared transform ids.
    V2,
    /// Length-prefixed padded strings, length-framed blocks, per-object material slots.
    V3,
}

/// The two `u16` words following the file signature.
///
/// When decoding through `EntryPoint::Variant` these are the variant and its reserved word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileVersion {
    pub major: u16,
    pub minor: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: [f32; 3],
    /// Path of the diffuse texture as written by the exporter. Empty when the material has none.
    pub diffuse_map: String,
}

/// The semantic of a vertex buffer, which also fixes how many floats make up one vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VertexBufferType {
    Coordinate,
    Uv1,
    Normal1,
    Uv2,
    Color,
    Normal2,
}

impl VertexBufferType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(VertexBufferType::Coordinate),
            2 => Some(VertexBufferType::Uv1),
            3 => Some(VertexBufferType::Normal1),
            4 => Some(VertexBufferType::Uv2),
            5 => Some(VertexBufferType::Color),
            6 => Some(VertexBufferType::Normal2),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            VertexBufferType::Coordinate => 1,
            VertexBufferType::Uv1 => 2,
            VertexBufferType::Normal1 => 3,
            VertexBufferType::Uv2 => 4,
            VertexBufferType::Color => 5,
            VertexBufferType::Normal2 => 6,
        }
    }

    /// Number of `f32` components per vertex.
    pub fn arity(self) -> usize {
        match self {
            VertexBufferType::Coordinate | VertexBufferType::Normal1 | VertexBufferType::Normal2 => 3,
            VertexBufferType::Uv1 | VertexBufferType::Uv2 => 2,
            VertexBufferType::Color => 4,
        }
    }
}

/// One per-vertex attribute array. `data` is flat: `vertex_count * buffer_type.arity()` floats.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    pub buffer_type: VertexBufferType,
    pub data: Vec<f32>,
}

impl VertexBuffer {
    pub fn len(&self) -> usize {
        self.data.len() / self.buffer_type.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The components of vertex `index`.
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        let arity = self.buffer_type.arity();
        let start = index.checked_mul(arity)?;
        self.data.get(start..start.checked_add(arity)?)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.buffer_type.arity())
    }
}

/// Where a submesh gets its material from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmeshMaterial {
    /// Index into the scene's materials, stored inline (variant 2). `None` when the file stores
    /// `0xFFFF`.
    Inline(Option<u16>),
    /// Resolved through the owning object's material slot at this submesh's position (variant 3).
    ObjectSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submesh {
    /// Triangle list.
    pub indices: Vec<u16>,
    /// One smoothing group per triangle. Only variant 2 stores them.
    pub smoothing_groups: Option<Vec<u32>>,
    pub material: SubmeshMaterial,
}

impl Submesh {
    pub fn faces(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|face| [face[0], face[1], face[2]])
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// The two corner vectors stored ahead of a variant 3 mesh. Which one is the minimum has not been
/// confirmed against real files, so they are kept in stream order under neutral names.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshBounds {
    pub bbox_a: [f32; 3],
    pub bbox_b: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Only variant 3 names its meshes.
    pub name: Option<String>,
    pub bounds: Option<MeshBounds>,
    pub vertex_count: u32,
    pub vertex_buffers: Vec<VertexBuffer>,
    pub submeshes: Vec<Submesh>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertex_count as usize
    }

    /// The first buffer of the given type. Files may repeat a type, later copies are reachable
    /// through `vertex_buffers`.
    pub fn vertex_buffer(&self, buffer_type: VertexBufferType) -> Option<&VertexBuffer> {
        self.vertex_buffers
            .iter()
            .find(|buffer| buffer.buffer_type == buffer_type)
    }

    pub fn coordinates(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer(VertexBufferType::Coordinate)
    }

    pub fn uv1(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer(VertexBufferType::Uv1)
    }

    pub fn normals(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer(VertexBufferType::Normal1)
    }

    pub fn uv2(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer(VertexBufferType::Uv2)
    }

    pub fn colors(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer(VertexBufferType::Color)
    }

    pub fn normals2(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer(VertexBufferType::Normal2)
    }

    /// Every submesh's faces, in submesh order.
    pub fn faces(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.submeshes.iter().flat_map(|submesh| submesh.faces())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The key this transform is stored under in `Scene::transforms`.
    pub id: u32,
    /// Only variant 3 names its transforms.
    pub name: Option<String>,
    pub position: [f32; 3],
    /// Quaternion in x, y, z, w order.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Transform {
    pub fn rotation_wxyz(&self) -> [f32; 4] {
        let [x, y, z, w] = self.rotation;
        [w, x, y, z]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Empty in variant 3, which doesn't store object names. See `Scene::object_display_name`.
    pub name: String,
    pub mesh_id: u32,
    pub transform_id: u32,
    /// Variant 3 only: one material per submesh slot, `None` where the file stores a negative id.
    pub material_ids: Option<Vec<Option<u32>>>,
}

/// An id stored in the file that doesn't point at anything in the decoded scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    Mesh { object: usize, mesh_id: u32 },
    Transform { object: usize, transform_id: u32 },
    ObjectMaterial { object: usize, slot: usize, material_id: u32 },
    SubmeshMaterial { mesh: usize, submesh: usize, material_id: u16 },
}

/// A fully decoded A3D file.
///
/// A `Scene` is only ever produced by a successful decode and is read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    format: SceneFormat,
    version: FileVersion,
    materials: Vec<Material>,
    meshes: Vec<Mesh>,
    transforms: LinkedHashMap<u32, Transform>,
    declared_transform_ids: Vec<u32>,
    objects: Vec<Object>,
}

impl Scene {
    pub(crate) fn new(
        format: SceneFormat,
        version: FileVersion,
        materials: Vec<Material>,
        meshes: Vec<Mesh>,
        transforms: LinkedHashMap<u32, Transform>,
        declared_transform_ids: Vec<u32>,
        objects: Vec<Object>,
    ) -> Self {
        Self {
            format,
            version,
            materials,
            meshes,
            transforms,
            declared_transform_ids,
            objects,
        }
    }

    pub fn format(&self) -> SceneFormat {
        self.format
    }

    pub fn version(&self) -> FileVersion {
        self.version
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Transforms keyed by the id objects refer to them with, in the order they were stored.
    pub fn transforms(&self) -> &LinkedHashMap<u32, Transform> {
        &self.transforms
    }

    pub fn transform(&self, id: u32) -> Option<&Transform> {
        self.transforms.get(&id)
    }

    /// The raw id word written after each transform record, in read order.
    ///
    /// Variant 2 files key transforms by these words. Variant 3 files store them as well but key
    /// transforms by read position instead; the words are kept here untouched because what they
    /// mean in variant 3 is not known.
    pub fn declared_transform_ids(&self) -> &[u32] {
        &self.declared_transform_ids
    }

    pub fn material_by_name(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.name == name)
    }

    pub fn object_mesh(&self, object: &Object) -> Option<&Mesh> {
        self.meshes.get(object.mesh_id as usize)
    }

    pub fn object_transform(&self, object: &Object) -> Option<&Transform> {
        self.transform(object.transform_id)
    }

    /// The material used by submesh `submesh_index` of `object`'s mesh.
    ///
    /// Inline ids (variant 2) come from the submesh itself; slot ids (variant 3) come from the
    /// object. Empty slots and ids outside the material table both resolve to `None`.
    pub fn submesh_material(&self, object: &Object, submesh_index: usize) -> Option<&Material> {
        let submesh = self.object_mesh(object)?.submeshes.get(submesh_index)?;
        let material_id = match submesh.material {
            SubmeshMaterial::Inline(id) => usize::from(id?),
            SubmeshMaterial::ObjectSlot => {
                let slot = object.material_ids.as_ref()?.get(submesh_index)?;
                (*slot)? as usize
            }
        };

        self.materials.get(material_id)
    }

    /// A name to show for `object`: its own name, else its mesh's, else its transform's.
    pub fn object_display_name<'s>(&'s self, object: &'s Object) -> &'s str {
        if !object.name.is_empty() {
            return &object.name;
        }

        let mesh_name = self.object_mesh(object).and_then(|mesh| mesh.name.as_deref());
        let transform_name = self
            .object_transform(object)
            .and_then(|transform| transform.name.as_deref());

        match (mesh_name, transform_name) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Some(name)) => name,
            _ => "",
        }
    }

    /// Ids stored in the file that don't resolve inside this scene.
    ///
    /// These don't fail the decode: variant 2 and 3 files are known to carry id words whose
    /// meaning is ambiguous, so resolution problems are reported instead.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        let material_count = self.materials.len();

        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            for (submesh_index, submesh) in mesh.submeshes.iter().enumerate() {
                if let SubmeshMaterial::Inline(Some(material_id)) = submesh.material {
                    if usize::from(material_id) >= material_count {
                        dangling.push(DanglingReference::SubmeshMaterial {
                            mesh: mesh_index,
                            submesh: submesh_index,
                            material_id,
                        });
                    }
                }
            }
        }

        for (object_index, object) in self.objects.iter().enumerate() {
            if self.object_mesh(object).is_none() {
                dangling.push(DanglingReference::Mesh {
                    object: object_index,
                    mesh_id: object.mesh_id,
                });
            }
            if self.object_transform(object).is_none() {
                dangling.push(DanglingReference::Transform {
                    object: object_index,
                    transform_id: object.transform_id,
                });
            }
            if let Some(material_ids) = &object.material_ids {
                for (slot, material_id) in material_ids.iter().enumerate() {
                    if let Some(material_id) = *material_id {
                        if material_id as usize >= material_count {
                            dangling.push(DanglingReference::ObjectMaterial {
                                object: object_index,
                                slot,
                                material_id,
                            });
                        }
                    }
                }
            }
        }

        dangling
    }
}
