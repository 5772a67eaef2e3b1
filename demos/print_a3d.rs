use a3d::{A3dParseError, Scene};
use std::{
    env,
    error::Error,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

fn print_scene(out: &mut impl Write, path: &Path, scene: &Scene) -> io::Result<()> {
    let version = scene.version();
    writeln!(
        out,
        "{} ({:?}, version {}.{})",
        path.display(),
        scene.format(),
        version.major,
        version.minor
    )?;
    writeln!(
        out,
        "  {} materials, {} meshes, {} transforms, {} objects",
        scene.materials().len(),
        scene.meshes().len(),
        scene.transforms().len(),
        scene.objects().len()
    )?;

    for material in scene.materials() {
        writeln!(
            out,
            "  material \"{}\" {:?} {}",
            material.name, material.color, material.diffuse_map
        )?;
    }

    for object in scene.objects() {
        write!(out, "  object \"{}\"", scene.object_display_name(object))?;

        match scene.object_mesh(object) {
            Some(mesh) => write!(
                out,
                " mesh {} ({} vertices, {} faces)",
                object.mesh_id,
                mesh.vertex_count(),
                mesh.faces().count()
            )?,
            None => write!(out, " mesh {} (missing)", object.mesh_id)?,
        }

        match scene.object_transform(object) {
            Some(transform) => write!(out, " at {:?}", transform.position)?,
            None => write!(out, " transform {} (missing)", object.transform_id)?,
        }
        writeln!(out)?;

        let submesh_count = scene.object_mesh(object).map_or(0, |mesh| mesh.submeshes.len());
        for submesh in 0..submesh_count {
            let material = scene
                .submesh_material(object, submesh)
                .map_or("<none>", |material| material.name.as_str());
            writeln!(out, "    submesh {} uses \"{}\"", submesh, material)?;
        }
    }

    for dangling in scene.dangling_references() {
        writeln!(out, "  unresolved: {:?}", dangling)?;
    }

    Ok(())
}

/// Decodes every .a3d file below the directory given as the first argument, or below
/// `demos/a3d_files` when no argument is given, and prints a summary of each.
pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let root = match env::args_os().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/a3d_files"),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for entry in WalkDir::new(&root) {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "a3d") {
            continue;
        }

        match Scene::from_path(path) {
            Ok(scene) => print_scene(&mut out, path, &scene)?,
            Err(A3dParseError::IoError(e)) => return Err(e.into()),
            Err(e) => writeln!(out, "{}: {}", path.display(), e)?,
        }
    }

    out.flush()?;
    Ok(())
}
