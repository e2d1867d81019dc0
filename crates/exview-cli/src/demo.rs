//! Procedural demo assembly

use anyhow::{Context, Result};
use exview_core::{MeshGeometry, NodeId, SceneGraph, Transform};
use glam::{Quat, Vec3};

/// Spawn the demo assembly and return its root.
///
/// A base plate, a central shaft, a rotor group with four blades, a bolt
/// group with four corner bolts and an open shim panel. The shaft sits on
/// the assembly center and the shim has border edges only.
pub fn build(scene: &mut SceneGraph) -> Result<NodeId> {
    let root = scene.spawn("assembly");

    part(scene, root, "base", Vec3::new(0.0, -1.0, 0.0), Vec3::new(4.0, 0.5, 4.0))?;
    part(scene, root, "shaft", Vec3::ZERO, Vec3::new(0.4, 3.0, 0.4))?;

    let rotor = scene.spawn_child(root, "rotor", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))?;
    for i in 0..4 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2;
        let rotation = Quat::from_rotation_y(angle);
        let blade = scene.spawn_child(
            rotor,
            format!("blade_{i}"),
            Transform::new(rotation * Vec3::X, rotation, Vec3::ONE),
        )?;
        set_mesh(scene, blade, MeshGeometry::cuboid(Vec3::new(1.2, 0.1, 0.3)))?;
    }

    let bolts = scene.spawn_child(root, "bolts", Transform::from_position(Vec3::new(0.0, -1.0, 0.0)))?;
    for (i, (x, z)) in [(1.5, 1.5), (-1.5, 1.5), (-1.5, -1.5), (1.5, -1.5)].into_iter().enumerate() {
        part(scene, bolts, &format!("bolt_{i}"), Vec3::new(x, 0.4, z), Vec3::new(0.2, 0.6, 0.2))?;
    }

    let shim = scene.spawn_child(root, "shim", Transform::from_position(Vec3::new(0.0, -0.7, 0.0)))?;
    set_mesh(
        scene,
        shim,
        MeshGeometry::triangles(vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ]),
    )?;

    scene.update_transforms();
    Ok(root)
}

fn part(scene: &mut SceneGraph, parent: NodeId, name: &str, position: Vec3, size: Vec3) -> Result<NodeId> {
    let id = scene.spawn_child(parent, name, Transform::from_position(position))?;
    set_mesh(scene, id, MeshGeometry::cuboid(size))?;
    Ok(id)
}

fn set_mesh(scene: &mut SceneGraph, id: NodeId, mesh: MeshGeometry) -> Result<()> {
    let node = scene.get_node_mut(id).with_context(|| format!("node {id} vanished"))?;
    node.mesh = Some(mesh);
    Ok(())
}
