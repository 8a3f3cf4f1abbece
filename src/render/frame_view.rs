use glam::{Mat4, Vec3};

use crate::core::FrameInfo;
use crate::scene::{
    GeometryAnimator, Light, LightingRig, MaterialFactory, MaterialHandle, Mesh, NodeKey,
    ParticleCloud, PerspectiveCamera, PointsMaterial, SceneGraph, StandardMaterial,
};

/// One triangle mesh to draw this frame
#[derive(Debug, Clone)]
pub struct MeshDraw<'a> {
    pub node: NodeKey,
    pub mesh: &'a Mesh,
    pub model: Mat4,
    pub material: &'a StandardMaterial,
    /// Distance from the camera to the object's origin
    pub depth: f32,
}

/// The particle cloud, drawn as camera-facing sprites
#[derive(Debug, Clone)]
pub struct PointsDraw<'a> {
    pub cloud: &'a ParticleCloud,
    pub model: Mat4,
    pub material: &'a PointsMaterial,
}

/// Everything a surface needs to render one frame
///
/// Only nodes attached to the scene graph whose materials are still live are
/// collected. Opaque meshes come first, transparent meshes follow sorted
/// back to front.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub frame: FrameInfo,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub lights: Vec<&'a Light>,
    pub meshes: Vec<MeshDraw<'a>>,
    pub points: Option<PointsDraw<'a>>,
    pub materials: &'a MaterialFactory,
    pub exposure: f32,
    pub transparent: bool,
}

impl<'a> FrameView<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        frame: FrameInfo,
        camera: &PerspectiveCamera,
        graph: &SceneGraph,
        animator: &'a GeometryAnimator,
        lighting: &'a LightingRig,
        materials: &'a MaterialFactory,
        exposure: f32,
        transparent: bool,
    ) -> Self {
        let eye = camera.position;
        let mut meshes = Vec::new();

        let standard = |node: NodeKey, handle: MaterialHandle| {
            graph
                .contains(node)
                .then(|| materials.material(handle)?.as_standard())
                .flatten()
        };

        if let Some(plane) = animator.image_plane() {
            if let Some(material) = standard(NodeKey::ImagePlane, plane.material) {
                meshes.push(MeshDraw {
                    node: NodeKey::ImagePlane,
                    mesh: &plane.mesh,
                    model: plane.transform.matrix(),
                    material,
                    depth: eye.distance(plane.transform.position),
                });
            }
        }

        for (index, solid) in animator.solids().iter().enumerate() {
            let node = NodeKey::Solid(index);
            if let Some(material) = standard(node, solid.material) {
                meshes.push(MeshDraw {
                    node,
                    mesh: &solid.mesh,
                    model: solid.transform.matrix(),
                    material,
                    depth: eye.distance(solid.transform.position),
                });
            }
        }

        sort_for_blending(&mut meshes);

        let points = animator
            .particles()
            .filter(|_| graph.contains(NodeKey::Particles))
            .and_then(|cloud| {
                let material = materials.material(cloud.material)?.as_points()?;
                Some(PointsDraw {
                    cloud,
                    model: cloud.transform.matrix(),
                    material,
                })
            });

        let lights = graph
            .lights()
            .filter_map(|index| lighting.lights().get(index))
            .collect();

        Self {
            frame,
            view: camera.view(),
            projection: camera.projection(),
            camera_position: eye,
            lights,
            meshes,
            points,
            materials,
            exposure,
            transparent,
        }
    }

    /// Number of draw calls this frame will issue
    pub fn draw_count(&self) -> usize {
        self.meshes.len() + usize::from(self.points.is_some())
    }
}

fn sort_for_blending(meshes: &mut [MeshDraw<'_>]) {
    meshes.sort_by(|a, b| {
        a.material
            .transparent
            .cmp(&b.material.transparent)
            .then_with(|| {
                if a.material.transparent {
                    b.depth.total_cmp(&a.depth)
                } else {
                    a.depth.total_cmp(&b.depth)
                }
            })
    });
}
