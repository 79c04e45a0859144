//! Scene tree nodes.

use std::rc::Rc;
use std::sync::Arc;

use prism_core::material::MaterialKind;
use prism_core::math::{
    Aabb, Mat4, Quat, Vec3, mat4_from_scale_rotation_translation, mat4_from_translation,
    mat4_is_translation_only,
};
use prism_core::mesh::MeshBuffer;

use crate::shader::ShaderInfo;

/// Local-to-parent transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::from_matrix(Mat4::identity())
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_matrix(mat4_from_translation(translation))
    }

    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self::from_matrix(mat4_from_scale_rotation_translation(scale, rotation, translation))
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// `child` expressed in this transform's parent space.
    pub fn then(&self, child: &Transform) -> Transform {
        Self::from_matrix(self.matrix * child.matrix)
    }

    pub fn is_translation_only(&self) -> bool {
        mat4_is_translation_only(&self.matrix)
    }
}

/// A mesh drawn with one material.
///
/// The mesh is shared: cloning a shape or building many shapes from one
/// `Arc<MeshBuffer>` uploads the geometry once.
#[derive(Debug, Clone)]
pub struct Shape {
    mesh: Arc<MeshBuffer>,
    bounds: Option<Aabb>,
    pub material: MaterialKind,
    pub transform: Transform,
    /// Replaces the default shader variants for this shape.
    pub shader: Option<Rc<ShaderInfo>>,
    pub visible: bool,
    pub label: Option<String>,
}

impl Shape {
    pub fn new(mesh: Arc<MeshBuffer>, material: impl Into<MaterialKind>) -> Self {
        let bounds = mesh.bounds();
        Self {
            mesh,
            bounds,
            material: material.into(),
            transform: Transform::identity(),
            shader: None,
            visible: true,
            label: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_shader(mut self, shader: Rc<ShaderInfo>) -> Self {
        self.shader = Some(shader);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn mesh(&self) -> &Arc<MeshBuffer> {
        &self.mesh
    }

    /// Bounds of the mesh in the shape's local space; `None` for an empty
    /// mesh.
    pub fn local_bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub(crate) fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("<shape>")
    }
}

/// Shapes and groups sharing one transform.
#[derive(Debug, Clone)]
pub struct ShapeGroup {
    pub transform: Transform,
    pub children: Vec<Node>,
    pub visible: bool,
}

impl Default for ShapeGroup {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            children: Vec::new(),
            visible: true,
        }
    }
}

impl ShapeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Number of shapes below this group.
    pub fn shape_count(&self) -> usize {
        self.children.iter().map(Node::shape_count).sum()
    }
}

/// One entry of a scene tree.
#[derive(Debug, Clone)]
pub enum Node {
    Shape(Shape),
    Group(ShapeGroup),
}

impl Node {
    pub fn transform(&self) -> &Transform {
        match self {
            Node::Shape(shape) => &shape.transform,
            Node::Group(group) => &group.transform,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Node::Shape(shape) => shape.visible,
            Node::Group(group) => group.visible,
        }
    }

    pub fn shape_count(&self) -> usize {
        match self {
            Node::Shape(_) => 1,
            Node::Group(group) => group.shape_count(),
        }
    }
}

impl From<Shape> for Node {
    fn from(shape: Shape) -> Self {
        Node::Shape(shape)
    }
}

impl From<ShapeGroup> for Node {
    fn from(group: ShapeGroup) -> Self {
        Node::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use prism_core::material::Material;
    use prism_core::math::quat_from_axis_angle;
    use prism_core::shapes::{ShapeOptions, create_box};

    use super::*;

    fn unit_box() -> Arc<MeshBuffer> {
        Arc::new(create_box(1.0, 1.0, 1.0, ShapeOptions::new()).unwrap().to_mesh_buffer())
    }

    #[test]
    fn transforms_compose_parent_first() {
        let parent = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let child = Transform::from_scale_rotation_translation(
            Vec3::new(2.0, 2.0, 2.0),
            quat_from_axis_angle(0.0, &Vec3::z()),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let world = parent.then(&child);
        let origin = world.matrix() * prism_core::math::Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((origin.xyz() - Vec3::new(3.0, 1.0, 0.0)).norm() < 1e-6);
        assert!(parent.is_translation_only());
        assert!(!world.is_translation_only());
        assert_eq!(Transform::default(), Transform::identity());
        assert_eq!(*Transform::identity().matrix(), Mat4::identity());
    }

    #[test]
    fn shape_caches_mesh_bounds() {
        let shape = Shape::new(unit_box(), Material::new()).with_label("crate");
        let bounds = shape.local_bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(shape.label_or_default(), "crate");
        assert!(shape.visible);
    }

    #[test]
    fn groups_count_nested_shapes() {
        let mesh = unit_box();
        let inner = ShapeGroup::new()
            .with_child(Shape::new(Arc::clone(&mesh), Material::new()))
            .with_child(Shape::new(Arc::clone(&mesh), Material::new()));
        let mut outer = ShapeGroup::new().with_child(inner);
        outer.push(Shape::new(mesh, Material::new()));
        assert_eq!(outer.shape_count(), 3);
        assert!(Node::from(outer).is_visible());
    }
}
