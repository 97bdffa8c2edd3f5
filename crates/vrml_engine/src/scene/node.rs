//! Scene node types
//!
//! Every node the parser understands is a variant of [`NodeKind`]. Grouping
//! nodes hold their children as [`NodeId`]s into the owning
//! [`SceneGraph`](super::SceneGraph), so a node reused through `USE` appears in
//! several child lists while existing once.
//!
//! Multi-valued fields that the traversal treats as "only overwrite what was
//! written" (material channels) default to empty lists. The parser fills them
//! only when the field is present in the file.

use bitflags::bitflags;

use crate::assets::Location;
use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3, Vec4};
use super::NodeId;

/// A node stored in the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Name given through `DEF`, if any
    pub name: Option<String>,
    /// Node payload
    pub kind: NodeKind,
}

impl SceneNode {
    /// Create an unnamed node
    pub fn new(kind: NodeKind) -> Self {
        Self { name: None, kind }
    }
}

/// Closed set of node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Separator, Group or TransformSeparator
    Group(Group),
    /// Switch
    Switch(Switch),
    /// Level of detail
    Lod(Lod),
    /// WWWAnchor
    Anchor(Anchor),
    /// WWWInline
    Inline(Inline),
    /// Transform and its Translation/Rotation/Scale shorthands
    Transform(Transform),
    /// MatrixTransform
    MatrixTransform(Mat4),
    /// Material
    Material(Material),
    /// Texture2
    Texture2(Texture2),
    /// Texture2Transform
    Texture2Transform(Texture2Transform),
    /// TextureCoordinate2
    TextureCoordinate2(Vec<Vec2>),
    /// Coordinate3
    Coordinate3(Vec<Vec3>),
    /// Normal
    Normal(Vec<Vec3>),
    /// NormalBinding
    NormalBinding(Binding),
    /// MaterialBinding
    MaterialBinding(Binding),
    /// ShapeHints
    ShapeHints(ShapeHints),
    /// Directional, point or spot light
    Light(LightNode),
    /// Perspective or orthographic camera
    Camera(CameraNode),
    /// Cube
    Cube(Cube),
    /// Sphere
    Sphere(Sphere),
    /// Cone
    Cone(Cone),
    /// Cylinder
    Cylinder(Cylinder),
    /// IndexedFaceSet
    IndexedFaceSet(IndexedShape),
    /// IndexedLineSet
    IndexedLineSet(IndexedShape),
    /// PointSet
    PointSet(PointSet),
    /// FontStyle
    FontStyle(FontStyle),
    /// AsciiText
    AsciiText(AsciiText),
    /// Info
    Info(String),
    /// Placeholder for a node type the parser does not know
    Unknown(String),
}

impl NodeKind {
    /// Children of a grouping node, empty for everything else
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Group(group) => &group.children,
            Self::Switch(switch) => &switch.children,
            Self::Lod(lod) => &lod.children,
            Self::Anchor(anchor) => &anchor.children,
            Self::Inline(inline) => &inline.children,
            _ => &[],
        }
    }

    /// Mutable child list for grouping nodes
    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Self::Group(group) => Some(&mut group.children),
            Self::Switch(switch) => Some(&mut switch.children),
            Self::Lod(lod) => Some(&mut lod.children),
            Self::Anchor(anchor) => Some(&mut anchor.children),
            Self::Inline(inline) => Some(&mut inline.children),
            _ => None,
        }
    }

    /// Whether this kind groups children
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            Self::Group(_) | Self::Switch(_) | Self::Lod(_) | Self::Anchor(_) | Self::Inline(_)
        )
    }

    /// Whether leaving this node restores the traversal properties it was
    /// entered with.
    ///
    /// The accumulated transform is restored on leaving any group regardless.
    pub fn restores_state(&self) -> bool {
        match self {
            Self::Group(group) => group.kind == GroupKind::Separator,
            Self::Anchor(_) | Self::Inline(_) => true,
            _ => false,
        }
    }

    /// Whether this node emits geometry
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            Self::Cube(_)
                | Self::Sphere(_)
                | Self::Cone(_)
                | Self::Cylinder(_)
                | Self::IndexedFaceSet(_)
                | Self::IndexedLineSet(_)
                | Self::PointSet(_)
                | Self::AsciiText(_)
        )
    }

    /// File-format type name, used in log output
    pub fn type_name(&self) -> &str {
        match self {
            Self::Group(group) => match group.kind {
                GroupKind::Separator => "Separator",
                GroupKind::Group => "Group",
                GroupKind::TransformSeparator => "TransformSeparator",
            },
            Self::Switch(_) => "Switch",
            Self::Lod(_) => "LOD",
            Self::Anchor(_) => "WWWAnchor",
            Self::Inline(_) => "WWWInline",
            Self::Transform(_) => "Transform",
            Self::MatrixTransform(_) => "MatrixTransform",
            Self::Material(_) => "Material",
            Self::Texture2(_) => "Texture2",
            Self::Texture2Transform(_) => "Texture2Transform",
            Self::TextureCoordinate2(_) => "TextureCoordinate2",
            Self::Coordinate3(_) => "Coordinate3",
            Self::Normal(_) => "Normal",
            Self::NormalBinding(_) => "NormalBinding",
            Self::MaterialBinding(_) => "MaterialBinding",
            Self::ShapeHints(_) => "ShapeHints",
            Self::Light(light) => match light.kind {
                LightKind::Directional { .. } => "DirectionalLight",
                LightKind::Point { .. } => "PointLight",
                LightKind::Spot { .. } => "SpotLight",
            },
            Self::Camera(camera) => match camera.projection {
                CameraProjection::Perspective { .. } => "PerspectiveCamera",
                CameraProjection::Orthographic { .. } => "OrthographicCamera",
            },
            Self::Cube(_) => "Cube",
            Self::Sphere(_) => "Sphere",
            Self::Cone(_) => "Cone",
            Self::Cylinder(_) => "Cylinder",
            Self::IndexedFaceSet(_) => "IndexedFaceSet",
            Self::IndexedLineSet(_) => "IndexedLineSet",
            Self::PointSet(_) => "PointSet",
            Self::FontStyle(_) => "FontStyle",
            Self::AsciiText(_) => "AsciiText",
            Self::Info(_) => "Info",
            Self::Unknown(name) => name,
        }
    }
}

/// Flavour of a plain grouping node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Scopes properties to its children
    Separator,
    /// Properties leak to later siblings
    Group,
    /// Scopes only the transform
    TransformSeparator,
}

/// Separator, Group or TransformSeparator
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Which grouping behaviour applies
    pub kind: GroupKind,
    /// Ordered children
    pub children: Vec<NodeId>,
}

impl Group {
    /// Empty group of the given kind
    pub fn new(kind: GroupKind) -> Self {
        Self { kind, children: Vec::new() }
    }
}

/// `whichChild` value selecting no child
pub const SWITCH_NONE: i32 = -1;
/// `whichChild` value selecting every child
pub const SWITCH_ALL: i32 = -3;

/// Switch
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    /// Index of the child to traverse
    pub which_child: i32,
    /// Ordered children
    pub children: Vec<NodeId>,
}

impl Default for Switch {
    fn default() -> Self {
        Self { which_child: SWITCH_NONE, children: Vec::new() }
    }
}

/// Level of detail
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lod {
    /// Ascending distance thresholds
    pub range: Vec<f32>,
    /// Object-space point distances are measured from
    pub center: Vec3,
    /// Children from most to least detailed
    pub children: Vec<NodeId>,
}

/// How an anchor reports the picked point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorMap {
    /// Plain URL
    #[default]
    None,
    /// Append the object-space hit point as a query
    Point,
}

/// WWWAnchor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Anchor {
    /// Target URL (`name` field)
    pub url: String,
    /// Human-readable description
    pub description: String,
    /// Map mode
    pub map: AnchorMap,
    /// Ordered children
    pub children: Vec<NodeId>,
}

/// Load lifecycle of an inline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InlineStatus {
    /// Not yet requested
    #[default]
    Pending,
    /// Fetch in flight
    Loading,
    /// Children published
    Loaded,
    /// Fetch or parse failed; never retried
    Failed,
}

/// WWWInline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inline {
    /// Referenced document (`name` field)
    pub url: String,
    /// Declared bounding box size
    pub bbox_size: Vec3,
    /// Declared bounding box center
    pub bbox_center: Vec3,
    /// Current load status
    pub status: InlineStatus,
    /// Resolved location once loaded; relative references inside resolve against it
    pub location: Option<Location>,
    /// Children published after loading
    pub children: Vec<NodeId>,
}

/// Transform node
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,
    /// Rotation as axis plus angle
    pub rotation: Vec4,
    /// Per-axis scale
    pub scale_factor: Vec3,
    /// Orientation of the scale axes
    pub scale_orientation: Vec4,
    /// Pivot for rotation and scale
    pub center: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            scale_factor: Vec3::new(1.0, 1.0, 1.0),
            scale_orientation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            center: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Local matrix `T · C · R · SO · S · SO⁻¹ · C⁻¹`
    pub fn to_matrix(&self) -> Mat4 {
        let scale_orientation = Mat4::from_axis_angle4(self.scale_orientation);
        Mat4::new_translation(&self.translation)
            * Mat4::new_translation(&self.center)
            * Mat4::from_axis_angle4(self.rotation)
            * scale_orientation
            * Mat4::new_nonuniform_scaling(&self.scale_factor)
            * scale_orientation.transpose()
            * Mat4::new_translation(&-self.center)
    }
}

/// Material channels as written in the file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    /// Diffuse colors
    pub diffuse: Vec<Vec3>,
    /// Ambient colors
    pub ambient: Vec<Vec3>,
    /// Specular colors
    pub specular: Vec<Vec3>,
    /// Emissive colors
    pub emissive: Vec<Vec3>,
    /// Shininess values
    pub shininess: Vec<f32>,
    /// Transparency values
    pub transparency: Vec<f32>,
}

/// Texture wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Tile the image
    #[default]
    Repeat,
    /// Clamp to the edge texel
    Clamp,
}

/// Texture2
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture2 {
    /// Image reference; empty clears the current texture
    pub filename: String,
    /// Horizontal wrap
    pub wrap_s: WrapMode,
    /// Vertical wrap
    pub wrap_t: WrapMode,
}

/// Texture2Transform
#[derive(Debug, Clone, PartialEq)]
pub struct Texture2Transform {
    /// Translation in texture space
    pub translation: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Scale in texture space
    pub scale_factor: Vec2,
    /// Pivot for rotation and scale
    pub center: Vec2,
}

impl Default for Texture2Transform {
    fn default() -> Self {
        Self {
            translation: Vec2::zeros(),
            rotation: 0.0,
            scale_factor: Vec2::new(1.0, 1.0),
            center: Vec2::zeros(),
        }
    }
}

impl Texture2Transform {
    /// Texture matrix `T · C · R · S · C⁻¹`
    pub fn to_matrix(&self) -> Mat4 {
        let (sin, cos) = self.rotation.sin_cos();
        let rotation = nalgebra::Matrix3::new(
            cos, -sin, 0.0,
            sin, cos, 0.0,
            0.0, 0.0, 1.0,
        );
        let affine = nalgebra::Matrix3::new_translation(&(self.translation + self.center))
            * rotation
            * nalgebra::Matrix3::new_nonuniform_scaling(&self.scale_factor)
            * nalgebra::Matrix3::new_translation(&-self.center);
        Mat4::from_texture_affine(&affine)
    }
}

/// Normal or material binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// Shape decides
    #[default]
    Default,
    /// One value for the whole shape
    Overall,
    /// One value per part
    PerPart,
    /// One value per part, through an index
    PerPartIndexed,
    /// One value per face
    PerFace,
    /// One value per face, through an index
    PerFaceIndexed,
    /// One value per vertex
    PerVertex,
    /// One value per vertex, through an index
    PerVertexIndexed,
}

impl Binding {
    /// Parse a binding keyword, returning `None` for anything unrecognized
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "DEFAULT" => Self::Default,
            "OVERALL" => Self::Overall,
            "PER_PART" => Self::PerPart,
            "PER_PART_INDEXED" => Self::PerPartIndexed,
            "PER_FACE" => Self::PerFace,
            "PER_FACE_INDEXED" => Self::PerFaceIndexed,
            "PER_VERTEX" => Self::PerVertex,
            "PER_VERTEX_INDEXED" => Self::PerVertexIndexed,
            _ => return None,
        })
    }
}

/// Winding of face vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexOrdering {
    /// Not specified
    #[default]
    UnknownOrdering,
    /// Front faces wind clockwise
    Clockwise,
    /// Front faces wind counter-clockwise
    CounterClockwise,
}

/// ShapeHints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHints {
    /// Face winding
    pub vertex_ordering: VertexOrdering,
    /// Whether the shape is known to be closed
    pub solid: bool,
    /// Whether faces are known to be convex
    pub convex: bool,
    /// Angle below which normals are smoothed
    pub crease_angle: f32,
}

impl Default for ShapeHints {
    fn default() -> Self {
        Self {
            vertex_ordering: VertexOrdering::UnknownOrdering,
            solid: false,
            convex: true,
            crease_angle: 0.5,
        }
    }
}

/// Kind-specific light parameters
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Infinitely distant light
    Directional {
        /// Direction the light travels
        direction: Vec3,
    },
    /// Omnidirectional light
    Point {
        /// Position
        location: Vec3,
    },
    /// Cone light
    Spot {
        /// Position
        location: Vec3,
        /// Cone axis
        direction: Vec3,
        /// Falloff exponent
        drop_off_rate: f32,
        /// Half-angle of the cone in radians
        cut_off_angle: f32,
    },
}

/// Directional, point or spot light
#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    /// Whether the light contributes at all
    pub on: bool,
    /// Brightness
    pub intensity: f32,
    /// Color
    pub color: Vec3,
    /// Kind-specific parameters
    pub kind: LightKind,
}

impl LightNode {
    /// Directional light with defaults
    pub fn directional() -> Self {
        Self::with_kind(LightKind::Directional { direction: Vec3::new(0.0, 0.0, -1.0) })
    }

    /// Point light with defaults
    pub fn point() -> Self {
        Self::with_kind(LightKind::Point { location: Vec3::new(0.0, 0.0, 1.0) })
    }

    /// Spot light with defaults
    pub fn spot() -> Self {
        Self::with_kind(LightKind::Spot {
            location: Vec3::new(0.0, 0.0, 1.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
            drop_off_rate: 0.0,
            cut_off_angle: 0.785_398,
        })
    }

    fn with_kind(kind: LightKind) -> Self {
        Self { on: true, intensity: 1.0, color: Vec3::new(1.0, 1.0, 1.0), kind }
    }
}

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    /// Perspective with a vertical view angle in radians
    Perspective {
        /// Vertical view angle
        height_angle: f32,
    },
    /// Orthographic with a visible height in world units
    Orthographic {
        /// Visible height
        height: f32,
    },
}

/// PerspectiveCamera or OrthographicCamera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraNode {
    /// Eye position
    pub position: Vec3,
    /// Orientation applied to the default -Z view direction
    pub orientation: Vec4,
    /// Distance to the point of interest
    pub focal_distance: f32,
    /// Projection parameters
    pub projection: CameraProjection,
}

impl CameraNode {
    /// PerspectiveCamera with defaults
    pub fn perspective() -> Self {
        Self::with_projection(CameraProjection::Perspective { height_angle: 0.785_398 })
    }

    /// OrthographicCamera with defaults
    pub fn orthographic() -> Self {
        Self::with_projection(CameraProjection::Orthographic { height: 2.0 })
    }

    fn with_projection(projection: CameraProjection) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            orientation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            focal_distance: 5.0,
            projection,
        }
    }
}

/// Cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    /// Size along X
    pub width: f32,
    /// Size along Y
    pub height: f32,
    /// Size along Z
    pub depth: f32,
}

impl Default for Cube {
    fn default() -> Self {
        Self { width: 2.0, height: 2.0, depth: 2.0 }
    }
}

impl Cube {
    /// Half extents of the box
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth) * 0.5
    }
}

/// Sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Radius
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

bitflags! {
    /// Cone parts to generate
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConeParts: u8 {
        /// Slanted side
        const SIDES = 0b01;
        /// Bottom cap
        const BOTTOM = 0b10;
        /// Everything
        const ALL = Self::SIDES.bits() | Self::BOTTOM.bits();
    }
}

bitflags! {
    /// Cylinder parts to generate
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CylinderParts: u8 {
        /// Curved side
        const SIDES = 0b001;
        /// Top cap
        const TOP = 0b010;
        /// Bottom cap
        const BOTTOM = 0b100;
        /// Everything
        const ALL = Self::SIDES.bits() | Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

/// Cone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    /// Parts to generate
    pub parts: ConeParts,
    /// Radius of the base
    pub bottom_radius: f32,
    /// Height along Y
    pub height: f32,
}

impl Default for Cone {
    fn default() -> Self {
        Self { parts: ConeParts::ALL, bottom_radius: 1.0, height: 2.0 }
    }
}

/// Cylinder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    /// Parts to generate
    pub parts: CylinderParts,
    /// Radius
    pub radius: f32,
    /// Height along Y
    pub height: f32,
}

impl Default for Cylinder {
    fn default() -> Self {
        Self { parts: CylinderParts::ALL, radius: 1.0, height: 2.0 }
    }
}

/// IndexedFaceSet or IndexedLineSet
///
/// Each index list uses `-1` to terminate a face or polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedShape {
    /// Indices into the current coordinates
    pub coord_index: Vec<i32>,
    /// Indices into the current material palette
    pub material_index: Vec<i32>,
    /// Indices into the current normals
    pub normal_index: Vec<i32>,
    /// Indices into the current texture coordinates
    pub texture_coord_index: Vec<i32>,
}

/// PointSet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSet {
    /// First coordinate used
    pub start_index: i32,
    /// Number of points, `-1` for all remaining
    pub num_points: i32,
}

impl Default for PointSet {
    fn default() -> Self {
        Self { start_index: 0, num_points: -1 }
    }
}

/// Font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    /// Serif face
    #[default]
    Serif,
    /// Sans-serif face
    Sans,
    /// Fixed-width face
    Typewriter,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    /// Regular
    #[default]
    None,
    /// Bold
    Bold,
    /// Italic
    Italic,
}

/// FontStyle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Line height in world units
    pub size: f32,
    /// Family
    pub family: FontFamily,
    /// Style
    pub style: FontWeight,
}

impl FontStyle {
    /// The style in effect before any FontStyle node
    pub const DEFAULT: Self = Self { size: 10.0, family: FontFamily::Serif, style: FontWeight::None };
}

impl Default for FontStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    /// Lines start at the origin
    #[default]
    Left,
    /// Lines are centered on the origin
    Center,
    /// Lines end at the origin
    Right,
}

/// AsciiText
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiText {
    /// One entry per line
    pub strings: Vec<String>,
    /// Line spacing as a multiple of the font size
    pub spacing: f32,
    /// Alignment
    pub justification: Justification,
    /// Requested width per line, zero for natural width
    pub width: Vec<f32>,
}

impl Default for AsciiText {
    fn default() -> Self {
        Self {
            strings: Vec::new(),
            spacing: 1.0,
            justification: Justification::Left,
            width: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_defaults_are_identity() {
        assert_eq!(Transform::default().to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_transform_applies_scale_then_rotate_then_translate() {
        let transform = Transform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation: Vec4::new(0.0, 0.0, 1.0, std::f32::consts::FRAC_PI_2),
            scale_factor: Vec3::new(2.0, 2.0, 2.0),
            ..Default::default()
        };
        let p = transform.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_transform_center_is_fixed_point() {
        let transform = Transform {
            rotation: Vec4::new(0.0, 0.0, 1.0, 1.3),
            scale_factor: Vec3::new(3.0, 0.5, 2.0),
            center: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let p = transform.to_matrix().transform_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_texture_transform_translates_uv() {
        let transform = Texture2Transform {
            translation: Vec2::new(0.5, 0.25),
            ..Default::default()
        };
        let uv = transform.to_matrix().transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(uv.x, 0.5);
        assert_relative_eq!(uv.y, 0.25);
    }

    #[test]
    fn test_restores_state_per_kind() {
        assert!(NodeKind::Group(Group::new(GroupKind::Separator)).restores_state());
        assert!(!NodeKind::Group(Group::new(GroupKind::Group)).restores_state());
        assert!(!NodeKind::Group(Group::new(GroupKind::TransformSeparator)).restores_state());
        assert!(!NodeKind::Switch(Switch::default()).restores_state());
        assert!(NodeKind::Anchor(Anchor::default()).restores_state());
        assert!(NodeKind::Inline(Inline::default()).restores_state());
    }

    #[test]
    fn test_binding_keywords() {
        assert_eq!(Binding::from_keyword("PER_FACE"), Some(Binding::PerFace));
        assert_eq!(Binding::from_keyword("PER_VERTEX_INDEXED"), Some(Binding::PerVertexIndexed));
        assert_eq!(Binding::from_keyword("SIDEWAYS"), None);
    }
}
