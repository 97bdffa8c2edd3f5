//! # Scene Traversal
//!
//! Depth-first walk of a [`SceneGraph`] that turns it into draw commands.
//!
//! Property nodes (transforms, materials, coordinates, bindings, textures,
//! fonts) update a [`TraversalState`] that is threaded through the walk by
//! value. Each child of a group sees the state left by its previous siblings.
//! On leaving a group the accumulated transform always reverts. The other
//! properties revert only for kinds whose [`NodeKind::restores_state`] is set,
//! and leak to later siblings otherwise.
//!
//! Lights and viewpoints are gathered by separate passes over the same graph
//! before drawing, so their effect does not depend on document order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::{
    InlineRequest, Location, TextBitmap, TextRasterizer, TextRequest, TextureCache, TextureHandle,
    TextureLoader,
};
use crate::core::config::ViewerConfig;
use crate::foundation::math::{Mat4, Point3, Vec2, Vec3};
use crate::scene::node::{
    AsciiText, Binding, CameraNode, FontStyle, InlineStatus, ShapeHints, WrapMode,
};
use crate::scene::{active_children, NodeId, NodeKind, SceneGraph};
use super::camera::Camera;
use super::lighting::Light;
use super::material::MaterialState;
use super::mesh::{Mesh, Topology};
use super::mesh_cache::MeshCache;
use super::tessellate::{self, text, ShapeContext};
use super::uniforms::{DrawParams, Uniforms};

/// A texture together with its sampler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundTexture {
    /// Host texture
    pub handle: TextureHandle,
    /// Horizontal wrap
    pub wrap_s: WrapMode,
    /// Vertical wrap
    pub wrap_t: WrapMode,
}

/// Inherited properties at one point of the walk
///
/// Slices borrow the property nodes that set them, so copying the state is
/// cheap and save/restore is plain assignment.
#[derive(Debug, Clone, Copy)]
pub struct TraversalState<'g> {
    /// Accumulated model transform
    pub transform: Mat4,
    /// Active material
    pub material: MaterialState,
    /// Diffuse colors of the last Material node, for per-face/per-vertex binding
    pub palette: &'g [Vec3],
    /// Current texture
    pub texture: Option<BoundTexture>,
    /// Accumulated texture-coordinate transform
    pub texture_transform: Mat4,
    /// Current Coordinate3
    pub coordinates: &'g [Vec3],
    /// Current TextureCoordinate2
    pub tex_coords: &'g [Vec2],
    /// Current Normal
    pub normals: &'g [Vec3],
    /// Current NormalBinding
    pub normal_binding: Binding,
    /// Current MaterialBinding
    pub material_binding: Binding,
    /// Current FontStyle
    pub font: FontStyle,
    /// Current ShapeHints
    pub shape_hints: ShapeHints,
    /// Location relative references resolve against
    pub base: Option<&'g Location>,
}

impl<'g> TraversalState<'g> {
    /// Default state at the root of a document
    pub fn root(base: Option<&'g Location>) -> Self {
        Self {
            transform: Mat4::identity(),
            material: MaterialState::default(),
            palette: &[],
            texture: None,
            texture_transform: Mat4::identity(),
            coordinates: &[],
            tex_coords: &[],
            normals: &[],
            normal_binding: Binding::Default,
            material_binding: Binding::Default,
            font: FontStyle::DEFAULT,
            shape_hints: ShapeHints::default(),
            base,
        }
    }

    fn shape_context(&self, segments: u32) -> ShapeContext<'g> {
        ShapeContext {
            coordinates: self.coordinates,
            normals: self.normals,
            tex_coords: self.tex_coords,
            palette: self.palette,
            material_binding: self.material_binding,
            normal_binding: self.normal_binding,
            shape_hints: self.shape_hints,
            diffuse: self.material.diffuse_rgba(),
            segments,
        }
    }
}

/// One draw request for the GPU backend
#[derive(Debug, Clone)]
pub struct DrawCommand {
    /// Shape node that produced the draw
    pub node: NodeId,
    /// Cached geometry
    pub mesh: Arc<Mesh>,
    /// Model transform
    pub model: Mat4,
    /// Material snapshot
    pub material: MaterialState,
    /// Uniform block
    pub uniforms: Uniforms,
    /// Bound texture, if any
    pub texture: Option<BoundTexture>,
    /// Whether lighting is skipped
    pub unlit: bool,
}

/// Everything one frame produced
#[derive(Debug, Default)]
pub struct FrameOutput {
    /// Draws in document order
    pub draws: Vec<DrawCommand>,
    /// World-space lights; never empty when the headlight is enabled
    pub lights: Vec<Light>,
    /// Inlines reached in `Pending` status, to be fetched
    pub pending_inlines: Vec<InlineRequest>,
    /// Pending inlines whose reference could not be resolved
    pub unresolved_inlines: Vec<NodeId>,
}

/// A camera node discovered in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    /// Camera node
    pub node: NodeId,
    /// Camera fields
    pub camera: CameraNode,
    /// Accumulated transform at the camera
    pub world: Mat4,
}

/// Host services needed while drawing
pub struct HostServices<'a> {
    /// Texture loader for Texture2 nodes
    pub textures: &'a mut dyn TextureLoader,
    /// Rasterizer for AsciiText nodes
    pub text: &'a mut dyn TextRasterizer,
}

/// Per-frame values shared by every draw
struct FrameContext<'a, 'h> {
    view: Mat4,
    projection: Mat4,
    viewer: Point3,
    light_count: usize,
    services: &'a mut HostServices<'h>,
    output: &'a mut FrameOutput,
}

/// Turns a scene graph into draw commands, caching meshes and textures
pub struct SceneRenderer {
    meshes: MeshCache,
    textures: TextureCache,
    text: HashMap<NodeId, Option<TextBitmap>>,
    segments: u32,
    point_size: f32,
    headlight: bool,
}

impl SceneRenderer {
    /// Create a renderer using the tessellation and lighting settings of `config`
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            meshes: MeshCache::new(),
            textures: TextureCache::new(),
            text: HashMap::new(),
            segments: config.tessellation.segments,
            point_size: config.point_size,
            headlight: config.headlight,
        }
    }

    /// Drop every cached mesh, texture and text bitmap
    pub fn clear_caches(&mut self) {
        log::debug!(
            "Clearing caches: {} meshes, {} textures, {} text blocks",
            self.meshes.len(),
            self.textures.len(),
            self.text.len()
        );
        self.meshes.clear();
        self.textures.clear();
        self.text.clear();
    }

    /// Mesh cache, for inspection
    pub fn meshes(&self) -> &MeshCache {
        &self.meshes
    }

    /// Traverse `graph` from its root and build the frame.
    ///
    /// # Arguments
    /// * `graph` - Scene to draw
    /// * `camera` - Viewer camera; also the reference point for LOD
    /// * `aspect` - Viewport width divided by height
    /// * `services` - Host texture loader and text rasterizer
    pub fn render(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        aspect: f32,
        services: &mut HostServices<'_>,
    ) -> FrameOutput {
        let mut output = FrameOutput::default();
        let Some(root) = graph.root() else {
            return output;
        };
        let viewer = Point3::from(camera.position);

        output.lights = collect_lights(graph, &viewer);
        if output.lights.is_empty() && self.headlight {
            output.lights.push(Light::headlight(camera.forward()));
        }

        let mut frame = FrameContext {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect),
            viewer,
            light_count: output.lights.len(),
            services,
            output: &mut output,
        };
        self.visit(graph, root, TraversalState::root(graph.base()), &mut frame);

        log::trace!(
            "Frame: {} draws, {} lights, {} pending inlines",
            output.draws.len(),
            output.lights.len(),
            output.pending_inlines.len()
        );
        output
    }

    fn visit<'g>(
        &mut self,
        graph: &'g SceneGraph,
        id: NodeId,
        mut state: TraversalState<'g>,
        frame: &mut FrameContext<'_, '_>,
    ) -> TraversalState<'g> {
        let Some(kind) = graph.kind(id) else {
            return state;
        };

        match kind {
            NodeKind::Transform(transform) => state.transform *= transform.to_matrix(),
            NodeKind::MatrixTransform(matrix) => state.transform *= matrix,
            NodeKind::Material(material) => {
                state.material.apply(material);
                if !material.diffuse.is_empty() {
                    state.palette = material.diffuse.as_slice();
                }
            }
            NodeKind::Texture2(texture) => {
                state.texture = self
                    .textures
                    .load_or_get(&texture.filename, state.base, frame.services.textures)
                    .map(|handle| BoundTexture { handle, wrap_s: texture.wrap_s, wrap_t: texture.wrap_t });
            }
            NodeKind::Texture2Transform(transform) => state.texture_transform *= transform.to_matrix(),
            NodeKind::TextureCoordinate2(points) => state.tex_coords = points.as_slice(),
            NodeKind::Coordinate3(points) => state.coordinates = points.as_slice(),
            NodeKind::Normal(vectors) => state.normals = vectors.as_slice(),
            NodeKind::NormalBinding(binding) => state.normal_binding = *binding,
            NodeKind::MaterialBinding(binding) => state.material_binding = *binding,
            NodeKind::ShapeHints(hints) => state.shape_hints = *hints,
            NodeKind::FontStyle(font) => state.font = *font,
            NodeKind::AsciiText(text) => self.draw_text(id, text, &state, frame),
            kind if kind.is_shape() => self.draw_shape(id, kind, &state, frame),
            kind if kind.is_group() => return self.visit_group(graph, id, kind, state, frame),
            _ => {}
        }
        state
    }

    fn visit_group<'g>(
        &mut self,
        graph: &'g SceneGraph,
        id: NodeId,
        kind: &'g NodeKind,
        state: TraversalState<'g>,
        frame: &mut FrameContext<'_, '_>,
    ) -> TraversalState<'g> {
        let mut inner = state;
        if let NodeKind::Inline(inline) = kind {
            match inline.status {
                InlineStatus::Pending => {
                    queue_inline(id, &inline.url, state.base, frame.output);
                    return state;
                }
                InlineStatus::Loaded => inner.base = inline.location.as_ref().or(state.base),
                InlineStatus::Loading | InlineStatus::Failed => return state,
            }
        }

        for child in active_children(kind, &state.transform, &frame.viewer) {
            inner = self.visit(graph, *child, inner, frame);
        }

        if kind.restores_state() {
            state
        } else {
            TraversalState { transform: state.transform, base: state.base, ..inner }
        }
    }

    fn draw_shape(&mut self, id: NodeId, kind: &NodeKind, state: &TraversalState<'_>, frame: &mut FrameContext<'_, '_>) {
        let ctx = state.shape_context(self.segments);
        let Some(mesh) = self.meshes.get_or_build(id, || tessellate::tessellate(kind, &ctx)) else {
            return;
        };
        let unlit = mesh.topology != Topology::Triangles;
        self.emit(id, mesh, state, state.texture, unlit, frame);
    }

    fn draw_text(&mut self, id: NodeId, text: &AsciiText, state: &TraversalState<'_>, frame: &mut FrameContext<'_, '_>) {
        let services = &mut frame.services;
        let bitmap = *self.text.entry(id).or_insert_with(|| {
            let request = TextRequest {
                lines: &text.strings,
                style: state.font,
                justification: text.justification,
                spacing: text.spacing,
            };
            let bitmap = services.text.rasterize(&request);
            if bitmap.is_none() {
                log::warn!("Text rasterizer produced nothing for {} line(s)", text.strings.len());
            }
            bitmap
        });
        let Some(bitmap) = bitmap else {
            return;
        };

        let build = || text::text_quad(&state.font, text.justification, text.spacing, text.strings.len(), bitmap.aspect);
        let Some(mesh) = self.meshes.get_or_build(id, build) else {
            return;
        };
        let texture = BoundTexture { handle: bitmap.texture, wrap_s: WrapMode::Clamp, wrap_t: WrapMode::Clamp };
        self.emit(id, mesh, state, Some(texture), true, frame);
    }

    fn emit(
        &self,
        node: NodeId,
        mesh: Arc<Mesh>,
        state: &TraversalState<'_>,
        texture: Option<BoundTexture>,
        unlit: bool,
        frame: &mut FrameContext<'_, '_>,
    ) {
        let uniforms = Uniforms::new(&DrawParams {
            projection: &frame.projection,
            view: &frame.view,
            model: &state.transform,
            texture_transform: &state.texture_transform,
            material: &state.material,
            light_count: frame.light_count,
            has_texture: texture.is_some(),
            point_size: self.point_size,
            unlit,
        });
        frame.output.draws.push(DrawCommand {
            node,
            mesh,
            model: state.transform,
            material: state.material,
            uniforms,
            texture,
            unlit,
        });
    }
}

fn queue_inline(node: NodeId, url: &str, base: Option<&Location>, output: &mut FrameOutput) {
    if output.pending_inlines.iter().any(|request| request.node == node) || output.unresolved_inlines.contains(&node) {
        return;
    }
    match Location::resolve(base, url) {
        Ok(location) => output.pending_inlines.push(InlineRequest { node, location }),
        Err(e) => {
            log::warn!("Cannot resolve inline reference '{}': {}", url, e);
            output.unresolved_inlines.push(node);
        }
    }
}

/// Visit every non-group node reachable through active children, with the
/// transform accumulated at that node.
///
/// Transforms accumulate across siblings and revert at each group boundary.
pub fn walk_placed<'g>(graph: &'g SceneGraph, viewer: &Point3, visit: &mut dyn FnMut(NodeId, &'g NodeKind, &Mat4)) {
    fn walk<'g>(
        graph: &'g SceneGraph,
        id: NodeId,
        transform: &mut Mat4,
        viewer: &Point3,
        visit: &mut dyn FnMut(NodeId, &'g NodeKind, &Mat4),
    ) {
        let Some(kind) = graph.kind(id) else {
            return;
        };
        match kind {
            NodeKind::Transform(t) => *transform *= t.to_matrix(),
            NodeKind::MatrixTransform(m) => *transform *= m,
            kind if kind.is_group() => {
                let mut inner = *transform;
                for child in active_children(kind, transform, viewer) {
                    walk(graph, *child, &mut inner, viewer, visit);
                }
            }
            kind => visit(id, kind, transform),
        }
    }

    if let Some(root) = graph.root() {
        walk(graph, root, &mut Mat4::identity(), viewer, visit);
    }
}

/// Every switched-on light in the scene, in world space
pub fn collect_lights(graph: &SceneGraph, viewer: &Point3) -> Vec<Light> {
    let mut lights = Vec::new();
    walk_placed(graph, viewer, &mut |_, kind, transform| {
        if let NodeKind::Light(light) = kind {
            lights.extend(Light::from_node(light, transform));
        }
    });
    lights
}

/// Every camera node in discovery order
pub fn collect_viewpoints(graph: &SceneGraph, viewer: &Point3) -> Vec<Viewpoint> {
    let mut viewpoints = Vec::new();
    walk_placed(graph, viewer, &mut |node, kind, transform| {
        if let NodeKind::Camera(camera) = kind {
            viewpoints.push(Viewpoint { node, camera: camera.clone(), world: *transform });
        }
    });
    viewpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::assets::vrml::parse;
    use crate::assets::AssetError;
    use crate::render::lighting::LightType;

    #[derive(Default)]
    struct CountingTextures {
        requested: Vec<String>,
    }

    impl TextureLoader for CountingTextures {
        fn load_texture(&mut self, location: &Location) -> Result<TextureHandle, AssetError> {
            self.requested.push(location.to_string());
            if location.to_string().contains("missing") {
                return Err(AssetError::NotFound(location.to_string()));
            }
            Ok(TextureHandle(self.requested.len() as u64))
        }
    }

    struct FixedText;

    impl TextRasterizer for FixedText {
        fn rasterize(&mut self, request: &TextRequest<'_>) -> Option<TextBitmap> {
            (!request.lines.is_empty()).then_some(TextBitmap { texture: TextureHandle(99), aspect: 2.0 })
        }
    }

    fn render(renderer: &mut SceneRenderer, graph: &SceneGraph, textures: &mut CountingTextures) -> FrameOutput {
        let mut text = FixedText;
        let mut services = HostServices { textures, text: &mut text };
        renderer.render(graph, &Camera::default(), 1.0, &mut services)
    }

    fn render_text(source: &str) -> FrameOutput {
        let graph = parse(source).unwrap();
        render(&mut SceneRenderer::new(&ViewerConfig::default()), &graph, &mut CountingTextures::default())
    }

    fn translation(draw: &DrawCommand) -> Vec3 {
        draw.model.fixed_view::<3, 1>(0, 3).into_owned()
    }

    #[test]
    fn test_cube_mesh_is_cached_across_frames() {
        let graph = parse("Separator { Cube { width 2 height 2 depth 2 } }").unwrap();
        let mut renderer = SceneRenderer::new(&ViewerConfig::default());
        let mut textures = CountingTextures::default();

        let first = render(&mut renderer, &graph, &mut textures);
        let second = render(&mut renderer, &graph, &mut textures);
        assert_eq!(first.draws.len(), 1);
        assert_eq!(first.draws[0].mesh.vertex_count(), 36);
        assert!(Arc::ptr_eq(&first.draws[0].mesh, &second.draws[0].mesh));
        assert_eq!(renderer.meshes().misses(), 1);
    }

    #[test]
    fn test_transform_accumulates_across_siblings() {
        let output = render_text(
            "Separator { Translation { translation 1 0 0 } Cube {} Translation { translation 0 2 0 } Sphere {} }",
        );
        assert_relative_eq!(translation(&output.draws[0]), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(translation(&output.draws[1]), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_separator_restores_material_but_group_leaks() {
        let output = render_text(
            "Separator {
                Separator { Material { diffuseColor 1 0 0 } }
                Cube {}
                Group { Material { diffuseColor 0 0 1 } Translation { translation 5 0 0 } }
                Cube {}
            }",
        );
        assert_relative_eq!(output.draws[0].material.diffuse, Vec3::new(0.8, 0.8, 0.8));
        assert_relative_eq!(output.draws[1].material.diffuse, Vec3::new(0.0, 0.0, 1.0));
        // Transform never leaks out of a group
        assert_relative_eq!(translation(&output.draws[1]), Vec3::zeros());
    }

    #[test]
    fn test_scene_without_lights_gets_one_headlight() {
        let output = render_text("Separator { Cube {} }");
        assert_eq!(output.lights.len(), 1);
        assert_eq!(output.lights[0].light_type, LightType::Directional);
        assert_relative_eq!(output.lights[0].direction, Camera::default().forward());
        assert_eq!(output.draws[0].uniforms.light_count, 1);
    }

    #[test]
    fn test_lights_are_global_and_transformed() {
        let output = render_text(
            "Separator {
                Cube {}
                Separator { Translation { translation 0 3 0 } PointLight { location 1 0 0 } }
                DirectionalLight { on FALSE }
            }",
        );
        assert_eq!(output.lights.len(), 1);
        assert_relative_eq!(output.lights[0].position, Vec3::new(1.0, 3.0, 0.0));
        assert_eq!(output.draws[0].uniforms.light_count, 1);
    }

    #[test]
    fn test_switch_draws_only_selected_child() {
        let output = render_text("Separator { Switch { whichChild 1 Cube {} Sphere {} Cone {} } }");
        assert_eq!(output.draws.len(), 1);
        assert_eq!(output.draws[0].mesh.vertex_count(), 20 * 20 * 6);

        assert!(render_text("Separator { Switch { Cube {} } }").draws.is_empty());
        assert_eq!(render_text("Separator { Switch { whichChild -3 Cube {} Cube {} } }").draws.len(), 2);
    }

    #[test]
    fn test_lod_selects_by_camera_distance() {
        // Default camera sits at z = 5
        let near = render_text("Separator { LOD { range [ 10 ] Cube {} Sphere {} } }");
        assert_eq!(near.draws[0].mesh.vertex_count(), 36);
        let far = render_text("Separator { LOD { range [ 2 ] Cube {} Sphere {} } }");
        assert_eq!(far.draws[0].mesh.vertex_count(), 20 * 20 * 6);
    }

    #[test]
    fn test_texture_loads_once_and_failures_draw_untextured() {
        let graph = parse(
            "Separator {
                Texture2 { filename \"wood.png\" } Cube {}
                Texture2 { filename \"wood.png\" } Sphere {}
                Texture2 { filename \"missing.png\" } Cone {}
                Texture2 { filename \"wood.png\" } Texture2 { filename \"\" } Cylinder {}
            }",
        )
        .unwrap();
        let mut renderer = SceneRenderer::new(&ViewerConfig::default());
        let mut textures = CountingTextures::default();
        let output = render(&mut renderer, &graph, &mut textures);

        assert_eq!(textures.requested, vec!["wood.png".to_string(), "missing.png".to_string()]);
        assert_eq!(output.draws[0].texture.map(|t| t.handle), Some(TextureHandle(1)));
        assert_eq!(output.draws[1].texture.map(|t| t.handle), Some(TextureHandle(1)));
        assert!(output.draws[2].texture.is_none());
        assert!(output.draws[3].texture.is_none());
        assert_eq!(output.draws[0].uniforms.has_texture, 1);
    }

    #[test]
    fn test_lines_and_points_are_unlit() {
        let output = render_text(
            "Separator {
                Coordinate3 { point [ 0 0 0, 1 0 0, 1 1 0 ] }
                IndexedLineSet { coordIndex [ 0, 1, 2, -1 ] }
                PointSet {}
                IndexedFaceSet { coordIndex [ 0, 1, 2, -1 ] }
            }",
        );
        assert_eq!(output.draws.len(), 3);
        assert!(output.draws[0].unlit);
        assert!(output.draws[1].unlit);
        assert_relative_eq!(output.draws[1].uniforms.point_size, 10.0);
        assert!(!output.draws[2].unlit);
    }

    #[test]
    fn test_ascii_text_draws_textured_quad() {
        let output = render_text("Separator { FontStyle { size 2 } AsciiText { string [ \"a\", \"b\" ] } }");
        let draw = &output.draws[0];
        assert!(draw.unlit);
        assert_eq!(draw.texture.map(|t| t.handle), Some(TextureHandle(99)));
        let (min, max) = draw.mesh.bounds().unwrap();
        assert_relative_eq!(max.y - min.y, 4.0);
        assert_relative_eq!(max.x - min.x, 8.0);
    }

    #[test]
    fn test_pending_inline_is_queued_once_and_draws_nothing() {
        let output = render_text(
            "Separator { DEF I WWWInline { name \"part.wrl\" } USE I WWWInline { name \"\" } }",
        );
        assert!(output.draws.is_empty());
        assert_eq!(output.pending_inlines.len(), 1);
        assert_eq!(output.pending_inlines[0].location, Location::parse("part.wrl"));
        assert_eq!(output.unresolved_inlines.len(), 1);
    }

    #[test]
    fn test_viewpoints_in_discovery_order() {
        let graph = parse(
            "Separator {
                PerspectiveCamera { position 0 0 3 }
                Separator { Translation { translation 1 0 0 } OrthographicCamera {} }
            }",
        )
        .unwrap();
        let viewpoints = collect_viewpoints(&graph, &Point3::origin());
        assert_eq!(viewpoints.len(), 2);
        assert_relative_eq!(viewpoints[0].camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(viewpoints[1].world.fixed_view::<3, 1>(0, 3).into_owned(), Vec3::new(1.0, 0.0, 0.0));
    }
}
