//! VRML 1.0 parser.
//!
//! Builds a [`SceneGraph`] from the token stream with one token of lookahead.
//! Parsing never fails part-way: unknown node types become placeholders,
//! unknown fields are stepped over and malformed values fall back to
//! defaults. A document whose first token does not start a node parses to
//! `None`; nothing before the root is skipped.
//!
//! `DEF` names are registered once the named node is complete, and `USE`
//! hands back the same [`NodeId`], so a reused subtree is shared rather than
//! copied.

use std::collections::HashMap;

use super::lexer::{Keyword, Lexer, Token};
use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::scene::node::{
    Anchor, AnchorMap, AsciiText, Binding, CameraNode, CameraProjection, Cone, ConeParts, Cube,
    Cylinder, CylinderParts, FontFamily, FontStyle, FontWeight, Group, GroupKind, IndexedShape,
    Inline, Justification, LightKind, LightNode, Lod, Material, PointSet, ShapeHints, Sphere,
    Switch, Texture2, Texture2Transform, Transform, VertexOrdering, WrapMode, SWITCH_NONE,
};
use crate::scene::{NodeId, NodeKind, SceneGraph, SceneNode};

/// Parse a whole document.
///
/// Returns `None` when the first token does not introduce a node.
pub fn parse(text: &str) -> Option<SceneGraph> {
    Parser::new(text).parse()
}

/// Counters reported after a parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Nodes created, placeholders included
    pub nodes: usize,
    /// Placeholders for unknown node types
    pub unknown_nodes: usize,
    /// `USE` references with no matching `DEF`
    pub unresolved_uses: usize,
}

/// Recursive-descent parser over a [`Lexer`]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    consumed: usize,
    graph: SceneGraph,
    names: HashMap<String, NodeId>,
    stats: ParseStats,
}

impl<'a> Parser<'a> {
    /// Create a parser positioned on the first token
    pub fn new(text: &'a str) -> Self {
        let mut lexer = Lexer::new(text);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            consumed: 0,
            graph: SceneGraph::new(),
            names: HashMap::new(),
            stats: ParseStats::default(),
        }
    }

    /// Parse the root node and return the finished graph
    pub fn parse(self) -> Option<SceneGraph> {
        self.parse_with_stats().map(|(graph, _)| graph)
    }

    /// Like [`parse`](Self::parse), also returning the counters
    pub fn parse_with_stats(mut self) -> Option<(SceneGraph, ParseStats)> {
        let Some(root) = self.parse_node() else {
            match self.current {
                Token::Eof => log::warn!("Document contains no node"),
                _ => log::warn!("Document does not start with a node (line {})", self.lexer.line()),
            }
            return None;
        };

        if self.current != Token::Eof {
            log::debug!("Ignoring content after the root node at line {}", self.lexer.line());
        }
        log::info!(
            "Parsed {} nodes ({} unknown, {} unresolved USE)",
            self.stats.nodes,
            self.stats.unknown_nodes,
            self.stats.unresolved_uses
        );

        self.graph.set_root(root);
        Some((self.graph, self.stats))
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
        self.consumed += 1;
    }

    fn eat(&mut self, token: &Token) -> bool {
        if &self.current == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn take_identifier(&mut self) -> Option<String> {
        match &self.current {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.stats.nodes += 1;
        self.graph.insert(SceneNode::new(kind))
    }

    /// Parse one node, including `DEF`/`USE` forms
    fn parse_node(&mut self) -> Option<NodeId> {
        match &self.current {
            Token::Keyword(Keyword::Def) => {
                self.advance();
                let name = self.take_identifier()?;
                let id = self.parse_node()?;
                if let Some(node) = self.graph.get_mut(id) {
                    node.name = Some(name.clone());
                }
                self.names.insert(name, id);
                Some(id)
            }
            Token::Keyword(Keyword::Use) => {
                self.advance();
                let name = self.take_identifier()?;
                let resolved = self.names.get(&name).copied();
                if resolved.is_none() {
                    self.stats.unresolved_uses += 1;
                    log::warn!("USE of undefined name '{}' at line {}", name, self.lexer.line());
                }
                resolved
            }
            Token::Identifier(_) => {
                let type_name = self.take_identifier()?;
                let kind = self.parse_node_body(&type_name);
                Some(self.insert(kind))
            }
            _ => None,
        }
    }

    fn parse_node_body(&mut self, type_name: &str) -> NodeKind {
        match type_name {
            "Separator" => {
                let children = self.parse_children(&["renderCulling"], |p, _| {
                    p.take_identifier();
                });
                NodeKind::Group(Group { kind: GroupKind::Separator, children })
            }
            "Group" => NodeKind::Group(Group { kind: GroupKind::Group, children: self.parse_children(&[], |_, _| {}) }),
            "TransformSeparator" => NodeKind::Group(Group {
                kind: GroupKind::TransformSeparator,
                children: self.parse_children(&[], |_, _| {}),
            }),
            "Switch" => {
                let mut which_child = SWITCH_NONE;
                let children = self.parse_children(&["whichChild"], |p, _| which_child = p.parse_int());
                NodeKind::Switch(Switch { which_child, children })
            }
            "LOD" => {
                let mut range = Vec::new();
                let mut center = Vec3::zeros();
                let children = self.parse_children(&["range", "center"], |p, name| match name {
                    "range" => range = p.parse_list(Self::parse_float),
                    _ => center = p.parse_vec3(),
                });
                NodeKind::Lod(Lod { range, center, children })
            }
            "WWWAnchor" => {
                let mut anchor = Anchor::default();
                anchor.children = self.parse_children(&["name", "description", "map"], |p, name| match name {
                    "name" => anchor.url = p.parse_string(),
                    "description" => anchor.description = p.parse_string(),
                    _ => {
                        anchor.map = match p.take_identifier().as_deref() {
                            Some("POINT") => AnchorMap::Point,
                            _ => AnchorMap::None,
                        }
                    }
                });
                NodeKind::Anchor(anchor)
            }
            "WWWInline" => {
                let mut inline = Inline::default();
                self.parse_fields(|p, name| {
                    match name {
                        "name" => inline.url = p.parse_string(),
                        "bboxSize" => inline.bbox_size = p.parse_vec3(),
                        "bboxCenter" => inline.bbox_center = p.parse_vec3(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::Inline(inline)
            }
            "Transform" | "Translation" | "Rotation" | "Scale" => self.parse_transform(type_name),
            "MatrixTransform" => {
                let mut matrix = Mat4::identity();
                self.parse_fields(|p, name| {
                    if name != "matrix" {
                        return false;
                    }
                    let values: Vec<f32> = (0..16).map(|_| p.parse_float()).collect();
                    matrix = Mat4::from_column_slice(&values);
                    true
                });
                NodeKind::MatrixTransform(matrix)
            }
            "Material" => NodeKind::Material(self.parse_material()),
            "Texture2" => {
                let mut texture = Texture2::default();
                self.parse_fields(|p, name| {
                    match name {
                        "filename" => texture.filename = p.parse_string(),
                        "wrapS" => texture.wrap_s = p.parse_wrap(),
                        "wrapT" => texture.wrap_t = p.parse_wrap(),
                        "image" => p.skip_image(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::Texture2(texture)
            }
            "Texture2Transform" => {
                let mut transform = Texture2Transform::default();
                self.parse_fields(|p, name| {
                    match name {
                        "translation" => transform.translation = p.parse_vec2(),
                        "rotation" => transform.rotation = p.parse_float(),
                        "scaleFactor" => transform.scale_factor = p.parse_vec2(),
                        "center" => transform.center = p.parse_vec2(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::Texture2Transform(transform)
            }
            "TextureCoordinate2" => NodeKind::TextureCoordinate2(self.parse_list_field("point", Self::parse_vec2)),
            "Coordinate3" => NodeKind::Coordinate3(self.parse_list_field("point", Self::parse_vec3)),
            "Normal" => NodeKind::Normal(self.parse_list_field("vector", Self::parse_vec3)),
            "NormalBinding" => NodeKind::NormalBinding(self.parse_binding()),
            "MaterialBinding" => NodeKind::MaterialBinding(self.parse_binding()),
            "ShapeHints" => NodeKind::ShapeHints(self.parse_shape_hints()),
            "DirectionalLight" => self.parse_light(LightNode::directional()),
            "PointLight" => self.parse_light(LightNode::point()),
            "SpotLight" => self.parse_light(LightNode::spot()),
            "PerspectiveCamera" => self.parse_camera(CameraNode::perspective()),
            "OrthographicCamera" => self.parse_camera(CameraNode::orthographic()),
            "Cube" => {
                let mut cube = Cube::default();
                self.parse_fields(|p, name| {
                    match name {
                        "width" => cube.width = p.parse_float(),
                        "height" => cube.height = p.parse_float(),
                        "depth" => cube.depth = p.parse_float(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::Cube(cube)
            }
            "Sphere" => {
                let mut sphere = Sphere::default();
                self.parse_fields(|p, name| {
                    if name != "radius" {
                        return false;
                    }
                    sphere.radius = p.parse_float();
                    true
                });
                NodeKind::Sphere(sphere)
            }
            "Cone" => {
                let mut cone = Cone::default();
                self.parse_fields(|p, name| {
                    match name {
                        "parts" => {
                            cone.parts = p.parse_flags(cone.parts, |flag| match flag {
                                "SIDES" => Some(ConeParts::SIDES),
                                "BOTTOM" => Some(ConeParts::BOTTOM),
                                "ALL" => Some(ConeParts::ALL),
                                _ => None,
                            });
                        }
                        "bottomRadius" => cone.bottom_radius = p.parse_float(),
                        "height" => cone.height = p.parse_float(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::Cone(cone)
            }
            "Cylinder" => {
                let mut cylinder = Cylinder::default();
                self.parse_fields(|p, name| {
                    match name {
                        "parts" => {
                            cylinder.parts = p.parse_flags(cylinder.parts, |flag| match flag {
                                "SIDES" => Some(CylinderParts::SIDES),
                                "TOP" => Some(CylinderParts::TOP),
                                "BOTTOM" => Some(CylinderParts::BOTTOM),
                                "ALL" => Some(CylinderParts::ALL),
                                _ => None,
                            });
                        }
                        "radius" => cylinder.radius = p.parse_float(),
                        "height" => cylinder.height = p.parse_float(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::Cylinder(cylinder)
            }
            "IndexedFaceSet" => NodeKind::IndexedFaceSet(self.parse_indexed_shape()),
            "IndexedLineSet" => NodeKind::IndexedLineSet(self.parse_indexed_shape()),
            "PointSet" => {
                let mut points = PointSet::default();
                self.parse_fields(|p, name| {
                    match name {
                        "startIndex" => points.start_index = p.parse_int(),
                        "numPoints" => points.num_points = p.parse_int(),
                        _ => return false,
                    }
                    true
                });
                NodeKind::PointSet(points)
            }
            "FontStyle" => NodeKind::FontStyle(self.parse_font_style()),
            "AsciiText" => NodeKind::AsciiText(self.parse_ascii_text()),
            "Info" => {
                let mut info = String::new();
                self.parse_fields(|p, name| {
                    if name != "string" {
                        return false;
                    }
                    info = p.parse_string();
                    true
                });
                NodeKind::Info(info)
            }
            _ => {
                log::warn!("Unknown node type '{}' at line {}", type_name, self.lexer.line());
                self.stats.unknown_nodes += 1;
                self.skip_block();
                NodeKind::Unknown(type_name.to_string())
            }
        }
    }

    fn parse_transform(&mut self, type_name: &str) -> NodeKind {
        let accepted: &[&str] = match type_name {
            "Translation" => &["translation"],
            "Rotation" => &["rotation"],
            "Scale" => &["scaleFactor"],
            _ => &["translation", "rotation", "scaleFactor", "scaleOrientation", "center"],
        };
        let mut transform = Transform::default();
        self.parse_fields(|p, name| {
            if !accepted.contains(&name) {
                return false;
            }
            match name {
                "translation" => transform.translation = p.parse_vec3(),
                "rotation" => transform.rotation = p.parse_vec4(),
                "scaleFactor" => transform.scale_factor = p.parse_vec3(),
                "scaleOrientation" => transform.scale_orientation = p.parse_vec4(),
                _ => transform.center = p.parse_vec3(),
            }
            true
        });
        NodeKind::Transform(transform)
    }

    fn parse_material(&mut self) -> Material {
        let mut material = Material::default();
        self.parse_fields(|p, name| {
            match name {
                "ambientColor" => material.ambient = p.parse_list(Self::parse_vec3),
                "diffuseColor" => material.diffuse = p.parse_list(Self::parse_vec3),
                "specularColor" => material.specular = p.parse_list(Self::parse_vec3),
                "emissiveColor" => material.emissive = p.parse_list(Self::parse_vec3),
                "shininess" => material.shininess = p.parse_list(Self::parse_float),
                "transparency" => material.transparency = p.parse_list(Self::parse_float),
                _ => return false,
            }
            true
        });
        material
    }

    fn parse_binding(&mut self) -> Binding {
        let mut binding = Binding::Default;
        self.parse_fields(|p, name| {
            if name != "value" {
                return false;
            }
            match p.take_identifier() {
                Some(keyword) => binding = Binding::from_keyword(&keyword).unwrap_or_else(|| {
                    log::debug!("Unknown binding '{}', using DEFAULT", keyword);
                    Binding::Default
                }),
                None => binding = Binding::Default,
            }
            true
        });
        binding
    }

    fn parse_shape_hints(&mut self) -> ShapeHints {
        let mut hints = ShapeHints::default();
        self.parse_fields(|p, name| {
            match name {
                "vertexOrdering" => {
                    hints.vertex_ordering = match p.take_identifier().as_deref() {
                        Some("CLOCKWISE") => VertexOrdering::Clockwise,
                        Some("COUNTERCLOCKWISE") => VertexOrdering::CounterClockwise,
                        _ => VertexOrdering::UnknownOrdering,
                    }
                }
                "shapeType" => hints.solid = p.take_identifier().as_deref() == Some("SOLID"),
                "faceType" => hints.convex = p.take_identifier().as_deref() != Some("UNKNOWN_FACE_TYPE"),
                "creaseAngle" => hints.crease_angle = p.parse_float(),
                _ => return false,
            }
            true
        });
        hints
    }

    fn parse_light(&mut self, mut light: LightNode) -> NodeKind {
        self.parse_fields(|p, name| {
            match (name, &mut light.kind) {
                ("on", _) => light.on = p.parse_bool(),
                ("intensity", _) => light.intensity = p.parse_float(),
                ("color", _) => light.color = p.parse_vec3(),
                (
                    "direction",
                    LightKind::Directional { direction } | LightKind::Spot { direction, .. },
                ) => *direction = p.parse_vec3(),
                ("location", LightKind::Point { location } | LightKind::Spot { location, .. }) => {
                    *location = p.parse_vec3();
                }
                ("dropOffRate", LightKind::Spot { drop_off_rate, .. }) => *drop_off_rate = p.parse_float(),
                ("cutOffAngle", LightKind::Spot { cut_off_angle, .. }) => *cut_off_angle = p.parse_float(),
                _ => return false,
            }
            true
        });
        NodeKind::Light(light)
    }

    fn parse_camera(&mut self, mut camera: CameraNode) -> NodeKind {
        self.parse_fields(|p, name| {
            match (name, &mut camera.projection) {
                ("position", _) => camera.position = p.parse_vec3(),
                ("orientation", _) => camera.orientation = p.parse_vec4(),
                ("focalDistance", _) => camera.focal_distance = p.parse_float(),
                ("heightAngle", CameraProjection::Perspective { height_angle }) => {
                    *height_angle = p.parse_float();
                }
                ("height", CameraProjection::Orthographic { height }) => *height = p.parse_float(),
                _ => return false,
            }
            true
        });
        NodeKind::Camera(camera)
    }

    fn parse_indexed_shape(&mut self) -> IndexedShape {
        let mut shape = IndexedShape::default();
        self.parse_fields(|p, name| {
            match name {
                "coordIndex" => shape.coord_index = p.parse_list(Self::parse_int),
                "materialIndex" => shape.material_index = p.parse_list(Self::parse_int),
                "normalIndex" => shape.normal_index = p.parse_list(Self::parse_int),
                "textureCoordIndex" => shape.texture_coord_index = p.parse_list(Self::parse_int),
                _ => return false,
            }
            true
        });
        shape
    }

    fn parse_font_style(&mut self) -> FontStyle {
        let mut style = FontStyle::DEFAULT;
        self.parse_fields(|p, name| {
            match name {
                "size" => style.size = p.parse_float(),
                "family" => {
                    style.family = match p.take_identifier().as_deref() {
                        Some("SANS") => FontFamily::Sans,
                        Some("TYPEWRITER") => FontFamily::Typewriter,
                        _ => FontFamily::Serif,
                    }
                }
                "style" => {
                    style.style = match p.take_identifier().as_deref() {
                        Some("BOLD") => FontWeight::Bold,
                        Some("ITALIC") => FontWeight::Italic,
                        _ => FontWeight::None,
                    }
                }
                _ => return false,
            }
            true
        });
        style
    }

    fn parse_ascii_text(&mut self) -> AsciiText {
        let mut text = AsciiText::default();
        self.parse_fields(|p, name| {
            match name {
                "string" => text.strings = p.parse_list(Self::parse_string),
                "spacing" => text.spacing = p.parse_float(),
                "justification" => {
                    text.justification = match p.take_identifier().as_deref() {
                        Some("CENTER") => Justification::Center,
                        Some("RIGHT") => Justification::Right,
                        _ => Justification::Left,
                    }
                }
                "width" => text.width = p.parse_list(Self::parse_float),
                _ => return false,
            }
            true
        });
        text
    }

    /// Node body with fields only. `on_field` returns false for names it does
    /// not know; one token after such a name is discarded.
    fn parse_fields(&mut self, mut on_field: impl FnMut(&mut Self, &str) -> bool) {
        if !self.eat(&Token::OpenBrace) {
            return;
        }
        loop {
            match &self.current {
                Token::CloseBrace => {
                    self.advance();
                    return;
                }
                Token::Eof => return,
                Token::Identifier(_) => {
                    let Some(name) = self.take_identifier() else { return };
                    if !on_field(self, &name) {
                        log::trace!("Skipping unknown field '{}' at line {}", name, self.lexer.line());
                        if !matches!(self.current, Token::CloseBrace | Token::Eof) {
                            self.advance();
                        }
                    }
                }
                _ => self.advance(),
            }
        }
    }

    /// Group body: named fields from `fields` interleaved with child nodes
    fn parse_children(&mut self, fields: &[&str], mut on_field: impl FnMut(&mut Self, &str)) -> Vec<NodeId> {
        let mut children = Vec::new();
        if !self.eat(&Token::OpenBrace) {
            return children;
        }
        loop {
            match &self.current {
                Token::CloseBrace => {
                    self.advance();
                    return children;
                }
                Token::Eof => return children,
                Token::Identifier(name) if fields.contains(&name.as_str()) => {
                    if let Some(name) = self.take_identifier() {
                        on_field(self, &name);
                    }
                }
                _ => {
                    let before = self.consumed;
                    match self.parse_node() {
                        Some(child) => children.push(child),
                        None if self.consumed == before => self.advance(),
                        None => {}
                    }
                }
            }
        }
    }

    /// Skip a balanced `{ ... }` block if one starts here
    fn skip_block(&mut self) {
        if !self.eat(&Token::OpenBrace) {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.current {
                Token::OpenBrace => depth += 1,
                Token::CloseBrace => depth -= 1,
                Token::Eof => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip an SFImage value: width, height, components, then one pixel per texel.
    ///
    /// Hex pixels such as `0xFF00FF` lex as a number followed by an `x...`
    /// identifier, so both halves are consumed.
    fn skip_image(&mut self) {
        let width = usize::try_from(self.parse_int()).unwrap_or(0);
        let height = usize::try_from(self.parse_int()).unwrap_or(0);
        self.parse_int();
        for _ in 0..width * height {
            if !matches!(self.current, Token::Number(_)) {
                return;
            }
            self.advance();
            if matches!(&self.current, Token::Identifier(s) if s.starts_with('x') || s.starts_with('X')) {
                self.advance();
            }
        }
    }

    /// `[ a, b, ... ]` or a single bare value
    fn parse_list<T>(&mut self, mut parse_one: impl FnMut(&mut Self) -> T) -> Vec<T> {
        if !self.eat(&Token::OpenBracket) {
            return vec![parse_one(self)];
        }
        let mut values = Vec::new();
        loop {
            match self.current {
                Token::CloseBracket => {
                    self.advance();
                    return values;
                }
                Token::Eof => return values,
                _ => {
                    let before = self.consumed;
                    let value = parse_one(self);
                    if self.consumed == before {
                        self.advance();
                    } else {
                        values.push(value);
                    }
                }
            }
        }
    }

    fn parse_list_field<T>(&mut self, field: &str, parse_one: fn(&mut Self) -> T) -> Vec<T> {
        let mut values = Vec::new();
        self.parse_fields(|p, name| {
            if name != field {
                return false;
            }
            values = p.parse_list(parse_one);
            true
        });
        values
    }

    /// Consecutive flag identifiers, OR-ed together. Returns `current` when none match.
    fn parse_flags<F>(&mut self, current: F, lookup: impl Fn(&str) -> Option<F>) -> F
    where
        F: Copy + std::ops::BitOr<Output = F>,
    {
        let mut flags: Option<F> = None;
        while let Token::Identifier(name) = &self.current {
            let Some(flag) = lookup(name) else { break };
            flags = Some(flags.map_or(flag, |f| f | flag));
            self.advance();
        }
        flags.unwrap_or(current)
    }

    fn parse_wrap(&mut self) -> WrapMode {
        match self.take_identifier().as_deref() {
            Some("CLAMP") => WrapMode::Clamp,
            _ => WrapMode::Repeat,
        }
    }

    /// A number, or 0 without consuming anything
    fn parse_float(&mut self) -> f32 {
        match self.current {
            Token::Number(value) => {
                self.advance();
                value as f32
            }
            _ => 0.0,
        }
    }

    fn parse_int(&mut self) -> i32 {
        match self.current {
            Token::Number(value) => {
                self.advance();
                value as i32
            }
            _ => 0,
        }
    }

    fn parse_bool(&mut self) -> bool {
        match &self.current {
            Token::Identifier(word) => {
                let value = word == "TRUE";
                self.advance();
                value
            }
            Token::Number(value) => {
                let value = *value != 0.0;
                self.advance();
                value
            }
            _ => false,
        }
    }

    fn parse_string(&mut self) -> String {
        match &self.current {
            Token::String(value) | Token::Identifier(value) => {
                let value = value.clone();
                self.advance();
                value
            }
            _ => String::new(),
        }
    }

    fn parse_vec2(&mut self) -> Vec2 {
        Vec2::new(self.parse_float(), self.parse_float())
    }

    fn parse_vec3(&mut self) -> Vec3 {
        Vec3::new(self.parse_float(), self.parse_float(), self.parse_float())
    }

    fn parse_vec4(&mut self) -> Vec4 {
        Vec4::new(self.parse_float(), self.parse_float(), self.parse_float(), self.parse_float())
    }
}
