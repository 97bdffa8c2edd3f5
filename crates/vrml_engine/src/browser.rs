//! # Scene Browser
//!
//! Host-facing facade tying the interpreter together. A host feeds it
//! document text and input, calls [`SceneBrowser::frame`] once per frame and
//! hands the resulting draw commands to its GPU backend.
//!
//! Each frame runs in a fixed order:
//! 1. Publish finished inline loads into the graph
//! 2. Traverse and emit draws and lights
//! 3. Dispatch fetches for inlines reached in `Pending` status
//!
//! Only step 1 mutates the graph, so a traversal never sees a half-loaded
//! inline.

use std::sync::Arc;

use crate::assets::{AssetError, DocumentFetcher, InlineLoader, Location, TextRasterizer, TextureLoader};
use crate::assets::vrml::parse;
use crate::core::config::ViewerConfig;
use crate::events::{Event, EventSystem};
use crate::foundation::math::{Point3, Vec2};
use crate::input::{pick, MouseState, PickHit};
use crate::render::{collect_viewpoints, Camera, FrameOutput, HostServices, SceneRenderer, Viewpoint};
use crate::scene::node::InlineStatus;
use crate::scene::SceneGraph;

/// Interactive viewer for one document at a time
pub struct SceneBrowser {
    config: ViewerConfig,
    graph: SceneGraph,
    camera: Camera,
    renderer: SceneRenderer,
    fetcher: Arc<dyn DocumentFetcher>,
    loader: InlineLoader,
    textures: Box<dyn TextureLoader>,
    text: Box<dyn TextRasterizer>,
    viewpoints: Vec<Viewpoint>,
    active_viewpoint: Option<usize>,
    events: EventSystem,
    mouse: MouseState,
}

impl SceneBrowser {
    /// Create a browser with no scene loaded
    pub fn new(
        config: ViewerConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        textures: Box<dyn TextureLoader>,
        text: Box<dyn TextRasterizer>,
    ) -> Self {
        Self {
            camera: Camera::from_config(&config.camera),
            renderer: SceneRenderer::new(&config),
            loader: InlineLoader::new(Arc::clone(&fetcher)),
            config,
            graph: SceneGraph::new(),
            fetcher,
            textures,
            text,
            viewpoints: Vec::new(),
            active_viewpoint: None,
            events: EventSystem::new(),
            mouse: MouseState::default(),
        }
    }

    /// Replace the current scene with the document `text`.
    ///
    /// `base` is where relative texture and inline references resolve from.
    /// Every cache is cleared and the first viewpoint, if any, is activated.
    ///
    /// # Errors
    /// [`AssetError::NoRootNode`] if the text does not start with a node; the previous
    /// scene stays loaded.
    pub fn load_scene(&mut self, text: &str, base: Option<Location>) -> Result<(), AssetError> {
        let mut graph = parse(text).ok_or(AssetError::NoRootNode)?;
        graph.set_base(base);
        log::info!(
            "Loaded scene with {} nodes{}",
            graph.len(),
            graph.base().map(|b| format!(" from {}", b)).unwrap_or_default()
        );

        self.graph = graph;
        self.renderer.clear_caches();
        self.loader.reset();
        self.camera = Camera::from_config(&self.config.camera);
        self.active_viewpoint = None;
        self.refresh_viewpoints(true);
        self.set_viewpoint(0);
        Ok(())
    }

    /// Fetch `location` with the browser's fetcher and load it
    ///
    /// # Errors
    /// Fetch errors from the [`DocumentFetcher`], or
    /// [`AssetError::NoRootNode`] as for [`load_scene`](Self::load_scene).
    pub fn load_location(&mut self, location: Location) -> Result<(), AssetError> {
        let text = self.fetcher.fetch(&location)?;
        self.load_scene(&text, Some(location))
    }

    /// Build one frame for a viewport of `viewport` pixels
    pub fn frame(&mut self, viewport: Vec2) -> FrameOutput {
        self.publish_inlines();

        let aspect = if viewport.y > 0.0 { viewport.x / viewport.y } else { 1.0 };
        let mut services = HostServices { textures: self.textures.as_mut(), text: self.text.as_mut() };
        let output = self.renderer.render(&self.graph, &self.camera, aspect, &mut services);

        for request in &output.pending_inlines {
            self.graph.set_inline_status(request.node, InlineStatus::Loading);
            if let Err(e) = self.loader.request(request.clone()) {
                log::error!("Could not start inline load of {}: {}", request.location, e);
                self.graph.set_inline_status(request.node, InlineStatus::Failed);
                self.events.send(Event::inline_failed(request.node, e.to_string()));
            }
        }
        for node in &output.unresolved_inlines {
            self.graph.set_inline_status(*node, InlineStatus::Failed);
            self.events.send(Event::inline_failed(*node, "unresolvable reference"));
        }
        output
    }

    /// Apply finished inline loads. Called at the start of every frame.
    fn publish_inlines(&mut self) {
        let mut loaded_any = false;
        for result in self.loader.poll_completed() {
            match result.outcome {
                Ok(loaded) => {
                    log::info!("Inline {} loaded ({} nodes)", result.location, loaded.len());
                    if self.graph.splice_inline(result.node, loaded, result.location) {
                        loaded_any = true;
                        self.events.send(Event::inline_loaded(result.node));
                    }
                }
                Err(e) => {
                    log::warn!("Inline {} failed: {}", result.location, e);
                    self.graph.set_inline_status(result.node, InlineStatus::Failed);
                    self.events.send(Event::inline_failed(result.node, e.to_string()));
                }
            }
        }
        if loaded_any {
            self.refresh_viewpoints(false);
            if self.active_viewpoint.is_none() {
                self.set_viewpoint(0);
            }
        }
    }

    /// Re-collect viewpoints; `ViewpointsChanged` fires when forced or the count changed
    fn refresh_viewpoints(&mut self, force: bool) {
        let viewpoints = collect_viewpoints(&self.graph, &Point3::from(self.camera.position));
        let changed = force || viewpoints.len() != self.viewpoints.len();
        self.viewpoints = viewpoints;
        if self.active_viewpoint.is_some_and(|index| index >= self.viewpoints.len()) {
            self.active_viewpoint = None;
        }
        if changed {
            log::debug!("{} viewpoint(s) in scene", self.viewpoints.len());
            self.events.send(Event::viewpoints_changed(self.viewpoints.len()));
        }
    }

    /// Move the camera to viewpoint `index`. Returns false if there is no such viewpoint
    pub fn set_viewpoint(&mut self, index: usize) -> bool {
        let Some(viewpoint) = self.viewpoints.get(index) else {
            return false;
        };
        self.camera.activate_viewpoint(&viewpoint.camera, &viewpoint.world);
        if self.active_viewpoint != Some(index) {
            self.active_viewpoint = Some(index);
            self.events.send(Event::active_viewpoint_changed(index));
        }
        true
    }

    /// Viewpoints in discovery order
    pub fn viewpoints(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// Index of the active viewpoint
    pub fn active_viewpoint(&self) -> Option<usize> {
        self.active_viewpoint
    }

    /// Closest pickable shape under a pixel
    pub fn pick(&self, screen: Vec2, viewport: Vec2) -> Option<PickHit> {
        pick(&self.graph, &self.camera, screen, viewport)
    }

    /// Pointer moved; rotates the camera while dragging
    pub fn mouse_moved(&mut self, position: Vec2) {
        self.mouse.update_position(position);
        if self.mouse.is_dragging() {
            let delta = self.mouse.take_drag_delta();
            self.camera.apply_drag(delta, self.config.input.drag_sensitivity);
        }
    }

    /// Primary button pressed
    pub fn mouse_pressed(&mut self) {
        self.mouse.start_drag();
    }

    /// Primary button released. A click (no drag) picks under the pointer
    pub fn mouse_released(&mut self, viewport: Vec2) -> Option<PickHit> {
        if self.mouse.end_drag() {
            self.pick(self.mouse.position, viewport)
        } else {
            None
        }
    }

    /// Scroll wheel; dollies the camera
    pub fn scroll(&mut self, delta: f32) {
        self.camera.apply_scroll(delta, self.config.input.scroll_sensitivity);
    }

    /// Viewer camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable viewer camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Loaded scene
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Active configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Event system, for registering handlers
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// Deliver queued events to registered handlers
    pub fn dispatch_events(&mut self) {
        self.events.dispatch();
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Inline fetches still outstanding
    pub fn pending_inlines(&self) -> usize {
        self.loader.in_flight()
    }
}
