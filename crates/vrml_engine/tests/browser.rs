//! End-to-end tests driving `SceneBrowser` with in-memory collaborators

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use vrml_engine::prelude::*;
use vrml_engine::scene::node::InlineStatus;

/// Serves documents from a map keyed by location text
struct MemoryFetcher {
    documents: HashMap<String, String>,
}

impl DocumentFetcher for MemoryFetcher {
    fn fetch(&self, location: &Location) -> Result<String, AssetError> {
        self.documents
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| AssetError::NotFound(location.to_string()))
    }
}

/// Records every texture request
#[derive(Clone, Default)]
struct RecordingTextures {
    requests: Arc<Mutex<Vec<String>>>,
}

impl TextureLoader for RecordingTextures {
    fn load_texture(&mut self, location: &Location) -> Result<TextureHandle, AssetError> {
        let mut requests = self.requests.lock().map_err(|e| AssetError::Fetch(e.to_string()))?;
        requests.push(location.to_string());
        Ok(TextureHandle(requests.len() as u64))
    }
}

struct SquareText;

impl TextRasterizer for SquareText {
    fn rasterize(&mut self, _request: &TextRequest<'_>) -> Option<TextBitmap> {
        Some(TextBitmap { texture: TextureHandle(1000), aspect: 1.0 })
    }
}

fn viewport() -> Vec2 {
    Vec2::new(800.0, 600.0)
}

fn browser(documents: &[(&str, &str)]) -> (SceneBrowser, RecordingTextures) {
    let fetcher = MemoryFetcher {
        documents: documents.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    };
    let textures = RecordingTextures::default();
    let browser = SceneBrowser::new(
        ViewerConfig::default(),
        Arc::new(fetcher),
        Box::new(textures.clone()),
        Box::new(SquareText),
    );
    (browser, textures)
}

/// Run frames until no inline is in flight
fn settle(browser: &mut SceneBrowser) -> FrameOutput {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut output = browser.frame(viewport());
    while (browser.pending_inlines() > 0 || !output.pending_inlines.is_empty()) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        output = browser.frame(viewport());
    }
    output
}

#[test]
fn test_load_rejects_empty_document_and_keeps_scene() {
    let (mut browser, _) = browser(&[]);
    browser.load_scene("Separator { Cube {} }", None).unwrap();
    let before = browser.graph().len();

    let err = browser.load_scene("# only a comment", None).unwrap_err();
    assert!(matches!(err, AssetError::NoRootNode));
    assert_eq!(browser.graph().len(), before);
    assert_eq!(browser.frame(viewport()).draws.len(), 1);
}

#[test]
fn test_inline_is_fetched_in_background_and_spliced() {
    let (mut browser, textures) = browser(&[
        ("world/main.wrl", "Separator { WWWInline { name \"parts/ball.wrl\" } }"),
        (
            "world/parts/ball.wrl",
            "Separator { Texture2 { filename \"skin.png\" } Sphere {} Cube {} }",
        ),
    ]);
    browser.load_location(Location::path("world/main.wrl")).unwrap();

    let first = browser.frame(viewport());
    assert!(first.draws.is_empty());
    assert_eq!(first.pending_inlines.len(), 1);

    let output = settle(&mut browser);
    assert_eq!(output.draws.len(), 2);
    // Textures inside the inline resolve against the inline's own location
    let requests = textures.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![Location::path("world/parts/skin.png").to_string()]);

    let events = browser.drain_events();
    assert!(events.iter().any(|e| e.event_type == EventType::InlineLoaded));
}

#[test]
fn test_failed_inline_renders_nothing_and_is_not_retried() {
    let (mut browser, _) = browser(&[]);
    browser.load_scene("Separator { DEF Missing WWWInline { name \"nowhere.wrl\" } Cube {} }", None).unwrap();

    let output = settle(&mut browser);
    assert_eq!(output.draws.len(), 1);
    assert!(output.pending_inlines.is_empty());

    let inline = browser.graph().find_named("Missing").unwrap();
    match browser.graph().kind(inline) {
        Some(NodeKind::Inline(inline)) => assert_eq!(inline.status, InlineStatus::Failed),
        other => panic!("unexpected node {:?}", other),
    }
    let events = browser.drain_events();
    assert!(events.iter().any(|e| e.event_type == EventType::InlineFailed));
}

#[test]
fn test_first_viewpoint_is_activated_with_events() {
    let (mut browser, _) = browser(&[]);
    browser
        .load_scene(
            "Separator {
                PerspectiveCamera { position 0 2 8 heightAngle 0.5 }
                OrthographicCamera { position 3 0 0 orientation 0 1 0 1.5708 }
                Cube {}
            }",
            None,
        )
        .unwrap();

    assert_eq!(browser.viewpoints().len(), 2);
    assert_eq!(browser.active_viewpoint(), Some(0));
    assert_relative_eq!(browser.camera().position, Vec3::new(0.0, 2.0, 8.0));

    let events = browser.drain_events();
    let types: Vec<EventType> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(types, vec![EventType::ViewpointsChanged, EventType::ActiveViewpointChanged]);
    assert_eq!(events[0].get_count(), Some(2));
    assert_eq!(events[1].get_index(), Some(0));

    assert!(browser.set_viewpoint(1));
    assert_relative_eq!(browser.camera().forward(), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-4);
    assert_eq!(browser.drain_events()[0].get_index(), Some(1));

    // Re-selecting the active viewpoint is not a change
    assert!(browser.set_viewpoint(1));
    assert!(browser.drain_events().is_empty());
    assert!(!browser.set_viewpoint(2));
    assert_eq!(browser.active_viewpoint(), Some(1));
}

#[test]
fn test_click_on_anchor_reports_link() {
    let (mut browser, _) = browser(&[]);
    browser
        .load_scene(
            "Separator {
                WWWAnchor { name \"http://example.com/next.wrl\" description \"Next\" Cube {} }
            }",
            None,
        )
        .unwrap();

    let center = viewport() * 0.5;
    browser.mouse_moved(center);
    browser.mouse_pressed();
    let hit = browser.mouse_released(viewport()).unwrap();
    // Default camera sits at z = 5, the cube face at z = 1
    assert_relative_eq!(hit.distance, 4.0 - 0.1, epsilon = 1e-3);
    let anchor = hit.anchor.unwrap();
    assert_eq!(anchor.target(), "http://example.com/next.wrl");
    assert_eq!(anchor.description, "Next");

    assert!(browser.pick(Vec2::new(0.0, 0.0), viewport()).is_none());
}

#[test]
fn test_drag_rotates_and_scroll_dollies() {
    let (mut browser, _) = browser(&[]);
    browser.load_scene("Separator { Cube {} }", None).unwrap();

    browser.mouse_moved(Vec2::new(100.0, 100.0));
    browser.mouse_pressed();
    browser.mouse_moved(Vec2::new(150.0, 100.0));
    assert_relative_eq!(browser.camera().yaw, 0.5, epsilon = 1e-6);
    assert!(browser.mouse_released(viewport()).is_none());

    let before = browser.camera().position;
    browser.scroll(10.0);
    assert_relative_eq!((browser.camera().position - before).norm(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_text_and_headlight_in_frame() {
    let (mut browser, _) = browser(&[]);
    browser.load_scene("Separator { AsciiText { string \"hello\" } }", None).unwrap();
    let output = browser.frame(viewport());
    assert_eq!(output.lights.len(), 1);
    assert_eq!(output.draws.len(), 1);
    assert!(output.draws[0].unlit);
    assert_eq!(output.draws[0].mesh.topology, Topology::Triangles);
}
