//! Headless VRML inspector
//!
//! Loads a `.wrl` document, waits for its inlines, and logs what one frame
//! would draw. With `--pick X Y` it also reports the link under that pixel.
//!
//! Usage: `wrl_inspect <file.wrl> [--config viewer.toml] [--pick X Y] [--size W H]`

mod host;

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use vrml_engine::prelude::*;

use host::{EstimatedText, ImageTextures};

/// How long to wait for inline documents before reporting anyway
const INLINE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
enum InspectError {
    #[error("usage: wrl_inspect <file.wrl> [--config FILE] [--pick X Y] [--size W H]")]
    Usage,

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },

    #[error(transparent)]
    Config(#[from] vrml_engine::config::ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

struct Args {
    document: String,
    config: Option<String>,
    pick: Option<Vec2>,
    viewport: Vec2,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, InspectError> {
        let mut document = None;
        let mut config = None;
        let mut pick = None;
        let mut viewport = Vec2::new(800.0, 600.0);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(args.next().ok_or(InspectError::Usage)?),
                "--pick" => pick = Some(Self::pair(&mut args, "--pick")?),
                "--size" => viewport = Self::pair(&mut args, "--size")?,
                _ if document.is_none() && !arg.starts_with("--") => document = Some(arg),
                _ => return Err(InspectError::Usage),
            }
        }

        Ok(Self { document: document.ok_or(InspectError::Usage)?, config, pick, viewport })
    }

    fn pair(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<Vec2, InspectError> {
        let mut value = || -> Result<f32, InspectError> {
            let text = args.next().ok_or(InspectError::Usage)?;
            text.parse().map_err(|_| InspectError::InvalidValue { flag, value: text })
        };
        Ok(Vec2::new(value()?, value()?))
    }
}

fn run(args: Args) -> Result<(), InspectError> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load_from_file(path)?,
        None => ViewerConfig::default(),
    };

    let mut browser = SceneBrowser::new(
        config,
        Arc::new(FileFetcher),
        Box::new(ImageTextures::default()),
        Box::new(EstimatedText::default()),
    );
    browser.load_location(Location::parse(&args.document))?;

    let deadline = Instant::now() + INLINE_TIMEOUT;
    let mut frame = browser.frame(args.viewport);
    while (browser.pending_inlines() > 0 || !frame.pending_inlines.is_empty()) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
        frame = browser.frame(args.viewport);
    }
    if browser.pending_inlines() > 0 {
        log::warn!("{} inline(s) still loading after {:?}", browser.pending_inlines(), INLINE_TIMEOUT);
    }

    for event in browser.drain_events() {
        log::debug!("{:?}", event);
    }

    log::info!("{} nodes, {} viewpoint(s)", browser.graph().len(), browser.viewpoints().len());
    for (index, viewpoint) in browser.viewpoints().iter().enumerate() {
        let name = browser.graph().get(viewpoint.node).and_then(|node| node.name.as_deref()).unwrap_or("<unnamed>");
        log::info!("  viewpoint {}: {}", index, name);
    }

    let vertices: usize = frame.draws.iter().map(|draw| draw.mesh.vertices.len()).sum();
    log::info!("{} draw(s), {} vertices, {} light(s)", frame.draws.len(), vertices, frame.lights.len());
    for draw in &frame.draws {
        log::debug!(
            "  {:?} {:?} with {} vertices{}{}",
            draw.node,
            draw.mesh.topology,
            draw.mesh.vertices.len(),
            if draw.texture.is_some() { ", textured" } else { "" },
            if draw.unlit { ", unlit" } else { "" },
        );
    }

    if let Some(screen) = args.pick {
        match browser.pick(screen, args.viewport) {
            Some(hit) => {
                log::info!("Hit {:?} at distance {:.3}", hit.node, hit.distance);
                match hit.anchor {
                    Some(anchor) => println!("{}", anchor.target()),
                    None => println!("no link"),
                }
            }
            None => println!("nothing under ({}, {})", screen.x, screen.y),
        }
    }
    Ok(())
}

fn main() {
    vrml_engine::foundation::logging::init_with_default("info");

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
