//! Background loading of WWWInline documents
//!
//! Fetch and parse run on worker threads. Finished documents come back over
//! a channel and are only ever applied to the scene graph by the thread that
//! calls [`InlineLoader::poll_completed`], which the browser does at the start
//! of each frame.

use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};

use super::vrml::parse;
use super::{AssetError, DocumentFetcher, Location};
use crate::scene::{NodeId, SceneGraph};

/// An inline that needs fetching
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRequest {
    /// Inline node to publish into
    pub node: NodeId,
    /// Resolved document location
    pub location: Location,
}

/// A finished inline fetch
#[derive(Debug)]
pub struct InlineResult {
    /// Inline node the result belongs to
    pub node: NodeId,
    /// Location that was fetched
    pub location: Location,
    /// Parsed document or the reason it failed
    pub outcome: Result<SceneGraph, AssetError>,
    generation: u64,
}

/// Dispatches inline fetches and collects their results
pub struct InlineLoader {
    fetcher: Arc<dyn DocumentFetcher>,
    result_tx: Sender<InlineResult>,
    result_rx: Receiver<InlineResult>,
    generation: u64,
    in_flight: usize,
}

impl InlineLoader {
    /// Create a loader using `fetcher` for every document
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self { fetcher, result_tx, result_rx, generation: 0, in_flight: 0 }
    }

    /// Start fetching `request` on a worker thread
    pub fn request(&mut self, request: InlineRequest) -> Result<(), AssetError> {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.result_tx.clone();
        let generation = self.generation;
        let InlineRequest { node, location } = request;

        log::debug!("Requesting inline {}", location);
        std::thread::Builder::new()
            .name("vrml-inline".into())
            .spawn(move || {
                let outcome = fetch_and_parse(fetcher.as_ref(), &location);
                // Receiver gone means the browser was dropped
                let _ = tx.send(InlineResult { node, location, outcome, generation });
            })?;
        self.in_flight += 1;
        Ok(())
    }

    /// Drain every result that arrived since the last call.
    ///
    /// Results from before the last [`reset`](Self::reset) are discarded.
    pub fn poll_completed(&mut self) -> Vec<InlineResult> {
        let mut completed = Vec::new();
        for result in self.result_rx.try_iter() {
            if result.generation != self.generation {
                log::trace!("Dropping stale inline result for {}", result.location);
                continue;
            }
            self.in_flight = self.in_flight.saturating_sub(1);
            completed.push(result);
        }
        completed
    }

    /// Number of requests still outstanding for the current scene
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Forget outstanding requests; their results will be ignored
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = 0;
    }
}

fn fetch_and_parse(fetcher: &dyn DocumentFetcher, location: &Location) -> Result<SceneGraph, AssetError> {
    let text = fetcher.fetch(location)?;
    let mut graph = parse(&text).ok_or(AssetError::NoRootNode)?;
    graph.set_base(Some(location.clone()));
    Ok(graph)
}
