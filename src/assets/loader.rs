use super::environment::{decode_environment_file, EnvironmentMap};
use super::model::{parse_gltf_file, ImportedModel};
use super::textures::{decode_texture_file, DecodedTexture};
use super::AssetError;
use crate::scene::registry::EntryId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Model,
    /// Texture bound for a mesh entry's slot list.
    Texture { entry: EntryId },
    Environment,
}

#[derive(Debug)]
pub enum Loaded {
    Model(ImportedModel),
    Texture(DecodedTexture),
    Environment(EnvironmentMap),
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub kind: LoadKind,
    pub source: PathBuf,
    pub result: Result<Loaded, AssetError>,
}

#[derive(Debug)]
struct PendingLoad {
    kind: LoadKind,
    source: PathBuf,
}

type Completion = (LoadTicket, Result<Loaded, AssetError>);

/// Runs decodes on worker threads and hands results back to the UI thread.
///
/// A ticket stays live until its completion is drained or its owning entry
/// is cancelled. Completions for dead tickets are dropped on arrival.
pub struct LoadQueue {
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    pending: HashMap<LoadTicket, PendingLoad>,
    next_ticket: u64,
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            pending: HashMap::new(),
            next_ticket: 1,
        }
    }

    pub fn request_model(&mut self, path: PathBuf) -> LoadTicket {
        self.spawn(LoadKind::Model, path, |path| {
            parse_gltf_file(path).map(Loaded::Model)
        })
    }

    pub fn request_texture(&mut self, entry: EntryId, path: PathBuf) -> LoadTicket {
        self.spawn(LoadKind::Texture { entry }, path, |path| {
            decode_texture_file(path).map(Loaded::Texture)
        })
    }

    pub fn request_environment(&mut self, path: PathBuf) -> LoadTicket {
        self.spawn(LoadKind::Environment, path, |path| {
            decode_environment_file(path).map(Loaded::Environment)
        })
    }

    fn spawn<F>(&mut self, kind: LoadKind, source: PathBuf, job: F) -> LoadTicket
    where
        F: FnOnce(&Path) -> Result<Loaded, AssetError> + Send + 'static,
    {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        log::info!("Loading {}", source.display());

        let sender = self.sender.clone();
        let path = source.clone();
        let spawned = thread::Builder::new()
            .name(format!("scenepad-load-{}", ticket.0))
            .spawn(move || {
                let result = job(&path);
                let _ = sender.send((ticket, result));
            });
        if let Err(err) = spawned {
            log::warn!("Could not start load worker: {err}");
            let _ = self.sender.send((ticket, Err(AssetError::WorkerGone)));
        }
        self.pending.insert(ticket, PendingLoad { kind, source });
        ticket
    }

    /// Marks every pending texture load for `entry` dead. Returns how many.
    pub fn cancel_for(&mut self, entry: EntryId) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|_, load| load.kind != LoadKind::Texture { entry });
        let cancelled = before - self.pending.len();
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} pending load(s) for entry {entry}");
        }
        cancelled
    }

    pub fn is_pending(&self, ticket: LoadTicket) -> bool {
        self.pending.contains_key(&ticket)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Completions that arrived since the last call, in arrival order.
    pub fn drain(&mut self) -> Vec<LoadOutcome> {
        let mut out = Vec::new();
        while let Ok((ticket, result)) = self.receiver.try_recv() {
            if let Some(outcome) = self.accept(ticket, result) {
                out.push(outcome);
            }
        }
        out
    }

    fn accept(&mut self, ticket: LoadTicket, result: Result<Loaded, AssetError>) -> Option<LoadOutcome> {
        let Some(load) = self.pending.remove(&ticket) else {
            log::debug!("Discarding completion of cancelled load {}", ticket.0);
            return None;
        };
        Some(LoadOutcome {
            ticket,
            kind: load.kind,
            source: load.source,
            result,
        })
    }

    /// Blocks until every live ticket has completed or `timeout` passes.
    #[cfg(test)]
    pub fn wait(&mut self, timeout: std::time::Duration) -> Vec<LoadOutcome> {
        let deadline = std::time::Instant::now() + timeout;
        let mut out = Vec::new();
        while !self.pending.is_empty() {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            let Ok((ticket, result)) = self.receiver.recv_timeout(remaining) else {
                break;
            };
            if let Some(outcome) = self.accept(ticket, result) {
                out.push(outcome);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::textures::png_bytes;
    use std::time::Duration;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("scenepad_{}_{name}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn texture_load_completes_with_decoded_image() {
        let path = temp_file("loader_ok.png", &png_bytes(2, 2));
        let mut queue = LoadQueue::new();
        let ticket = queue.request_texture(EntryId(7), path.clone());
        assert!(queue.is_pending(ticket));

        let outcomes = queue.wait(Duration::from_secs(10));
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind, LoadKind::Texture { entry: EntryId(7) });
        assert!(matches!(&outcomes[0].result, Ok(Loaded::Texture(t)) if t.width == 2));
        assert_eq!(queue.pending_count(), 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn cancelled_entry_completion_is_discarded() {
        let path = temp_file("loader_cancel.png", &png_bytes(1, 1));
        let mut queue = LoadQueue::new();
        queue.request_texture(EntryId(3), path.clone());
        let survivor = queue.request_texture(EntryId(4), path.clone());
        assert_eq!(queue.cancel_for(EntryId(3)), 1);

        let outcomes = queue.wait(Duration::from_secs(10));
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].ticket, survivor);
        // the cancelled worker may still be in flight
        std::thread::sleep(Duration::from_millis(200));
        assert!(queue.drain().is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn failures_come_back_as_outcomes() {
        let mut queue = LoadQueue::new();
        let missing = std::env::temp_dir().join("scenepad_missing_model.glb");
        queue.request_model(missing);
        let outcomes = queue.wait(Duration::from_secs(10));
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].result, Err(AssetError::Read { .. })));
    }
}
