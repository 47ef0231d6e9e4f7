//! Per-model session cache with single-flight creation.
//!
//! Each model moves `Uninitialized -> Ready` exactly once. Callers that race
//! on the first request all await the same in-flight creation, so the engine
//! builds at most one session per model. A failed creation leaves the entry
//! `Uninitialized` and the next caller tries again.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::ModelKind;
use crate::error::{Result, ZiaError};
use crate::ml::engine::{InferenceEngine, InferenceSession, ModelSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Uninitialized,
    Ready,
}

#[derive(Default)]
struct Entry {
    session: OnceCell<Arc<dyn InferenceSession>>,
    attempts: AtomicU64,
}

pub struct SessionRegistry {
    engine: Arc<dyn InferenceEngine>,
    specs: HashMap<ModelKind, ModelSpec>,
    entries: DashMap<ModelKind, Arc<Entry>>,
}

impl SessionRegistry {
    pub fn new(engine: Arc<dyn InferenceEngine>, specs: impl IntoIterator<Item = ModelSpec>) -> Self {
        Self {
            engine,
            specs: specs.into_iter().map(|s| (s.kind, s)).collect(),
            entries: DashMap::new(),
        }
    }

    pub fn spec(&self, kind: ModelKind) -> Result<&ModelSpec> {
        self.specs
            .get(&kind)
            .ok_or_else(|| ZiaError::Validation(format!("no model configured for {kind}")))
    }

    /// Return the cached session for `kind`, creating it on first use.
    pub async fn get_or_create(&self, kind: ModelKind) -> Result<Arc<dyn InferenceSession>> {
        let spec = self.spec(kind)?;
        // Clone out of the map so no shard lock is held across the await.
        let entry = Arc::clone(&self.entries.entry(kind).or_default());

        let session = entry
            .session
            .get_or_try_init(|| async {
                let attempt = entry.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                info!(model = %kind, model_path = %spec.path, attempt, "creating inference session");
                match self.engine.create_session(spec).await {
                    Ok(session) => Ok(session),
                    Err(e) => {
                        warn!(model = %kind, attempt, error = %e, "session creation failed");
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(session))
    }

    pub fn state(&self, kind: ModelKind) -> HandleState {
        match self.entries.get(&kind) {
            Some(entry) if entry.session.initialized() => HandleState::Ready,
            _ => HandleState::Uninitialized,
        }
    }

    /// How many times the engine was asked to build a session for `kind`.
    pub fn creation_attempts(&self, kind: ModelKind) -> u64 {
        self.entries
            .get(&kind)
            .map(|e| e.attempts.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut models: Vec<_> = self.specs.keys().copied().collect();
        models.sort_by_key(|k| k.as_str());
        let states: Vec<_> = models.iter().map(|k| (*k, self.state(*k))).collect();
        f.debug_struct("SessionRegistry")
            .field("models", &states)
            .finish()
    }
}
