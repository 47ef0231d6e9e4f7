use async_trait::async_trait;
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zia::config::AppConfig;
use zia::ml::{InferenceEngine, InferenceSession, ModelSpec, SessionRegistry, Tensor, TensorMap};
use zia::{HandleState, ModelKind, Predictor, Result, ZiaError};

/// Slow to create, so racing callers overlap the creation window.
struct SlowEngine {
    created: AtomicUsize,
    fail_first: usize,
    delay: Duration,
}

impl SlowEngine {
    fn new(fail_first: usize) -> Self {
        Self {
            created: AtomicUsize::new(0),
            fail_first,
            delay: Duration::from_millis(25),
        }
    }
}

struct LogitsSession;

#[async_trait]
impl InferenceSession for LogitsSession {
    async fn run(&self, _feeds: TensorMap) -> Result<TensorMap> {
        let mut out = TensorMap::new();
        out.insert(
            "output".to_string(),
            Tensor::new(vec![1, 3], vec![2.0, 0.1, 0.05])?,
        );
        Ok(out)
    }
}

#[async_trait]
impl InferenceEngine for SlowEngine {
    async fn create_session(&self, _spec: &ModelSpec) -> Result<Arc<dyn InferenceSession>> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if n < self.fail_first {
            return Err(ZiaError::Engine(format!("model load failed (attempt {})", n + 1)));
        }
        Ok(Arc::new(LogitsSession))
    }
}

fn registry(engine: Arc<SlowEngine>) -> SessionRegistry {
    SessionRegistry::new(engine, AppConfig::default_config().model_specs())
}

#[tokio::test]
async fn racing_first_calls_share_one_creation() {
    let engine = Arc::new(SlowEngine::new(0));
    let registry = registry(Arc::clone(&engine));

    let sessions = join_all((0..16).map(|_| registry.get_or_create(ModelKind::Classification))).await;

    let first = sessions[0].as_ref().ok().cloned().expect("creation should succeed");
    for session in &sessions {
        let session = session.as_ref().ok().expect("every racer gets the session");
        assert!(Arc::ptr_eq(session, &first));
    }
    assert_eq!(engine.created.load(Ordering::SeqCst), 1);
    assert_eq!(registry.creation_attempts(ModelKind::Classification), 1);
    assert_eq!(registry.state(ModelKind::Classification), HandleState::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_tasks_across_threads_share_one_creation() {
    let engine = Arc::new(SlowEngine::new(0));
    let predictor = Arc::new(
        Predictor::new(&AppConfig::default_config(), Arc::clone(&engine) as Arc<dyn InferenceEngine>)
            .unwrap(),
    );

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let predictor = Arc::clone(&predictor);
            tokio::spawn(async move {
                predictor
                    .render(ModelKind::Classification, "5.1,3.5,1.4,0.2")
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), "setosa (class 0, prob = 0.774)");
    }
    assert_eq!(engine.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn models_are_cached_independently() {
    let engine = Arc::new(SlowEngine::new(0));
    let registry = registry(Arc::clone(&engine));

    registry.get_or_create(ModelKind::Regression).await.unwrap();
    registry.get_or_create(ModelKind::Classification).await.unwrap();
    registry.get_or_create(ModelKind::Regression).await.unwrap();

    assert_eq!(engine.created.load(Ordering::SeqCst), 2);
    assert_eq!(registry.creation_attempts(ModelKind::Regression), 1);
    assert_eq!(registry.creation_attempts(ModelKind::Classification), 1);
}

#[tokio::test]
async fn failed_creation_leaves_handle_uninitialized_and_retries() {
    let engine = Arc::new(SlowEngine::new(1));
    let predictor = Predictor::new(
        &AppConfig::default_config(),
        Arc::clone(&engine) as Arc<dyn InferenceEngine>,
    )
    .unwrap();

    let text = predictor
        .render(ModelKind::Classification, "5.1,3.5,1.4,0.2")
        .await;
    assert_eq!(text, "Error: model load failed (attempt 1)");
    assert_eq!(
        predictor.registry().state(ModelKind::Classification),
        HandleState::Uninitialized
    );

    let text = predictor
        .render(ModelKind::Classification, "5.1,3.5,1.4,0.2")
        .await;
    assert_eq!(text, "setosa (class 0, prob = 0.774)");
    assert_eq!(
        predictor.registry().state(ModelKind::Classification),
        HandleState::Ready
    );
    assert_eq!(engine.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn ready_handle_survives_sibling_errors() {
    let engine = Arc::new(SlowEngine::new(0));
    let predictor = Predictor::new(
        &AppConfig::default_config(),
        Arc::clone(&engine) as Arc<dyn InferenceEngine>,
    )
    .unwrap();

    let ok = predictor
        .render(ModelKind::Classification, "5.1,3.5,1.4,0.2")
        .await;
    assert!(!ok.starts_with("Error:"));

    let err = predictor.render(ModelKind::Classification, "5.1,oops").await;
    assert_eq!(err, "Error: All inputs must be valid numbers.");

    let ok_again = predictor
        .render(ModelKind::Classification, "5.1,3.5,1.4,0.2")
        .await;
    assert_eq!(ok, ok_again);
    assert_eq!(engine.created.load(Ordering::SeqCst), 1);
    assert_eq!(
        predictor.registry().state(ModelKind::Classification),
        HandleState::Ready
    );
}
