use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use zia::config::{AppConfig, MEANS_CLS, MEANS_REG, SCALES_CLS, SCALES_REG};
use zia::ml::{InferenceEngine, InferenceSession, ModelSpec, Tensor, TensorMap};
use zia::pipeline::{decode_classification, report_once, softmax, IRIS_CLASS_NAMES};
use zia::{ModelKind, PipelineOutcome, Predictor, Result, ZiaError};

/// Records every feed and answers with a fixed output per model.
#[derive(Default)]
struct StubEngine {
    regression_output: Vec<f32>,
    classification_output: Vec<f32>,
    feeds: Arc<Mutex<Vec<(ModelKind, Vec<usize>, Vec<f32>)>>>,
}

struct StubSession {
    kind: ModelKind,
    output: Vec<f32>,
    feeds: Arc<Mutex<Vec<(ModelKind, Vec<usize>, Vec<f32>)>>>,
}

#[async_trait]
impl InferenceSession for StubSession {
    async fn run(&self, feeds: TensorMap) -> Result<TensorMap> {
        let input = feeds
            .get("input")
            .ok_or_else(|| ZiaError::Engine("no tensor named 'input'".to_string()))?;
        self.feeds.lock().unwrap().push((
            self.kind,
            input.shape().to_vec(),
            input.data().to_vec(),
        ));

        let mut out = TensorMap::new();
        out.insert(
            "output".to_string(),
            Tensor::new(vec![1, self.output.len()], self.output.clone())?,
        );
        Ok(out)
    }
}

#[async_trait]
impl InferenceEngine for StubEngine {
    async fn create_session(&self, spec: &ModelSpec) -> Result<Arc<dyn InferenceSession>> {
        let output = match spec.kind {
            ModelKind::Regression => self.regression_output.clone(),
            ModelKind::Classification => self.classification_output.clone(),
        };
        Ok(Arc::new(StubSession {
            kind: spec.kind,
            output,
            feeds: Arc::clone(&self.feeds),
        }))
    }
}

fn predictor(engine: StubEngine) -> (Predictor, Arc<Mutex<Vec<(ModelKind, Vec<usize>, Vec<f32>)>>>) {
    let feeds = Arc::clone(&engine.feeds);
    let predictor = Predictor::new(&AppConfig::default_config(), Arc::new(engine)).unwrap();
    (predictor, feeds)
}

const WINE_SAMPLE: &str = "6.9,0.28,0.33,6.5,0.046,36,139,0.994,3.19,0.49,10.5";
const IRIS_SAMPLE: &str = "5.1,3.5,1.4,0.2";

#[tokio::test]
async fn regression_end_to_end_renders_three_decimals() {
    let (predictor, feeds) = predictor(StubEngine {
        regression_output: vec![5.6],
        ..Default::default()
    });

    let text = predictor.render(ModelKind::Regression, WINE_SAMPLE).await;
    assert_eq!(text, "5.600");

    let feeds = feeds.lock().unwrap();
    assert_eq!(feeds.len(), 1);
    let (kind, shape, data) = &feeds[0];
    assert_eq!(*kind, ModelKind::Regression);
    assert_eq!(shape, &vec![1, 11]);

    let raw = [6.9, 0.28, 0.33, 6.5, 0.046, 36.0, 139.0, 0.994, 3.19, 0.49, 10.5];
    for i in 0..11 {
        let expected = ((raw[i] - MEANS_REG[i]) / SCALES_REG[i]) as f32;
        assert_eq!(data[i], expected, "feature {i}");
    }
}

#[tokio::test]
async fn regression_keeps_full_precision() {
    let (predictor, _) = predictor(StubEngine {
        regression_output: vec![6.123_456],
        ..Default::default()
    });

    let prediction = predictor.predict_regression(WINE_SAMPLE).await.unwrap();
    assert_eq!(prediction.value, f64::from(6.123_456f32));
    assert_eq!(prediction.display(), "6.123");
}

#[tokio::test]
async fn classification_end_to_end_selects_setosa() {
    let logits = vec![2.0f32, 0.1, 0.05];
    let (predictor, feeds) = predictor(StubEngine {
        classification_output: logits.clone(),
        ..Default::default()
    });

    let decision = predictor.classify(IRIS_SAMPLE).await.unwrap();
    assert_eq!(decision.class_index, 0);
    assert_eq!(decision.label, "setosa");

    let expected = softmax(&logits.iter().map(|v| f64::from(*v)).collect::<Vec<_>>());
    assert_eq!(decision.probabilities, expected);
    assert_eq!(
        format!("{:.3}", decision.probability),
        format!("{:.3}", expected[0])
    );
    assert!((decision.probability - 0.774_088).abs() < 1e-5);

    let text = predictor.render(ModelKind::Classification, IRIS_SAMPLE).await;
    assert_eq!(text, "setosa (class 0, prob = 0.774)");

    let feeds = feeds.lock().unwrap();
    let (_, shape, data) = &feeds[0];
    assert_eq!(shape, &vec![1, 4]);
    let raw = [5.1, 3.5, 1.4, 0.2];
    for i in 0..4 {
        let expected = ((raw[i] - MEANS_CLS[i]) / SCALES_CLS[i]) as f32;
        assert_eq!(data[i], expected, "feature {i}");
    }
}

#[tokio::test]
async fn classification_tie_goes_to_first_class() {
    let (predictor, _) = predictor(StubEngine {
        classification_output: vec![0.0, 0.0, 0.0],
        ..Default::default()
    });

    let text = predictor.render(ModelKind::Classification, IRIS_SAMPLE).await;
    assert_eq!(text, "setosa (class 0, prob = 0.333)");
}

#[tokio::test]
async fn both_pipelines_share_nothing_but_the_registry() {
    let (predictor, feeds) = predictor(StubEngine {
        regression_output: vec![5.6],
        classification_output: vec![0.0, 0.5, 3.0],
        ..Default::default()
    });

    let (reg, cls) = tokio::join!(
        predictor.run(ModelKind::Regression, WINE_SAMPLE),
        predictor.run(ModelKind::Classification, "6.7,3.0,5.2,2.3"),
    );

    assert!(matches!(reg.unwrap(), PipelineOutcome::Regression(p) if p.display() == "5.600"));
    match cls.unwrap() {
        PipelineOutcome::Classification(d) => {
            assert_eq!(d.class_index, 2);
            assert_eq!(d.label, "virginica");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(feeds.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn errors_render_into_the_region() {
    let (predictor, feeds) = predictor(StubEngine {
        regression_output: vec![5.6],
        classification_output: vec![2.0, 0.1, 0.05],
        ..Default::default()
    });

    assert_eq!(
        predictor.render(ModelKind::Regression, "").await,
        "Error: Input is empty."
    );
    assert_eq!(
        predictor.render(ModelKind::Classification, "1,2,abc").await,
        "Error: All inputs must be valid numbers."
    );
    assert_eq!(
        predictor.render(ModelKind::Classification, "5.1,3.5,1.4").await,
        "Error: Expected 4 features but got 3."
    );
    assert_eq!(
        predictor.render(ModelKind::Classification, "0x1F,3.5,1.4,0.2").await,
        "Error: All inputs must be valid numbers."
    );
    // Trailing commas are tolerated
    assert_eq!(
        predictor.render(ModelKind::Classification, "5.1,3.5,,1.4,0.2,").await,
        "setosa (class 0, prob = 0.774)"
    );
    assert_eq!(feeds.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn halfway_outputs_round_away_from_zero() {
    // Odd multiples of 1/16 are exact in f32 and sit on a 3-decimal midpoint
    for (output, expected) in [(5.5625f32, "5.563"), (0.0625, "0.063"), (-5.5625, "-5.563")] {
        let (predictor, _) = predictor(StubEngine {
            regression_output: vec![output],
            ..Default::default()
        });
        assert_eq!(predictor.render(ModelKind::Regression, WINE_SAMPLE).await, expected);
    }
}

#[tokio::test]
async fn setup_errors_render_into_the_region() {
    let mut config = AppConfig::default_config();
    config.models.classification.labels.pop();

    let report = report_once(
        &config,
        Ok(Arc::new(StubEngine::default()) as Arc<dyn InferenceEngine>),
        ModelKind::Classification,
        IRIS_SAMPLE,
    )
    .await;
    assert!(report.is_error());
    assert!(report.text.starts_with("Error: "), "{}", report.text);

    let report = report_once(
        &AppConfig::default_config(),
        Err(ZiaError::Engine("no inference engine available".to_string())),
        ModelKind::Regression,
        WINE_SAMPLE,
    )
    .await;
    assert_eq!(report.text, "Error: no inference engine available");
}

#[test]
fn decoder_matches_the_pipeline_contract() {
    let d = decode_classification(&[0.0, 0.0, 0.0], &IRIS_CLASS_NAMES).unwrap();
    assert_eq!((d.class_index, d.label.as_str()), (0, "setosa"));
    for p in &d.probabilities {
        assert!((p - 1.0 / 3.0).abs() < 1e-12);
    }
}
