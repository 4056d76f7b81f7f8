use anyhow::{Context, Result};
use approx::assert_abs_diff_eq;
use infer_rs::model::{Activation, ModelBuilder};
use infer_rs::{create_context, Device, InferError, InferenceContext, ModelConfig, Tensor};

const LN2: f32 = std::f32::consts::LN_2;

/// Four inputs, three classes. The fourth input feature is ignored.
fn classifier_bytes() -> Result<Vec<u8>> {
    #[rustfmt::skip]
    let weights = [
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
        0.0, 0.0, 0.0,
    ];
    Ok(ModelBuilder::new("classifier", [4])
        .dense(4, 3, &weights, Some(&[0.0, 0.0, 0.0]))?
        .activation(Activation::Softmax)
        .labels(["a", "b", "c"])
        .to_bytes()?)
}

#[tokio::test]
async fn infer_classifier_probabilities() -> Result<()> {
    let ctx = create_context(ModelConfig::new(Device::cpu(), classifier_bytes()?))
        .await
        .context("Failed to load classifier")?;
    assert_eq!(ctx.device(), Device::Cpu);

    let model = ctx.model().context("cpu context should hold a model")?;
    assert_eq!(model.name(), "classifier");
    assert_eq!(model.output_features(), 3);

    // logits [0, ln2, ln3] -> exp [1, 2, 3] -> [1/6, 2/6, 3/6]
    let input = Tensor::new([1, 4], vec![0.0, LN2, 3.0f32.ln(), 5.0])?;
    let output = ctx.run(input).await?;

    assert_eq!(output.shape.dims(), &[1, 3]);
    let expected = [1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0];
    for (v, exp) in output.data.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*v, *exp, epsilon = 1e-5);
    }
    assert_eq!(output.argmax(), Some(2));
    assert_eq!(model.label(2), Some("c"));

    Ok(())
}

#[tokio::test]
async fn infer_batched_rows_sum_to_one() -> Result<()> {
    let ctx = create_context(ModelConfig::new(Device::cpu(), classifier_bytes()?)).await?;

    let input = Tensor::new([2, 4], vec![0.0, LN2, 3.0f32.ln(), 5.0, 0.0, 0.0, 0.0, 0.0])?;
    let output = ctx.run(input).await?;

    assert_eq!(output.shape.dims(), &[2, 3]);
    for row in output.data.chunks(3) {
        assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }
    for &v in &output.data[3..] {
        assert_abs_diff_eq!(v, 1.0 / 3.0, epsilon = 1e-5);
    }

    Ok(())
}

#[tokio::test]
async fn wrong_input_size_is_a_tensor_error() -> Result<()> {
    let ctx = create_context(ModelConfig::new(Device::cpu(), classifier_bytes()?)).await?;

    let err = ctx
        .run(Tensor::new([1, 3], vec![1.0, 2.0, 3.0])?)
        .await
        .expect_err("3 values cannot feed a 4-feature model");
    assert!(matches!(err, InferError::Tensor(_)), "got {err}");

    let inconsistent = Tensor {
        shape: [1, 4].into(),
        data: vec![1.0],
    };
    assert!(matches!(ctx.run(inconsistent).await, Err(InferError::Tensor(_))));

    // The context stays usable after rejected inputs.
    assert!(ctx.run(Tensor::new([4], vec![0.0; 4])?).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn corrupt_model_fails_to_load() -> Result<()> {
    let err = create_context(ModelConfig::new(Device::cpu(), b"not a model".to_vec()))
        .await
        .expect_err("garbage must not load");
    assert!(matches!(err, InferError::ModelLoad(_)), "got {err}");

    let mut bytes = classifier_bytes()?;
    bytes.truncate(bytes.len() - 4);
    let err = create_context(ModelConfig::new(Device::cpu(), bytes))
        .await
        .expect_err("model with a missing weight must not load");
    assert!(matches!(err, InferError::ModelLoad(_)), "got {err}");

    Ok(())
}

#[tokio::test]
async fn npu_is_not_available() -> Result<()> {
    let err = create_context(ModelConfig::new(Device::Npu, classifier_bytes()?))
        .await
        .expect_err("npu should not initialize");
    assert!(matches!(err, InferError::DeviceInit(_)), "got {err}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_share_a_context() -> Result<()> {
    let ctx = create_context(ModelConfig::new(Device::cpu(), classifier_bytes()?)).await?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            ctx.run(Tensor::new([1, 4], vec![0.0, LN2, 3.0f32.ln(), 5.0])?)
                .await
        }));
    }

    let mut outputs = Vec::new();
    for handle in handles {
        outputs.push(handle.await??);
    }
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[test]
fn blocking_api_matches_async() -> Result<()> {
    let ctx = InferenceContext::new(ModelConfig::new(Device::cpu(), classifier_bytes()?))?;
    let output = ctx.infer(&Tensor::new([4], vec![0.0, 0.0, 0.0, 0.0])?)?;
    assert_eq!(output.shape.dims(), &[1, 3]);
    for &v in &output.data {
        assert_abs_diff_eq!(v, 1.0 / 3.0, epsilon = 1e-5);
    }
    Ok(())
}

#[test]
fn model_config_from_file() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("infer-rs-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("classifier.infm");
    std::fs::write(&path, classifier_bytes()?)?;

    let config = ModelConfig::from_file(&path, Device::cpu())?;
    assert!(InferenceContext::new(config).is_ok());

    let missing = ModelConfig::from_file(dir.join("missing.infm"), Device::cpu());
    assert!(matches!(missing, Err(InferError::FileNotFound(_))));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
