//! CLI entry point for infer-rs.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use infer_rs::cli::{Cli, Commands};
use infer_rs::config::Config;
use infer_rs::inference::{create_context, probe_device, Device, InferenceContext, ModelConfig};
use infer_rs::model::{Model, ModelDescription};
use infer_rs::Tensor;

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_yaml_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn init_logging(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Best `k` classes per output row, labelled when the model has labels.
fn top_classes(ctx: &InferenceContext, output: &Tensor, k: usize) -> Vec<serde_json::Value> {
    let width = output.shape.last().map_or(output.len(), |w| w as usize).max(1);
    output
        .data
        .chunks(width)
        .map(|row| {
            let classes = Tensor::from_vec(row.to_vec())
                .map(|row| row.top_k(k))
                .unwrap_or_default()
                .into_iter()
                .map(|(index, probability)| {
                    let label = ctx.model().and_then(|m| m.label(index));
                    serde_json::json!({
                        "index": index,
                        "label": label,
                        "probability": probability,
                    })
                })
                .collect::<Vec<_>>();
            serde_json::Value::Array(classes)
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Infer {
            model,
            device,
            input,
            format,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            init_logging(config.log_level()?);

            let device: Device = match device {
                Some(device) => device.parse()?,
                None => config.device()?,
            };
            info!("Using device: {}", device);

            let model = match model.or_else(|| config.model.path.clone().map(Into::into)) {
                Some(model) => model,
                None => bail!("No model given: pass --model or set model.path in the config"),
            };

            info!("Loading model: {}", model.display());
            let ctx = create_context(ModelConfig::from_file(&model, device)?).await?;
            info!("Model loaded successfully");

            info!("Loading input: {}", input.display());
            let input_tensor: Tensor = serde_json::from_str(
                &fs::read_to_string(&input)
                    .with_context(|| format!("Failed to read input: {}", input.display()))?,
            )
            .context("Input must be {\"shape\": [..], \"data\": [..]}")?;
            input_tensor.validate()?;

            info!("Running inference...");
            let start = Instant::now();
            let output = ctx.run(input_tensor).await?;
            let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            info!("Inference complete in {:.2}ms", latency_ms);

            let result = serde_json::json!({
                "device": device.to_string(),
                "latency_ms": latency_ms,
                "shape": output.shape,
                "output": output.data,
                "top": top_classes(&ctx, &output, config.inference.top_k),
            });

            if format == "pretty" {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", serde_json::to_string(&result)?);
            }
        }

        Commands::Info { model, device } => {
            init_logging(Level::INFO);
            let device: Device = device.parse()?;

            println!("infer-rs v{}", env!("CARGO_PKG_VERSION"));
            println!("Model: {}", model.display());
            println!("Device: {}", device);

            info!("Loading model...");
            let ctx = create_context(ModelConfig::from_file(&model, device)?).await?;
            match ctx.model() {
                Some(m) => {
                    println!("Name: {}", m.name());
                    println!("Input shape: {}", m.input_shape());
                    println!("Outputs: {}", m.output_features());
                    println!("Layers: {}", m.layers().len());
                    if let Some(labels) = m.labels() {
                        println!("Labels: {}", labels.join(", "));
                    }
                }
                None => println!("Model data is not inspected on the {} device", device),
            }
            println!("Status: OK (model loaded successfully)");
        }

        Commands::Pack { spec, output } => {
            init_logging(Level::INFO);

            let json = fs::read_to_string(&spec)
                .with_context(|| format!("Failed to read model description: {}", spec.display()))?;
            let bytes = ModelDescription::from_json(&json)?.into_builder()?.to_bytes()?;

            // Reject anything the loader would refuse before writing it out.
            let model = Model::from_bytes(&bytes)?;
            fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write model: {}", output.display()))?;

            info!(
                "Wrote {} ({} bytes, {} layers, {} -> {})",
                output.display(),
                bytes.len(),
                model.layers().len(),
                model.input_shape(),
                model.output_features()
            );
        }

        Commands::Probe { device } => {
            init_logging(Level::INFO);
            let device: Device = device.parse()?;
            println!("Testing device: {}", device);
            println!();

            match probe_device(&device) {
                Ok(report) => {
                    println!("{}", report);
                }
                Err(e) => {
                    eprintln!("Device probe failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
