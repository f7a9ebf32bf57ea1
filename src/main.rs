//! Collusion Scoring Core - Offline Command Entry
//!
//! Training and evaluation run out-of-band from any serving process:
//! they read the feedback directory and publish artifacts that a live
//! engine hot-reloads.
//!
//! Commands:
//!   train         refit model + calibrators from feedback
//!   tune-weights  refit the fallback blend weights from feedback
//!   eval          ROC-AUC and risk distribution of the active model
//!   score <json>  score one signal map, e.g. '{"jaccard":0.9,"tfidf":0.8}'

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use collusion_core::constants::APP_NAME;
use collusion_core::logic::artifacts::snapshot::{EngineConfig, ScoringEngine};
use collusion_core::logic::artifacts::store::FsArtifactStore;
use collusion_core::logic::artifacts::types::{ArtifactKind, ModelArtifact};
use collusion_core::logic::features::vector::{assemble, SignalMap};
use collusion_core::logic::feedback::record::FeedbackRecord;
use collusion_core::logic::feedback::store::{FeedbackStore, JsonlFeedbackStore};
use collusion_core::logic::risk::RiskThresholds;
use collusion_core::logic::training::metrics::roc_auc;
use collusion_core::logic::training::{train, tune_fallback_weights, save_weights, TrainingConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (positional, data_dir) = parse_args(&args);

    match positional.first().map(String::as_str) {
        Some("train") => cmd_train(&data_dir),
        Some("tune-weights") => cmd_tune_weights(&data_dir),
        Some("eval") => cmd_eval(&data_dir),
        Some("score") => {
            let json = positional
                .get(1)
                .context("score needs a JSON signal map argument")?;
            cmd_score(&data_dir, json)
        }
        _ => {
            eprintln!(
                "usage: collusion-core <train|tune-weights|eval|score> [--data-dir DIR]"
            );
            Ok(())
        }
    }
}

fn parse_args(args: &[String]) -> (Vec<String>, PathBuf) {
    let mut positional = Vec::new();
    let mut data_dir = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--data-dir" {
            data_dir = args.get(i + 1).map(PathBuf::from);
            i += 2;
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }
    let data_dir = data_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
    });
    (positional, data_dir)
}

fn feedback_records(data_dir: &PathBuf) -> Result<Vec<FeedbackRecord>> {
    let store = JsonlFeedbackStore::from_path(data_dir.join("feedback"))?;
    Ok(store.read_all()?)
}

fn cmd_train(data_dir: &PathBuf) -> Result<()> {
    let records = feedback_records(data_dir)?;
    let store = FsArtifactStore::new(data_dir.join("artifacts"))?;
    let report = train(&records, &TrainingConfig::default(), &store)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_tune_weights(data_dir: &PathBuf) -> Result<()> {
    let records = feedback_records(data_dir)?;
    let tuned = tune_fallback_weights(&records, 0, collusion_core::constants::DEFAULT_TRAINING_SEED)?;
    let path = data_dir.join("weights.json");
    save_weights(&tuned, &path)?;
    println!("{}", serde_json::to_string_pretty(&tuned)?);
    log::info!("saved tuned weights to {}", path.display());
    Ok(())
}

fn cmd_eval(data_dir: &PathBuf) -> Result<()> {
    let store = FsArtifactStore::new(data_dir.join("artifacts"))?;
    let Some((model, _)) = store.read_active::<ModelArtifact>(ArtifactKind::Model)? else {
        bail!("no model artifact; run `collusion-core train` first");
    };
    model.validate()?;

    let records = feedback_records(data_dir)?;
    if records.is_empty() {
        bail!("no feedback data to evaluate on");
    }

    let labels: Vec<u8> = records.iter().map(|r| r.label).collect();
    let scores: Vec<f64> = records
        .iter()
        .map(|r| model.predict(&assemble(&r.signals, model.dim())))
        .collect::<std::result::Result<_, _>>()?;

    let thresholds = RiskThresholds::default();
    let mut buckets = std::collections::BTreeMap::new();
    for &score in &scores {
        *buckets
            .entry(thresholds.classify(score).as_str())
            .or_insert(0usize) += 1;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "n": labels.len(),
            "dim": model.dim(),
            "model_type": model.model_type,
            "auc": roc_auc(&labels, &scores),
            "risk_dist": buckets,
        }))?
    );
    Ok(())
}

fn cmd_score(data_dir: &PathBuf, json: &str) -> Result<()> {
    let signals: SignalMap = serde_json::from_str(json).context("signal map must be JSON")?;
    let engine = ScoringEngine::new(EngineConfig {
        artifact_dir: data_dir.join("artifacts"),
        weights_path: Some(data_dir.join("weights.json")),
        ..Default::default()
    })?;
    let result = engine.score(&signals);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
