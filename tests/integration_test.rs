//! Integration tests for stratgen

use std::fs;
use stratgen::{
    ai::{GenerationClient, GeneratorConfig, StrategyValidator},
    config::{Config, LintConfig},
    pipeline::{Outcome, Pipeline, DEFAULT_PROMPTS},
    store::{ArtifactStore, StrategyMetadata},
    types::Dialect,
};
use tempfile::TempDir;

fn offline_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.generator = GeneratorConfig::offline();
    config.validation.lint = LintConfig::disabled();
    config.output.directory = dir.path().to_path_buf();
    config
}

#[tokio::test]
async fn test_offline_batch_of_three_is_saved() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::from_config(&offline_config(&dir));

    let report = pipeline.run_batch(&DEFAULT_PROMPTS).await;

    assert_eq!(report.items.len(), 3);
    assert_eq!(report.saved(), 3);
    for (i, item) in report.items.iter().enumerate() {
        assert_eq!(item.index, i + 1);
        assert_eq!(item.prompt, DEFAULT_PROMPTS[i]);
        match &item.outcome {
            Outcome::Saved {
                path,
                score,
                warnings,
            } => {
                assert_eq!(*score, 100);
                assert!(warnings.is_empty());
                assert_eq!(
                    path.file_name().unwrap().to_str().unwrap(),
                    format!("strategy_{}.py", i + 1)
                );
            }
            other => panic!("item {} not saved: {:?}", i + 1, other),
        }
    }

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "strategy_1.json",
            "strategy_1.py",
            "strategy_2.json",
            "strategy_2.py",
            "strategy_3.json",
            "strategy_3.py"
        ]
    );
}

#[tokio::test]
async fn test_sidecar_matches_saved_source() {
    let dir = TempDir::new().unwrap();
    let mut config = offline_config(&dir);
    config.output.dialect = Dialect::CSharp;
    config.output.stem_prefix = "algo".to_string();
    let pipeline = Pipeline::from_config(&config);

    let report = pipeline.run_batch(&["Pairs trading on KO and PEP"]).await;
    let Outcome::Saved { path, .. } = &report.items[0].outcome else {
        panic!("not saved: {:?}", report.items[0].outcome);
    };

    let metadata = StrategyMetadata::read_from(dir.path().join("algo_1.json")).unwrap();
    assert_eq!(metadata.description, "Pairs trading on KO and PEP");
    assert_eq!(metadata.language, Dialect::CSharp);
    assert!(metadata.origin.is_fallback());
    assert_eq!(
        fs::read(&metadata.filename).unwrap(),
        fs::read(path).unwrap()
    );
}

#[tokio::test]
async fn test_unconfigured_client_output_validates_clean() {
    let client = GenerationClient::new(&GeneratorConfig {
        api_key: None,
        ..GeneratorConfig::default()
    });
    assert!(!client.is_online());

    let artifact = client.generate("Volatility breakout", Dialect::Python).await;
    assert!(artifact.source_code().contains("def Initialize("));
    assert!(artifact.source_code().contains("def OnData("));

    let report = StrategyValidator::new()
        .validate(artifact.source_code(), Dialect::Python)
        .await;
    assert!(report.is_valid());
    assert_eq!(report.score(), 100);
}

#[tokio::test]
async fn test_persist_then_revalidate() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let artifact = GenerationClient::offline()
        .generate("Dual momentum", Dialect::Python)
        .await;

    let path = store.persist(&artifact, "dual").unwrap();
    let source = fs::read_to_string(&path).unwrap();
    assert_eq!(source, artifact.source_code());

    let validator = StrategyValidator::new();
    assert_eq!(
        validator.check_rules(&source, Dialect::Python),
        validator.check_rules(artifact.source_code(), Dialect::Python)
    );
}

#[tokio::test]
async fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stratgen.toml");

    let mut config = Config::default();
    config.output.stem_prefix = "idea".to_string();
    config.validation.lint.csharp = Some(vec!["dotnet".to_string(), "format".to_string()]);
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.output.stem_prefix, "idea");
    assert_eq!(
        loaded.validation.lint.command_for(Dialect::CSharp),
        Some(&["dotnet".to_string(), "format".to_string()][..])
    );
}
