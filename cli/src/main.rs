mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geoconflict_core::{CountryDefinition, GameBuilder, default_definitions};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> Result<()> {
    let definitions = load_definitions()?;
    let rng = StdRng::from_entropy();
    let mut game = GameBuilder::new(definitions)
        .with_rng(rng)
        .build()
        .context("世界情勢の初期化に失敗しました")?;

    cli::run(&mut game)
}

fn load_definitions() -> Result<Vec<CountryDefinition>> {
    let Some(config_path) = resolve_config_path() else {
        println!("config/countries.json が見つからないため、組み込みシナリオで開始します。");
        return default_definitions();
    };

    let file = File::open(&config_path)
        .with_context(|| format!("国設定ファイルを開けません: {}", config_path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).with_context(|| {
        format!(
            "国設定ファイルの解析に失敗しました: {}",
            config_path.display()
        )
    })
}

fn resolve_config_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let candidates = [
        cwd.join("config").join("countries.json"),
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("config")
            .join("countries.json"),
    ];

    candidates.into_iter().find(|path| path.exists())
}
