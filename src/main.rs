use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use seavigil::{cli, config, error, output, progress, scanner, session};
use seavigil::client::EnhancementClient;
use seavigil_common::{EnhancementResult, MediaAsset};
use cli::{Cli, Commands};
use config::Config;
use error::SeaVigilError;
use progress::StepProgress;
use session::{Delay, NoDelay, RunOutcome, SessionOptions, TokioDelay, UploadSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 設定ファイルが壊れていても config サブコマンドで修復できるようにする
    let config = match cli.command {
        Commands::Config { .. } => Config::load_or_default(),
        _ => Config::load()?,
    };

    match cli.command {
        Commands::Enhance { file, output: save_to, passthrough, interval_ms, strict, json } => {
            println!("🌊 seavigil - 画像強調\n");

            let asset = scanner::load_asset(&file)?;
            println!("✔ {} ({}, {} bytes)\n", asset.file_name(), asset.mime(), asset.content().len());

            let session = build_session(&config, passthrough, interval_ms)?;
            let result = run_once(&session, asset).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }

            ensure_enhanced(&result, strict)?;

            if let Some(target) = save_to {
                match output::save_enhanced(&result, &target, output::default_file_name)? {
                    Some(path) => println!("✔ 強調画像を保存: {}", path.display()),
                    None => println!("- 保存できる強調画像がありません"),
                }
            }

            println!("\n✅ 完了");
        }

        Commands::Batch { folder, output_dir, passthrough, interval_ms } => {
            println!("🌊 seavigil - 一括強調\n");

            let items = scanner::scan_folder(&folder)?;
            if items.is_empty() {
                println!("対象ファイルがありません: {}", folder.display());
                return Ok(());
            }
            println!("✔ {}件のファイルを検出\n", items.len());

            let output_dir = output_dir.unwrap_or_else(|| folder.join("enhanced"));
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("出力フォルダを作成できません: {}", output_dir.display()))?;

            let session = build_session(&config, passthrough, interval_ms)?;
            let mut fallbacks = 0usize;

            for (idx, item) in items.iter().enumerate() {
                println!("[{}/{}] {}", idx + 1, items.len(), item.file_name);

                let asset = match scanner::load_asset(&item.path) {
                    Ok(asset) => asset,
                    Err(err) => {
                        println!("  ✘ スキップ: {}", err);
                        continue;
                    }
                };

                let result = run_once(&session, asset)
                    .await
                    .with_context(|| format!("{} の処理に失敗", item.file_name))?;
                print_result(&result);

                if !result.is_enhanced() {
                    fallbacks += 1;
                }
                let saved = output::save_enhanced(&result, &output_dir, |ext| {
                    output::derived_file_name(&item.file_name, ext)
                })?;
                if let Some(path) = saved {
                    println!("  ✔ 保存: {}", path.display());
                }
            }

            println!("\n✅ 完了（強調失敗: {}件）", fallbacks);
        }

        Commands::Health => {
            let client = EnhancementClient::new(config.base_url())?;
            println!("接続先: {}", client.base_url());
            let status = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Commands::Config { set_base_url, show } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ 接続先を設定しました");
            }

            if show {
                println!("設定:");
                println!("  接続先: {}", config.base_url());
                println!("  ステップ間隔: {}ms", config.step_interval_ms);
                println!("  パススルー: {}", if config.passthrough { "有効" } else { "無効" });
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "seavigil=debug" } else { "seavigil=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_session(config: &Config, passthrough: bool, interval_ms: Option<u64>) -> error::Result<UploadSession> {
    let client = EnhancementClient::new(config.base_url())?.with_passthrough(passthrough || config.passthrough);
    println!("接続先: {}", client.base_url());

    let step_interval = interval_ms.map(Duration::from_millis).unwrap_or_else(|| config.step_interval());
    let delay: Arc<dyn Delay> = if step_interval.is_zero() {
        Arc::new(NoDelay)
    } else {
        Arc::new(TokioDelay)
    };

    let options = SessionOptions {
        step_interval,
        ..SessionOptions::default()
    };
    Ok(UploadSession::new(Arc::new(client), delay, options))
}

async fn run_once(session: &UploadSession, asset: MediaAsset) -> error::Result<EnhancementResult> {
    session.select_asset(asset);

    let progress = StepProgress::new(session.steps().len());
    let renderer = progress.follow(session.subscribe());
    let outcome = session.start_run().await;
    renderer.abort();
    progress.render(&session.steps());
    progress.finish();

    match outcome? {
        RunOutcome::Completed(result) => Ok(result),
        RunOutcome::AlreadyRunning | RunOutcome::Superseded => Err(SeaVigilError::Precondition(
            "別の処理と競合したため結果を破棄しました".into(),
        )),
    }
}

fn print_result(result: &EnhancementResult) {
    if !result.is_enhanced() {
        println!("⚠ 強調処理に失敗したため元画像を表示しています");
    }
    for row in result.metrics.display_rows() {
        println!("  {:<5} {:>10}  {}", row.name, row.value, row.description);
    }
    if let Some(file) = &result.source_file {
        println!("  サーバー保存先: {}", file);
    }
}

/// `--strict` 指定時は代替結果を失敗として扱う
fn ensure_enhanced(result: &EnhancementResult, strict: bool) -> anyhow::Result<()> {
    if strict && !result.is_enhanced() {
        anyhow::bail!("強調処理に失敗しました（--strict）");
    }
    Ok(())
}
