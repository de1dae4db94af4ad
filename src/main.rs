use clap::Parser;
use dialoguer::Input;
use emotion_eval::{analyzer, cli, config, error, evaluator, export, logging, scanner};
use emotion_eval::ai_provider::AiProvider;
use emotion_eval_common::{
    match_emotion, Emotion, ModelVendor, PromptStrategy, ReportRow, SYNONYM_TABLE,
};
use analyzer::{GeminiClient, OpenAiClient, QueryOptions, VisionModel};
use cli::{Cli, Commands};
use config::Config;
use error::{EvalError, Result};
use evaluator::{estimate_remaining, format_duration, QueryEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            images,
            few_shot_dir,
            output,
            format,
            temperature,
            max_retries,
            models,
            include_raw,
        } => {
            println!("🧪 emotion-eval - 感情ラベル評価\n");

            // 1. 画像スキャン
            println!("[1/4] 画像をスキャン中...");
            let infos = scanner::scan_folder(&images)?;
            let targets = scanner::load_images(&infos);
            if targets.is_empty() {
                return Err(EvalError::NoImagesFound(images.display().to_string()));
            }
            println!("✔ {}枚の画像を読み込み\n", targets.len());

            // 2. few-shot 例示
            println!("[2/4] few-shot例示を読み込み中...");
            let examples = scanner::load_few_shot_examples(&few_shot_dir)?;
            for example in &examples {
                println!("  - {} ({})", example.path.display(), example.emotion.arabic());
            }
            println!("✔ {}件の例示\n", examples.len());

            // 3. 評価
            let clients = build_clients(&config, &models)?;
            let temperature = match temperature {
                Some(t) => t,
                None => prompt_temperature()?,
            };
            let options = QueryOptions {
                temperature,
                max_retries: max_retries.unwrap_or(config.max_retries),
            };
            println!(
                "[3/4] 評価中... (温度: {:.1}, リトライ: {}回, モデル: {})",
                options.temperature,
                options.max_retries,
                clients
                    .iter()
                    .map(|c| c.model_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            let rows = run_evaluation(&clients, &targets, &examples, &options).await;
            println!("✔ 評価完了\n");

            // 4. レポート出力
            println!("[4/4] レポートを出力中...");
            let written = export::save_report(&rows, format, &output, include_raw)?;
            for path in &written {
                println!("✔ 出力: {}", path.display());
            }

            let vendors: Vec<ModelVendor> = clients.iter().map(|c| c.vendor()).collect();
            print_summary(&rows, &vendors);
            println!("\n✅ 完了");
        }

        Commands::Normalize { text } => {
            for input in &text {
                let matched = match_emotion(input);
                let kind = matched.kind();
                let label = matched.into_label();
                println!("{} → {} ({})", input, label, kind);
            }
        }

        Commands::Labels => {
            println!("正規ラベル:");
            for emotion in Emotion::ALL {
                println!("  {} ({})", emotion.arabic(), emotion.english());
            }

            println!("\n同義語:");
            for emotion in Emotion::ALL {
                let synonyms: Vec<&str> = SYNONYM_TABLE
                    .iter()
                    .filter(|(_, e)| *e == emotion)
                    .map(|(s, _)| *s)
                    .collect();
                if !synonyms.is_empty() {
                    println!("  {} ← {}", emotion.arabic(), synonyms.join("، "));
                }
            }
        }

        Commands::Config { set_openai_key, set_google_key, show } => {
            let mut config = config;

            if let Some(key) = set_openai_key {
                config.set_openai_api_key(key)?;
                println!("✔ OpenAI APIキーを設定しました");
            }

            if let Some(key) = set_google_key {
                config.set_google_api_key(key)?;
                println!("✔ Google APIキーを設定しました");
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!("  OpenAIモデル: {}", config.openai_model);
                println!("  Geminiモデル: {}", config.gemini_model);
                println!("  最大トークン: {}", config.max_tokens);
                println!("  最大リトライ: {}", config.max_retries);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  OpenAI APIキー: {}", key_status(config.openai_api_key().is_ok()));
                println!("  Google APIキー: {}", key_status(config.google_api_key().is_ok()));
            }
        }
    }

    Ok(())
}

fn key_status(configured: bool) -> &'static str {
    if configured { "設定済み" } else { "未設定" }
}

/// 指定されたプロバイダのクライアントを作成（OpenAI → Gemini の順）
fn build_clients(config: &Config, providers: &[AiProvider]) -> Result<Vec<Box<dyn VisionModel>>> {
    let mut clients: Vec<Box<dyn VisionModel>> = Vec::new();

    if providers.contains(&AiProvider::OpenAi) {
        let client = OpenAiClient::new(config.openai_api_key()?, config.openai_model.clone())
            .max_tokens(config.max_tokens)
            .with_timeout(config.timeout_seconds);
        clients.push(Box::new(client));
    }

    if providers.contains(&AiProvider::Gemini) {
        let client = GeminiClient::new(config.google_api_key()?, config.gemini_model.clone())
            .with_timeout(config.timeout_seconds);
        clients.push(Box::new(client));
    }

    if clients.is_empty() {
        return Err(EvalError::Config("モデルが指定されていません".into()));
    }

    evaluator::sort_models(&mut clients);
    Ok(clients)
}

/// 温度を対話入力
fn prompt_temperature() -> Result<f32> {
    println!("温度 (temperature) はモデル出力のランダム性を決めます。");
    println!("  0.0: 最も決定的（再現性重視）");
    println!("  1.0: 多様な回答");
    println!("拒否応答のリトライごとに 0.1 ずつ上がります。\n");

    let input: String = Input::new()
        .with_prompt(format!(
            "温度 ({:.1}〜{:.1})",
            cli::MIN_TEMPERATURE,
            cli::MAX_TEMPERATURE
        ))
        .default("0.0".to_string())
        .validate_with(|s: &String| cli::parse_temperature(s).map(|_| ()))
        .interact_text()
        .map_err(|e| EvalError::CliExecution(e.to_string()))?;

    cli::parse_temperature(&input).map_err(EvalError::Config)
}

/// 全画像を順に評価する
async fn run_evaluation(
    clients: &[Box<dyn VisionModel>],
    targets: &[scanner::LoadedImage],
    examples: &[scanner::FewShotExample],
    options: &QueryOptions,
) -> Vec<ReportRow> {
    let total = targets.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );

    let started = Instant::now();
    let mut rows = Vec::with_capacity(total);

    for (idx, target) in targets.iter().enumerate() {
        pb.set_message(target.info.file_name.clone());
        pb.println(format!("\n[{}/{}] {}", idx + 1, total, target.info.file_name));

        let row = evaluator::evaluate_image(clients, target, examples, options, |event| {
            pb.println(format_event(event));
        })
        .await;
        rows.push(row);
        pb.inc(1);

        let elapsed = started.elapsed();
        pb.println(format!(
            "  経過: {} / 残り: {}",
            format_duration(elapsed),
            format_duration(estimate_remaining(elapsed, idx + 1, total))
        ));
    }

    pb.finish_with_message("完了");
    rows
}

/// 問い合わせ1回分の表示
fn format_event(event: &QueryEvent<'_>) -> String {
    let outcome = event.outcome;
    let mut line = format!("  {} / {}: ", event.model_name, event.strategy);

    match (&outcome.raw_label, &outcome.label) {
        (Some(raw), Some(label)) if outcome.was_normalized() => {
            line.push_str(&format!("{} → {}", raw, label));
        }
        (_, Some(label)) => line.push_str(label),
        _ => line.push_str("(失敗)"),
    }

    if outcome.is_unmatched() {
        line.push_str(" ⚠ 正規ラベル外");
    }

    if let Some(reasoning) = &outcome.reasoning {
        line.push_str(&format!("\n    推論: {}", reasoning.replace('\n', "\n          ")));
    }

    line
}

fn print_summary(rows: &[ReportRow], vendors: &[ModelVendor]) {
    let queries = rows.len() * vendors.len() * PromptStrategy::ALL.len();
    let unmatched: usize = rows.iter().map(ReportRow::unmatched_count).sum();
    let failed = rows
        .iter()
        .flat_map(|row| vendors.iter().map(move |v| row.columns(*v)))
        .flat_map(|cols| PromptStrategy::ALL.into_iter().map(move |s| cols.get(s)))
        .filter(|outcome| outcome.label.is_none())
        .count();

    println!("\n集計:");
    println!("  画像: {}枚", rows.len());
    println!("  問い合わせ: {}回", queries);
    println!("  失敗: {}回", failed);
    println!("  正規ラベル外: {}件", unmatched);
}
