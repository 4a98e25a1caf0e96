use clap::Parser;
use playlist_bridge::config::cli::load_env_file;
use playlist_bridge::core::report;
use playlist_bridge::utils::error::ErrorSeverity;
use playlist_bridge::utils::{link, logger, validation::Validate};
use playlist_bridge::{
    AppConfig, CliConfig, Result, SpotifyClient, TransferError, TransferOptions,
    TransferOrchestrator, TransferReport, YoutubeClient,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // .env 先載入，clap 的 env 預設值才看得到
    let env_file = load_env_file(None);
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting playlist-bridge");
    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let config = match cli.to_app_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let outcome = tokio::select! {
        result = run(cli.playlist.clone(), &config) => result,
        _ = tokio::signal::ctrl_c() => Err(TransferError::Interrupted),
    };

    match outcome {
        Ok(report) => print_summary(&report),
        Err(TransferError::Interrupted) => {
            eprintln!("\n😢 Transfer interrupted. Goodbye! 👋");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        Err(e) => {
            tracing::error!(
                "❌ Transfer failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("\n⚠️ An error occurred:");
            if e.is_quota_exceeded() {
                eprintln!("  ⏳ {}", e.user_friendly_message());
            } else {
                eprintln!("  ⛔️ {}", e.user_friendly_message());
            }
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(playlist: Option<String>, config: &AppConfig) -> Result<TransferReport> {
    let link = match playlist {
        Some(link) => link,
        None => prompt_for_link().await?,
    };
    let playlist_id = link::parse_playlist_id(&link)?;

    let follow = config.transfer.follow_pagination;
    let source = SpotifyClient::from_config(&config.spotify)?.with_pagination(follow);
    let destination = YoutubeClient::from_config(&config.youtube)?.with_pagination(follow);

    let mut orchestrator = TransferOrchestrator::new(
        source,
        destination,
        TransferOptions::from(&config.transfer),
    );
    let report = match orchestrator.run(&playlist_id).await {
        Ok(report) => report,
        Err(TransferError::Incomplete { report, source }) => {
            println!("\n⛔️ Transfer stopped before the last track.");
            print_counts(&report);
            save_report(config, &report)?;
            return Err(*source);
        }
        Err(e) => return Err(e),
    };

    save_report(config, &report)?;
    Ok(report)
}

fn save_report(config: &AppConfig, report: &TransferReport) -> Result<()> {
    if let Some(path) = &config.transfer.report {
        let written = report::write_csv(report, path)?;
        println!("📁 Report saved to: {}", written.display());
    }
    Ok(())
}

async fn prompt_for_link() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all("🔗 Enter Spotify playlist link: ".as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    if read == 0 {
        return Err(TransferError::Interrupted);
    }
    Ok(line.trim().to_string())
}

fn print_summary(report: &TransferReport) {
    match &report.halted {
        None => {
            println!("\n🎉 Playlist transferred successfully! 🎉");
        }
        Some(halt) => {
            println!(
                "\n⏳ Rate limit exceeded or service unavailable (HTTP {}). Halted at track {} of {}.",
                halt.status,
                halt.track_index + 1,
                report.entries.len()
            );
        }
    }
    print_counts(report);
}

fn print_counts(report: &TransferReport) {
    println!(
        "   '{}' → YouTube playlist {}{}",
        report.source_title,
        report.destination.id,
        if report.created_playlist { " (new)" } else { "" }
    );
    println!(
        "   ✅ {} added, ❌ {} not found, ⏭️ {} skipped",
        report.inserted(),
        report.not_found(),
        report.skipped()
    );
}
