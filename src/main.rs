use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use stalebot::client;
use stalebot::config::loader::CONFIG_FILENAME;
use stalebot::config::models::ItemType;
use stalebot::config::{self, RealEnv};
use stalebot::infrastructure::gh::{Gh, RealGh};

#[derive(Parser)]
#[command(name = "stalebot", version, about = "비활성 이슈/PR을 정리하는 mark-and-sweep 봇")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 한 번 실행 (mark + sweep)
    Run {
        /// 레포 이름 (org/repo)
        #[arg(long)]
        repo: String,
        /// 설정 파일 경로 (기본: ./stalebot.yml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// issues 또는 pulls만 처리
        #[arg(long, value_parser = ItemType::parse)]
        only: Option<ItemType>,
        /// 원격 뮤테이션 없이 분류만 수행
        #[arg(long)]
        dry_run: bool,
        /// GHE hostname (기본: github.com)
        #[arg(long)]
        gh_host: Option<String>,
    },
    /// 주기 실행 루프
    Watch {
        /// 레포 이름 (org/repo)
        #[arg(long)]
        repo: String,
        /// 설정 파일 경로 (기본: ./stalebot.yml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// issues 또는 pulls만 처리
        #[arg(long, value_parser = ItemType::parse)]
        only: Option<ItemType>,
        /// 원격 뮤테이션 없이 분류만 수행
        #[arg(long)]
        dry_run: bool,
        /// GHE hostname (기본: github.com)
        #[arg(long)]
        gh_host: Option<String>,
        /// 실행 간격 (초)
        #[arg(long, default_value = "3600")]
        interval_secs: u64,
    },
    /// 활동이 감지된 아이템에서 stale 라벨 제거
    Unmark {
        /// 아이템 번호
        number: i64,
        /// 레포 이름 (org/repo)
        #[arg(long)]
        repo: String,
        /// 설정 파일 경로 (기본: ./stalebot.yml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// issues 또는 pulls
        #[arg(long, value_parser = ItemType::parse, default_value = "issues")]
        item_type: ItemType,
        /// 원격 뮤테이션 없이 분류만 수행
        #[arg(long)]
        dry_run: bool,
        /// GHE hostname (기본: github.com)
        #[arg(long)]
        gh_host: Option<String>,
    },
    /// 설정 관리
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 현재 설정 표시 (파일 + 기본값 머지 결과)
    Show {
        /// 레포 이름 (org/repo)
        #[arg(long)]
        repo: Option<String>,
        /// 설정 파일 경로 (기본: ./stalebot.yml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn config_path_or_default(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = RealEnv;

    let is_watch = matches!(cli.command, Commands::Watch { .. });

    // _guard must live until main() returns to flush non-blocking writer
    let _guard = if is_watch {
        let log_dir = config::log_dir(&env);
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix("watch")
            .filename_suffix("log")
            .build(&log_dir)
            .expect("failed to create log appender");

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("stalebot=info".parse()?),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();

        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("stalebot=info".parse()?),
            )
            .with_writer(std::io::stderr)
            .init();
        None
    };

    let gh: Arc<dyn Gh> = Arc::new(RealGh);

    match cli.command {
        Commands::Run {
            repo,
            config,
            only,
            dry_run,
            gh_host,
        } => {
            let path = config_path_or_default(config);
            client::run_once(gh, &repo, &path, only, dry_run, gh_host).await?;
        }
        Commands::Watch {
            repo,
            config,
            only,
            dry_run,
            gh_host,
            interval_secs,
        } => {
            let path = config_path_or_default(config);
            client::watch(gh, &repo, &path, only, dry_run, gh_host, interval_secs).await?;
        }
        Commands::Unmark {
            number,
            repo,
            config,
            item_type,
            dry_run,
            gh_host,
        } => {
            let path = config_path_or_default(config);
            client::unmark(gh, &repo, &path, item_type, number, dry_run, gh_host).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { repo, config } => {
                let path = config_path_or_default(config);
                let name = repo.unwrap_or_else(|| "org/repo".to_string());
                let output = client::config_show(&name, &path)?;
                println!("{output}");
            }
        },
    }

    Ok(())
}
