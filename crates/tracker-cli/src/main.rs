//! 포트폴리오 수익률 트래커 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 차트 데이터 (JSON)
//! tracker chart -c config/default.toml
//!
//! # 20일 SMA로 CSV 저장
//! tracker chart --window 20 --format csv -o out/chart.csv
//!
//! # 상관관계 / 분산 기여도
//! tracker correlate
//! tracker correlate --matrix
//!
//! # 자산 요약
//! tracker summary --format json
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use tracker_cli::commands::chart::{run_chart, ChartCliConfig};
use tracker_cli::commands::correlate::{run_correlate, CorrelateCliConfig};
use tracker_cli::commands::output::OutputFormat;
use tracker_cli::commands::summary::{run_summary, SummaryCliConfig};
use tracker_cli::commands::RunOptions;
use tracker_core::{init_logging, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Portfolio tracker CLI - 자산 수익률 비교, SMA, 상관관계 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    /// 로그 레벨 (설정 파일 값 대신 사용)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// 파이프라인 공통 인자.
#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    /// 가격 CSV 디렉토리 (기본: 설정 파일의 analytics.data_dir)
    #[arg(long)]
    data_dir: Option<String>,

    /// SMA 윈도우 (일)
    #[arg(short, long)]
    window: Option<usize>,

    /// SMA/리베이스 비활성화
    #[arg(long, default_value = "false")]
    no_sma: bool,
}

impl From<PipelineArgs> for RunOptions {
    fn from(args: PipelineArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            window: args.window,
            no_sma: args.no_sma,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 날짜별 병합 차트 데이터 출력
    Chart {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// 출력 형식 (json, csv)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 일간 수익률 상관관계 및 분산 기여도
    Correlate {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// 상관행렬 형태로 출력 (table 형식)
        #[arg(long, default_value = "false")]
        matrix: bool,
    },

    /// 자산별 수익률 요약
    Summary {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let log_config = LogConfig::from(&config.logging)
        .with_env_overrides()
        .with_overrides(cli.log_level.as_deref(), None);
    init_logging(&log_config)?;

    info!(config = %cli.config, assets = config.assets.len(), "Configuration loaded");

    let result = match cli.command {
        Commands::Chart {
            pipeline,
            format,
            output,
        } => run_chart(
            &config,
            ChartCliConfig {
                run: pipeline.into(),
                format: OutputFormat::parse(&format)?,
                output,
            },
        ),
        Commands::Correlate {
            pipeline,
            format,
            output,
            matrix,
        } => run_correlate(
            &config,
            CorrelateCliConfig {
                run: pipeline.into(),
                format: OutputFormat::parse(&format)?,
                output,
                matrix,
            },
        ),
        Commands::Summary {
            pipeline,
            format,
            output,
        } => run_summary(
            &config,
            SummaryCliConfig {
                run: pipeline.into(),
                format: OutputFormat::parse(&format)?,
                output,
            },
        ),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result.map(|_| ())
}
