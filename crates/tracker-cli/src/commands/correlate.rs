//! 상관관계 명령어.
//!
//! 자산 쌍별 일간 수익률 상관계수와 동일 가중 포트폴리오의 분산 기여도를 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! tracker correlate -c config/default.toml
//! tracker correlate -c config/default.toml --format json -o out/correlation.json
//! tracker correlate -c config/default.toml --matrix
//! ```

use anyhow::{Context, Result};
use tracing::info;

use tracker_analytics::{CorrelationAnalysis, CorrelationMatrix};
use tracker_core::AppConfig;

use super::output::{write_output, OutputFormat};
use super::{build_report, RunOptions};

/// 상관관계 명령 설정.
#[derive(Debug, Clone)]
pub struct CorrelateCliConfig {
    /// 공통 실행 옵션
    pub run: RunOptions,
    /// 출력 형식
    pub format: OutputFormat,
    /// 출력 파일 경로
    pub output: Option<String>,
    /// 쌍 목록 대신 N×N 행렬 출력 (table 형식)
    pub matrix: bool,
}

/// 상관 분석을 실행해 출력합니다. 자산 쌍 수를 반환합니다.
pub fn run_correlate(config: &AppConfig, cli: CorrelateCliConfig) -> Result<usize> {
    let report = build_report(config, &cli.run)?;
    let analysis = &report.correlation;

    let content = match cli.format {
        OutputFormat::Table if cli.matrix => format_matrix(&analysis.matrix()),
        OutputFormat::Table => format_table(analysis),
        OutputFormat::Csv => format_csv(analysis)?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(analysis).context("Failed to serialize correlation")?
        }
    };

    write_output(&content, cli.output.as_deref())?;

    info!(
        pairs = analysis.pairs.len(),
        observations = analysis.observation_count,
        "Correlation analysis written"
    );
    Ok(analysis.pairs.len())
}

/// 테이블 형식 출력.
pub fn format_table(analysis: &CorrelationAnalysis) -> String {
    let mut output = String::new();

    if analysis.pairs.is_empty() {
        output.push_str("상관 분석에는 공통 날짜가 있는 자산이 2개 이상 필요합니다.\n");
        return output;
    }

    output.push_str(&format!(
        "{:<20} {:>12} {:>14} {:>10} {:>10}\n",
        "PAIR", "CORRELATION", "COV_CONTRIB%", "VAR_A%", "VAR_B%"
    ));
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for pair in &analysis.pairs {
        output.push_str(&format!(
            "{:<20} {:>12.4} {:>14.2} {:>10.2} {:>10.2}\n",
            format!("{}-{}", pair.symbol_a, pair.symbol_b),
            pair.correlation,
            pair.variance_contribution,
            pair.variance_a,
            pair.variance_b
        ));
    }

    output.push_str("\nVariance share (equal weight):\n");
    for asset in &analysis.assets {
        output.push_str(&format!(
            "  {:<10} {:>8.2}%\n",
            asset.symbol, asset.contribution_pct
        ));
    }

    output.push_str(&format!(
        "\nObservations: {} days",
        analysis.observation_count
    ));

    output
}

/// N×N 상관행렬 테이블.
pub fn format_matrix(matrix: &CorrelationMatrix) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<10}", ""));
    for symbol in &matrix.symbols {
        output.push_str(&format!(" {:>8}", symbol));
    }
    output.push('\n');

    for (symbol, row) in matrix.symbols.iter().zip(&matrix.matrix) {
        output.push_str(&format!("{:<10}", symbol));
        for value in row {
            output.push_str(&format!(" {:>8.3}", value));
        }
        output.push('\n');
    }

    output.push_str(&format!("\nPeriod: {} days", matrix.period));
    output
}

/// CSV 형식 출력.
pub fn format_csv(analysis: &CorrelationAnalysis) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record([
        "symbol_a",
        "symbol_b",
        "correlation",
        "variance_contribution",
        "variance_a",
        "variance_b",
    ])
    .context("Failed to write CSV header")?;

    for pair in &analysis.pairs {
        wtr.write_record(&[
            pair.symbol_a.clone(),
            pair.symbol_b.clone(),
            pair.correlation.to_string(),
            pair.variance_contribution.to_string(),
            pair.variance_a.to_string(),
            pair.variance_b.to_string(),
        ])
        .context("Failed to write CSV record")?;
    }

    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
