//! 차트 데이터 명령어.
//!
//! 설정된 자산들의 수익률을 날짜별 차트 행으로 병합해 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일의 SMA 윈도우로 JSON 출력
//! tracker chart -c config/default.toml
//!
//! # 50일 SMA, CSV로 저장
//! tracker chart -c config/default.toml --window 50 --format csv -o out/chart.csv
//! ```

use anyhow::{bail, Context, Result};
use tracing::info;

use tracker_analytics::MergedRow;
use tracker_core::AppConfig;

use super::output::{write_output, OutputFormat};
use super::{build_report, RunOptions};

/// 차트 명령 설정.
#[derive(Debug, Clone)]
pub struct ChartCliConfig {
    /// 공통 실행 옵션
    pub run: RunOptions,
    /// 출력 형식 (json, csv)
    pub format: OutputFormat,
    /// 출력 파일 경로
    pub output: Option<String>,
}

/// 차트 행을 생성해 출력합니다. 출력한 행 수를 반환합니다.
pub fn run_chart(config: &AppConfig, cli: ChartCliConfig) -> Result<usize> {
    let report = build_report(config, &cli.run)?;
    let symbols: Vec<String> = report.series.iter().map(|s| s.symbol.clone()).collect();

    let content = match cli.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report.rows).context("Failed to serialize rows")?
        }
        OutputFormat::Csv => format_csv(&symbols, &report.rows)?,
        OutputFormat::Table => bail!("chart supports json or csv output"),
    };

    write_output(&content, cli.output.as_deref())?;

    info!(rows = report.rows.len(), "Chart data generated");
    Ok(report.rows.len())
}

/// 차트 행을 CSV로 변환합니다. 컬럼 순서는 자산 입력 순서를 따릅니다.
pub fn format_csv(symbols: &[String], rows: &[MergedRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date".to_string(), "timestamp".to_string()];
    for symbol in symbols {
        header.push(symbol.clone());
        header.push(format!("{}_price", symbol));
        header.push(format!("{}_sma", symbol));
    }
    wtr.write_record(&header)
        .context("Failed to write CSV header")?;

    for row in rows {
        let mut record = vec![row.date.to_string(), row.timestamp.to_string()];
        for symbol in symbols {
            let value = row.value(symbol);
            record.push(value.map(|v| v.return_pct.to_string()).unwrap_or_default());
            record.push(value.map(|v| v.price.to_string()).unwrap_or_default());
            record.push(
                value
                    .and_then(|v| v.sma_return_pct)
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)
            .context("Failed to write CSV record")?;
    }

    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
