//! 자산 요약 명령어.
//!
//! 자산별 표시 구간, 총 수익률, 최근 가격, 최근 SMA를 출력합니다.

use anyhow::{Context, Result};

use tracker_analytics::AssetSummary;
use tracker_core::AppConfig;

use super::output::{fmt_pct, write_output, OutputFormat};
use super::{build_report, RunOptions};

/// 요약 명령 설정.
#[derive(Debug, Clone)]
pub struct SummaryCliConfig {
    pub run: RunOptions,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 자산 요약을 출력합니다. 자산 수를 반환합니다.
pub fn run_summary(config: &AppConfig, cli: SummaryCliConfig) -> Result<usize> {
    let report = build_report(config, &cli.run)?;

    let content = match cli.format {
        OutputFormat::Table => format_table(&report.summaries),
        OutputFormat::Csv => format_csv(&report.summaries)?,
        OutputFormat::Json => serde_json::to_string_pretty(&report.summaries)
            .context("Failed to serialize summaries")?,
    };

    write_output(&content, cli.output.as_deref())?;
    Ok(report.summaries.len())
}

fn fmt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

/// 테이블 형식 출력.
pub fn format_table(summaries: &[AssetSummary]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:<20} {:<12} {:<12} {:>12} {:>14} {:>10}\n",
        "SYMBOL", "NAME", "START", "END", "RETURN", "LATEST PRICE", "SMA"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    for summary in summaries {
        let name = if summary.display_name.chars().count() > 18 {
            format!("{}...", summary.display_name.chars().take(15).collect::<String>())
        } else {
            summary.display_name.clone()
        };

        output.push_str(&format!(
            "{:<10} {:<20} {:<12} {:<12} {:>12} {:>14} {:>10}\n",
            summary.symbol,
            name,
            fmt_date(summary.start_date),
            fmt_date(summary.end_date),
            fmt_pct(summary.total_return_pct),
            summary
                .latest_price
                .map(|p| format!("{:.2}", p))
                .unwrap_or_else(|| "-".to_string()),
            fmt_pct(summary.latest_sma_return_pct),
        ));
    }

    output.push_str(&format!("\nTotal: {} assets", summaries.len()));
    output
}

/// CSV 형식 출력.
pub fn format_csv(summaries: &[AssetSummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record([
        "symbol",
        "display_name",
        "color",
        "start_date",
        "end_date",
        "total_return_pct",
        "latest_price",
        "latest_sma_return_pct",
    ])
    .context("Failed to write CSV header")?;

    let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    for s in summaries {
        wtr.write_record(&[
            s.symbol.clone(),
            s.display_name.clone(),
            s.color.clone(),
            s.start_date.map(|d| d.to_string()).unwrap_or_default(),
            s.end_date.map(|d| d.to_string()).unwrap_or_default(),
            opt(s.total_return_pct),
            opt(s.latest_price),
            opt(s.latest_sma_return_pct),
        ])
        .context("Failed to write CSV record")?;
    }

    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Vec<AssetSummary> {
        vec![AssetSummary {
            symbol: "BTC".to_string(),
            display_name: "Bitcoin".to_string(),
            color: "#f7931a".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3),
            total_return_pct: Some(21.0),
            latest_price: Some(121.0),
            latest_sma_return_pct: None,
        }]
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&sample());
        assert!(table.contains("Bitcoin"));
        assert!(table.contains("+21.00%"));
        assert!(table.contains("121.00"));
        assert!(table.contains("Total: 1 assets"));
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[1],
            "BTC,Bitcoin,#f7931a,2024-01-01,2024-01-03,21,121,"
        );
    }
}
