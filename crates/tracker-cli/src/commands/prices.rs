//! 가격 CSV 로더.
//!
//! 지원하는 헤더 형식:
//!
//! ```text
//! date,price
//! date,timestamp,price
//! date,open,high,low,close,volume   (OHLCV 형식, close 사용)
//! ```

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use tracker_analytics::AssetInput;
use tracker_core::{AppConfig, PricePoint};

/// 날짜 문자열 파싱 (YYYY-MM-DD)
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
}

/// CSV 컬럼 위치.
struct Columns {
    date: usize,
    price: usize,
    timestamp: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date = find("date").ok_or_else(|| anyhow!("Missing 'date' column"))?;
        let price = find("price")
            .or_else(|| find("close"))
            .ok_or_else(|| anyhow!("Missing 'price' or 'close' column"))?;

        Ok(Self {
            date,
            price,
            timestamp: find("timestamp"),
        })
    }
}

/// 리더에서 가격 시계열을 읽습니다. 결과는 날짜순으로 정렬됩니다.
pub fn read_prices<R: Read>(reader: R) -> Result<Vec<PricePoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers().context("Failed to read CSV header")?)?;

    let mut points = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", line + 2))?;

        let field = |idx: usize| {
            record
                .get(idx)
                .ok_or_else(|| anyhow!("Row {}: missing column {}", line + 2, idx))
        };

        let date = parse_date(field(columns.date)?)?;
        let price: f64 = field(columns.price)?
            .parse()
            .with_context(|| format!("Row {}: invalid price", line + 2))?;

        let point = match columns.timestamp {
            Some(idx) => {
                let ts: i64 = field(idx)?
                    .parse()
                    .with_context(|| format!("Row {}: invalid timestamp", line + 2))?;
                PricePoint::with_timestamp(date, ts, price)
            }
            None => PricePoint::new(date, price),
        };

        if !point.has_valid_price() {
            bail!("Row {}: price must be positive, got {}", line + 2, price);
        }

        points.push(point);
    }

    // 날짜순 정렬 (오래된 것부터)
    points.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(points)
}

/// 파일에서 가격 시계열을 읽습니다.
pub fn load_prices(path: impl AsRef<Path>) -> Result<Vec<PricePoint>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open price file: {}", path.display()))?;
    let points = read_prices(file)
        .with_context(|| format!("Failed to parse price file: {}", path.display()))?;

    debug!(path = %path.display(), points = points.len(), "Loaded prices");
    Ok(points)
}

/// 설정된 모든 자산의 파이프라인 입력을 로드합니다.
pub fn load_inputs(config: &AppConfig, data_dir: Option<&str>) -> Result<Vec<AssetInput>> {
    let data_dir = data_dir.unwrap_or(config.analytics.data_dir.as_str());

    let inputs = config
        .assets
        .iter()
        .map(|asset| {
            let prices = load_prices(asset.price_file(data_dir))?;
            Ok(AssetInput::from_config(asset, prices))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        assets = inputs.len(),
        data_dir = %data_dir,
        "Loaded price series"
    );

    Ok(inputs)
}
