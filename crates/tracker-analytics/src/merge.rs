//! 자산 간 날짜 병합 모듈.
//!
//! 여러 자산의 수익률 시계열을 날짜별 차트 행으로 병합합니다.
//!
//! 자산마다 거래 달력이 다르므로 (BTC는 주말에도 거래, 주식은 평일만)
//! **모든 자산에 데이터가 있는 날짜만** 남깁니다. 이렇게 해야 차트 라인에
//! 빈 구간이 생기지 않습니다.
//!
//! # 직렬화 형태
//!
//! ```json
//! { "date": "2024-01-03", "timestamp": 1704240000000,
//!   "BTC": 21.0, "BTC_price": 121.0, "BTC_sma": 15.5,
//!   "AMZN": 6.0, "AMZN_price": 53.0 }
//! ```

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracker_core::{AssetSeries, ReturnPoint};

/// 병합 행에 들어가는 자산별 값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedValue {
    /// 수익률 (%)
    pub return_pct: f64,
    /// 가격
    pub price: f64,
    /// 수익률 SMA (%)
    pub sma_return_pct: Option<f64>,
}

impl From<&ReturnPoint> for MergedValue {
    fn from(point: &ReturnPoint) -> Self {
        Self {
            return_pct: point.return_pct,
            price: point.price,
            sma_return_pct: point.sma_return_pct,
        }
    }
}

/// 날짜별 병합 차트 행.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    /// 거래일
    pub date: NaiveDate,
    /// 타임스탬프 (epoch 밀리초)
    pub timestamp: i64,
    /// 심볼별 값
    pub values: BTreeMap<String, MergedValue>,
}

impl MergedRow {
    /// 심볼의 값.
    pub fn value(&self, symbol: &str) -> Option<&MergedValue> {
        self.values.get(symbol)
    }

    /// 심볼의 수익률 (%).
    pub fn return_pct(&self, symbol: &str) -> Option<f64> {
        self.value(symbol).map(|v| v.return_pct)
    }

    /// 심볼의 가격.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.value(symbol).map(|v| v.price)
    }

    /// 심볼의 수익률 SMA (%).
    pub fn sma_return_pct(&self, symbol: &str) -> Option<f64> {
        self.value(symbol).and_then(|v| v.sma_return_pct)
    }
}

/// 자산별로 `SYM`, `SYM_price`, `SYM_sma`(정의된 경우) 키를 펼쳐 씁니다.
/// `BTC`와 `BTC_price`처럼 키가 겹치는 심볼 조합은 설정/파이프라인 검증에서 거부됩니다.
impl Serialize for MergedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sma_count = self
            .values
            .values()
            .filter(|v| v.sma_return_pct.is_some())
            .count();
        let mut map = serializer.serialize_map(Some(2 + self.values.len() * 2 + sma_count))?;

        map.serialize_entry("date", &self.date)?;
        map.serialize_entry("timestamp", &self.timestamp)?;

        for (symbol, value) in &self.values {
            map.serialize_entry(symbol, &value.return_pct)?;
            map.serialize_entry(&format!("{}_price", symbol), &value.price)?;
            if let Some(sma) = value.sma_return_pct {
                map.serialize_entry(&format!("{}_sma", symbol), &sma)?;
            }
        }

        map.end()
    }
}

/// 여러 자산 시계열을 날짜 교집합 기준으로 병합.
///
/// # 인자
///
/// * `assets` - 자산 시계열 목록
///
/// # 반환
///
/// 모든 자산에 데이터가 있는 날짜의 행 (타임스탬프 오름차순).
/// 행의 타임스탬프는 입력 순서상 첫 자산의 값을 사용합니다.
/// 한 자산 내 중복 날짜는 마지막 포인트가 우선합니다.
///
/// 심볼은 `tracker_core::find_symbol_conflict`로 검사된 고유한 값이어야 합니다.
/// 중복 심볼은 행 안에서 서로 덮어씁니다.
pub fn merge_series(assets: &[AssetSeries]) -> Vec<MergedRow> {
    let Some((first, rest)) = assets.split_first() else {
        return Vec::new();
    };

    let lookups: Vec<HashMap<NaiveDate, &ReturnPoint>> = rest
        .iter()
        .map(|asset| asset.returns.iter().map(|p| (p.date, p)).collect())
        .collect();

    let first_by_date: BTreeMap<NaiveDate, &ReturnPoint> =
        first.returns.iter().map(|p| (p.date, p)).collect();

    let mut rows: Vec<MergedRow> = first_by_date
        .into_iter()
        .filter_map(|(date, anchor)| {
            let mut values = BTreeMap::new();
            values.insert(first.symbol.clone(), MergedValue::from(anchor));

            for (asset, lookup) in rest.iter().zip(&lookups) {
                let point = lookup.get(&date)?;
                values.insert(asset.symbol.clone(), MergedValue::from(*point));
            }

            Some(MergedRow {
                date,
                timestamp: anchor.timestamp,
                values,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.date.cmp(&b.date)));

    tracing::debug!(
        assets = assets.len(),
        rows = rows.len(),
        "자산 시계열 병합 완료"
    );

    rows
}
