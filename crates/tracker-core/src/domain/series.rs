//! 수익률 시계열 타입.
//!
//! - `ReturnPoint` - 기준 시점 대비 수익률(%) 포인트
//! - `AssetSeries` - 자산 하나의 수익률 시계열과 표시 정보

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::PricePoint;

/// 수익률 포인트.
///
/// `return_pct`는 같은 시계열 내 기준 시점 대비 변화율(%)이며, 복리 계산은
/// 항상 `1 + return_pct / 100` 형태로 수행합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// 거래일
    pub date: NaiveDate,
    /// 타임스탬프 (epoch 밀리초)
    pub timestamp: i64,
    /// 수익률 (%)
    #[serde(rename = "returnPercent")]
    pub return_pct: f64,
    /// 원본 가격
    pub price: f64,
    /// 수익률 SMA (%), 윈도우가 채워지기 전에는 None
    #[serde(
        rename = "smaReturnPercent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sma_return_pct: Option<f64>,
}

impl ReturnPoint {
    /// 가격 포인트와 수익률로 수익률 포인트를 생성합니다.
    pub fn from_price(point: &PricePoint, return_pct: f64) -> Self {
        Self {
            date: point.date,
            timestamp: point.timestamp,
            return_pct,
            price: point.price,
            sma_return_pct: None,
        }
    }

    /// 총 수익 배수 (`1 + return_pct / 100`).
    #[inline]
    pub fn gross(&self) -> f64 {
        1.0 + self.return_pct / 100.0
    }

    /// 수익률만 바꾼 복사본을 반환합니다.
    pub fn with_return(&self, return_pct: f64) -> Self {
        Self { return_pct, ..*self }
    }

    /// SMA 값만 바꾼 복사본을 반환합니다.
    pub fn with_sma(&self, sma_return_pct: Option<f64>) -> Self {
        Self {
            sma_return_pct,
            ..*self
        }
    }
}

/// 자산 수익률 시계열.
///
/// 요청/렌더 한 번 동안만 유지되며 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSeries {
    /// 심볼
    pub symbol: String,
    /// 표시 이름
    pub display_name: String,
    /// 차트 색상
    pub color: String,
    /// 시간순 수익률 포인트
    pub returns: Vec<ReturnPoint>,
}

impl AssetSeries {
    /// 새 자산 시계열을 생성합니다.
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        color: impl Into<String>,
        returns: Vec<ReturnPoint>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            color: color.into(),
            returns,
        }
    }

    /// 포인트 개수.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// 포인트가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// 첫 포인트.
    pub fn first(&self) -> Option<&ReturnPoint> {
        self.returns.first()
    }

    /// 마지막 포인트.
    pub fn latest(&self) -> Option<&ReturnPoint> {
        self.returns.last()
    }

    /// 기간 전체 수익률 (%). 포인트가 없으면 None.
    pub fn total_return_pct(&self) -> Option<f64> {
        self.latest().map(|p| p.return_pct)
    }
}

/// 병합 차트 행에서 자산 하나가 차지하는 키 (`SYM`, `SYM_price`, `SYM_sma`).
pub fn chart_keys(symbol: &str) -> [String; 3] {
    [
        symbol.to_string(),
        format!("{}_price", symbol),
        format!("{}_sma", symbol),
    ]
}

/// 심볼 목록에서 중복 또는 차트 키 충돌을 찾습니다.
///
/// `BTC`와 `BTC_price`처럼 한 심볼의 파생 키가 다른 심볼과 겹쳐도 충돌입니다.
/// 충돌이 없으면 None, 있으면 설명 메시지를 반환합니다.
pub fn find_symbol_conflict<'a, I>(symbols: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut owners: HashMap<String, &str> = HashMap::new();

    for symbol in symbols {
        for key in chart_keys(symbol) {
            if let Some(owner) = owners.insert(key.clone(), symbol) {
                return Some(if owner == symbol {
                    format!("중복된 심볼: {}", symbol)
                } else {
                    format!("심볼 {}와 {}의 차트 키 '{}'가 겹칩니다", owner, symbol, key)
                });
            }
        }
    }

    None
}
