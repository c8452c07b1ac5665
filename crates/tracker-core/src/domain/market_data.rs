//! 시장 데이터 타입.
//!
//! 외부 시세 수집기가 생성하는 자산별 가격 시계열의 단위 타입을 정의합니다.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 일별 가격 포인트.
///
/// 자산 하나의 시계열은 시간순(오래된 것부터)으로 정렬된 `PricePoint` 목록입니다.
/// 자산마다 거래 달력이 다를 수 있습니다 (24시간 거래되는 암호화폐 vs 평일만 거래되는 주식).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 타임스탬프 (epoch 밀리초)
    pub timestamp: i64,
    /// 가격 (양수)
    pub price: f64,
}

impl PricePoint {
    /// 거래일 자정(UTC) 타임스탬프로 가격 포인트를 생성합니다.
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            timestamp: midnight_utc_millis(date),
            price,
        }
    }

    /// 명시적 타임스탬프로 가격 포인트를 생성합니다.
    pub fn with_timestamp(date: NaiveDate, timestamp: i64, price: f64) -> Self {
        Self {
            date,
            timestamp,
            price,
        }
    }

    /// 가격이 유한한 양수인지 확인합니다.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// 날짜의 자정(UTC)을 epoch 밀리초로 변환합니다.
pub fn midnight_utc_millis(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .timestamp_millis()
}
