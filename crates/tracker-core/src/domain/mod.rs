//! 포트폴리오 분석을 위한 도메인 모델.

mod market_data;
mod series;

pub use market_data::*;
pub use series::*;
