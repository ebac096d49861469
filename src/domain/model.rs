use crate::utils::error::{ChartError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// 依評論數排序的熱門啤酒柱狀圖
    PopularBeers,
    /// 兩位使用者評分比較散佈圖
    RatingComparison,
    /// 不需抓取資料的靜態長條圖
    StaticBar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::PopularBeers => "popular-beers",
            ChartKind::RatingComparison => "rating-comparison",
            ChartKind::StaticBar => "static-bar",
        }
    }

    /// Key of the record list inside the fetched payload.
    pub fn list_key(&self) -> Option<&'static str> {
        match self {
            ChartKind::PopularBeers => Some("beers"),
            ChartKind::RatingComparison => Some("ratings"),
            ChartKind::StaticBar => None,
        }
    }

    pub fn default_limit(&self) -> Option<usize> {
        match self {
            ChartKind::PopularBeers => Some(10),
            ChartKind::RatingComparison | ChartKind::StaticBar => None,
        }
    }

    pub fn needs_fetch(&self) -> bool {
        self.list_key().is_some()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// What to do when a payload holds fewer records than the requested limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    #[default]
    Clamp,
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub body: serde_json::Value,
}

impl Payload {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeerRecord {
    pub name: String,
    pub reviews_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user1_rating: Number,
    pub user2_rating: Number,
}

/// 序列化後即為圖表庫接受的資料點格式
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesPoint {
    Category(String, u64),
    Xy(Number, Number),
    Value(Number),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSeries {
    pub name: String,
    pub data: Vec<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticData {
    pub categories: Vec<String>,
    pub series: Vec<StaticSeries>,
}

impl StaticData {
    pub fn fruit_consumption() -> Self {
        let numbers =
            |values: &[u64]| -> Vec<Number> { values.iter().map(|&v| Number::from(v)).collect() };
        Self {
            categories: vec![
                "Apples".to_string(),
                "Bananas".to_string(),
                "Oranges".to_string(),
            ],
            series: vec![
                StaticSeries {
                    name: "Ronda Rousey".to_string(),
                    data: numbers(&[5, 5, 5]),
                },
                StaticSeries {
                    name: "Jon Jones".to_string(),
                    data: numbers(&[8, 7, 8]),
                },
            ],
        }
    }

    /// 每個 series 必須剛好對應每個 category 一個值
    pub fn check(&self, field: &str) -> Result<()> {
        for series in &self.series {
            if series.data.len() != self.categories.len() {
                return Err(ChartError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: series.name.clone(),
                    reason: format!(
                        "series has {} values for {} categories",
                        series.data.len(),
                        self.categories.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    pub timeout: Option<Duration>,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub headers: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
            headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartOutput {
    pub name: String,
    pub kind: ChartKind,
    pub endpoint: Option<String>,
    pub series: Vec<Series>,
    pub config: serde_json::Value,
    pub csv_output: String,
    pub generated_at: DateTime<Utc>,
}

impl ChartOutput {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.data.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_data_check() {
        let data = StaticData::fruit_consumption();
        assert!(data.check("static_data").is_ok());

        let mut ragged = data.clone();
        ragged.series[1].data.push(Number::from(3));
        match ragged.check("charts.fruit.static_data") {
            Err(ChartError::InvalidConfigValueError { field, value, .. }) => {
                assert_eq!(field, "charts.fruit.static_data");
                assert_eq!(value, "Jon Jones");
            }
            other => panic!("expected InvalidConfigValueError, got {:?}", other),
        }
    }
}
