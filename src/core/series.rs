use crate::core::{BeerRecord, BoundsPolicy, Payload, RatingRecord, SeriesPoint};
use crate::utils::error::{ChartError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Projects payload records into series points, in input order,
/// truncated to an optional limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesBuilder {
    limit: Option<usize>,
    policy: BoundsPolicy,
}

impl SeriesBuilder {
    pub fn new(limit: Option<usize>, policy: BoundsPolicy) -> Result<Self> {
        if limit == Some(0) {
            return Err(ChartError::InvalidConfigValueError {
                field: "limit".to_string(),
                value: "0".to_string(),
                reason: "Limit must be at least 1".to_string(),
            });
        }
        Ok(Self { limit, policy })
    }

    pub fn unbounded() -> Self {
        Self {
            limit: None,
            policy: BoundsPolicy::Clamp,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// 依照上限與邊界策略截取紀錄
    pub fn window<'a>(&self, records: &'a [Value]) -> Result<&'a [Value]> {
        let Some(limit) = self.limit else {
            return Ok(records);
        };

        if records.len() < limit {
            match self.policy {
                BoundsPolicy::Strict => {
                    return Err(ChartError::InsufficientRecords {
                        requested: limit,
                        available: records.len(),
                    })
                }
                BoundsPolicy::Clamp => {
                    tracing::debug!(
                        "Payload has {} records, fewer than limit {}; clamping",
                        records.len(),
                        limit
                    );
                }
            }
        }

        Ok(&records[..limit.min(records.len())])
    }

    pub fn build<R, F>(&self, payload: &Payload, list_key: &str, project: F) -> Result<Vec<SeriesPoint>>
    where
        R: DeserializeOwned,
        F: Fn(R) -> SeriesPoint,
    {
        let records = record_list(payload, list_key)?;
        self.window(records)?
            .iter()
            .enumerate()
            .map(|(index, value)| {
                R::deserialize(value)
                    .map(&project)
                    .map_err(|e| ChartError::SchemaMismatch {
                        location: format!("{}[{}]", list_key, index),
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    /// `[name, reviews_count]` for each beer record.
    pub fn popular_beers(&self, payload: &Payload) -> Result<Vec<SeriesPoint>> {
        self.build(payload, "beers", |beer: BeerRecord| {
            SeriesPoint::Category(beer.name, beer.reviews_count)
        })
    }

    /// `[user1_rating, user2_rating]` for each rating record.
    pub fn rating_pairs(&self, payload: &Payload) -> Result<Vec<SeriesPoint>> {
        self.build(payload, "ratings", |rating: RatingRecord| {
            SeriesPoint::Xy(rating.user1_rating, rating.user2_rating)
        })
    }
}

fn record_list<'a>(payload: &'a Payload, list_key: &str) -> Result<&'a [Value]> {
    match payload.body.get(list_key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ChartError::SchemaMismatch {
            location: list_key.to_string(),
            message: format!("expected an array, found {}", json_type(other)),
        }),
        None => Err(ChartError::SchemaMismatch {
            location: list_key.to_string(),
            message: "key not found in payload".to_string(),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn beers(count: usize) -> Payload {
        let beers: Vec<Value> = (0..count)
            .map(|i| json!({"id": i, "name": format!("Beer {}", i), "reviews_count": 100 - i}))
            .collect();
        Payload::new(json!({ "beers": beers }))
    }

    #[test]
    fn test_top_ten_keeps_order() {
        let builder = SeriesBuilder::new(Some(10), BoundsPolicy::Clamp).unwrap();
        let points = builder.popular_beers(&beers(25)).unwrap();

        assert_eq!(points.len(), 10);
        assert_eq!(points[0], SeriesPoint::Category("Beer 0".to_string(), 100));
        assert_eq!(points[9], SeriesPoint::Category("Beer 9".to_string(), 91));
    }

    #[test]
    fn test_unbounded_names_and_counts() {
        let payload = Payload::new(json!({"beers": [
            {"name": "A", "reviews_count": 3},
            {"name": "B", "reviews_count": 7}
        ]}));
        let points = SeriesBuilder::unbounded().popular_beers(&payload).unwrap();

        assert_eq!(serde_json::to_value(&points).unwrap(), json!([["A", 3], ["B", 7]]));
    }

    #[test]
    fn test_rating_pairs() {
        let payload = Payload::new(json!({"ratings": [{"user1_rating": 1, "user2_rating": 2}]}));
        let points = SeriesBuilder::unbounded().rating_pairs(&payload).unwrap();

        assert_eq!(serde_json::to_value(&points).unwrap(), json!([[1, 2]]));
    }

    #[test]
    fn test_rating_pairs_accept_fractional_ratings() {
        let payload = Payload::new(json!({"ratings": [
            {"user1_rating": 3.5, "user2_rating": 4},
            {"user1_rating": 2, "user2_rating": 4.5},
            {"user1_rating": 5, "user2_rating": 1}
        ]}));
        let points = SeriesBuilder::unbounded().rating_pairs(&payload).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(
            serde_json::to_value(&points).unwrap(),
            json!([[3.5, 4], [2, 4.5], [5, 1]])
        );
    }

    #[test]
    fn test_short_list_is_clamped() {
        let builder = SeriesBuilder::new(Some(10), BoundsPolicy::Clamp).unwrap();
        let points = builder.popular_beers(&beers(3)).unwrap();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_short_list_fails_when_strict() {
        let builder = SeriesBuilder::new(Some(10), BoundsPolicy::Strict).unwrap();
        let err = builder.popular_beers(&beers(3)).unwrap_err();
        assert!(matches!(
            err,
            ChartError::InsufficientRecords {
                requested: 10,
                available: 3
            }
        ));
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(SeriesBuilder::new(Some(0), BoundsPolicy::Clamp).is_err());
    }

    #[test]
    fn test_missing_field_names_record_index() {
        let payload = Payload::new(json!({"beers": [
            {"name": "A", "reviews_count": 3},
            {"name": "B"}
        ]}));
        let err = SeriesBuilder::unbounded().popular_beers(&payload).unwrap_err();

        match err {
            ChartError::SchemaMismatch { location, message } => {
                assert_eq!(location, "beers[1]");
                assert!(message.contains("reviews_count"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_or_wrong_list() {
        let missing = Payload::new(json!({"ratings": []}));
        assert!(matches!(
            SeriesBuilder::unbounded().popular_beers(&missing),
            Err(ChartError::SchemaMismatch { .. })
        ));

        let not_array = Payload::new(json!({"beers": {"name": "A"}}));
        let err = SeriesBuilder::unbounded().popular_beers(&not_array).unwrap_err();
        assert!(err.to_string().contains("expected an array, found an object"));
    }

    #[test]
    fn test_empty_list_yields_empty_series() {
        let payload = Payload::new(json!({"ratings": []}));
        let points = SeriesBuilder::unbounded().rating_pairs(&payload).unwrap();
        assert!(points.is_empty());
    }
}
