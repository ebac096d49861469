//! Chart configuration objects in the shape the front-end charting library
//! expects. Only structural options are emitted; styling is left to the page.

use crate::core::{Series, SeriesPoint, StaticData};
use serde::Serialize;

const RATEBEER_SOURCE: &str = "Source: Ratebeer";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart: ChartOptions,
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<Title>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub legend: Legend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(rename = "type")]
    pub chart_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub point_format: String,
}

impl ChartConfig {
    /// Column chart of beers by number of reviews.
    pub fn popular_beers(points: Vec<SeriesPoint>, title: Option<&str>) -> Self {
        Self {
            chart: ChartOptions {
                chart_type: "column".to_string(),
                zoom_type: None,
            },
            title: Title::new(title.unwrap_or("Popular Beers by Number of Reviews")),
            subtitle: Some(Title::new(RATEBEER_SOURCE)),
            x_axis: Axis {
                axis_type: Some("category".to_string()),
                ..Axis::default()
            },
            y_axis: Axis {
                title: Some(Title::new("Number of Reviews")),
                min: Some(0.0),
                ..Axis::default()
            },
            legend: Legend { enabled: false },
            tooltip: Some(Tooltip {
                point_format: "Number of Reviews: <b>{point.y}</b>".to_string(),
            }),
            series: vec![Series {
                name: "Beer".to_string(),
                data: points,
            }],
        }
    }

    /// Scatter chart of one user's ratings against another's.
    pub fn rating_comparison(points: Vec<SeriesPoint>, title: Option<&str>) -> Self {
        Self {
            chart: ChartOptions {
                chart_type: "scatter".to_string(),
                zoom_type: Some("xy".to_string()),
            },
            title: Title::new(title.unwrap_or("Comparing Beer Preferences of Two Users")),
            subtitle: Some(Title::new(RATEBEER_SOURCE)),
            x_axis: Axis {
                title: Some(Title::new("User1")),
                ..Axis::default()
            },
            y_axis: Axis {
                title: Some(Title::new("User2")),
                ..Axis::default()
            },
            legend: Legend { enabled: true },
            tooltip: Some(Tooltip {
                point_format: "user1: {point.x}, user2: {point.y}".to_string(),
            }),
            series: vec![Series {
                name: "Beer Data".to_string(),
                data: points,
            }],
        }
    }

    pub fn static_bar(data: &StaticData, title: Option<&str>) -> Self {
        let series = data
            .series
            .iter()
            .map(|s| Series {
                name: s.name.clone(),
                data: s.data.iter().cloned().map(SeriesPoint::Value).collect(),
            })
            .collect();

        Self {
            chart: ChartOptions {
                chart_type: "bar".to_string(),
                zoom_type: None,
            },
            title: Title::new(title.unwrap_or("Fruit Consumption")),
            subtitle: None,
            x_axis: Axis {
                categories: Some(data.categories.clone()),
                ..Axis::default()
            },
            y_axis: Axis {
                title: Some(Title::new("Fruit eaten")),
                ..Axis::default()
            },
            legend: Legend { enabled: true },
            tooltip: None,
            series,
        }
    }
}
