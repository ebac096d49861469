pub mod chart;
pub mod etl;
pub mod fetcher;
pub mod pipeline;
pub mod series;

pub use crate::domain::model::{
    BeerRecord, BoundsPolicy, ChartKind, ChartOutput, FetchOptions, OutputFormat, Payload,
    RatingRecord, Series, SeriesPoint, StaticData, StaticSeries,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
