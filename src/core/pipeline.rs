use crate::core::chart::ChartConfig;
use crate::core::fetcher::{resolve_endpoint, DataFetcher};
use crate::core::series::SeriesBuilder;
use crate::core::{
    ChartKind, ChartOutput, ConfigProvider, OutputFormat, Payload, Pipeline, Series, SeriesPoint,
    StaticData, Storage,
};
use crate::utils::error::{ChartError, Result};
use chrono::Utc;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

pub struct ChartPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    fetcher: DataFetcher,
}

impl<S: Storage, C: ConfigProvider> ChartPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = DataFetcher::new(config.fetch_options())?;
        Ok(Self {
            storage,
            config,
            fetcher,
        })
    }

    /// Endpoint this chart reads from, `None` for static charts.
    pub fn endpoint(&self) -> Result<Option<String>> {
        let kind = self.config.chart_kind();
        if !kind.needs_fetch() {
            return Ok(None);
        }
        match self.config.endpoint() {
            Some(endpoint) => Ok(Some(endpoint.to_string())),
            None => resolve_endpoint(kind, self.config.api_base(), self.config.compared_users())
                .map(Some),
        }
    }

    fn series_builder(&self) -> Result<SeriesBuilder> {
        let limit = self
            .config
            .series_limit()
            .or_else(|| self.config.chart_kind().default_limit());
        SeriesBuilder::new(limit, self.config.bounds_policy())
    }

    fn output_file(&self, extension: &str) -> String {
        format!("{}.{}", self.config.chart_name(), extension)
    }

    fn full_path(&self, file_name: &str) -> String {
        Path::new(self.config.output_path())
            .join(file_name)
            .display()
            .to_string()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ChartPipeline<S, C> {
    async fn extract(&self) -> Result<Payload> {
        match self.endpoint()? {
            Some(url) => {
                tracing::info!(
                    "🚀 Fetching {} data from: {}",
                    self.config.chart_kind(),
                    url
                );
                self.fetcher.fetch(&url).await
            }
            None => {
                let data = match self.config.static_data() {
                    Some(data) => data.clone(),
                    None => {
                        tracing::debug!("No static data configured, using built-in sample");
                        StaticData::fruit_consumption()
                    }
                };
                Ok(Payload::new(serde_json::to_value(data)?))
            }
        }
    }

    async fn transform(&self, payload: Payload) -> Result<ChartOutput> {
        let kind = self.config.chart_kind();
        let title = self.config.title();

        let (chart, categories) = match kind {
            ChartKind::PopularBeers => {
                let points = self.series_builder()?.popular_beers(&payload)?;
                (ChartConfig::popular_beers(points, title), None)
            }
            ChartKind::RatingComparison => {
                let points = self.series_builder()?.rating_pairs(&payload)?;
                (ChartConfig::rating_comparison(points, title), None)
            }
            ChartKind::StaticBar => {
                let data: StaticData = serde_json::from_value(payload.body).map_err(|e| {
                    ChartError::SchemaMismatch {
                        location: "static_data".to_string(),
                        message: e.to_string(),
                    }
                })?;
                data.check("static_data")?;
                (ChartConfig::static_bar(&data, title), Some(data.categories))
            }
        };

        let csv_output = series_to_csv(kind, &chart.series, categories.as_deref())?;
        let series = chart.series.clone();

        Ok(ChartOutput {
            name: self.config.chart_name().to_string(),
            kind,
            endpoint: self.endpoint()?,
            series,
            config: serde_json::to_value(&chart)?,
            csv_output,
            generated_at: Utc::now(),
        })
    }

    async fn load(&self, output: ChartOutput) -> Result<String> {
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();
        for format in self.config.output_formats() {
            let bytes = match format {
                OutputFormat::Json => serde_json::to_vec_pretty(&output.config)?,
                OutputFormat::Csv => output.csv_output.as_bytes().to_vec(),
            };
            files.push((self.output_file(format.extension()), bytes));
        }

        if files.is_empty() {
            return Err(ChartError::ValidationError {
                message: "no output formats selected".to_string(),
            });
        }

        if self.config.compress() {
            let zip_name = self.output_file("zip");
            tracing::debug!("Creating ZIP file with {} files", files.len() + 1);

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                let options = SimpleFileOptions::default();

                for (name, bytes) in &files {
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(bytes)?;
                }

                let manifest = serde_json::json!({
                    "chart": output.name,
                    "kind": output.kind,
                    "endpoint": output.endpoint,
                    "points": output.point_count(),
                    "generated_at": output.generated_at.to_rfc3339(),
                });
                zip.start_file("manifest.json", options)?;
                zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

                zip.finish()?.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&zip_name, &zip_data).await?;
            return Ok(self.full_path(&zip_name));
        }

        for (name, bytes) in &files {
            tracing::debug!("Writing {} ({} bytes) to storage", name, bytes.len());
            self.storage.write_file(name, bytes).await?;
        }

        Ok(self.full_path(&files[0].0))
    }
}

/// 將序列轉為 CSV，欄位依圖表種類而定（空序列也有表頭）
pub fn series_to_csv(
    kind: ChartKind,
    series: &[Series],
    categories: Option<&[String]>,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: &[&str] = match kind {
        ChartKind::PopularBeers => &["name", "count"],
        ChartKind::RatingComparison => &["x", "y"],
        ChartKind::StaticBar => &["series", "category", "value"],
    };
    writer.write_record(header)?;

    for s in series {
        for (index, point) in s.data.iter().enumerate() {
            match point {
                SeriesPoint::Category(name, count) => {
                    writer.write_record([name.clone(), count.to_string()])?
                }
                SeriesPoint::Xy(x, y) => writer.write_record([x.to_string(), y.to_string()])?,
                SeriesPoint::Value(value) => {
                    let category = categories
                        .and_then(|c| c.get(index))
                        .cloned()
                        .unwrap_or_else(|| index.to_string());
                    writer.write_record([s.name.clone(), category, value.to_string()])?
                }
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ChartError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ChartError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
