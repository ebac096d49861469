use crate::config::DEFAULT_API_BASE;
use crate::core::{BoundsPolicy, ChartKind, ConfigProvider, FetchOptions, OutputFormat, StaticData};
use crate::utils::error::{ChartError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub charts: Vec<ChartDefinition>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub name: String,
    pub kind: ChartKind,
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub user: Option<u32>,
    pub compare_user: Option<u32>,
    pub limit: Option<usize>,
    pub strict: Option<bool>,
    pub title: Option<String>,
    pub static_data: Option<StaticData>,
}

impl ChartDefinition {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ChartError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ChartError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("project.name", &self.project.name)?;
        validation::validate_url("source.base_url", self.base_url())?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 600)?;
        }
        if let Some(retries) = self.source.retry_attempts {
            validation::validate_range("source.retry_attempts", retries, 0, 10)?;
        }

        if self.load.output_formats.is_empty() {
            return Err(ChartError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }
        if self.charts.is_empty() {
            return Err(ChartError::MissingConfigError {
                field: "charts".to_string(),
            });
        }

        validation::validate_file_stems("charts.name", self.charts.iter().map(|c| c.name.as_str()))?;

        for chart in &self.charts {
            Self::validate_chart(chart)?;
        }

        Ok(())
    }

    fn validate_chart(chart: &ChartDefinition) -> Result<()> {
        let field = |suffix: &str| format!("charts.{}.{}", chart.name, suffix);

        if let Some(endpoint) = &chart.endpoint {
            validation::validate_url(&field("endpoint"), endpoint)?;
        }
        if let Some(limit) = chart.limit {
            validation::validate_positive_number(&field("limit"), limit, 1)?;
        }

        match (chart.kind.needs_fetch(), &chart.static_data) {
            (true, Some(_)) => Err(ChartError::ValidationError {
                message: format!(
                    "chart '{}' of kind {} cannot define static_data",
                    chart.name, chart.kind
                ),
            }),
            (false, _) if chart.endpoint.is_some() => Err(ChartError::ValidationError {
                message: format!("static chart '{}' cannot define an endpoint", chart.name),
            }),
            (false, Some(data)) => data.check(&field("static_data")),
            _ => Ok(()),
        }
    }

    pub fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn output_path(&self) -> &str {
        &self.load.output_path
    }

    pub fn compression_enabled(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 每個啟用的圖表各自成為一個工作
    pub fn jobs(&self) -> Vec<ChartJob> {
        self.charts
            .iter()
            .filter(|c| c.is_enabled())
            .map(|chart| ChartJob {
                chart: chart.clone(),
                source: self.source.clone(),
                load: self.load.clone(),
            })
            .collect()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// One chart from a TOML file together with the shared source and load settings.
#[derive(Debug, Clone)]
pub struct ChartJob {
    pub chart: ChartDefinition,
    pub source: SourceConfig,
    pub load: LoadConfig,
}

impl ConfigProvider for ChartJob {
    fn chart_name(&self) -> &str {
        &self.chart.name
    }

    fn chart_kind(&self) -> ChartKind {
        self.chart.kind
    }

    fn api_base(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    fn endpoint(&self) -> Option<&str> {
        self.chart.endpoint.as_deref()
    }

    fn compared_users(&self) -> (u32, u32) {
        (
            self.chart.user.unwrap_or(1),
            self.chart.compare_user.unwrap_or(2),
        )
    }

    fn series_limit(&self) -> Option<usize> {
        self.chart.limit
    }

    fn bounds_policy(&self) -> BoundsPolicy {
        if self.chart.strict.unwrap_or(false) {
            BoundsPolicy::Strict
        } else {
            BoundsPolicy::Clamp
        }
    }

    fn title(&self) -> Option<&str> {
        self.chart.title.as_deref()
    }

    fn static_data(&self) -> Option<&StaticData> {
        self.chart.static_data.as_ref()
    }

    fn fetch_options(&self) -> FetchOptions {
        let defaults = FetchOptions::default();
        FetchOptions {
            timeout: self
                .source
                .timeout_seconds
                .map(Duration::from_secs)
                .or(defaults.timeout),
            retry_attempts: self.source.retry_attempts.unwrap_or(defaults.retry_attempts),
            retry_delay: self
                .source
                .retry_delay_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
            headers: self
                .source
                .headers
                .iter()
                .flatten()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.load.output_formats
    }

    fn compress(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[project]
name = "ratebeer-dashboard"
version = "1.0.0"

[source]
base_url = "http://localhost:3000/api/v1"
timeout_seconds = 10
retry_attempts = 2

[source.headers]
X-Api-Key = "abc"

[[charts]]
name = "popular"
kind = "popular-beers"

[[charts]]
name = "compare"
kind = "rating-comparison"
user = 4
compare_user = 5
strict = true

[[charts]]
name = "fruit"
kind = "static-bar"
enabled = false

[load]
output_path = "./charts"
output_formats = ["json", "csv"]

[load.compression]
enabled = true
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.project.name, "ratebeer-dashboard");
        assert_eq!(config.charts.len(), 3);
        assert_eq!(config.charts[1].kind, ChartKind::RatingComparison);
        assert!(config.compression_enabled());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jobs_skip_disabled_and_share_source() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        let jobs = config.jobs();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].chart_name(), "popular");
        assert_eq!(jobs[1].compared_users(), (4, 5));
        assert_eq!(jobs[1].bounds_policy(), BoundsPolicy::Strict);
        assert!(jobs[1].compress());

        let options = jobs[0].fetch_options();
        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.retry_attempts, 2);
        assert_eq!(options.headers, vec![("X-Api-Key".to_string(), "abc".to_string())]);
    }

    #[test]
    fn test_static_data_table() {
        let toml_content = r#"
[project]
name = "fruit"

[[charts]]
name = "fruit"
kind = "static-bar"
title = "Fruit eaten this week"

[charts.static_data]
categories = ["Apples", "Pears"]

[[charts.static_data.series]]
name = "Jane"
data = [1, 2.5]

[load]
output_path = "./out"
output_formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), DEFAULT_API_BASE);

        let job = &config.jobs()[0];
        let data = job.static_data().unwrap();
        assert_eq!(data.series[0].data.len(), 2);
        assert_eq!(job.title(), Some("Fruit eaten this week"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BEER_CHARTS_TEST_BASE", "https://ratings.example.com/api/v1");

        let toml_content = r#"
[project]
name = "env"

[source]
base_url = "${BEER_CHARTS_TEST_BASE}"

[[charts]]
name = "popular"
kind = "popular-beers"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), "https://ratings.example.com/api/v1");

        std::env::remove_var("BEER_CHARTS_TEST_BASE");
    }

    #[test]
    fn test_config_validation_failures() {
        let duplicate = BASIC.replace("name = \"compare\"", "name = \"popular\"");
        let config = TomlConfig::from_toml_str(&duplicate).unwrap();
        assert!(config.validate().is_err());

        let bad_url = BASIC.replace("http://localhost:3000/api/v1", "not-a-url");
        let config = TomlConfig::from_toml_str(&bad_url).unwrap();
        assert!(config.validate().is_err());

        let zero_limit = BASIC.replace("kind = \"popular-beers\"", "kind = \"popular-beers\"\nlimit = 0");
        let config = TomlConfig::from_toml_str(&zero_limit).unwrap();
        assert!(config.validate().is_err());

        let ragged = r#"
[project]
name = "ragged"

[[charts]]
name = "fruit"
kind = "static-bar"

[charts.static_data]
categories = ["Apples", "Pears"]

[[charts.static_data.series]]
name = "Jane"
data = [1]

[load]
output_path = "./out"
output_formats = ["json"]
"#;
        let config = TomlConfig::from_toml_str(ragged).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ChartError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_unknown_chart_kind_fails_parsing() {
        let broken = BASIC.replace("popular-beers", "pie");
        assert!(matches!(
            TomlConfig::from_toml_str(&broken),
            Err(ChartError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, "ratebeer-dashboard");
    }
}
