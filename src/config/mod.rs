pub mod cli;
pub mod toml_config;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api/v1";

#[cfg(feature = "cli")]
mod args {
    use super::DEFAULT_API_BASE;
    use crate::core::{
        BoundsPolicy, ChartKind, ConfigProvider, FetchOptions, OutputFormat, StaticData,
    };
    use crate::utils::error::{ChartError, Result};
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "beer-charts")]
    #[command(about = "Build chart configurations from the beer ratings API")]
    pub struct CliConfig {
        #[arg(long, value_enum, default_value_t = ChartKind::PopularBeers)]
        pub chart: ChartKind,

        #[arg(long, default_value = DEFAULT_API_BASE)]
        pub api_base: String,

        #[arg(long, help = "Full endpoint URL, overrides --api-base")]
        pub endpoint: Option<String>,

        #[arg(long, default_value = "1")]
        pub user: u32,

        #[arg(long, default_value = "2")]
        pub compare_user: u32,

        #[arg(long, help = "Maximum number of points (popular-beers defaults to 10)")]
        pub limit: Option<usize>,

        #[arg(long, help = "Fail instead of clamping when fewer records than --limit")]
        pub strict: bool,

        #[arg(long)]
        pub title: Option<String>,

        #[arg(long, help = "Output file name without extension")]
        pub name: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_enum, value_delimiter = ',', default_value = "json")]
        pub formats: Vec<OutputFormat>,

        #[arg(long, help = "Bundle outputs and a manifest into a ZIP file")]
        pub zip: bool,

        #[arg(long, default_value = "30")]
        pub timeout_seconds: u64,

        #[arg(long, default_value = "0")]
        pub retry_attempts: u32,

        #[arg(long, default_value = "1")]
        pub retry_delay_seconds: u64,

        #[arg(long = "header", value_parser = parse_header, help = "Extra request header, NAME:VALUE")]
        pub headers: Vec<(String, String)>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("expected NAME:VALUE, got '{}'", raw))?;
        let name = name.trim();
        if name.is_empty() {
            return Err("header name cannot be empty".to_string());
        }
        Ok((name.to_string(), value.trim().to_string()))
    }

    impl ConfigProvider for CliConfig {
        fn chart_name(&self) -> &str {
            self.name.as_deref().unwrap_or(self.chart.as_str())
        }

        fn chart_kind(&self) -> ChartKind {
            self.chart
        }

        fn api_base(&self) -> &str {
            &self.api_base
        }

        fn endpoint(&self) -> Option<&str> {
            self.endpoint.as_deref()
        }

        fn compared_users(&self) -> (u32, u32) {
            (self.user, self.compare_user)
        }

        fn series_limit(&self) -> Option<usize> {
            self.limit
        }

        fn bounds_policy(&self) -> BoundsPolicy {
            if self.strict {
                BoundsPolicy::Strict
            } else {
                BoundsPolicy::Clamp
            }
        }

        fn title(&self) -> Option<&str> {
            self.title.as_deref()
        }

        fn static_data(&self) -> Option<&StaticData> {
            None
        }

        fn fetch_options(&self) -> FetchOptions {
            FetchOptions {
                timeout: Some(Duration::from_secs(self.timeout_seconds)),
                retry_attempts: self.retry_attempts,
                retry_delay: Duration::from_secs(self.retry_delay_seconds),
                headers: self.headers.clone(),
            }
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.formats
        }

        fn compress(&self) -> bool {
            self.zip
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("api_base", &self.api_base)?;
            if let Some(endpoint) = &self.endpoint {
                if !self.chart.needs_fetch() {
                    return Err(ChartError::ValidationError {
                        message: format!("--endpoint cannot be used with {}", self.chart),
                    });
                }
                validation::validate_url("endpoint", endpoint)?;
            }
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_file_stems("name", [self.chart_name()])?;
            if let Some(limit) = self.limit {
                validation::validate_positive_number("limit", limit, 1)?;
            }
            validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
            validation::validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
            if self.formats.is_empty() {
                return Err(ChartError::MissingConfigError {
                    field: "formats".to_string(),
                });
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_match_popular_beers_script() {
            let config = CliConfig::parse_from(["beer-charts"]);

            assert_eq!(config.chart, ChartKind::PopularBeers);
            assert_eq!(config.api_base, DEFAULT_API_BASE);
            assert_eq!(config.chart_name(), "popular-beers");
            assert_eq!(config.output_formats(), &[OutputFormat::Json]);
            assert_eq!(config.bounds_policy(), BoundsPolicy::Clamp);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_parse_full_flag_set() {
            let config = CliConfig::parse_from([
                "beer-charts",
                "--chart",
                "rating-comparison",
                "--user",
                "7",
                "--compare-user",
                "9",
                "--formats",
                "json,csv",
                "--header",
                "X-Api-Key: abc",
                "--retry-attempts",
                "2",
                "--strict",
                "--zip",
            ]);

            assert_eq!(config.chart_kind(), ChartKind::RatingComparison);
            assert_eq!(config.compared_users(), (7, 9));
            assert_eq!(config.formats, vec![OutputFormat::Json, OutputFormat::Csv]);
            assert_eq!(config.bounds_policy(), BoundsPolicy::Strict);
            assert!(config.compress());

            let options = config.fetch_options();
            assert_eq!(options.retry_attempts, 2);
            assert_eq!(
                options.headers,
                vec![("X-Api-Key".to_string(), "abc".to_string())]
            );
        }

        #[test]
        fn test_invalid_values_rejected() {
            let zero_limit = CliConfig::parse_from(["beer-charts", "--limit", "0"]);
            assert!(zero_limit.validate().is_err());

            let static_with_endpoint = CliConfig::parse_from([
                "beer-charts",
                "--chart",
                "static-bar",
                "--endpoint",
                "http://localhost:3000/x.json",
            ]);
            assert!(static_with_endpoint.validate().is_err());

            assert!(CliConfig::try_parse_from(["beer-charts", "--header", "novalue"]).is_err());
        }
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;
