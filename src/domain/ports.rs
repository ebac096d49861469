use crate::domain::model::{
    BoundsPolicy, ChartKind, ChartOutput, FetchOptions, OutputFormat, Payload, StaticData,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn chart_name(&self) -> &str;
    fn chart_kind(&self) -> ChartKind;
    fn api_base(&self) -> &str;
    /// Explicit endpoint; when absent the URL is derived from the kind and users.
    fn endpoint(&self) -> Option<&str>;
    fn compared_users(&self) -> (u32, u32);
    fn series_limit(&self) -> Option<usize>;
    fn bounds_policy(&self) -> BoundsPolicy;
    fn title(&self) -> Option<&str>;
    fn static_data(&self) -> Option<&StaticData>;
    fn fetch_options(&self) -> FetchOptions;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    fn compress(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Payload>;
    async fn transform(&self, payload: Payload) -> Result<ChartOutput>;
    async fn load(&self, output: ChartOutput) -> Result<String>;
}
