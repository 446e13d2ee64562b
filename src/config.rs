use std::time::Duration;

/// OWID 完整数据集
pub const DEFAULT_DATA_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";
/// 远程不可用时读取的本地副本
pub const DEFAULT_DATA_FILE: &str = "owid-covid-data.csv";
pub const DEFAULT_COORDINATES_FILE: &str = "country-coordinates.csv";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 数据源配置：先取远程，失败后回退到本地文件
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub data_url: Option<String>,
    pub data_file: String,
    pub coordinates_url: Option<String>,
    pub coordinates_file: String,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_url: Some(DEFAULT_DATA_URL.to_string()),
            data_file: DEFAULT_DATA_FILE.to_string(),
            coordinates_url: None,
            coordinates_file: DEFAULT_COORDINATES_FILE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SourceConfig {
    /// 只用本地文件，不访问网络
    pub fn local(data_file: impl Into<String>, coordinates_file: impl Into<String>) -> Self {
        Self {
            data_url: None,
            data_file: data_file.into(),
            coordinates_url: None,
            coordinates_file: coordinates_file.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
