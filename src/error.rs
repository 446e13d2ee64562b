use polars::prelude::PolarsError;
use thiserror::Error;

/// 数据加载和图表推导过程中对外暴露的错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashError {
    /// 数据集缺少必须的列，启动阶段出现即终止
    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),
    #[error("unknown country `{0}`")]
    UnknownCountry(String),
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
    #[error("{name} must be within [{min}, {max}], got {value}")]
    InvalidRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    /// polars 执行表推导时出错，或者列的类型不对
    #[error("dataframe error: {0}")]
    Frame(String),
}

impl From<PolarsError> for DashError {
    fn from(e: PolarsError) -> Self {
        DashError::Frame(e.to_string())
    }
}

/// 悬停/点击信息查询失败，只在内部使用，边界处会被替换成占位文本
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("no records for country `{0}`")]
    UnknownCountry(String),
    #[error("country `{country}` has no value for `{field}`")]
    MissingField {
        country: String,
        field: &'static str,
    },
}
