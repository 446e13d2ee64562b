use std::ops::{Deref, DerefMut};

use anyhow::{Context, Result};
use polars::frame::DataFrame;
use polars::io::SerWriter;
use polars::prelude::CsvWriter;
use tracing::{info, warn};

use crate::fetcher::retrieve_with_fallback;
use crate::load::{detect_content, load_coordinates, Layout};

pub mod chart;
pub mod config;
mod convert;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod load;
pub mod model;
pub mod selection;
pub mod tables;

#[cfg(test)]
mod fixtures;

pub use chart::{ChartSpec, DetailMode, InfoText};
pub use config::SourceConfig;
pub use dashboard::{Dashboard, DropdownOption};
pub use error::{DashError, LookupError};
pub use model::{CoordinatesIndex, MapMetric, Metric, RawData, RawRecord};
pub use selection::Selection;
pub use tables::{derive_tables, DerivedTables};

#[derive(Debug)]
pub struct DataSet(DataFrame);

impl Deref for DataSet {
    type Target = DataFrame;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DataSet {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

// DataSet 内部方法
impl DataSet {
    /// DataSet 转换为 CSV
    pub fn to_csv(&self) -> Result<String> {
        let mut buf = Vec::new();
        let writer = CsvWriter::new(&mut buf);
        writer.finish(self)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// 取数据（远程优先，失败回退本地），识别布局，推导出所有表
pub async fn load_dashboard(config: &SourceConfig) -> Result<Dashboard> {
    info!("loading dataset");
    let data = retrieve_with_fallback(config.data_url.as_deref(), &config.data_file, config.timeout)
        .await
        .context("loading dataset")?;
    let loader = detect_content(data)?;
    let layout = loader.layout();
    let raw = loader.load()?;

    match layout {
        Layout::LegacyDeaths => Ok(Dashboard::deaths_only(raw)?),
        Layout::Owid => {
            let coordinates = match retrieve_with_fallback(
                config.coordinates_url.as_deref(),
                &config.coordinates_file,
                config.timeout,
            )
            .await
            {
                Ok(text) => load_coordinates(text)?,
                Err(e) => {
                    // 没有坐标表时地图为空，其它图表照常
                    warn!("no coordinates reference available: {:#}", e);
                    CoordinatesIndex::default()
                }
            };
            Ok(Dashboard::new(raw, &coordinates)?)
        }
    }
}
