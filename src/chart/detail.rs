use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::{date_axis, display_label, ChartKind, ChartSpec, Trace};
use crate::error::DashError;
use crate::model::{Column, RawData, RawRecord};

/// 单个国家图表显示累计值还是每日新增
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailMode {
    #[default]
    Cumulative,
    Daily,
}

impl DetailMode {
    pub const fn columns(self) -> [Column; 2] {
        match self {
            DetailMode::Cumulative => [Column::TotalCases, Column::TotalDeaths],
            DetailMode::Daily => [Column::NewCases, Column::NewDeaths],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DetailMode::Cumulative => "cumulative",
            DetailMode::Daily => "daily",
        }
    }
}

impl FromStr for DetailMode {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cumulative" => Ok(DetailMode::Cumulative),
            "daily" => Ok(DetailMode::Daily),
            other => Err(DashError::UnknownMetric(other.to_string())),
        }
    }
}

impl fmt::Display for DetailMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个国家在 [start, end] 内的柱状图，总是两条序列。
/// 数据集里完全没有这个国家时报 `UnknownCountry`；窗口内没有数据时序列为空
pub fn derive_country_detail_chart(
    raw: &RawData,
    country: &str,
    start: NaiveDate,
    end: NaiveDate,
    mode: DetailMode,
) -> Result<ChartSpec, DashError> {
    if !raw.contains_country(country) {
        return Err(DashError::UnknownCountry(country.to_string()));
    }

    let mut records: Vec<&RawRecord> = raw
        .for_country(country)
        .filter(|r| r.date >= start && r.date <= end)
        .collect();
    records.sort_by_key(|r| r.date);

    let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    let series = mode
        .columns()
        .into_iter()
        .map(|column| {
            Trace::new(
                display_label(column.name()),
                date_axis(&dates),
                records.iter().map(|r| r.value(column)).collect(),
            )
        })
        .collect();

    let title = match mode {
        DetailMode::Cumulative => format!("{}: cumulative cases and deaths", country),
        DetailMode::Daily => format!("{}: daily new cases and deaths", country),
    };
    Ok(ChartSpec::new(ChartKind::Bar, title, "date", "people").with_series(series))
}
