//! 图表描述：与具体渲染库无关，外层界面负责把 `ChartSpec` 画出来

use chrono::NaiveDate;
use serde::Serialize;

mod detail;
mod info;
mod line;
mod map;
mod top_n;

pub use detail::{derive_country_detail_chart, DetailMode};
pub use info::{derive_country_info, lookup_country_info, CountryInfo, InfoText, INFO_PLACEHOLDER};
pub use line::derive_line_chart;
pub use map::{derive_map_chart, marker_size, MARKER_FLOOR};
pub use top_n::{derive_top_n_chart, top_n, TOP_N_MAX, TOP_N_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    ScatterGeo,
}

/// 坐标轴上的一个值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Date(NaiveDate),
    Category(String),
    Number(f64),
}

/// 散点标记：大小、颜色和悬停文字
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub sizes: Vec<f64>,
    pub color: String,
    pub text: Vec<String>,
}

/// 一条数据序列，x 和 y 等长；y 为 None 的点画成缺口
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub label: String,
    pub x: Vec<AxisValue>,
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

impl Trace {
    pub fn new(label: impl Into<String>, x: Vec<AxisValue>, y: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            marker: None,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// 额外的渲染提示
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_orientation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub series: Vec<Trace>,
    pub hints: Hints,
}

impl ChartSpec {
    pub fn new(
        kind: ChartKind,
        title: impl Into<String>,
        x_axis_label: impl Into<String>,
        y_axis_label: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            x_axis_label: x_axis_label.into(),
            y_axis_label: y_axis_label.into(),
            series: Vec::new(),
            hints: Hints::default(),
        }
    }

    pub fn with_series(mut self, series: Vec<Trace>) -> Self {
        self.series = series;
        self
    }

    pub fn with_hints(mut self, hints: Hints) -> Self {
        self.hints = hints;
        self
    }
}

/// 列名转成展示用的文字："total_cases_per_million" → "Total cases per million"
pub fn display_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub(crate) fn date_axis(dates: &[NaiveDate]) -> Vec<AxisValue> {
    dates.iter().copied().map(AxisValue::Date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_replaces_underscores_and_capitalizes() {
        assert_eq!(display_label("total_deaths"), "Total deaths");
        assert_eq!(display_label("total_cases_per_million"), "Total cases per million");
        assert_eq!(display_label("New_Cases"), "New cases");
        assert_eq!(display_label(""), "");
    }

    #[test]
    fn chart_spec_serializes_without_empty_hints() {
        let chart = ChartSpec::new(ChartKind::Bar, "t", "x", "y").with_series(vec![Trace::new(
            "s",
            vec![AxisValue::Category("Spain".into())],
            vec![Some(1.0)],
        )]);
        let json = serde_json::to_value(&chart).unwrap();

        assert_eq!(json["kind"], "bar");
        assert_eq!(json["series"][0]["x"][0], "Spain");
        assert!(json["series"][0].get("marker").is_none());
        assert_eq!(json["hints"], serde_json::json!({}));
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let json = serde_json::to_value(date_axis(&[date])).unwrap();
        assert_eq!(json, serde_json::json!(["2020-03-01"]));
    }
}
