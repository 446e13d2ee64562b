use chrono::{Local, NaiveDate};

use crate::chart::DetailMode;
use crate::error::DashError;
use crate::model::{MapMetric, Metric};

pub const DEFAULT_COUNTRIES: [&str; 5] = ["United Kingdom", "United States", "Germany", "Spain", "Brazil"];
pub const DEFAULT_DETAIL_COUNTRY: &str = "United Kingdom";
pub const DEFAULT_TOP_N: usize = 5;

/// 界面上当前的选择。由外层界面持有，推导函数只拿到它的只读引用
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub countries: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ranking_metric: Metric,
    pub top_n: usize,
    pub country: String,
    pub mode: DetailMode,
    pub map_metric: MapMetric,
    /// 悬停/点击的是 `countries` 里的第几个
    pub hovered: Option<usize>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or(NaiveDate::MIN),
            end: Local::now().date_naive(),
            ranking_metric: Metric::TotalDeaths,
            top_n: DEFAULT_TOP_N,
            country: DEFAULT_DETAIL_COUNTRY.to_string(),
            mode: DetailMode::Cumulative,
            map_metric: MapMetric::TotalCases,
            hovered: None,
        }
    }
}

impl Selection {
    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// 日期选择器给的是 `2020-03-01` 或者 `2020-03-01T00:00:00`，只看前十个字符
pub fn parse_date(s: &str) -> Result<NaiveDate, DashError> {
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| DashError::InvalidDate(s.to_string()))
}
