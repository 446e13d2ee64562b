use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DashError;

/// 聚合行的名字，排行榜里不参与排序
pub const WORLD: &str = "World";

/// 数据集里我们关心的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Date,
    Location,
    IsoCode,
    TotalCases,
    NewCases,
    TotalDeaths,
    NewDeaths,
    TotalCasesPerMillion,
    TotalTestsPerThousand,
    Population,
    PopulationDensity,
    GdpPerCapita,
    HospitalBedsPerThousand,
}

impl Column {
    pub const NUMERIC: [Column; 10] = [
        Column::TotalCases,
        Column::NewCases,
        Column::TotalDeaths,
        Column::NewDeaths,
        Column::TotalCasesPerMillion,
        Column::TotalTestsPerThousand,
        Column::Population,
        Column::PopulationDensity,
        Column::GdpPerCapita,
        Column::HospitalBedsPerThousand,
    ];

    /// CSV 里的列名
    pub const fn name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Location => "location",
            Column::IsoCode => "iso_code",
            Column::TotalCases => "total_cases",
            Column::NewCases => "new_cases",
            Column::TotalDeaths => "total_deaths",
            Column::NewDeaths => "new_deaths",
            Column::TotalCasesPerMillion => "total_cases_per_million",
            Column::TotalTestsPerThousand => "total_tests_per_thousand",
            Column::Population => "population",
            Column::PopulationDensity => "population_density",
            Column::GdpPerCapita => "gdp_per_capita",
            Column::HospitalBedsPerThousand => "hospital_beds_per_thousand",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一个国家在某一天的一行原始数据
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub location: String,
    pub iso_code: Option<String>,
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
    pub total_cases_per_million: Option<f64>,
    pub total_tests_per_thousand: Option<f64>,
    pub population: Option<f64>,
    pub population_density: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub hospital_beds_per_thousand: Option<f64>,
}

impl RawRecord {
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            date,
            location: location.into(),
            iso_code: None,
            total_cases: None,
            new_cases: None,
            total_deaths: None,
            new_deaths: None,
            total_cases_per_million: None,
            total_tests_per_thousand: None,
            population: None,
            population_density: None,
            gdp_per_capita: None,
            hospital_beds_per_thousand: None,
        }
    }

    /// 按列取数值；非数值列总是 None
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::TotalCases => self.total_cases,
            Column::NewCases => self.new_cases,
            Column::TotalDeaths => self.total_deaths,
            Column::NewDeaths => self.new_deaths,
            Column::TotalCasesPerMillion => self.total_cases_per_million,
            Column::TotalTestsPerThousand => self.total_tests_per_thousand,
            Column::Population => self.population,
            Column::PopulationDensity => self.population_density,
            Column::GdpPerCapita => self.gdp_per_capita,
            Column::HospitalBedsPerThousand => self.hospital_beds_per_thousand,
            Column::Date | Column::Location | Column::IsoCode => None,
        }
    }

    pub(crate) fn set_value(&mut self, column: Column, value: Option<f64>) {
        let slot = match column {
            Column::TotalCases => &mut self.total_cases,
            Column::NewCases => &mut self.new_cases,
            Column::TotalDeaths => &mut self.total_deaths,
            Column::NewDeaths => &mut self.new_deaths,
            Column::TotalCasesPerMillion => &mut self.total_cases_per_million,
            Column::TotalTestsPerThousand => &mut self.total_tests_per_thousand,
            Column::Population => &mut self.population,
            Column::PopulationDensity => &mut self.population_density,
            Column::GdpPerCapita => &mut self.gdp_per_capita,
            Column::HospitalBedsPerThousand => &mut self.hospital_beds_per_thousand,
            Column::Date | Column::Location | Column::IsoCode => return,
        };
        *slot = value;
    }
}

/// 进程启动时加载一次的原始数据，同时记录数据源实际带了哪些列
#[derive(Debug, Clone, PartialEq)]
pub struct RawData {
    records: Vec<RawRecord>,
    columns: BTreeSet<Column>,
}

impl RawData {
    pub fn new(records: Vec<RawRecord>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            records,
            columns: columns.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// 缺任何一列都报 `MissingColumn`，报告第一个缺失的列
    pub fn require(&self, columns: &[Column]) -> Result<(), DashError> {
        match columns.iter().find(|c| !self.has_column(**c)) {
            Some(missing) => Err(DashError::MissingColumn(missing.name().to_string())),
            None => Ok(()),
        }
    }

    pub fn for_country<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a RawRecord> + 'a {
        self.records.iter().filter(move |r| r.location == country)
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.records.iter().any(|r| r.location == country)
    }
}

/// 排行榜可选的五个指标，顺序与透视表的列顺序一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NewCases,
    NewDeaths,
    TotalCases,
    TotalCasesPerMillion,
    TotalDeaths,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::NewCases,
        Metric::NewDeaths,
        Metric::TotalCases,
        Metric::TotalCasesPerMillion,
        Metric::TotalDeaths,
    ];

    pub const fn column(self) -> Column {
        match self {
            Metric::NewCases => Column::NewCases,
            Metric::NewDeaths => Column::NewDeaths,
            Metric::TotalCases => Column::TotalCases,
            Metric::TotalCasesPerMillion => Column::TotalCasesPerMillion,
            Metric::TotalDeaths => Column::TotalDeaths,
        }
    }

    pub const fn name(self) -> &'static str {
        self.column().name()
    }
}

impl FromStr for Metric {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| DashError::UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 地图可选的指标，每个指标有固定的标记缩放系数和颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMetric {
    TotalCases,
    TotalDeaths,
    TotalTestsPerThousand,
}

impl MapMetric {
    pub const ALL: [MapMetric; 3] = [
        MapMetric::TotalCases,
        MapMetric::TotalDeaths,
        MapMetric::TotalTestsPerThousand,
    ];

    pub const fn column(self) -> Column {
        match self {
            MapMetric::TotalCases => Column::TotalCases,
            MapMetric::TotalDeaths => Column::TotalDeaths,
            MapMetric::TotalTestsPerThousand => Column::TotalTestsPerThousand,
        }
    }

    pub const fn name(self) -> &'static str {
        self.column().name()
    }

    /// 标记大小的除数
    pub const fn scale(self) -> f64 {
        match self {
            MapMetric::TotalCases => 10_000.0,
            MapMetric::TotalDeaths => 200.0,
            MapMetric::TotalTestsPerThousand => 10.0,
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            MapMetric::TotalCases => "orange",
            MapMetric::TotalDeaths => "crimson",
            MapMetric::TotalTestsPerThousand => "seagreen",
        }
    }
}

impl FromStr for MapMetric {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapMetric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| DashError::UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for MapMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 坐标参考表里的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCoordinates {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// iso_code → 坐标
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatesIndex(BTreeMap<String, CountryCoordinates>);

impl CoordinatesIndex {
    pub fn get(&self, iso_code: &str) -> Option<&CountryCoordinates> {
        self.0.get(iso_code)
    }

    pub fn insert(&mut self, iso_code: impl Into<String>, coordinates: CountryCoordinates) {
        self.0.insert(iso_code.into(), coordinates);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryCoordinates)> {
        self.0.iter().map(|(iso, c)| (iso.as_str(), c))
    }
}

impl FromIterator<(String, CountryCoordinates)> for CoordinatesIndex {
    fn from_iter<I: IntoIterator<Item = (String, CountryCoordinates)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
