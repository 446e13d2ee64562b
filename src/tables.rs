use chrono::NaiveDate;
use polars::prelude::{col, lit, DataFrame, Expr, IntoLazy, NamedFrom, Series};
use serde::Serialize;
use tracing::{debug, info};

use crate::convert::{DeathsFrame, HighsFrame, MapFrame};
use crate::error::DashError;
use crate::model::{
    Column, CoordinatesIndex, CountryCoordinates, MapMetric, Metric, RawData, WORLD,
};
use crate::DataSet;

const DATE: &str = Column::Date.name();
const LOCATION: &str = Column::Location.name();
const ISO_CODE: &str = Column::IsoCode.name();

/// 累计死亡宽表：行是日期（升序），第一列是 date，之后每个国家一列（按名字排序）
#[derive(Debug, Clone)]
pub struct CumulativeDeathsTable {
    dates: Vec<NaiveDate>,
    frame: DataFrame,
}

impl CumulativeDeathsTable {
    pub fn from_raw(raw: &RawData) -> Result<Self, DashError> {
        Self::from_frame(raw, &DataSet::try_from(raw)?)
    }

    /// 按 (日期, 国家) 透视 total_deaths。同一格出现多行时取平均值，
    /// 没有任何值的日期和国家不会出现在表里
    fn from_frame(raw: &RawData, frame: &DataSet) -> Result<Self, DashError> {
        raw.require(&[Column::Date, Column::Location, Column::TotalDeaths])?;
        let deaths = Column::TotalDeaths.name();

        let long = frame
            .0
            .clone()
            .lazy()
            .filter(col(deaths).is_not_null())
            .select(vec![col(DATE), col(LOCATION), col(deaths)])
            .collect()?;
        if long.height() == 0 {
            let empty: Vec<&str> = Vec::new();
            return Ok(Self::from_parts(Vec::new(), DataFrame::new(vec![Series::new(DATE, empty)])?));
        }

        let wide = long.groupby(DATE)?.pivot(LOCATION, deaths).mean()?;
        let mut countries: Vec<&str> = wide
            .get_column_names()
            .into_iter()
            .filter(|c| *c != DATE)
            .collect();
        countries.sort_unstable();
        let mut order = vec![col(DATE)];
        order.extend(countries.into_iter().map(col));

        let wide = wide.lazy().select(order).sort(DATE, false).collect()?;
        let table = Self::try_from(DeathsFrame(wide))?;
        debug!(
            "cumulative deaths table: {} dates x {} countries",
            table.dates.len(),
            table.frame.width() - 1
        );
        Ok(table)
    }

    pub(crate) fn from_parts(dates: Vec<NaiveDate>, frame: DataFrame) -> Self {
        Self { dates, frame }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.frame.get_columns().iter().skip(1).map(|s| s.name())
    }

    pub fn contains(&self, country: &str) -> bool {
        self.countries().any(|c| c == country)
    }

    pub fn column(&self, country: &str) -> Option<Vec<Option<f64>>> {
        if !self.contains(country) {
            return None;
        }
        let values = self.frame.column(country).ok()?.f64().ok()?;
        Some(values.into_iter().collect())
    }

    /// 闭区间 [start, end] 内的行，列不变；start > end 时没有行
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, DashError> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(
                col(DATE)
                    .gt_eq(lit(start.to_string()))
                    .and(col(DATE).lt_eq(lit(end.to_string()))),
            )
            .collect()?;
        Self::try_from(DeathsFrame(frame))
    }
}

impl PartialEq for CumulativeDeathsTable {
    fn eq(&self, other: &Self) -> bool {
        self.dates == other.dates && self.frame.frame_equal_missing(&other.frame)
    }
}

/// 一个国家各指标的历史最大值，各列互相独立
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryHighs {
    pub location: String,
    pub new_cases: Option<f64>,
    pub new_deaths: Option<f64>,
    pub total_cases: Option<f64>,
    pub total_cases_per_million: Option<f64>,
    pub total_deaths: Option<f64>,
}

impl CountryHighs {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            new_cases: None,
            new_deaths: None,
            total_cases: None,
            total_cases_per_million: None,
            total_deaths: None,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::NewCases => self.new_cases,
            Metric::NewDeaths => self.new_deaths,
            Metric::TotalCases => self.total_cases,
            Metric::TotalCasesPerMillion => self.total_cases_per_million,
            Metric::TotalDeaths => self.total_deaths,
        }
    }
}

/// 排行榜用的每国最大值表，不含 World，按国家名排序
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryHighsTable {
    rows: Vec<CountryHighs>,
}

impl CountryHighsTable {
    pub fn from_raw(raw: &RawData) -> Result<Self, DashError> {
        Self::from_frame(raw, &DataSet::try_from(raw)?)
    }

    fn from_frame(raw: &RawData, frame: &DataSet) -> Result<Self, DashError> {
        let mut required = vec![Column::Location];
        required.extend(Metric::ALL.iter().map(|m| m.column()));
        raw.require(&required)?;

        // 所有指标都是空的国家不进表
        let has_value = Metric::ALL[1..]
            .iter()
            .fold(col(Metric::ALL[0].name()).is_not_null(), |acc, m| {
                acc.or(col(m.name()).is_not_null())
            });

        let df = frame
            .0
            .clone()
            .lazy()
            .filter(col(LOCATION).neq(lit(WORLD)))
            .groupby(vec![col(LOCATION)])
            .agg(Metric::ALL.iter().map(|m| max_of(m.name())).collect())
            .filter(has_value)
            .sort(LOCATION, false)
            .collect()?;
        Self::try_from(HighsFrame(&df))
    }

    pub fn from_rows(rows: Vec<CountryHighs>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CountryHighs] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 地图上一个国家的一行，坐标没匹配上时为 None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryMapRow {
    pub location: String,
    pub iso_code: Option<String>,
    pub total_cases: f64,
    pub total_deaths: f64,
    pub total_tests_per_thousand: f64,
    pub coordinates: Option<CountryCoordinates>,
}

impl CountryMapRow {
    pub fn value(&self, metric: MapMetric) -> f64 {
        match metric {
            MapMetric::TotalCases => self.total_cases,
            MapMetric::TotalDeaths => self.total_deaths,
            MapMetric::TotalTestsPerThousand => self.total_tests_per_thousand,
        }
    }

    /// 坐标表里的名字，没有就用数据集里的名字
    pub fn display_name(&self) -> &str {
        self.coordinates
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(&self.location)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryMapTable {
    rows: Vec<CountryMapRow>,
}

impl CountryMapTable {
    pub fn from_raw(raw: &RawData, coordinates: &CoordinatesIndex) -> Result<Self, DashError> {
        Self::from_frame(raw, &DataSet::try_from(raw)?, coordinates)
    }

    /// 按国家取最大值后，用 iso_code 左连接坐标表；缺失的数值补 0
    fn from_frame(
        raw: &RawData,
        frame: &DataSet,
        coordinates: &CoordinatesIndex,
    ) -> Result<Self, DashError> {
        raw.require(&[
            Column::Location,
            Column::IsoCode,
            Column::TotalCases,
            Column::TotalDeaths,
            Column::TotalTestsPerThousand,
        ])?;
        let coordinates = DataSet::try_from(coordinates)?;

        let mut aggs = vec![col(ISO_CODE).first().alias(ISO_CODE)];
        aggs.extend(MapMetric::ALL.iter().map(|m| max_of(m.name())));

        let df = frame
            .0
            .clone()
            .lazy()
            .groupby(vec![col(LOCATION)])
            .agg(aggs)
            .left_join(coordinates.0.lazy(), col(ISO_CODE), col(ISO_CODE))
            .with_columns(
                MapMetric::ALL
                    .iter()
                    .map(|m| col(m.name()).fill_none(lit(0.0)))
                    .collect(),
            )
            .sort(LOCATION, false)
            .collect()?;
        let table = Self::try_from(MapFrame(&df))?;

        debug!(
            "country map table: {} rows, {} with coordinates",
            table.rows.len(),
            table.rows.iter().filter(|r| r.coordinates.is_some()).count()
        );
        Ok(table)
    }

    pub fn from_rows(rows: Vec<CountryMapRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CountryMapRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 启动时推导出来的三张表，之后只读
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTables {
    pub deaths: CumulativeDeathsTable,
    pub highs: CountryHighsTable,
    pub map: CountryMapTable,
}

pub fn derive_tables(raw: &RawData, coordinates: &CoordinatesIndex) -> Result<DerivedTables, DashError> {
    let frame = DataSet::try_from(raw)?;
    let tables = DerivedTables {
        deaths: CumulativeDeathsTable::from_frame(raw, &frame)?,
        highs: CountryHighsTable::from_frame(raw, &frame)?,
        map: CountryMapTable::from_frame(raw, &frame, coordinates)?,
    };
    info!(
        "derived tables from {} records: {} countries ranked, {} map rows",
        raw.len(),
        tables.highs.len(),
        tables.map.len()
    );
    Ok(tables)
}

/// groupby 里取最大值并保留原列名
fn max_of(name: &str) -> Expr {
    col(name).max().alias(name)
}
