use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::DashError;
use crate::load::{LEGACY_CODE, LEGACY_DATE, LEGACY_DEATHS, LEGACY_ENTITY};
use crate::model::{
    Column, CoordinatesIndex, CountryCoordinates, MapMetric, Metric, RawData, RawRecord,
};
use crate::tables::{
    CountryHighs, CountryHighsTable, CountryMapRow, CountryMapTable, CumulativeDeathsTable,
};
use crate::DataSet;

const OWID_DATE_FORMAT: &str = "%Y-%m-%d";
const LEGACY_DATE_FORMAT: &str = "%b %d, %Y";

// 因为 Rust trait 的孤儿规则，我们如果要想对已有的类型实现已有的 trait，
// 需要简单包装一下

pub struct OwidFrame<'a>(pub(crate) &'a DataFrame);
pub struct LegacyFrame<'a>(pub(crate) &'a DataFrame);
pub struct CoordinatesFrame<'a>(pub(crate) &'a DataFrame);

/// pivot 之后的宽表：date 列加每个国家一列
pub struct DeathsFrame(pub(crate) DataFrame);
/// groupby 之后每个国家一行
pub struct HighsFrame<'a>(pub(crate) &'a DataFrame);
/// groupby 再 left join 坐标表之后的结果
pub struct MapFrame<'a>(pub(crate) &'a DataFrame);

impl<'a> TryFrom<OwidFrame<'a>> for RawData {
    type Error = anyhow::Error;

    fn try_from(frame: OwidFrame<'a>) -> Result<Self, Self::Error> {
        let df = frame.0;
        let dates = text_column(df, Column::Date.name())?;
        let locations = text_column(df, Column::Location.name())?;
        let iso_codes = optional(df, Column::IsoCode.name(), text_column)?;

        let mut columns = vec![Column::Date, Column::Location];
        if iso_codes.is_some() {
            columns.push(Column::IsoCode);
        }
        let mut numeric = Vec::new();
        for column in Column::NUMERIC {
            if let Some(values) = optional(df, column.name(), numeric_column)? {
                numeric.push((column, values));
                columns.push(column);
            }
        }

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let (location, date) = match (&locations[row], &dates[row]) {
                (Some(location), Some(date)) => (location, date),
                _ => continue,
            };
            let mut record = RawRecord::new(location.as_str(), parse_date(date, OWID_DATE_FORMAT)?);
            record.iso_code = iso_codes.as_ref().and_then(|codes| codes[row].clone());
            for (column, values) in &numeric {
                record.set_value(*column, values[row]);
            }
            records.push(record);
        }

        Ok(RawData::new(records, columns))
    }
}

impl<'a> TryFrom<LegacyFrame<'a>> for RawData {
    type Error = anyhow::Error;

    fn try_from(frame: LegacyFrame<'a>) -> Result<Self, Self::Error> {
        let df = frame.0;
        let dates = text_column(df, LEGACY_DATE)?;
        let locations = text_column(df, LEGACY_ENTITY)?;
        let deaths = numeric_column(df, LEGACY_DEATHS)?;
        let iso_codes = optional(df, LEGACY_CODE, text_column)?;

        let mut columns = vec![Column::Date, Column::Location, Column::TotalDeaths];
        if iso_codes.is_some() {
            columns.push(Column::IsoCode);
        }

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let (location, date) = match (&locations[row], &dates[row]) {
                (Some(location), Some(date)) => (location, date),
                _ => continue,
            };
            let mut record = RawRecord::new(location.as_str(), parse_date(date, LEGACY_DATE_FORMAT)?);
            record.iso_code = iso_codes.as_ref().and_then(|codes| codes[row].clone());
            record.total_deaths = deaths[row];
            records.push(record);
        }

        Ok(RawData::new(records, columns))
    }
}

impl<'a> TryFrom<CoordinatesFrame<'a>> for CoordinatesIndex {
    type Error = anyhow::Error;

    fn try_from(frame: CoordinatesFrame<'a>) -> Result<Self, Self::Error> {
        let df = frame.0;
        let iso_codes = text_column(df, "iso_code")?;
        let names = text_column(df, "name")?;
        let latitudes = numeric_column(df, "latitude")?;
        let longitudes = numeric_column(df, "longitude")?;

        Ok((0..df.height())
            .filter_map(|row| {
                let iso = iso_codes[row].clone()?;
                let coordinates = CountryCoordinates {
                    name: names[row].clone().unwrap_or_else(|| iso.clone()),
                    latitude: latitudes[row]?,
                    longitude: longitudes[row]?,
                };
                Some((iso, coordinates))
            })
            .collect())
    }
}

/// 把记录还原成统一的长表，日期统一成 YYYY-MM-DD 文本，只带数据集里有的列
impl TryFrom<&RawData> for DataSet {
    type Error = DashError;

    fn try_from(raw: &RawData) -> Result<Self, Self::Error> {
        let records = raw.records();
        let locations: Vec<&str> = records.iter().map(|r| r.location.as_str()).collect();
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        let dates: Vec<&str> = dates.iter().map(String::as_str).collect();

        let mut columns = vec![
            Series::new(Column::Location.name(), locations.as_slice()),
            Series::new(Column::Date.name(), dates.as_slice()),
        ];
        if raw.has_column(Column::IsoCode) {
            let iso_codes: Vec<Option<&str>> = records.iter().map(|r| r.iso_code.as_deref()).collect();
            columns.push(Series::new(Column::IsoCode.name(), iso_codes.as_slice()));
        }
        for column in Column::NUMERIC {
            if raw.has_column(column) {
                let values: Vec<Option<f64>> = records.iter().map(|r| r.value(column)).collect();
                columns.push(Series::new(column.name(), values.as_slice()));
            }
        }
        Ok(DataSet(DataFrame::new(columns)?))
    }
}

impl TryFrom<&CoordinatesIndex> for DataSet {
    type Error = DashError;

    fn try_from(index: &CoordinatesIndex) -> Result<Self, Self::Error> {
        let mut iso_codes = Vec::with_capacity(index.len());
        let mut names = Vec::with_capacity(index.len());
        let mut latitudes = Vec::with_capacity(index.len());
        let mut longitudes = Vec::with_capacity(index.len());
        for (iso, c) in index.iter() {
            iso_codes.push(iso);
            names.push(c.name.as_str());
            latitudes.push(c.latitude);
            longitudes.push(c.longitude);
        }

        Ok(DataSet(DataFrame::new(vec![
            Series::new(Column::IsoCode.name(), iso_codes.as_slice()),
            Series::new("name", names.as_slice()),
            Series::new("latitude", latitudes.as_slice()),
            Series::new("longitude", longitudes.as_slice()),
        ])?))
    }
}

impl TryFrom<DeathsFrame> for CumulativeDeathsTable {
    type Error = DashError;

    fn try_from(frame: DeathsFrame) -> Result<Self, Self::Error> {
        let dates = text_column(&frame.0, Column::Date.name())?
            .into_iter()
            .map(|d| {
                let d = d.ok_or_else(|| DashError::InvalidDate(String::new()))?;
                parse_date(&d, OWID_DATE_FORMAT)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CumulativeDeathsTable::from_parts(dates, frame.0))
    }
}

impl<'a> TryFrom<HighsFrame<'a>> for CountryHighsTable {
    type Error = DashError;

    fn try_from(frame: HighsFrame<'a>) -> Result<Self, Self::Error> {
        let df = frame.0;
        let locations = text_column(df, Column::Location.name())?;
        let [new_cases, new_deaths, total_cases, total_cases_per_million, total_deaths] =
            Metric::ALL.map(|m| numeric_column(df, m.name()));
        let (new_cases, new_deaths, total_cases) = (new_cases?, new_deaths?, total_cases?);
        let (total_cases_per_million, total_deaths) = (total_cases_per_million?, total_deaths?);

        let rows = (0..df.height())
            .filter_map(|row| {
                Some(CountryHighs {
                    location: locations[row].clone()?,
                    new_cases: new_cases[row],
                    new_deaths: new_deaths[row],
                    total_cases: total_cases[row],
                    total_cases_per_million: total_cases_per_million[row],
                    total_deaths: total_deaths[row],
                })
            })
            .collect();
        Ok(CountryHighsTable::from_rows(rows))
    }
}

impl<'a> TryFrom<MapFrame<'a>> for CountryMapTable {
    type Error = DashError;

    fn try_from(frame: MapFrame<'a>) -> Result<Self, Self::Error> {
        let df = frame.0;
        let locations = text_column(df, Column::Location.name())?;
        let iso_codes = text_column(df, Column::IsoCode.name())?;
        let [total_cases, total_deaths, tests] = MapMetric::ALL.map(|m| numeric_column(df, m.name()));
        let (total_cases, total_deaths, tests) = (total_cases?, total_deaths?, tests?);
        let names = text_column(df, "name")?;
        let latitudes = numeric_column(df, "latitude")?;
        let longitudes = numeric_column(df, "longitude")?;

        let rows = (0..df.height())
            .filter_map(|row| {
                let location = locations[row].clone()?;
                let coordinates = match (latitudes[row], longitudes[row]) {
                    (Some(latitude), Some(longitude)) => Some(CountryCoordinates {
                        name: names[row].clone().unwrap_or_else(|| location.clone()),
                        latitude,
                        longitude,
                    }),
                    _ => None,
                };
                Some(CountryMapRow {
                    location,
                    iso_code: iso_codes[row].clone(),
                    total_cases: total_cases[row].unwrap_or(0.0),
                    total_deaths: total_deaths[row].unwrap_or(0.0),
                    total_tests_per_thousand: tests[row].unwrap_or(0.0),
                    coordinates,
                })
            })
            .collect();
        Ok(CountryMapTable::from_rows(rows))
    }
}

impl TryFrom<&CumulativeDeathsTable> for DataSet {
    type Error = DashError;

    fn try_from(table: &CumulativeDeathsTable) -> Result<Self, Self::Error> {
        Ok(DataSet(table.frame().clone()))
    }
}

impl TryFrom<&CountryHighsTable> for DataSet {
    type Error = DashError;

    fn try_from(table: &CountryHighsTable) -> Result<Self, Self::Error> {
        let locations: Vec<&str> = table.rows().iter().map(|r| r.location.as_str()).collect();
        let mut columns = vec![Series::new(Column::Location.name(), locations.as_slice())];
        for metric in Metric::ALL {
            let values: Vec<Option<f64>> = table.rows().iter().map(|r| r.value(metric)).collect();
            columns.push(Series::new(metric.name(), values.as_slice()));
        }
        Ok(DataSet(DataFrame::new(columns)?))
    }
}

impl TryFrom<&CountryMapTable> for DataSet {
    type Error = DashError;

    fn try_from(table: &CountryMapTable) -> Result<Self, Self::Error> {
        let rows = table.rows();
        let locations: Vec<&str> = rows.iter().map(|r| r.location.as_str()).collect();
        let iso_codes: Vec<Option<&str>> = rows.iter().map(|r| r.iso_code.as_deref()).collect();
        let total_cases: Vec<f64> = rows.iter().map(|r| r.total_cases).collect();
        let total_deaths: Vec<f64> = rows.iter().map(|r| r.total_deaths).collect();
        let tests: Vec<f64> = rows.iter().map(|r| r.total_tests_per_thousand).collect();
        let latitudes: Vec<Option<f64>> = rows
            .iter()
            .map(|r| r.coordinates.as_ref().map(|c| c.latitude))
            .collect();
        let longitudes: Vec<Option<f64>> = rows
            .iter()
            .map(|r| r.coordinates.as_ref().map(|c| c.longitude))
            .collect();
        let names: Vec<&str> = rows.iter().map(|r| r.display_name()).collect();

        let columns = vec![
            Series::new("location", locations.as_slice()),
            Series::new("iso_code", iso_codes.as_slice()),
            Series::new("total_cases", total_cases.as_slice()),
            Series::new("total_deaths", total_deaths.as_slice()),
            Series::new("total_tests_per_thousand", tests.as_slice()),
            Series::new("latitude", latitudes.as_slice()),
            Series::new("longitude", longitudes.as_slice()),
            Series::new("name", names.as_slice()),
        ];
        Ok(DataSet(DataFrame::new(columns)?))
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| *c == name)
}

fn optional<T>(
    df: &DataFrame,
    name: &str,
    read: fn(&DataFrame, &str) -> Result<Vec<T>, DashError>,
) -> Result<Option<Vec<T>>, DashError> {
    if has_column(df, name) {
        Ok(Some(read(df, name)?))
    } else {
        Ok(None)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, DashError> {
    df.column(name)
        .map_err(|_| DashError::MissingColumn(name.to_string()))
}

/// 文本列，空字符串当作缺失
pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DashError> {
    let series = column(df, name)?;
    match series.dtype() {
        DataType::Utf8 => Ok(series
            .utf8()?
            .into_iter()
            .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
            .collect()),
        other => Err(DashError::Frame(format!(
            "column `{}` is {:?}, expected text",
            name, other
        ))),
    }
}

/// 数值列统一成 f64；空值、NaN、无穷大和解析不了的文本都当作缺失
pub(crate) fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DashError> {
    let series = column(df, name)?;
    let values: Vec<Option<f64>> = match series.dtype() {
        DataType::Float64 => series.f64()?.into_iter().collect(),
        DataType::Int64 => series.i64()?.into_iter().map(|v| v.map(|v| v as f64)).collect(),
        DataType::Utf8 => series
            .utf8()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect(),
        other => {
            return Err(DashError::Frame(format!(
                "column `{}` is {:?}, expected numbers",
                name, other
            )))
        }
    };
    Ok(values
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite()))
        .collect())
}

fn parse_date(value: &str, format: &str) -> Result<NaiveDate, DashError> {
    NaiveDate::parse_from_str(value.trim(), format)
        .map_err(|_| DashError::InvalidDate(value.to_string()))
}
