use std::io::Cursor;

use anyhow::Result;
use polars::prelude::{CsvReader, DataFrame, SerReader};
use tracing::info;

use crate::convert::{CoordinatesFrame, LegacyFrame, OwidFrame};
use crate::error::DashError;
use crate::model::{CoordinatesIndex, RawData};

/// 旧版只有累计死亡数的导出文件里的列名
pub const LEGACY_ENTITY: &str = "Entity";
pub const LEGACY_CODE: &str = "Code";
pub const LEGACY_DATE: &str = "Date";
pub const LEGACY_DEATHS: &str = "Total confirmed deaths due to COVID-19 (deaths)";

/// 数据集的两种布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// OWID 的长表：每个国家每天一行
    Owid,
    /// 早期版本用的 grapher 导出，只有累计死亡数
    LegacyDeaths,
}

#[derive(Debug)]
pub struct Loader {
    layout: Layout,
    data: String,
}

/// 根据表头判断数据布局
pub fn detect_content(data: String) -> Result<Loader> {
    let header: Vec<String> = data
        .lines()
        .next()
        .unwrap_or_default()
        .split(',')
        .map(|h| h.trim().trim_matches('"').to_string())
        .collect();
    let has = |name: &str| header.iter().any(|h| h == name);

    let layout = if has("date") && has("location") {
        Layout::Owid
    } else if has(LEGACY_ENTITY) && has(LEGACY_DATE) {
        Layout::LegacyDeaths
    } else if has("location") {
        return Err(DashError::MissingColumn("date".to_string()).into());
    } else {
        return Err(DashError::MissingColumn("location".to_string()).into());
    };

    info!("detected {:?} layout with {} columns", layout, header.len());
    Ok(Loader { layout, data })
}

impl Loader {
    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn load(self) -> Result<RawData> {
        let df = read_frame(self.data)?;
        let raw = match self.layout {
            Layout::Owid => RawData::try_from(OwidFrame(&df))?,
            Layout::LegacyDeaths => RawData::try_from(LegacyFrame(&df))?,
        };
        info!("loaded {} records", raw.len());
        Ok(raw)
    }
}

/// 坐标参考表：iso_code,name,latitude,longitude
pub fn load_coordinates(data: String) -> Result<CoordinatesIndex> {
    let df = read_frame(data)?;
    let index = CoordinatesIndex::try_from(CoordinatesFrame(&df))?;
    info!("loaded coordinates for {} countries", index.len());
    Ok(index)
}

fn read_frame(data: String) -> Result<DataFrame> {
    // 全表推断类型，稀疏的列前几行可能都是空的
    Ok(CsvReader::new(Cursor::new(data))
        .infer_schema(None)
        .finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use chrono::NaiveDate;

    const OWID: &str = "\
iso_code,location,date,total_cases,new_cases,total_deaths,new_deaths,total_cases_per_million,total_tests_per_thousand,population,population_density,gdp_per_capita,hospital_beds_per_thousand
ESP,Spain,2020-03-01,80,80,2,2,1.7,,46754783,93.105,34272.36,2.97
ESP,Spain,2020-03-02,200,120,9,7,4.3,,46754783,93.105,34272.36,2.97
GBR,United Kingdom,2020-03-01,30,30,,,0.4,1.5,67886004,272.898,39753.244,2.54
";

    const LEGACY: &str = "\
Entity,Code,Date,Total confirmed deaths due to COVID-19 (deaths)
Spain,ESP,\"Mar 1, 2020\",2
Spain,ESP,\"Mar 10, 2020\",35
";

    #[test]
    fn detects_both_layouts() {
        assert_eq!(detect_content(OWID.to_string()).unwrap().layout(), Layout::Owid);
        assert_eq!(
            detect_content(LEGACY.to_string()).unwrap().layout(),
            Layout::LegacyDeaths
        );
    }

    #[test]
    fn unknown_layout_reports_missing_column() {
        let err = detect_content("a,b\n1,2\n".to_string()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DashError>(),
            Some(&DashError::MissingColumn("location".into()))
        );

        let err = detect_content("location,day\nSpain,1\n".to_string()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DashError>(),
            Some(&DashError::MissingColumn("date".into()))
        );
    }

    #[test]
    fn loads_owid_records() {
        let raw = detect_content(OWID.to_string()).unwrap().load().unwrap();
        assert_eq!(raw.len(), 3);
        assert!(raw.has_column(Column::TotalTestsPerThousand));

        let uk = &raw.records()[2];
        assert_eq!(uk.location, "United Kingdom");
        assert_eq!(uk.iso_code.as_deref(), Some("GBR"));
        assert_eq!(uk.date, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
        assert_eq!(uk.total_cases, Some(30.0));
        assert_eq!(uk.total_deaths, None);
        assert_eq!(uk.total_tests_per_thousand, Some(1.5));
        assert_eq!(uk.population, Some(67_886_004.0));

        let spain = &raw.records()[1];
        assert_eq!(spain.total_cases_per_million, Some(4.3));
        assert_eq!(spain.total_tests_per_thousand, None);
    }

    #[test]
    fn nan_cells_load_as_missing() {
        let csv = "location,date,total_deaths\nA,2020-03-01,10\nB,2020-03-01,NaN\n";
        let raw = detect_content(csv.to_string()).unwrap().load().unwrap();
        assert_eq!(raw.records()[0].total_deaths, Some(10.0));
        assert_eq!(raw.records()[1].total_deaths, None);
    }

    #[test]
    fn loads_legacy_deaths_only_records() {
        let raw = detect_content(LEGACY.to_string()).unwrap().load().unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw.has_column(Column::TotalDeaths));
        assert!(!raw.has_column(Column::TotalCases));

        let second = &raw.records()[1];
        assert_eq!(second.location, "Spain");
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2020, 3, 10).unwrap());
        assert_eq!(second.total_deaths, Some(35.0));
    }

    #[test]
    fn loads_coordinates() {
        let index = load_coordinates(
            "iso_code,name,latitude,longitude\nESP,Spain,40.46,-3.75\nXXX,Nowhere,,\n".to_string(),
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("ESP").unwrap().longitude, -3.75);
    }
}
