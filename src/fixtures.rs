//! 测试用的小数据集

use chrono::NaiveDate;

use crate::load::detect_content;
use crate::model::{CoordinatesIndex, CountryCoordinates, RawData};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const SAMPLE_CSV: &str = "\
iso_code,location,date,total_cases,new_cases,total_deaths,new_deaths,total_cases_per_million,total_tests_per_thousand,population,population_density,gdp_per_capita,hospital_beds_per_thousand
DEU,Germany,2020-03-01,100,100,1,1,1.2,0.5,83783945,237.016,45229.245,8.0
DEU,Germany,2020-03-02,150,50,3,2,1.8,0.7,83783945,237.016,45229.245,8.0
DEU,Germany,2020-03-03,240,90,3,0,2.9,,83783945,237.016,45229.245,8.0
DEU,Germany,2020-03-04,300,60,7,4,3.6,1.1,83783945,237.016,45229.245,8.0
ESP,Spain,2020-03-01,80,80,2,2,1.7,,46754783,93.105,34272.36,2.97
ESP,Spain,2020-03-02,200,120,9,7,4.3,,46754783,93.105,34272.36,2.97
ESP,Spain,2020-03-04,500,300,30,21,10.7,,46754783,93.105,34272.36,2.97
GBR,United Kingdom,2020-03-01,30,30,,,0.4,,67886004,272.898,39753.244,2.54
GBR,United Kingdom,2020-03-02,40,10,1,1,0.6,2.0,67886004,272.898,39753.244,2.54
GBR,United Kingdom,2020-03-03,50,10,1,0,0.7,,67886004,272.898,39753.244,2.54
GBR,United Kingdom,2020-03-04,90,40,2,1,1.3,2.5,67886004,272.898,39753.244,2.54
OWID_WRL,World,2020-03-04,90000,2000,3000,100,11.5,,,,,
ATL,Atlantis,2020-03-04,5,5,0,0,50.0,,,,,
";

/// 四个国家加一行 World，2020-03-01 到 2020-03-04，走真实的加载流程
pub fn sample_raw() -> RawData {
    detect_content(SAMPLE_CSV.to_string())
        .unwrap()
        .load()
        .unwrap()
}

pub fn sample_coordinates() -> CoordinatesIndex {
    [
        ("DEU", "Germany", 51.16, 10.45),
        ("ESP", "Spain", 40.46, -3.75),
        ("GBR", "UK", 55.38, -3.44),
    ]
    .into_iter()
    .map(|(iso, name, latitude, longitude)| {
        (
            iso.to_string(),
            CountryCoordinates {
                name: name.to_string(),
                latitude,
                longitude,
            },
        )
    })
    .collect()
}

pub fn countries(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
