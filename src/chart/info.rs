use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::LookupError;
use crate::model::{Column, RawData};

/// 还没有悬停或点击时显示的文字
pub const INFO_PLACEHOLDER: &str = "Hover over or click on a country to see more information";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryInfo {
    pub country: String,
    pub population: u64,
    pub population_density: f64,
    pub gdp_per_capita: f64,
    pub hospital_beds_per_thousand: f64,
}

impl fmt::Display for CountryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Country: {}", self.country)?;
        writeln!(f, "Population: {}", group_thousands(self.population))?;
        writeln!(f, "Population density: {:.2}", self.population_density)?;
        writeln!(f, "GDP per capita: {:.2}", self.gdp_per_capita)?;
        write!(f, "Hospital beds per 1000: {:.2}", self.hospital_beds_per_thousand)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "info", rename_all = "snake_case")]
pub enum InfoText {
    Country(CountryInfo),
    Placeholder,
}

impl fmt::Display for InfoText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoText::Country(info) => fmt::Display::fmt(info, f),
            InfoText::Placeholder => f.write_str(INFO_PLACEHOLDER),
        }
    }
}

/// 取国家的人口、人口密度、人均 GDP 和每千人床位数，每项取最近一天有值的记录
pub fn lookup_country_info(raw: &RawData, country: &str) -> Result<CountryInfo, LookupError> {
    if !raw.contains_country(country) {
        return Err(LookupError::UnknownCountry(country.to_string()));
    }

    let latest = |column: Column| -> Result<f64, LookupError> {
        raw.for_country(country)
            .filter_map(|r| r.value(column).map(|v| (r.date, v)))
            .max_by_key(|(date, _)| *date)
            .map(|(_, v)| v)
            .ok_or_else(|| LookupError::MissingField {
                country: country.to_string(),
                field: column.name(),
            })
    };

    Ok(CountryInfo {
        country: country.to_string(),
        population: latest(Column::Population)?.round().max(0.0) as u64,
        population_density: round2(latest(Column::PopulationDensity)?),
        gdp_per_capita: round2(latest(Column::GdpPerCapita)?),
        hospital_beds_per_thousand: round2(latest(Column::HospitalBedsPerThousand)?),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 悬停/点击信息面板。没有选中、下标越界或者查询失败都返回占位文字，不会报错
pub fn derive_country_info(raw: &RawData, countries: &[String], selected: Option<usize>) -> InfoText {
    let country = match selected.and_then(|i| countries.get(i)) {
        Some(country) => country,
        None => return InfoText::Placeholder,
    };

    match lookup_country_info(raw, country) {
        Ok(info) => InfoText::Country(info),
        Err(e) => {
            debug!("country info lookup failed: {}", e);
            InfoText::Placeholder
        }
    }
}

/// 67886004 → "67,886,004"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
