use serde::Serialize;
use tracing::{info, warn};

use crate::chart::{
    derive_country_detail_chart, derive_country_info, derive_line_chart, derive_map_chart,
    derive_top_n_chart, display_label, ChartSpec, InfoText,
};
use crate::error::DashError;
use crate::model::{Column, CoordinatesIndex, MapMetric, Metric, RawData};
use crate::selection::Selection;
use crate::tables::{
    derive_tables, CountryHighsTable, CountryMapTable, CumulativeDeathsTable, DerivedTables,
};

/// 下拉框的一个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    fn labelled(value: &str) -> Self {
        Self {
            label: display_label(value),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tables {
    Full(DerivedTables),
    /// 只有累计死亡数的旧格式数据，只能画折线图
    DeathsOnly(CumulativeDeathsTable),
}

/// 启动时构建一次、之后只读的上下文，所有图表都从这里推导
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    raw: RawData,
    tables: Tables,
}

impl Dashboard {
    pub fn new(raw: RawData, coordinates: &CoordinatesIndex) -> Result<Self, DashError> {
        let tables = derive_tables(&raw, coordinates)?;
        Ok(Self {
            raw,
            tables: Tables::Full(tables),
        })
    }

    pub fn deaths_only(raw: RawData) -> Result<Self, DashError> {
        let deaths = CumulativeDeathsTable::from_raw(&raw)?;
        info!(
            "dataset only carries {}, rankings and map are unavailable",
            Column::TotalDeaths
        );
        Ok(Self {
            raw,
            tables: Tables::DeathsOnly(deaths),
        })
    }

    pub fn raw(&self) -> &RawData {
        &self.raw
    }

    pub fn deaths(&self) -> &CumulativeDeathsTable {
        match &self.tables {
            Tables::Full(tables) => &tables.deaths,
            Tables::DeathsOnly(deaths) => deaths,
        }
    }

    pub fn highs(&self) -> Result<&CountryHighsTable, DashError> {
        self.full().map(|t| &t.highs)
    }

    pub fn map(&self) -> Result<&CountryMapTable, DashError> {
        self.full().map(|t| &t.map)
    }

    fn full(&self) -> Result<&DerivedTables, DashError> {
        match &self.tables {
            Tables::Full(tables) => Ok(tables),
            Tables::DeathsOnly(_) => {
                // 旧格式数据第一个缺的就是 total_cases
                let missing = self
                    .raw
                    .require(&Column::NUMERIC)
                    .err()
                    .unwrap_or_else(|| DashError::MissingColumn(Column::TotalCases.name().to_string()));
                warn!("{}", missing);
                Err(missing)
            }
        }
    }

    pub fn line_chart(&self, selection: &Selection) -> Result<ChartSpec, DashError> {
        derive_line_chart(
            self.deaths(),
            &selection.countries,
            selection.start,
            selection.end,
        )
    }

    pub fn top_n_chart(&self, selection: &Selection) -> Result<ChartSpec, DashError> {
        derive_top_n_chart(self.highs()?, selection.ranking_metric, selection.top_n)
    }

    pub fn map_chart(&self, selection: &Selection) -> Result<ChartSpec, DashError> {
        Ok(derive_map_chart(self.map()?, selection.map_metric))
    }

    pub fn detail_chart(&self, selection: &Selection) -> Result<ChartSpec, DashError> {
        derive_country_detail_chart(
            &self.raw,
            &selection.country,
            selection.start,
            selection.end,
            selection.mode,
        )
    }

    pub fn country_info(&self, selection: &Selection) -> InfoText {
        derive_country_info(&self.raw, &selection.countries, selection.hovered)
    }

    /// 国家多选框的选项，来自累计死亡表的列
    pub fn country_options(&self) -> Vec<DropdownOption> {
        self.deaths()
            .countries()
            .map(|c| DropdownOption {
                label: c.to_string(),
                value: c.to_string(),
            })
            .collect()
    }

    pub fn metric_options() -> Vec<DropdownOption> {
        Metric::ALL
            .iter()
            .map(|m| DropdownOption::labelled(m.name()))
            .collect()
    }

    pub fn map_metric_options() -> Vec<DropdownOption> {
        MapMetric::ALL
            .iter()
            .map(|m| DropdownOption::labelled(m.name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{DetailMode, INFO_PLACEHOLDER};
    use crate::fixtures::{date, sample_coordinates, sample_raw};
    use crate::model::RawRecord;

    fn dashboard() -> Dashboard {
        Dashboard::new(sample_raw(), &sample_coordinates()).unwrap()
    }

    fn selection() -> Selection {
        Selection::default()
            .with_countries(["Germany", "Spain", "United States"])
            .with_window(date(2020, 3, 1), date(2020, 3, 4))
    }

    #[test]
    fn every_chart_derives_from_one_selection() {
        let dashboard = dashboard();
        let mut selection = selection();
        selection.country = "Spain".into();
        selection.mode = DetailMode::Daily;
        selection.map_metric = MapMetric::TotalDeaths;

        assert_eq!(dashboard.line_chart(&selection).unwrap().series.len(), 2);
        assert_eq!(dashboard.top_n_chart(&selection).unwrap().series[0].len(), 4);
        assert_eq!(dashboard.map_chart(&selection).unwrap().series[0].len(), 3);
        assert_eq!(dashboard.detail_chart(&selection).unwrap().series.len(), 2);
        assert_eq!(dashboard.country_info(&selection).to_string(), INFO_PLACEHOLDER);

        selection.hovered = Some(1);
        assert!(matches!(
            dashboard.country_info(&selection),
            InfoText::Country(ref info) if info.country == "Spain"
        ));
    }

    #[test]
    fn options_use_display_labels() {
        let options = Dashboard::metric_options();
        assert_eq!(options.len(), 5);
        assert_eq!(
            options[3],
            DropdownOption {
                label: "Total cases per million".into(),
                value: "total_cases_per_million".into(),
            }
        );
        assert_eq!(Dashboard::map_metric_options()[2].label, "Total tests per thousand");

        let countries: Vec<_> = dashboard()
            .country_options()
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(countries, vec!["Atlantis", "Germany", "Spain", "United Kingdom", "World"]);
    }

    #[test]
    fn deaths_only_data_still_draws_the_line_chart() {
        let mut record = RawRecord::new("Spain", date(2020, 3, 1));
        record.total_deaths = Some(2.0);
        let raw = RawData::new(vec![record], [Column::Date, Column::Location, Column::TotalDeaths]);

        assert_eq!(
            Dashboard::new(raw.clone(), &CoordinatesIndex::default()),
            Err(DashError::MissingColumn("new_cases".into()))
        );

        let dashboard = Dashboard::deaths_only(raw).unwrap();
        let chart = dashboard.line_chart(&selection()).unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(
            dashboard.top_n_chart(&selection()),
            Err(DashError::MissingColumn("total_cases".into()))
        );
        assert!(dashboard.map_chart(&selection()).is_err());
    }
}
