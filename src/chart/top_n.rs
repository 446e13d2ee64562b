use polars::prelude::{col, IntoLazy};

use super::{display_label, AxisValue, ChartKind, ChartSpec, Hints, Trace};
use crate::convert::{numeric_column, text_column};
use crate::error::DashError;
use crate::model::{Column, Metric};
use crate::tables::{CountryHighs, CountryHighsTable};
use crate::DataSet;

pub const TOP_N_MIN: usize = 1;
pub const TOP_N_MAX: usize = 10;

/// 按指标取前 n 个国家，降序；值相同时按国家名排序。
/// 没有该指标数值的国家不参与排名
pub fn top_n(
    table: &CountryHighsTable,
    metric: Metric,
    n: usize,
) -> Result<Vec<(&CountryHighs, f64)>, DashError> {
    if !(TOP_N_MIN..=TOP_N_MAX).contains(&n) {
        return Err(DashError::InvalidRange {
            name: "top-N count",
            value: i64::try_from(n).unwrap_or(i64::MAX),
            min: TOP_N_MIN as i64,
            max: TOP_N_MAX as i64,
        });
    }

    let location = Column::Location.name();
    let ranked = DataSet::try_from(table)?
        .0
        .lazy()
        .filter(col(metric.name()).is_not_null())
        .sort_by_exprs(vec![col(metric.name()), col(location)], vec![true, false])
        .slice(0, n)
        .collect()?;

    let locations = text_column(&ranked, location)?;
    let values = numeric_column(&ranked, metric.name())?;
    Ok(locations
        .into_iter()
        .zip(values)
        .filter_map(|(name, value)| {
            let name = name?;
            let row = table.rows().iter().find(|r| r.location == name)?;
            Some((row, value?))
        })
        .collect())
}

pub fn derive_top_n_chart(
    table: &CountryHighsTable,
    metric: Metric,
    n: usize,
) -> Result<ChartSpec, DashError> {
    let ranked = top_n(table, metric, n)?;
    let label = display_label(metric.name());

    let (x, y): (Vec<AxisValue>, Vec<Option<f64>>) = ranked
        .into_iter()
        .map(|(row, value)| (AxisValue::Category(row.location.clone()), Some(value)))
        .unzip();

    Ok(ChartSpec::new(
        ChartKind::Bar,
        format!("Top {} countries with highest number of {}", n, label),
        "countries",
        label.as_str(),
    )
    .with_series(vec![Trace::new(label.as_str(), x, y)])
    .with_hints(Hints {
        color_scale: Some("Burg"),
        ..Hints::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_raw;
    use crate::load::detect_content;

    fn highs(location: &str, total_deaths: f64) -> CountryHighs {
        let mut row = CountryHighs::new(location);
        row.total_deaths = Some(total_deaths);
        row
    }

    fn names(ranked: &[(&CountryHighs, f64)]) -> Vec<String> {
        ranked.iter().map(|(r, _)| r.location.clone()).collect()
    }

    #[test]
    fn picks_largest_values_descending() {
        let table = CountryHighsTable::from_rows(vec![
            highs("A", 10.0),
            highs("B", 30.0),
            highs("C", 20.0),
        ]);
        let ranked = top_n(&table, Metric::TotalDeaths, 2).unwrap();
        assert_eq!(names(&ranked), vec!["B", "C"]);
    }

    #[test]
    fn ties_break_by_country_name() {
        let table = CountryHighsTable::from_rows(vec![
            highs("Zed", 5.0),
            highs("Alpha", 7.0),
            highs("Mid", 5.0),
            highs("Beta", 5.0),
        ]);
        let ranked = top_n(&table, Metric::TotalDeaths, 3).unwrap();
        assert_eq!(names(&ranked), vec!["Alpha", "Beta", "Mid"]);
    }

    #[test]
    fn returns_at_most_table_size() {
        let table = CountryHighsTable::from_raw(&sample_raw()).unwrap();
        let ranked = top_n(&table, Metric::TotalCasesPerMillion, 10).unwrap();
        assert_eq!(names(&ranked), vec!["Atlantis", "Spain", "Germany", "United Kingdom"]);
    }

    #[test]
    fn countries_without_a_value_are_not_ranked() {
        let mut empty = CountryHighs::new("Nowhere");
        empty.new_cases = Some(1.0);
        let table = CountryHighsTable::from_rows(vec![empty, highs("A", 1.0)]);
        let ranked = top_n(&table, Metric::TotalDeaths, 5).unwrap();
        assert_eq!(names(&ranked), vec!["A"]);
    }

    #[test]
    fn n_outside_slider_range_is_rejected() {
        let table = CountryHighsTable::from_rows(vec![highs("A", 1.0)]);
        for n in [0, 11] {
            assert!(matches!(
                top_n(&table, Metric::TotalDeaths, n),
                Err(DashError::InvalidRange { .. })
            ));
        }
    }

    #[test]
    fn huge_n_is_reported_without_wrapping() {
        let table = CountryHighsTable::from_rows(vec![highs("A", 1.0)]);
        let err = top_n(&table, Metric::TotalDeaths, usize::MAX).unwrap_err();
        assert!(matches!(err, DashError::InvalidRange { value, .. } if value == i64::MAX));
        assert_eq!(
            err.to_string(),
            format!("top-N count must be within [1, 10], got {}", i64::MAX)
        );
    }

    #[test]
    fn nan_cells_from_the_dataset_are_not_ranked() {
        let csv = "\
iso_code,location,date,total_cases,new_cases,total_deaths,new_deaths,total_cases_per_million
AAA,A,2020-03-01,1,1,10,1,0.1
BBB,B,2020-03-01,1,1,NaN,1,0.1
";
        let raw = detect_content(csv.to_string()).unwrap().load().unwrap();
        let table = CountryHighsTable::from_raw(&raw).unwrap();

        let ranked = top_n(&table, Metric::TotalDeaths, 1).unwrap();
        assert_eq!(names(&ranked), vec!["A"]);
        assert_eq!(ranked[0].1, 10.0);
        assert_eq!(names(&top_n(&table, Metric::TotalDeaths, 5).unwrap()), vec!["A"]);
    }

    #[test]
    fn chart_uses_display_labels() {
        let table = CountryHighsTable::from_raw(&sample_raw()).unwrap();
        let chart = derive_top_n_chart(&table, Metric::TotalDeaths, 2).unwrap();

        assert_eq!(chart.title, "Top 2 countries with highest number of Total deaths");
        assert_eq!(chart.x_axis_label, "countries");
        assert_eq!(chart.y_axis_label, "Total deaths");
        assert_eq!(chart.series.len(), 1);
        assert_eq!(
            chart.series[0].x,
            vec![
                AxisValue::Category("Spain".into()),
                AxisValue::Category("Germany".into())
            ]
        );
        assert_eq!(chart.series[0].y, vec![Some(30.0), Some(7.0)]);
        assert_eq!(chart.hints.color_scale, Some("Burg"));
    }
}
