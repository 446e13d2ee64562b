use chrono::NaiveDate;
use tracing::warn;

use super::{date_axis, ChartKind, ChartSpec, Hints, Trace};
use crate::error::DashError;
use crate::tables::CumulativeDeathsTable;

pub const LINE_TITLE: &str = "Confirmed Covid 19 deaths by country";

/// 所选国家在 [start, end] 内的累计死亡折线，每个国家一条，顺序与传入顺序一致。
/// 表里没有的国家跳过并记一条警告；start > end 时返回空图
pub fn derive_line_chart(
    table: &CumulativeDeathsTable,
    countries: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ChartSpec, DashError> {
    let series = if start > end {
        Vec::new()
    } else {
        let window = table.window(start, end)?;
        let x = date_axis(window.dates());
        countries
            .iter()
            .filter_map(|country| match window.column(country) {
                Some(y) => Some(Trace::new(country.as_str(), x.clone(), y)),
                None => {
                    warn!("skipping unknown country in line chart: {}", country);
                    None
                }
            })
            .collect()
    };

    Ok(ChartSpec::new(ChartKind::Line, LINE_TITLE, "date", "confirmed deaths")
        .with_series(series)
        .with_hints(Hints {
            hover_mode: Some("x unified"),
            legend_orientation: Some("h"),
            ..Hints::default()
        }))
}
