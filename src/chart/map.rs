use tracing::debug;

use super::{display_label, AxisValue, ChartKind, ChartSpec, Marker, Trace};
use crate::model::MapMetric;
use crate::tables::CountryMapTable;

/// 加在标记大小上的下限，值为 0 的国家也能看到
pub const MARKER_FLOOR: f64 = 5.0;

pub fn marker_size(value: f64, metric: MapMetric) -> f64 {
    value / metric.scale() + MARKER_FLOOR
}

/// 世界地图散点：x 为经度，y 为纬度。没有坐标的行不画
pub fn derive_map_chart(table: &CountryMapTable, metric: MapMetric) -> ChartSpec {
    let label = display_label(metric.name());
    let plotted: Vec<_> = table
        .rows()
        .iter()
        .filter_map(|row| row.coordinates.as_ref().map(|c| (row, c)))
        .collect();
    debug!(
        "map chart for {}: {} of {} rows plotted",
        metric,
        plotted.len(),
        table.len()
    );

    let mut x = Vec::with_capacity(plotted.len());
    let mut y = Vec::with_capacity(plotted.len());
    let mut sizes = Vec::with_capacity(plotted.len());
    let mut text = Vec::with_capacity(plotted.len());
    for (row, coordinates) in plotted {
        let value = row.value(metric);
        x.push(AxisValue::Number(coordinates.longitude));
        y.push(Some(coordinates.latitude));
        sizes.push(marker_size(value, metric));
        text.push(format!("{}: {}", row.display_name(), value));
    }

    let mut trace = Trace::new(label.as_str(), x, y);
    trace.marker = Some(Marker {
        sizes,
        color: metric.color().to_string(),
        text,
    });

    ChartSpec::new(
        ChartKind::ScatterGeo,
        format!("{} by country", label),
        "longitude",
        "latitude",
    )
    .with_series(vec![trace])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_coordinates, sample_raw};

    #[test]
    fn marker_size_has_an_additive_floor() {
        assert_eq!(marker_size(0.0, MapMetric::TotalDeaths), 5.0);
        assert_eq!(marker_size(1000.0, MapMetric::TotalDeaths), 10.0);
        assert_eq!(marker_size(0.0, MapMetric::TotalCases), 5.0);
        assert_eq!(marker_size(20_000.0, MapMetric::TotalCases), 7.0);
        assert_eq!(marker_size(25.0, MapMetric::TotalTestsPerThousand), 7.5);
    }

    #[test]
    fn rows_without_coordinates_are_left_out() {
        let table = CountryMapTable::from_raw(&sample_raw(), &sample_coordinates()).unwrap();
        let chart = derive_map_chart(&table, MapMetric::TotalDeaths);

        assert_eq!(chart.kind, ChartKind::ScatterGeo);
        assert_eq!(chart.title, "Total deaths by country");
        assert_eq!(chart.series.len(), 1);

        let trace = &chart.series[0];
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.x[0], AxisValue::Number(10.45));
        assert_eq!(trace.y[0], Some(51.16));

        let marker = trace.marker.as_ref().unwrap();
        assert_eq!(marker.color, "crimson");
        // Germany 7, Spain 30, UK 2
        let expected = [5.035, 5.15, 5.01];
        assert_eq!(marker.sizes.len(), expected.len());
        for (size, want) in marker.sizes.iter().zip(expected) {
            assert!((size - want).abs() < 1e-9, "{} != {}", size, want);
        }
        assert_eq!(marker.text[2], "UK: 2");
    }

    #[test]
    fn zero_filled_values_still_get_the_floor() {
        let table = CountryMapTable::from_raw(&sample_raw(), &sample_coordinates()).unwrap();
        let chart = derive_map_chart(&table, MapMetric::TotalTestsPerThousand);
        let marker = chart.series[0].marker.as_ref().unwrap();
        // Spain 没有检测数据，补 0
        assert_eq!(marker.sizes[1], MARKER_FLOOR);
    }
}
