use std::path::Path;

use itertools::Itertools;
use plotters::prelude::*;

use crate::prelude::*;

/// One labeled line of a chart. All lines of a chart share the X axis.
pub struct Line<'a> {
    pub label: &'a str,
    pub values: Vec<f64>,
}

/// Renders a labeled line chart to an SVG file.
pub fn render_line_chart(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    x: &[f64],
    lines: &[Line<'_>],
) -> Result {
    ensure!(!x.is_empty(), "nothing to plot for `{title}`");

    let (x_range, y_range) = axis_ranges(x, lines);
    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(("sans-serif", 13))
        .draw()?;

    for (index, line) in lines.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                x.iter().copied().zip_eq(line.values.iter().copied()),
                color.stroke_width(2),
            ))?
            .label(line.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.85))
        .draw()?;
    root.present()?;
    info!(path = %path.display(), "saved chart");
    Ok(())
}

/// Axis ranges with a padding margin, degenerate ranges widened so plotters
/// never sees an empty span.
fn axis_ranges(x: &[f64], lines: &[Line<'_>]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let ys = lines.iter().flat_map(|line| line.values.iter().copied());
    (padded(min_max(x.iter().copied())), padded(min_max(ys)))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    })
}

fn padded((min, max): (f64, f64)) -> std::ops::Range<f64> {
    let span = max - min;
    if span > 0.0 {
        (min - 0.05 * span)..(max + 0.05 * span)
    } else {
        (min - 1.0)..(max + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_widens_degenerate_ranges() {
        let range = padded((2.0, 2.0));
        assert!(range.start < 2.0 && range.end > 2.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max([3.0, -1.0, 2.0].into_iter()), (-1.0, 3.0));
    }
}
