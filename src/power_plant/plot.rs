//! PNG rendering of cost curves and connection trees.
//!
//! Axis labels need a TrueType font. The first one found in the usual system locations is
//! registered on first use; without one the charts are drawn unlabelled.

use crate::error::{KataError, Result};
use crate::power_plant::loc::{Edge, Loc};
use crate::power_plant::transmission::CostPoint;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

/// File name used when no plot path is given.
pub const DEFAULT_PLOT_PATH: &str = "line_graph.png";

/// Image size in pixels (4 x 4 inches at 100 dpi).
const SIZE: (u32, u32) = (400, 400);

const FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
];

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn plot_error(e: impl std::fmt::Display) -> KataError {
    KataError::Plot(e.to_string())
}

/// Whether a font for axis labels has been registered.
fn labels_available() -> bool {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    *REGISTERED.get_or_init(|| {
        FONT_PATHS
            .iter()
            .filter_map(|path| std::fs::read(path).ok())
            .any(|bytes| {
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                register_font("sans-serif", FontStyle::Normal, bytes).is_ok()
            })
    })
}

/// Draws the mesh, with tick labels and the axis descriptions when a font is available.
fn draw_mesh(chart: &mut Chart<'_, '_>, descriptions: Option<(&str, &str)>) -> Result<()> {
    let mut mesh = chart.configure_mesh();
    if labels_available() {
        if let Some((x_desc, y_desc)) = descriptions {
            mesh.x_desc(x_desc).y_desc(y_desc);
        }
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw().map_err(plot_error)
}

/// Range covering `values` with a 5% margin on each side; never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad)..(hi + pad)
}

/// Line chart of the cost of every tried transmission line position.
///
/// # Errors
///
/// `KataError::Plot` if the image cannot be drawn or written.
pub fn plot_cost_curve(path: &Path, samples: &[CostPoint]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(
            padded_range(samples.iter().map(|s| s.line)),
            padded_range(samples.iter().map(|s| s.cost)),
        )
        .map_err(plot_error)?;

    draw_mesh(&mut chart, Some(("Transmission Line", "Cost")))?;

    chart
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (s.line, s.cost)),
            &BLUE,
        ))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}

/// Scatter plot of the two probe series of a ternary search.
///
/// # Errors
///
/// `KataError::Plot` if the image cannot be drawn or written.
pub fn plot_probes(path: &Path, left: &[CostPoint], right: &[CostPoint]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let all = || left.iter().chain(right);
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(
            padded_range(all().map(|s| s.line)),
            padded_range(all().map(|s| s.cost)),
        )
        .map_err(plot_error)?;

    draw_mesh(&mut chart, Some(("Transmission Line", "Cost")))?;

    chart
        .draw_series(
            left.iter()
                .map(|s| Circle::new((s.line, s.cost), 3, BLUE.filled())),
        )
        .map_err(plot_error)?;
    chart
        .draw_series(
            right
                .iter()
                .map(|s| Circle::new((s.line, s.cost), 3, RED.filled())),
        )
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}

/// Tree edges as segments over a scatter of the nodes; `highlight` points (Steiner points) are
/// drawn as red crosses.
///
/// # Errors
///
/// `KataError::Plot` if the image cannot be drawn or written.
pub fn plot_tree(path: &Path, nodes: &[Loc], edges: &[Edge], highlight: &[Loc]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_2d(
            padded_range(nodes.iter().map(|n| n.x)),
            padded_range(nodes.iter().map(|n| n.y)),
        )
        .map_err(plot_error)?;

    draw_mesh(&mut chart, None)?;

    for edge in edges {
        chart
            .draw_series(LineSeries::new(
                [(edge.from.x, edge.from.y), (edge.to.x, edge.to.y)],
                &BLACK,
            ))
            .map_err(plot_error)?;
    }

    chart
        .draw_series(
            nodes
                .iter()
                .filter(|n| !highlight.contains(n))
                .map(|n| Circle::new((n.x, n.y), 3, BLUE.filled())),
        )
        .map_err(plot_error)?;
    chart
        .draw_series(
            highlight
                .iter()
                .map(|n| Cross::new((n.x, n.y), 4, RED.stroke_width(2))),
        )
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_plant::brute_force::brute_force;
    use crate::power_plant::loc::EXAMPLE_PLANTS;
    use crate::power_plant::prims::prims;
    use crate::power_plant::ternary_search::{ternary_search, DEFAULT_EPS};
    use crate::power_plant::transmission::Orientation;

    fn temp_png(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("kata-solver-{}-{name}.png", std::process::id()))
    }

    #[test]
    fn test_padded_range() {
        let range = padded_range([1.0, 11.0].into_iter());
        assert!((range.start - 0.5).abs() < 1e-12);
        assert!((range.end - 11.5).abs() < 1e-12);

        let single = padded_range(std::iter::once(3.0));
        assert!(single.start < 3.0 && single.end > 3.0);

        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn test_plot_cost_curve_writes_png() {
        let path = temp_png("curve");
        let result = brute_force(&EXAMPLE_PLANTS, Orientation::NorthSouth).unwrap();
        plot_cost_curve(&path, &result.samples).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_plot_probes_writes_png() {
        let path = temp_png("probes");
        let result = ternary_search(&EXAMPLE_PLANTS, Orientation::NorthSouth, DEFAULT_EPS).unwrap();
        assert!(!result.left_probes.is_empty());
        plot_probes(&path, &result.left_probes, &result.right_probes).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_plot_tree_writes_png() {
        let path = temp_png("tree");
        let tree = prims(&EXAMPLE_PLANTS);
        plot_tree(&path, &EXAMPLE_PLANTS, &tree.edges, &[]).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_plot_into_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("kata-solver-no-such-dir")
            .join("nested")
            .join("plot.png");
        assert!(matches!(
            plot_cost_curve(&path, &[]),
            Err(KataError::Plot(_))
        ));
    }
}
