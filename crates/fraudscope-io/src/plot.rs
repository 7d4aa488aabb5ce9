//! SVG rendering of ROC curves.

use std::path::Path;

use plotters::prelude::*;

use crate::IoError;

const SIZE: (u32, u32) = (640, 480);

fn plot_error(path: &Path, e: impl std::fmt::Display) -> IoError {
    IoError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Draw `(fpr, tpr)` points as a line chart with an AUC legend.
pub(crate) fn render_roc(path: &Path, points: &[(f64, f64)], auc: f64) -> Result<(), IoError> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Receiver Operating Characteristic", ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.05f64)
        .map_err(|e| plot_error(path, e))?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()
        .map_err(|e| plot_error(path, e))?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
        .map_err(|e| plot_error(path, e))?
        .label(format!("ROC curve (AUC = {auc:.2})"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| plot_error(path, e))?;

    root.present().map_err(|e| plot_error(path, e))?;
    Ok(())
}
