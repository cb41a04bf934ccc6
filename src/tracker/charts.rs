// Renders the coverage charts to raster images.

use log::debug;
use plotters::prelude::*;
use snafu::whatever;

use crate::tracker::TrackerResult;

const SLICE_COLORS: [RGBColor; 2] = [RGBColor(0x43, 0xA0, 0x47), RGBColor(0x1E, 0x88, 0xE5)];
const BAR_COLOR: RGBColor = RGBColor(0x1E, 0x88, 0xE5);
const TEXT_COLOR: RGBColor = RGBColor(0x1F, 0x29, 0x37);
const AXIS_COLOR: RGBColor = RGBColor(0xE5, 0xE7, 0xEB);

const PIE_SIZE: (u32, u32) = (480, 320);
const BAR_SIZE: (u32, u32) = (640, 360);
const MARGIN: i32 = 40;

/// Draws a two-slice proportion chart with a color-keyed legend.
///
/// Slices start at 12 o'clock and sweep clockwise, each angle proportional
/// to its value over the total. A zero total counts as one, so the call
/// succeeds and draws no visible slice.
pub fn draw_proportion(path: &str, values: [u64; 2], labels: [&str; 2]) -> TrackerResult<()> {
    debug!("draw_proportion: {:?} {:?} -> {:?}", values, labels, path);
    let (w, h) = PIE_SIZE;
    let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
    whatever!(root.fill(&WHITE), "Error filling chart {}", path);

    let total = match values[0] + values[1] {
        0 => 1,
        t => t,
    };
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = (w.min(h) / 2) as f64 - 30.0;

    let mut start = -std::f64::consts::FRAC_PI_2;
    for (i, value) in values.iter().enumerate() {
        let angle = *value as f64 / total as f64 * std::f64::consts::TAU;
        let points = sector_points(center, radius, start, angle);
        if !points.is_empty() {
            whatever!(
                root.draw(&Polygon::new(points, SLICE_COLORS[i].filled())),
                "Error drawing slice {i} of {path}"
            );
        }
        start += angle;
    }

    let font = ("sans-serif", 14).into_font().color(&TEXT_COLOR);
    for (i, label) in labels.iter().enumerate() {
        let y = 18 + i as i32 * 22;
        whatever!(
            root.draw(&Rectangle::new(
                [(18, y), (32, y + 14)],
                SLICE_COLORS[i].filled()
            )),
            "Error drawing legend of {}",
            path
        );
        whatever!(
            root.draw(&Text::new(
                format!("{}: {}", label, values[i]),
                (40, y),
                font.clone()
            )),
            "Error drawing legend of {}",
            path
        );
    }

    whatever!(root.present(), "Error writing chart {}", path);
    Ok(())
}

// Polygon approximation of a circle sector: the center plus arc points from
// `start` sweeping `angle` radians. Screen coordinates grow downward, so a
// growing angle reads clockwise.
fn sector_points(center: (f64, f64), radius: f64, start: f64, angle: f64) -> Vec<(i32, i32)> {
    if angle <= 0.0 {
        return Vec::new();
    }
    let steps = ((angle / 0.05).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for k in 0..=steps {
        let theta = start + angle * (k as f64 / steps as f64);
        points.push((
            (center.0 + radius * theta.cos()).round() as i32,
            (center.1 + radius * theta.sin()).round() as i32,
        ));
    }
    points
}

/// Draws equal-width vertical bars over an axis baseline, with per-bar
/// label and value text.
///
/// Heights scale against `max(1, max(values))`, so an all-zero series draws
/// flat bars instead of dividing by zero.
pub fn draw_bar_chart(path: &str, labels: &[&str], values: &[u64]) -> TrackerResult<()> {
    debug!("draw_bar_chart: {:?} {:?} -> {:?}", values, labels, path);
    let (w, h) = BAR_SIZE;
    let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
    whatever!(root.fill(&WHITE), "Error filling chart {}", path);

    let plot_w = w as f64 - 2.0 * MARGIN as f64;
    let plot_h = h as f64 - 2.0 * MARGIN as f64;
    let baseline = h as i32 - MARGIN;
    let max_val = values.iter().max().cloned().unwrap_or(0).max(1) as f64;
    let step = plot_w / labels.len().max(1) as f64;
    let bar_w = step * 0.6;

    whatever!(
        root.draw(&PathElement::new(
            vec![(MARGIN, baseline), (w as i32 - MARGIN, baseline)],
            AXIS_COLOR.stroke_width(1)
        )),
        "Error drawing axis of {}",
        path
    );

    let font = ("sans-serif", 13).into_font().color(&TEXT_COLOR);
    for (i, (label, value)) in labels.iter().zip(values.iter()).enumerate() {
        let bar_h = *value as f64 / max_val * plot_h;
        let x = MARGIN as f64 + i as f64 * step + (step - bar_w) / 2.0;
        let y = baseline as f64 - bar_h;
        whatever!(
            root.draw(&Rectangle::new(
                [(x as i32, y as i32), ((x + bar_w) as i32, baseline)],
                BAR_COLOR.filled()
            )),
            "Error drawing bar {i} of {path}"
        );
        whatever!(
            root.draw(&Text::new(label.to_string(), (x as i32, baseline + 6), font.clone())),
            "Error drawing label {i} of {path}"
        );
        whatever!(
            root.draw(&Text::new(
                value.to_string(),
                ((x + bar_w / 2.0) as i32 - 6, y as i32 - 18),
                font.clone()
            )),
            "Error drawing value {i} of {path}"
        );
    }

    whatever!(root.present(), "Error writing chart {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sectors_start_at_twelve_o_clock() {
        let points = sector_points((100.0, 100.0), 50.0, -std::f64::consts::FRAC_PI_2, 0.5);
        assert_eq!(points[0], (100, 100));
        // First arc point sits straight above the center.
        assert_eq!(points[1], (100, 50));
        // The sweep moves toward positive x: clockwise on screen.
        assert!(points[2].0 > 100);
    }

    #[test]
    fn zero_angles_draw_nothing() {
        assert!(sector_points((10.0, 10.0), 5.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn full_circle_closes_on_itself() {
        let points = sector_points((0.0, 0.0), 10.0, 0.0, std::f64::consts::TAU);
        assert_eq!(points[1], *points.last().unwrap());
    }
}
