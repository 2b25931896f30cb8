use std::f64::consts::PI;

/// Plot rectangle in page millimetres, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

/// Axis ceiling: the series maximum rounded up to a 1/2/5 step, at least 1.
pub fn nice_ceiling(values: &[f64]) -> f64 {
    let max = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10_f64.powf(max.log10().floor());
    for step in [1.0, 2.0, 5.0, 10.0] {
        let candidate = step * magnitude;
        if candidate >= max {
            return candidate;
        }
    }
    10.0 * magnitude
}

/// X position of the centre of slot `index` out of `count` equal slots.
pub fn slot_center(area: &PlotArea, index: usize, count: usize) -> f64 {
    let slots = count.max(1) as f64;
    area.left + area.width * (index as f64 + 0.5) / slots
}

pub fn scale_y(area: &PlotArea, value: f64, ceiling: f64) -> f64 {
    let ratio = if ceiling > 0.0 { value / ceiling } else { 0.0 };
    area.bottom + area.height * ratio.clamp(0.0, 1.0)
}

/// Polyline vertices for a line series.
pub fn line_points(area: &PlotArea, values: &[f64], ceiling: f64) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            (
                slot_center(area, index, values.len()),
                scale_y(area, *value, ceiling),
            )
        })
        .collect()
}

/// `(left, bottom, right, top)` for each bar, using 60% of its slot.
pub fn bar_rects(area: &PlotArea, values: &[f64], ceiling: f64) -> Vec<(f64, f64, f64, f64)> {
    let slot = area.width / values.len().max(1) as f64;
    let half = slot * 0.3;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let center = slot_center(area, index, values.len());
            (
                center - half,
                area.bottom,
                center + half,
                scale_y(area, *value, ceiling),
            )
        })
        .collect()
}

/// Start and end angle in radians for each non-empty slice, clockwise from
/// twelve o'clock. Empty input or an all-zero total yields no slices.
pub fn pie_angles(values: &[f64]) -> Vec<(usize, f64, f64)> {
    let total: f64 = values.iter().filter(|value| **value > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut angle = PI / 2.0;
    let mut slices = Vec::new();
    for (index, value) in values.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }
        let sweep = 2.0 * PI * value / total;
        slices.push((index, angle, angle - sweep));
        angle -= sweep;
    }
    slices
}

/// Closed wedge outline approximating the arc with short segments.
pub fn wedge_points(center: (f64, f64), radius: f64, from: f64, to: f64) -> Vec<(f64, f64)> {
    let sweep = (from - to).abs();
    let steps = ((sweep / (PI / 36.0)).ceil() as usize).max(1);
    let mut points = vec![center];
    for step in 0..=steps {
        let angle = from + (to - from) * step as f64 / steps as f64;
        points.push((
            center.0 + radius * angle.cos(),
            center.1 + radius * angle.sin(),
        ));
    }
    points
}

/// Keeps at most `max_labels` evenly spaced tick labels.
pub fn label_stride(count: usize, max_labels: usize) -> usize {
    if max_labels == 0 {
        return count.max(1);
    }
    count.div_ceil(max_labels).max(1)
}

#[cfg(test)]
mod tests {
    use super::{
        bar_rects, label_stride, line_points, nice_ceiling, pie_angles, wedge_points, PlotArea,
    };
    use std::f64::consts::PI;

    const AREA: PlotArea = PlotArea {
        left: 20.0,
        bottom: 50.0,
        width: 100.0,
        height: 80.0,
    };

    #[test]
    fn ceiling_rounds_up_to_readable_steps() {
        assert_eq!(nice_ceiling(&[]), 1.0);
        assert_eq!(nice_ceiling(&[0.0, 0.0]), 1.0);
        assert_eq!(nice_ceiling(&[3.0]), 5.0);
        assert_eq!(nice_ceiling(&[12.0, 7.0]), 20.0);
        assert_eq!(nice_ceiling(&[100.0]), 100.0);
        assert_eq!(nice_ceiling(&[730.0]), 1000.0);
    }

    #[test]
    fn zero_series_sits_on_the_axis() {
        let points = line_points(&AREA, &[0.0, 0.0, 0.0], nice_ceiling(&[0.0]));
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|(_, y)| *y == AREA.bottom));
        assert!(points.iter().all(|(x, _)| *x > AREA.left && *x < AREA.right()));
    }

    #[test]
    fn bars_reach_scaled_height() {
        let bars = bar_rects(&AREA, &[5.0, 10.0], 10.0);
        assert_eq!(bars[0].3, AREA.bottom + 40.0);
        assert_eq!(bars[1].3, AREA.top());
        assert!(bars[0].2 < bars[1].0);
    }

    #[test]
    fn pie_slices_cover_full_circle() {
        let slices = pie_angles(&[3.0, 0.0, 1.0]);
        assert_eq!(slices.len(), 2);
        let sweep: f64 = slices.iter().map(|(_, from, to)| from - to).sum();
        assert!((sweep - 2.0 * PI).abs() < 1e-9);
        assert_eq!(slices[1].0, 2);
        assert!(pie_angles(&[0.0, 0.0]).is_empty());
    }

    #[test]
    fn wedge_starts_at_center() {
        let points = wedge_points((50.0, 50.0), 10.0, PI / 2.0, 0.0);
        assert_eq!(points[0], (50.0, 50.0));
        assert!((points[1].1 - 60.0).abs() < 1e-9);
        assert!(points.len() > 3);
    }

    #[test]
    fn label_stride_limits_ticks() {
        assert_eq!(label_stride(7, 10), 1);
        assert_eq!(label_stride(31, 8), 4);
        assert_eq!(label_stride(0, 8), 1);
    }
}
