use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use super::{
    charts::{
        bar_rects, label_stride, line_points, nice_ceiling, pie_angles, scale_y, slot_center,
        wedge_points, PlotArea,
    },
    narrative::{
        format_change, format_count, format_currency, summary_paragraph, visitor_split,
        wrap_text,
    },
    ExportContext, ExportError,
};
use crate::schemas::DashboardData;

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;
const LAYER: &str = "content";
const MAX_X_LABELS: usize = 8;

const INK: (f64, f64, f64) = (0.15, 0.15, 0.15);
const GRID: (f64, f64, f64) = (0.75, 0.75, 0.75);
const PALETTE: [(f64, f64, f64); 6] = [
    (0.16, 0.44, 0.71),
    (0.91, 0.49, 0.13),
    (0.20, 0.63, 0.33),
    (0.80, 0.25, 0.25),
    (0.55, 0.40, 0.72),
    (0.50, 0.50, 0.50),
];

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Renders the dashboard as an A4 report: summary page, one page per chart,
/// and a closing narrative.
pub fn render_pdf(data: &DashboardData, context: &ExportContext) -> Result<Vec<u8>, ExportError> {
    let title = format!("{} dashboard report", context.venue_name);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), LAYER);
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|error| ExportError::Pdf(format!("{error:?}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|error| ExportError::Pdf(format!("{error:?}")))?,
    };

    draw_pages(
        &doc,
        doc.get_page(first_page).get_layer(first_layer),
        &fonts,
        data,
        context,
        &title,
    );

    doc.save_to_bytes()
        .map_err(|error| ExportError::Pdf(format!("{error:?}")))
}

fn draw_pages(
    doc: &PdfDocumentReference,
    cover: PdfLayerReference,
    fonts: &Fonts,
    data: &DashboardData,
    context: &ExportContext,
    title: &str,
) {
    draw_summary_page(&cover, fonts, data, context, title);

    let revenue_values = data
        .revenue_data
        .iter()
        .map(|point| point.revenue)
        .collect::<Vec<_>>();
    let revenue_labels = data
        .revenue_data
        .iter()
        .map(|point| point.date.clone())
        .collect::<Vec<_>>();
    let layer = new_page(doc);
    draw_line_chart(
        &layer,
        fonts,
        "Revenue over time",
        &revenue_labels,
        &revenue_values,
        PALETTE[0],
    );

    let occupancy_values = data
        .occupancy_data
        .iter()
        .map(|point| point.occupancy as f64)
        .collect::<Vec<_>>();
    let occupancy_labels = data
        .occupancy_data
        .iter()
        .map(|point| point.date.clone())
        .collect::<Vec<_>>();
    let layer = new_page(doc);
    draw_line_chart(
        &layer,
        fonts,
        "Occupied rooms over time",
        &occupancy_labels,
        &occupancy_values,
        PALETTE[2],
    );

    let layer = new_page(doc);
    draw_visitor_pie(&layer, fonts, data);

    let layer = new_page(doc);
    draw_room_type_chart(&layer, fonts, data);

    let layer = new_page(doc);
    draw_narrative(&layer, fonts, data, context);
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), LAYER);
    doc.get_page(page).get_layer(layer)
}

fn draw_summary_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    data: &DashboardData,
    context: &ExportContext,
    title: &str,
) {
    let range = &data.date_range;
    let mut y = PAGE_HEIGHT - MARGIN;
    text(layer, &fonts.bold, title, 18.0, MARGIN, y);
    y -= 9.0;
    text(
        layer,
        &fonts.regular,
        &format!(
            "Period {} to {} ({} view), compared with {} to {}",
            range.start_date,
            range.end_date,
            range.view_mode.as_str(),
            range.previous_start_date,
            range.previous_end_date
        ),
        10.0,
        MARGIN,
        y,
    );
    y -= 6.0;
    text(
        layer,
        &fonts.regular,
        &format!("Generated {}", context.generated_on),
        9.0,
        MARGIN,
        y,
    );

    y -= 16.0;
    let columns = [MARGIN, MARGIN + 55.0, MARGIN + 95.0, MARGIN + 135.0];
    for (header, x) in ["Metric", "Current", "Previous", "Change"].iter().zip(columns) {
        text(layer, &fonts.bold, header, 11.0, x, y);
    }
    y -= 2.5;
    stroke_line(layer, &[(MARGIN, y), (PAGE_WIDTH - MARGIN, y)], INK, 0.6);

    for row in summary_rows(data, &pdf_currency_symbol(&context.currency_symbol)) {
        y -= 8.0;
        for (cell, x) in row.iter().zip(columns) {
            text(layer, &fonts.regular, cell, 10.0, x, y);
        }
    }
}

/// `[metric, current, previous, change]` per headline figure.
fn summary_rows(data: &DashboardData, currency_symbol: &str) -> Vec<[String; 4]> {
    let previous = &data.previous;
    let count_row = |label: &str, current: i64, before: i64, change: f64| {
        [
            label.to_string(),
            format_count(current),
            format_count(before),
            format_change(change),
        ]
    };
    let visitors = data.visitor_data.iter().map(|slice| slice.visitors).sum();
    vec![
        count_row(
            "Total bookings",
            data.total_bookings,
            previous.bookings,
            data.total_bookings_change,
        ),
        [
            "Total revenue".to_string(),
            format_currency(currency_symbol, data.total_revenue),
            format_currency(currency_symbol, previous.revenue),
            format_change(data.total_revenue_change),
        ],
        count_row(
            "Total guests",
            data.total_guests,
            previous.guests,
            data.total_guests_change,
        ),
        count_row(
            "Available rooms",
            data.available_rooms,
            previous.available_rooms,
            data.available_rooms_change,
        ),
        count_row(
            "Available spaces",
            data.available_spaces,
            previous.available_spaces,
            data.available_spaces_change,
        ),
        count_row("Visitors", visitors, previous.bookings, data.visitor_trending),
    ]
}

/// Builtin Helvetica only covers ASCII reliably, so symbols outside it are
/// replaced by their ISO code and anything else unknown is dropped.
fn pdf_currency_symbol(symbol: &str) -> String {
    if symbol.is_ascii() {
        return symbol.to_string();
    }
    let code = match symbol.trim() {
        "₱" => "PHP ",
        "€" => "EUR ",
        "£" => "GBP ",
        "¥" => "JPY ",
        "₹" => "INR ",
        "₩" => "KRW ",
        "₫" => "VND ",
        "฿" => "THB ",
        _ => return symbol.chars().filter(char::is_ascii).collect(),
    };
    code.to_string()
}

fn chart_area() -> PlotArea {
    PlotArea {
        left: MARGIN + 15.0,
        bottom: PAGE_HEIGHT - 190.0,
        width: PAGE_WIDTH - 2.0 * MARGIN - 30.0,
        height: 140.0,
    }
}

fn draw_line_chart(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    title: &str,
    labels: &[String],
    values: &[f64],
    color: (f64, f64, f64),
) {
    text(layer, &fonts.bold, title, 16.0, MARGIN, PAGE_HEIGHT - MARGIN);
    let area = chart_area();
    let ceiling = nice_ceiling(values);
    draw_axes(layer, fonts, &area, ceiling, MARGIN);
    draw_x_labels(layer, fonts, &area, labels);

    if values.iter().all(|value| *value == 0.0) {
        no_data(layer, fonts, &area);
    }
    let points = line_points(&area, values, ceiling);
    if points.len() > 1 {
        stroke_line(layer, &points, color, 1.4);
    }
    for (x, y) in &points {
        fill_polygon(layer, &square(*x, *y, 0.9), color);
    }
}

fn draw_visitor_pie(layer: &PdfLayerReference, fonts: &Fonts, data: &DashboardData) {
    text(
        layer,
        &fonts.bold,
        "Visitors by reservation type",
        16.0,
        MARGIN,
        PAGE_HEIGHT - MARGIN,
    );
    let center = (PAGE_WIDTH / 2.0, PAGE_HEIGHT - 110.0);
    let radius = 55.0;
    let values = data
        .visitor_data
        .iter()
        .map(|slice| slice.visitors as f64)
        .collect::<Vec<_>>();

    let slices = pie_angles(&values);
    if slices.is_empty() {
        stroke_line(
            layer,
            &wedge_points(center, radius, 0.0, 2.0 * std::f64::consts::PI)[1..],
            GRID,
            0.8,
        );
        text(layer, &fonts.regular, "No data", 11.0, center.0 - 7.0, center.1);
    }
    for (index, from, to) in slices {
        fill_polygon(
            layer,
            &wedge_points(center, radius, from, to),
            PALETTE[index % PALETTE.len()],
        );
    }

    let mut y = center.1 - radius - 15.0;
    for (index, (name, share)) in visitor_split(data).into_iter().enumerate() {
        let visitors = data
            .visitor_data
            .get(index)
            .map(|slice| slice.visitors)
            .unwrap_or(0);
        fill_polygon(
            layer,
            &square(MARGIN + 42.0, y + 1.2, 2.0),
            PALETTE[index % PALETTE.len()],
        );
        text(
            layer,
            &fonts.regular,
            &format!("{name}: {} ({share:.1}%)", format_count(visitors)),
            11.0,
            MARGIN + 47.0,
            y,
        );
        y -= 8.0;
    }
}

fn draw_room_type_chart(layer: &PdfLayerReference, fonts: &Fonts, data: &DashboardData) {
    text(
        layer,
        &fonts.bold,
        "Room type performance",
        16.0,
        MARGIN,
        PAGE_HEIGHT - MARGIN,
    );
    let area = chart_area();
    let bookings = data
        .room_type_performance
        .iter()
        .map(|row| row.booking_frequency as f64)
        .collect::<Vec<_>>();
    let stays = data
        .room_type_performance
        .iter()
        .map(|row| row.avg_stay_duration)
        .collect::<Vec<_>>();
    let labels = data
        .room_type_performance
        .iter()
        .map(|row| row.room_type.clone())
        .collect::<Vec<_>>();

    let booking_ceiling = nice_ceiling(&bookings);
    let stay_ceiling = nice_ceiling(&stays);
    draw_axes(layer, fonts, &area, booking_ceiling, MARGIN);
    draw_right_axis(layer, fonts, &area, stay_ceiling);
    draw_x_labels(layer, fonts, &area, &labels);

    if bookings.is_empty() {
        no_data(layer, fonts, &area);
    }
    for (left, bottom, right, top) in bar_rects(&area, &bookings, booking_ceiling) {
        if top > bottom {
            fill_polygon(
                layer,
                &[(left, bottom), (right, bottom), (right, top), (left, top)],
                PALETTE[0],
            );
        }
    }
    let stay_points = line_points(&area, &stays, stay_ceiling);
    if stay_points.len() > 1 {
        stroke_line(layer, &stay_points, PALETTE[1], 1.4);
    }
    for (x, y) in &stay_points {
        fill_polygon(layer, &square(*x, *y, 1.0), PALETTE[1]);
    }

    let legend_y = area.bottom - 22.0;
    fill_polygon(layer, &square(area.left + 2.0, legend_y + 1.2, 2.0), PALETTE[0]);
    text(
        layer,
        &fonts.regular,
        "Booking frequency (left axis)",
        9.0,
        area.left + 6.0,
        legend_y,
    );
    fill_polygon(layer, &square(area.left + 72.0, legend_y + 1.2, 2.0), PALETTE[1]);
    text(
        layer,
        &fonts.regular,
        "Average stay in days (right axis)",
        9.0,
        area.left + 76.0,
        legend_y,
    );
}

fn draw_narrative(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    data: &DashboardData,
    context: &ExportContext,
) {
    let mut y = PAGE_HEIGHT - MARGIN;
    text(layer, &fonts.bold, "Summary", 16.0, MARGIN, y);
    y -= 12.0;
    let symbol = pdf_currency_symbol(&context.currency_symbol);
    for line in wrap_text(&summary_paragraph(data, &symbol), 95) {
        text(layer, &fonts.regular, &line, 11.0, MARGIN, y);
        y -= 6.0;
    }
}

fn draw_axes(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    area: &PlotArea,
    ceiling: f64,
    label_x: f64,
) {
    for tick in 0..=4 {
        let value = ceiling * f64::from(tick) / 4.0;
        let y = scale_y(area, value, ceiling);
        let color = if tick == 0 { INK } else { GRID };
        stroke_line(layer, &[(area.left, y), (area.right(), y)], color, 0.4);
        text(layer, &fonts.regular, &axis_label(value), 7.0, label_x, y - 1.0);
    }
    stroke_line(
        layer,
        &[(area.left, area.bottom), (area.left, area.top())],
        INK,
        0.6,
    );
}

fn draw_right_axis(layer: &PdfLayerReference, fonts: &Fonts, area: &PlotArea, ceiling: f64) {
    stroke_line(
        layer,
        &[(area.right(), area.bottom), (area.right(), area.top())],
        INK,
        0.6,
    );
    for tick in 0..=4 {
        let value = ceiling * f64::from(tick) / 4.0;
        let y = scale_y(area, value, ceiling);
        text(
            layer,
            &fonts.regular,
            &axis_label(value),
            7.0,
            area.right() + 2.0,
            y - 1.0,
        );
    }
}

fn draw_x_labels(layer: &PdfLayerReference, fonts: &Fonts, area: &PlotArea, labels: &[String]) {
    let stride = label_stride(labels.len(), MAX_X_LABELS);
    for (index, label) in labels.iter().enumerate() {
        if index % stride != 0 {
            continue;
        }
        let x = slot_center(area, index, labels.len());
        let shown = label.chars().take(12).collect::<String>();
        let half_width = shown.chars().count() as f64 * 0.8;
        text(
            layer,
            &fonts.regular,
            &shown,
            7.0,
            x - half_width,
            area.bottom - 7.0,
        );
    }
}

fn no_data(layer: &PdfLayerReference, fonts: &Fonts, area: &PlotArea) {
    text(
        layer,
        &fonts.regular,
        "No data for this period",
        11.0,
        area.left + area.width / 2.0 - 20.0,
        area.bottom + area.height / 2.0,
    );
}

fn axis_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format_count(value as i64)
    } else {
        format!("{value:.1}")
    }
}

fn square(x: f64, y: f64, half: f64) -> [(f64, f64); 4] {
    [
        (x - half, y - half),
        (x + half, y - half),
        (x + half, y + half),
        (x - half, y + half),
    ]
}

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, value: &str, size: f32, x: f64, y: f64) {
    layer.set_fill_color(rgb(INK));
    layer.use_text(value, size, mm(x), mm(y), font);
}

fn stroke_line(layer: &PdfLayerReference, points: &[(f64, f64)], color: (f64, f64, f64), width: f32) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(width);
    layer.add_line(Line {
        points: to_points(points),
        is_closed: false,
    });
}

fn fill_polygon(layer: &PdfLayerReference, points: &[(f64, f64)], color: (f64, f64, f64)) {
    layer.set_fill_color(rgb(color));
    layer.add_polygon(Polygon {
        rings: vec![to_points(points)],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn to_points(points: &[(f64, f64)]) -> Vec<(Point, bool)> {
    points
        .iter()
        .map(|(x, y)| (Point::new(mm(*x), mm(*y)), false))
        .collect()
}

fn mm(value: f64) -> Mm {
    Mm(value as f32)
}

fn rgb((r, g, b): (f64, f64, f64)) -> Color {
    Color::Rgb(Rgb::new(r as f32, g as f32, b as f32, None))
}

#[cfg(test)]
mod tests {
    use super::{pdf_currency_symbol, render_pdf, summary_rows};
    use crate::services::export::ExportContext;
    use crate::schemas::ViewMode;
    use crate::services::export::tests::{empty_dashboard, sample_context, sample_dashboard};

    #[test]
    fn renders_pdf_document() {
        let bytes = render_pdf(&sample_dashboard(), &sample_context()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn renders_period_without_reservations() {
        for view_mode in [ViewMode::Daily, ViewMode::Monthly] {
            let data = empty_dashboard(view_mode);
            assert!(data.room_type_performance.is_empty());
            let bytes = render_pdf(&data, &sample_context()).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
    }

    #[test]
    fn non_ascii_currency_becomes_iso_code() {
        assert_eq!(pdf_currency_symbol("$"), "$");
        assert_eq!(pdf_currency_symbol("PHP "), "PHP ");
        assert_eq!(pdf_currency_symbol("₱"), "PHP ");
        assert_eq!(pdf_currency_symbol("€"), "EUR ");
        assert_eq!(pdf_currency_symbol("R₴"), "R");

        let rows = summary_rows(&sample_dashboard(), &pdf_currency_symbol("₱"));
        assert_eq!(rows[1][1], "PHP 12,500.50");
    }

    #[test]
    fn renders_with_non_ascii_currency() {
        let context = ExportContext {
            currency_symbol: "₱".to_string(),
            ..sample_context()
        };
        let bytes = render_pdf(&sample_dashboard(), &context).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn summary_rows_format_currency_and_change() {
        let rows = summary_rows(&sample_dashboard(), "$");
        assert_eq!(rows.len(), 6);
        assert_eq!(
            rows[1],
            [
                "Total revenue".to_string(),
                "$12,500.50".to_string(),
                "$10,000.40".to_string(),
                "+25.0%".to_string(),
            ]
        );
        assert_eq!(rows[5][2], "10");
    }
}
