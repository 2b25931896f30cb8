use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::{ExportContext, ExportError};
use crate::schemas::DashboardData;

struct Formats {
    header: Format,
    currency: Format,
    change: Format,
    count: Format,
    decimal: Format,
}

impl Formats {
    fn new(currency_symbol: &str) -> Self {
        let symbol = currency_symbol.replace('"', "");
        Self {
            header: Format::new().set_bold(),
            currency: Format::new().set_num_format(format!("\"{symbol}\"#,##0.00")),
            change: Format::new().set_num_format("+0.0\"%\";-0.0\"%\";0.0\"%\""),
            count: Format::new().set_num_format("#,##0"),
            decimal: Format::new().set_num_format("0.00"),
        }
    }
}

/// Builds the xlsx workbook: a summary sheet plus one sheet per series or
/// breakdown.
pub fn render_workbook(
    data: &DashboardData,
    context: &ExportContext,
) -> Result<Vec<u8>, ExportError> {
    let formats = Formats::new(&context.currency_symbol);
    let mut workbook = Workbook::new();

    write_summary(workbook.add_worksheet(), data, context, &formats)?;
    write_occupancy(workbook.add_worksheet(), data, &formats)?;
    write_revenue(workbook.add_worksheet(), data, &formats)?;
    write_room_types(workbook.add_worksheet(), data, &formats)?;
    write_visitors(workbook.add_worksheet(), data, &formats)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_headers(
    sheet: &mut Worksheet,
    headers: &[&str],
    formats: &Formats,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &formats.header)?;
        sheet.set_column_width(col, 22)?;
    }
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    data: &DashboardData,
    context: &ExportContext,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.set_name("Summary")?;
    write_headers(sheet, &["Metric", "Current", "Previous", "Change"], formats)?;

    let previous = &data.previous;
    let visitors: i64 = data.visitor_data.iter().map(|slice| slice.visitors).sum();
    let counts: [(&str, i64, i64, f64); 5] = [
        ("Total bookings", data.total_bookings, previous.bookings, data.total_bookings_change),
        ("Total guests", data.total_guests, previous.guests, data.total_guests_change),
        (
            "Available rooms",
            data.available_rooms,
            previous.available_rooms,
            data.available_rooms_change,
        ),
        (
            "Available spaces",
            data.available_spaces,
            previous.available_spaces,
            data.available_spaces_change,
        ),
        ("Visitors", visitors, previous.bookings, data.visitor_trending),
    ];

    sheet.write_string(1, 0, "Total revenue")?;
    sheet.write_number_with_format(1, 1, data.total_revenue, &formats.currency)?;
    sheet.write_number_with_format(1, 2, previous.revenue, &formats.currency)?;
    sheet.write_number_with_format(1, 3, data.total_revenue_change, &formats.change)?;

    let mut row = 2;
    for (label, current, before, change) in counts {
        sheet.write_string(row, 0, label)?;
        sheet.write_number_with_format(row, 1, current as f64, &formats.count)?;
        sheet.write_number_with_format(row, 2, before as f64, &formats.count)?;
        sheet.write_number_with_format(row, 3, change, &formats.change)?;
        row += 1;
    }

    let range = &data.date_range;
    row += 1;
    sheet.write_string_with_format(row, 0, "Period", &formats.header)?;
    sheet.write_string(
        row,
        1,
        format!("{} to {}", range.start_date, range.end_date),
    )?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Compared with", &formats.header)?;
    sheet.write_string(
        row,
        1,
        format!("{} to {}", range.previous_start_date, range.previous_end_date),
    )?;
    row += 1;
    sheet.write_string_with_format(row, 0, "Generated", &formats.header)?;
    sheet.write_string(row, 1, context.generated_on.to_string())?;
    Ok(())
}

fn write_occupancy(
    sheet: &mut Worksheet,
    data: &DashboardData,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.set_name("Occupancy")?;
    write_headers(sheet, &["Date", "Occupied rooms"], formats)?;
    for (index, point) in data.occupancy_data.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, &point.date)?;
        sheet.write_number_with_format(row, 1, point.occupancy as f64, &formats.count)?;
    }
    Ok(())
}

fn write_revenue(
    sheet: &mut Worksheet,
    data: &DashboardData,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.set_name("Revenue")?;
    write_headers(sheet, &["Date", "Revenue"], formats)?;
    for (index, point) in data.revenue_data.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, &point.date)?;
        sheet.write_number_with_format(row, 1, point.revenue, &formats.currency)?;
    }
    Ok(())
}

fn write_room_types(
    sheet: &mut Worksheet,
    data: &DashboardData,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.set_name("Room Types")?;
    write_headers(
        sheet,
        &["Room type", "Booking frequency", "Average stay (days)"],
        formats,
    )?;
    for (index, item) in data.room_type_performance.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, &item.room_type)?;
        sheet.write_number_with_format(row, 1, item.booking_frequency as f64, &formats.count)?;
        sheet.write_number_with_format(row, 2, item.avg_stay_duration, &formats.decimal)?;
    }
    Ok(())
}

fn write_visitors(
    sheet: &mut Worksheet,
    data: &DashboardData,
    formats: &Formats,
) -> Result<(), XlsxError> {
    sheet.set_name("Visitors")?;
    write_headers(sheet, &["Reservation type", "Visitors"], formats)?;
    for (index, slice) in data.visitor_data.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, &slice.name)?;
        sheet.write_number_with_format(row, 1, slice.visitors as f64, &formats.count)?;
    }
    Ok(())
}
