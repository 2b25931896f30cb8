pub mod charts;
pub mod narrative;
pub mod pdf;
pub mod spreadsheet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::schemas::{DashboardData, ExportFormat};

/// Presentation settings that do not belong in the metrics payload.
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub venue_name: String,
    pub currency_symbol: String,
    pub generated_on: NaiveDate,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
    #[error("export format {0:?} is not a document")]
    NotADocument(ExportFormat),
}

/// A rendered document ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn render_document(
    format: ExportFormat,
    data: &DashboardData,
    context: &ExportContext,
) -> Result<RenderedDocument, ExportError> {
    let bytes = match format {
        ExportFormat::Excel => spreadsheet::render_workbook(data, context)?,
        ExportFormat::Pdf => pdf::render_pdf(data, context)?,
        ExportFormat::Json => return Err(ExportError::NotADocument(format)),
    };
    Ok(RenderedDocument {
        filename: attachment_filename(format, context.generated_on),
        content_type: format.content_type(),
        bytes,
    })
}

pub fn attachment_filename(format: ExportFormat, generated_on: NaiveDate) -> String {
    format!(
        "dashboard_report_{}.{}",
        generated_on.format("%Y-%m-%d"),
        format.file_extension()
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{attachment_filename, render_document, ExportContext};
    use crate::repository::dashboard_rows::DashboardSnapshot;
    use crate::services::metrics::build_dashboard;
    use crate::services::period::{ComparisonPair, Period};
    use crate::schemas::{
        DashboardData, DateRange, ExportFormat, OccupancyPoint, PreviousTotals, RevenuePoint,
        RoomTypePerformance, ViewMode, VisitorSlice,
    };
    use chrono::NaiveDate;

    pub(crate) fn sample_context() -> ExportContext {
        ExportContext {
            venue_name: "Harbor Hotel".to_string(),
            currency_symbol: "$".to_string(),
            generated_on: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        }
    }

    pub(crate) fn sample_dashboard() -> DashboardData {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        DashboardData {
            total_bookings: 12,
            total_bookings_change: 20.0,
            total_bookings_period: "day",
            total_revenue: 12500.5,
            total_revenue_change: 25.0,
            total_revenue_period: "day",
            total_guests: 9,
            total_guests_change: -10.0,
            total_guests_period: "day",
            available_rooms: 4,
            available_rooms_change: 0.0,
            available_rooms_period: "day",
            available_spaces: 1,
            available_spaces_change: 100.0,
            available_spaces_period: "day",
            occupancy_data: (4..=10)
                .map(|d| OccupancyPoint {
                    date: day(d).to_string(),
                    occupancy: i64::from(d % 4),
                })
                .collect(),
            revenue_data: (4..=10)
                .map(|d| RevenuePoint {
                    date: day(d).to_string(),
                    revenue: f64::from(d) * 250.0,
                })
                .collect(),
            room_type_performance: vec![
                RoomTypePerformance {
                    room_type: "Deluxe".to_string(),
                    booking_frequency: 5,
                    avg_stay_duration: 2.4,
                },
                RoomTypePerformance {
                    room_type: "Suite".to_string(),
                    booking_frequency: 3,
                    avg_stay_duration: 4.0,
                },
            ],
            visitor_data: vec![
                VisitorSlice {
                    name: "Room".to_string(),
                    visitors: 8,
                },
                VisitorSlice {
                    name: "Venue".to_string(),
                    visitors: 4,
                },
            ],
            visitor_trending: 20.0,
            date_range: DateRange {
                start_date: day(4),
                end_date: day(10),
                previous_start_date: NaiveDate::from_ymd_opt(2024, 5, 28).unwrap(),
                previous_end_date: day(3),
                view_mode: ViewMode::Daily,
            },
            previous: PreviousTotals {
                bookings: 10,
                revenue: 10000.4,
                guests: 10,
                available_rooms: 4,
                available_spaces: 0,
            },
        }
    }

    /// Dashboard computed from a period with no rows at all.
    pub(crate) fn empty_dashboard(view_mode: ViewMode) -> DashboardData {
        let current = Period::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();
        let pair = ComparisonPair {
            current,
            previous: current.previous().unwrap(),
            view_mode,
        };
        build_dashboard(&DashboardSnapshot::default(), &pair)
    }

    #[test]
    fn filename_is_stamped_with_generation_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(
            attachment_filename(ExportFormat::Excel, date),
            "dashboard_report_2024-06-10.xlsx"
        );
        assert_eq!(
            attachment_filename(ExportFormat::Pdf, date),
            "dashboard_report_2024-06-10.pdf"
        );
    }

    #[test]
    fn json_is_not_rendered_as_document() {
        let result = render_document(ExportFormat::Json, &sample_dashboard(), &sample_context());
        assert!(result.is_err());
    }

    #[test]
    fn renders_pdf_attachment() {
        let document =
            render_document(ExportFormat::Pdf, &sample_dashboard(), &sample_context()).unwrap();
        assert_eq!(document.content_type, "application/pdf");
        assert_eq!(document.filename, "dashboard_report_2024-06-10.pdf");
        assert!(document.bytes.starts_with(b"%PDF"));
    }
}
