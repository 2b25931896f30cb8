use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub view_mode: Option<String>,
    pub export: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Daily,
    Monthly,
}

impl ViewMode {
    /// Parses the `viewMode` query value. Absent or blank uses `default`.
    pub fn parse(raw: Option<&str>, default: Self) -> Result<Self, AppError> {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(default);
        };
        match value {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            _ => Err(AppError::BadRequest(format!(
                "Unsupported view mode '{value}'. Use 'daily' or 'monthly'."
            ))),
        }
    }

    /// `DEFAULT_VIEW_MODE` is read case-insensitively; request values are not.
    pub fn from_setting(raw: Option<&str>) -> Self {
        let lowered = raw.map(str::to_ascii_lowercase);
        Self::parse(lowered.as_deref(), Self::Daily).unwrap_or(Self::Daily)
    }

    /// Label reported next to each headline metric.
    pub fn period_label(self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Monthly => "month",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            None | Some("") | Some("json") => Ok(Self::Json),
            Some("excel") => Ok(Self::Excel),
            Some("pdf") => Ok(Self::Pdf),
            Some(_) => Err(AppError::BadRequest("Unsupported export format".to_string())),
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_bookings: i64,
    pub total_bookings_change: f64,
    pub total_bookings_period: &'static str,
    pub total_revenue: f64,
    pub total_revenue_change: f64,
    pub total_revenue_period: &'static str,
    pub total_guests: i64,
    pub total_guests_change: f64,
    pub total_guests_period: &'static str,
    pub available_rooms: i64,
    pub available_rooms_change: f64,
    pub available_rooms_period: &'static str,
    pub available_spaces: i64,
    pub available_spaces_change: f64,
    pub available_spaces_period: &'static str,
    pub occupancy_data: Vec<OccupancyPoint>,
    pub revenue_data: Vec<RevenuePoint>,
    pub room_type_performance: Vec<RoomTypePerformance>,
    pub visitor_data: Vec<VisitorSlice>,
    pub visitor_trending: f64,
    pub date_range: DateRange,
    /// Comparison-window values, shown in exports only.
    #[serde(skip)]
    pub previous: PreviousTotals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreviousTotals {
    pub bookings: i64,
    pub revenue: f64,
    pub guests: i64,
    pub available_rooms: i64,
    pub available_spaces: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyPoint {
    pub date: String,
    pub occupancy: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub date: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypePerformance {
    pub room_type: String,
    pub booking_frequency: i64,
    pub avg_stay_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitorSlice {
    pub name: String,
    pub visitors: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub previous_start_date: NaiveDate,
    pub previous_end_date: NaiveDate,
    pub view_mode: ViewMode,
}

#[cfg(test)]
mod tests {
    use super::{ExportFormat, ViewMode};

    #[test]
    fn view_mode_defaults_and_rejects_unknown() {
        assert_eq!(ViewMode::parse(None, ViewMode::Daily).ok(), Some(ViewMode::Daily));
        assert_eq!(
            ViewMode::parse(Some("  "), ViewMode::Monthly).ok(),
            Some(ViewMode::Monthly)
        );
        assert_eq!(
            ViewMode::parse(Some("monthly"), ViewMode::Daily).ok(),
            Some(ViewMode::Monthly)
        );
        assert!(ViewMode::parse(Some("Monthly"), ViewMode::Daily).is_err());
        assert!(ViewMode::parse(Some("weekly"), ViewMode::Daily).is_err());
        assert_eq!(ViewMode::from_setting(Some("weekly")), ViewMode::Daily);
        assert_eq!(ViewMode::from_setting(Some("Monthly")), ViewMode::Monthly);
    }

    #[test]
    fn export_format_accepts_known_values_only() {
        assert_eq!(ExportFormat::parse(None).ok(), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse(Some("json")).ok(), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse(Some("excel")).ok(), Some(ExportFormat::Excel));
        assert!(ExportFormat::parse(Some("EXCEL")).is_err());
        assert_eq!(ExportFormat::parse(Some("pdf")).ok(), Some(ExportFormat::Pdf));

        let error = ExportFormat::parse(Some("xml")).err().map(|error| error.to_string());
        assert_eq!(error.as_deref(), Some("Unsupported export format"));
    }
}
