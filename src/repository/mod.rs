pub mod dashboard_rows;
