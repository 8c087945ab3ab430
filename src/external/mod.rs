pub mod chart_data;
pub mod csv_chart_data;
