//! Projection of tasks into a single-sheet XLSX workbook.
//!
//! The projector never filters: it renders exactly the tasks it is given, in
//! order, so an export always agrees with the listing for the same filters.

use chrono::{DateTime, NaiveDate, Utc};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, XlsxError};

use super::task_models::Task;

pub const SHEET_NAME: &str = "Tasks";
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADER_FILL: u32 = 0x4472C4;

/// Header text and column width, in sheet order.
pub const COLUMNS: [(&str, f64); 10] = [
    ("ID", 25.0),
    ("Author", 20.0),
    ("Division", 20.0),
    ("Task", 50.0),
    ("Date of Task", 15.0),
    ("Status", 15.0),
    ("Priority", 15.0),
    ("Created By", 20.0),
    ("Created At", 20.0),
    ("Updated At", 20.0),
];

pub struct TaskWorkbook {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn export_filename(generated_on: NaiveDate) -> String {
    format!("tasks_{}.xlsx", generated_on.format("%Y-%m-%d"))
}

/// Renders the cells of one data row.
pub fn project_row(task: &Task) -> [String; 10] {
    [
        task.id.to_string(),
        task.author.clone(),
        task.division.clone(),
        task.task.clone(),
        format_date(task.date_of_task),
        task.status.to_string(),
        task.priority.to_string(),
        task.created_by
            .as_ref()
            .map_or_else(|| "N/A".to_string(), |user| user.name.clone()),
        format_datetime(task.created_at),
        format_datetime(task.updated_at),
    ]
}

pub fn build_workbook(tasks: &[Task], generated_at: DateTime<Utc>) -> Result<TaskWorkbook, XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
    }

    for (index, task) in tasks.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in project_row(task).iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, value, &cell_format)?;
        }
    }

    worksheet.autofilter(0, 0, 0, (COLUMNS.len() - 1) as u16)?;

    Ok(TaskWorkbook {
        filename: export_filename(generated_at.date_naive()),
        bytes: workbook.save_to_buffer()?,
    })
}

/// `M/D/YYYY`, the en-US short date.
fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// `M/D/YYYY, h:mm:ss AM`, the en-US short date and time, in UTC.
fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
