use crate::io::IoError;
use crate::model::Task;
use std::path::Path;

/// Export tasks as semicolon-delimited CSV matching the import format.
///
/// Columns: Title ; Lane ; Category ; Start Date ; End Date ; Description
/// Dates are formatted as YYYY-MM-DD.
pub fn write_csv<W: std::io::Write>(tasks: &[Task], writer: W) -> Result<usize, IoError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    wtr.write_record(["Title", "Lane", "Category", "Start Date", "End Date", "Description"])?;
    for task in tasks {
        let start = task.start_date.format("%Y-%m-%d").to_string();
        let end = task.end_date.format("%Y-%m-%d").to_string();
        wtr.write_record([
            task.title.as_str(),
            task.lane.key(),
            task.category.key(),
            start.as_str(),
            end.as_str(),
            task.description.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(tasks.len())
}

/// Export tasks to a CSV file. Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, IoError> {
    let file = std::fs::File::create(path)?;
    let count = write_csv(tasks, file)?;
    tracing::info!(path = %path.display(), count, "CSV exported");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_import::import_csv_str;
    use crate::model::{Category, Lane};
    use chrono::NaiveDate;

    #[test]
    fn exported_rows_import_back() {
        let start = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let tasks = vec![
            Task::new("Write; summary", Lane::Testing, start, start + chrono::Duration::days(2))
                .with_category(Category::Delivery)
                .with_description("Who, how many"),
        ];

        let mut buf = Vec::new();
        assert_eq!(write_csv(&tasks, &mut buf).unwrap(), 1);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Title;Lane;Category;Start Date;End Date;Description"));

        let (imported, skipped) = import_csv_str(&text).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(imported[0].title, "Write; summary");
        assert_eq!(imported[0].lane, Lane::Testing);
        assert_eq!(imported[0].category, Category::Delivery);
        assert_eq!(imported[0].end_date, tasks[0].end_date);
    }
}
