use std::path::Path;

use chrono::NaiveDate;

use crate::io::IoError;
use crate::model::plan::validate_task;
use crate::model::{Category, Lane, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Title,
    Start,
    End,
    Lane,
    Category,
    Description,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn header_to_column(header: &str) -> Option<Column> {
    let normalized = header.trim().to_lowercase().replace([' ', '-', '_'], "");
    match normalized.as_str() {
        "title" | "name" | "task" | "taskname" | "tasktitle" | "label" => Some(Column::Title),
        "start" | "startdate" | "from" | "begin" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "due" | "duedate" => Some(Column::End),
        "lane" | "timeline" | "stream" | "workstream" | "track" => Some(Column::Lane),
        "category" | "type" | "kind" => Some(Column::Category),
        "description" | "notes" | "note" | "details" => Some(Column::Description),
        _ => None,
    }
}

/// Import tasks from a CSV file.
///
/// Returns `(tasks, skipped_count)` on success.
pub fn import_csv(path: &Path) -> Result<(Vec<Task>, usize), IoError> {
    let content = std::fs::read_to_string(path)?;
    let result = import_csv_str(&content)?;
    tracing::info!(path = %path.display(), imported = result.0.len(), skipped = result.1, "CSV imported");
    Ok(result)
}

/// Import tasks from CSV text.
///
/// The delimiter is auto-detected and headers are matched loosely. Rows with a
/// missing title, an unparseable date, an unknown lane, or an end before the
/// start are skipped and counted.
pub fn import_csv_str(content: &str) -> Result<(Vec<Task>, usize), IoError> {
    let first_line = content.lines().next().unwrap_or("");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers.iter().map(header_to_column).collect();

    let required = [Column::Title, Column::Start, Column::End, Column::Lane];
    if !required.iter().all(|r| columns.contains(&Some(*r))) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(IoError::Format(format!(
            "CSV is missing required columns. Found headers: {:?}. \
             Need columns for: title, start date, end date, lane.",
            found
        )));
    }

    let mut tasks = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(row, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let field = |col: Column| {
            columns
                .iter()
                .position(|c| *c == Some(col))
                .and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let Some(title) = field(Column::Title) else {
            skipped += 1;
            continue;
        };
        let (Some(start), Some(end)) = (
            field(Column::Start).and_then(parse_date),
            field(Column::End).and_then(parse_date),
        ) else {
            tracing::warn!(row, title, "skipping row with invalid dates");
            skipped += 1;
            continue;
        };
        let Some(lane) = field(Column::Lane).and_then(Lane::parse) else {
            tracing::warn!(row, title, "skipping row with unknown lane");
            skipped += 1;
            continue;
        };
        let category = field(Column::Category)
            .and_then(Category::parse)
            .unwrap_or(Category::Planning);

        let mut task = Task::new(title, lane, start, end).with_category(category);
        if let Some(description) = field(Column::Description) {
            task = task.with_description(description);
        }

        if let Err(e) = validate_task(&task) {
            tracing::warn!(row, title, error = %e, "skipping invalid task");
            skipped += 1;
            continue;
        }
        tasks.push(task);
    }

    if tasks.is_empty() && skipped > 0 {
        return Err(IoError::Format(format!(
            "No valid tasks found in CSV ({} rows skipped)",
            skipped
        )));
    }
    if tasks.is_empty() {
        return Err(IoError::Format("CSV file is empty or has no data rows".to_string()));
    }

    Ok((tasks, skipped))
}
