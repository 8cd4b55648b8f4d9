/// CSV rendering of task exports.

use super::ExportError;
use crate::models::task::TaskExportRow;
use chrono::{DateTime, Utc};

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const HEADER: [&str; 10] = [
    "id",
    "title",
    "status",
    "start_date",
    "end_date",
    "hours",
    "done",
    "executor",
    "reviewer",
    "comment",
];

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn record(row: &TaskExportRow) -> [String; 10] {
    [
        row.id.to_string(),
        row.title.clone(),
        row.status.clone().unwrap_or_default(),
        date(row.start_date),
        date(row.end_date),
        row.hours.map(|h| h.to_string()).unwrap_or_default(),
        if row.is_done { "yes" } else { "no" }.to_string(),
        row.executor.clone().unwrap_or_default(),
        row.reviewer.clone().unwrap_or_default(),
        row.comment.clone().unwrap_or_default(),
    ]
}

/// Renders rows under a header line. An empty slice yields only the header.
pub async fn render_tasks(rows: &[TaskExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv_async::AsyncWriterBuilder::new()
        .has_headers(false)
        .create_writer(Vec::new());

    writer.write_record(HEADER).await?;
    for row in rows {
        writer.write_record(record(row)).await?;
    }

    writer
        .into_inner()
        .await
        .map_err(|e| ExportError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(id: i32) -> TaskExportRow {
        TaskExportRow {
            id,
            title: format!("Task {}", id),
            status: Some("IN_PROGRESS".into()),
            start_date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
            end_date: None,
            hours: Some(4.5),
            is_done: false,
            executor: Some("Petrov Ivan".into()),
            reviewer: None,
            comment: Some("needs review, urgent".into()),
        }
    }

    #[tokio::test]
    async fn test_header_only_for_empty_export() {
        let bytes = render_tasks(&[]).await.unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "id,title,status,start_date,end_date,hours,done,executor,reviewer,comment\n"
        );
    }

    #[tokio::test]
    async fn test_rows_follow_header() {
        let bytes = render_tasks(&[row(1), row(2)]).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1,Task 1,IN_PROGRESS,2025-03-01,,4.5,no,Petrov Ivan,,\"needs review, urgent\""
        );
        assert!(lines[2].starts_with("2,Task 2,"));
    }
}
