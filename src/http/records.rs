//! Viewer page and CSV export for persisted submissions.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use tracing::error;

use crate::models::SubmissionRecord;
use crate::state::AppState;
use crate::utils::{escape_html, format_export_stamp};

use super::HttpError;

/// UTF-8 byte-order mark, prepended for spreadsheet compatibility.
const BOM: char = '\u{feff}';
const CSV_HEADER: &str = "No,Submitted At,Unit Number,Name";

pub async fn view_records(State(state): State<AppState>) -> Result<Html<String>, HttpError> {
    let records = state.storage.list_all().await.map_err(|err| {
        error!("Failed to read submissions for viewer: {err}");
        HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load submissions".to_string(),
        )
    })?;
    Ok(Html(render_records_page(&records)))
}

pub async fn export_csv(State(state): State<AppState>) -> Result<Response, HttpError> {
    let records = state.storage.list_all().await.map_err(|err| {
        error!("Failed to read submissions for CSV export: {err}");
        HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate CSV".to_string(),
        )
    })?;

    let filename = format!(
        "door-access-log_{}.csv",
        format_export_stamp(Utc::now(), state.utc_offset_hours)
    );
    let headers = [
        (
            header::CONTENT_TYPE,
            "text/csv; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, render_csv(&records)).into_response())
}

/// One row per record, newest first, numbered from 1. Double quotes inside
/// the name are escaped by doubling.
fn render_csv(records: &[SubmissionRecord]) -> String {
    let mut csv = format!("{BOM}{CSV_HEADER}\n");
    for (index, record) in records.iter().rev().enumerate() {
        let escaped_name = record.name.replace('"', "\"\"");
        csv.push_str(&format!(
            "{},\"{}\",\"{}\",\"{}\"\n",
            index + 1,
            record.submitted_at,
            record.unit_number,
            escaped_name
        ));
    }
    csv
}

fn render_records_page(records: &[SubmissionRecord]) -> String {
    let total = records.len();
    let table = if records.is_empty() {
        "    <p>No submissions yet.</p>\n".to_string()
    } else {
        let mut rows = String::new();
        for (index, record) in records.iter().rev().enumerate() {
            rows.push_str(&format!(
                "        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                total - index,
                escape_html(&record.submitted_at),
                record.unit_number,
                escape_html(&record.name),
            ));
        }
        format!(
            "    <table>\n      <thead>\n        <tr><th>#</th><th>Submitted At</th>\
             <th>Unit Number</th><th>Name</th></tr>\n      </thead>\n      <tbody>\n\
             {rows}      </tbody>\n    </table>\n"
        )
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
           <meta charset=\"UTF-8\">\n\
           <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
           <title>Door Access Issue Reports</title>\n\
           <style>\n\
             body {{ font-family: sans-serif; margin: 24px; }}\n\
             table {{ border-collapse: collapse; width: 100%; }}\n\
             th, td {{ border-bottom: 1px solid #ddd; padding: 8px 12px; text-align: left; }}\n\
           </style>\n\
         </head>\n\
         <body>\n\
           <h1>Door Access Issue Reports</h1>\n\
           <p>Total reports: <strong>{total}</strong> &middot; \
         <a href=\"/records/export.csv\">Download CSV</a></p>\n\
         {table}\
         </body>\n\
         </html>\n"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use crate::http::testing::{MockStore, test_state};

    use super::*;

    fn record(unit: u16, name: &str, submitted_at: &str) -> SubmissionRecord {
        SubmissionRecord {
            unit_number: unit,
            name: name.to_string(),
            submitted_at: submitted_at.to_string(),
        }
    }

    fn seeded_records() -> Vec<SubmissionRecord> {
        vec![
            record(101, "Alice", "2026-03-01 09:00:00"),
            record(202, "Bob \"Bobby\"", "2026-03-01 10:00:00"),
            record(303, "Cara", "2026-03-01 11:00:00"),
        ]
    }

    fn state_with_store(store: Arc<MockStore>) -> AppState {
        let (state, _, _) = test_state();
        AppState::new(
            store,
            state.notifier.clone(),
            state.rate_limiter.clone(),
            state.utc_offset_hours,
        )
    }

    async fn get(state: AppState, uri: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        crate::http::router(state).oneshot(request).await.unwrap()
    }

    #[test]
    fn csv_is_newest_first_with_bom_and_doubled_quotes() {
        let csv = render_csv(&seeded_records());
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "\u{feff}No,Submitted At,Unit Number,Name");
        assert_eq!(
            lines.next().unwrap(),
            "1,\"2026-03-01 11:00:00\",\"303\",\"Cara\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "2,\"2026-03-01 10:00:00\",\"202\",\"Bob \"\"Bobby\"\"\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "3,\"2026-03-01 09:00:00\",\"101\",\"Alice\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_of_empty_store_is_header_only() {
        let csv = render_csv(&[]);
        assert_eq!(csv, "\u{feff}No,Submitted At,Unit Number,Name\n");
    }

    #[test]
    fn page_shows_total_and_escapes_names() {
        let mut records = seeded_records();
        records.push(record(404, "<script>", "2026-03-01 12:00:00"));
        let page = render_records_page(&records);
        assert!(page.contains("Total reports: <strong>4</strong>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("/records/export.csv"));
        // Newest record keeps the highest display number.
        assert!(page.contains("<tr><td>4</td><td>2026-03-01 12:00:00</td>"));
    }

    #[tokio::test]
    async fn viewer_returns_200_with_table() {
        let state = state_with_store(Arc::new(MockStore::seeded(seeded_records())));
        let response = get(state, "/records").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("Alice"));
        assert!(page.contains("Total reports: <strong>3</strong>"));
    }

    #[tokio::test]
    async fn csv_endpoint_sets_download_headers() {
        let state = state_with_store(Arc::new(MockStore::seeded(seeded_records())));
        let response = get(state, "/records/export.csv").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"door-access-log_"));
        assert!(disposition.ends_with(".csv\""));
    }

    #[tokio::test]
    async fn read_failure_returns_500() {
        let state = state_with_store(Arc::new(MockStore::failing()));
        assert_eq!(
            get(state.clone(), "/records").await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get(state, "/records/export.csv").await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
