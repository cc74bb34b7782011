//! Support request reports.
//!
//! Two CSV files are produced. The intermediate report keeps every resolved
//! field under alphabetically sorted columns; the final report is the curated
//! layout people work from, with split date/time fields and the blank
//! `month_asked` and `resolution` columns that are filled in by hand.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;

use crate::search::Mention;
use crate::thread::ThreadRecord;
use crate::users::Directory;
use crate::{AppError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%m/%d/%Y";
const TIME_FORMAT: &str = "%I:%M:%S %p";

pub const INTERMEDIATE_COLUMNS: [&str; 11] = [
    "ask_ts",
    "asker_name",
    "last_msg_ts",
    "mentioner_handle",
    "mentioner_name",
    "msg_text",
    "respond_ts",
    "responder_name",
    "slack_link",
    "thread_ts",
    "timestamp",
];

pub const FINAL_COLUMNS: [&str; 12] = [
    "date_asked",
    "month_asked",
    "time_asked",
    "asker_name",
    "date_responded",
    "time_responded",
    "responder_name",
    "date_resolved",
    "time_resolved",
    "msg_text",
    "resolution",
    "slack_link",
];

/// One support request: the mention, its thread and the resolved names
#[derive(Debug, Clone, PartialEq)]
pub struct SupportRequestRow {
    pub mentioner_name: Option<String>,
    pub mentioner_handle: Option<String>,
    pub timestamp: NaiveDateTime,
    pub msg_text: String,
    pub slack_link: String,
    pub thread_ts: Option<String>,
    pub asker_name: Option<String>,
    pub ask_ts: Option<NaiveDateTime>,
    pub responder_name: Option<String>,
    pub respond_ts: Option<NaiveDateTime>,
    pub last_msg_ts: Option<NaiveDateTime>,
}

impl SupportRequestRow {
    pub fn assemble(mention: Mention, thread: Option<ThreadRecord>, directory: &Directory) -> Self {
        let thread = thread.unwrap_or_default();
        let thread_ts = mention.thread_ts();

        Self {
            mentioner_name: directory.real_name(mention.mentioner_id.as_deref()),
            mentioner_handle: mention.mentioner_handle,
            timestamp: mention.timestamp,
            msg_text: mention.text,
            slack_link: mention.permalink,
            thread_ts,
            asker_name: directory.real_name(thread.asker_id.as_deref()),
            ask_ts: thread.ask_ts,
            responder_name: directory.real_name(thread.responder_id.as_deref()),
            respond_ts: thread.respond_ts,
            last_msg_ts: thread.last_ts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeSplit {
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Display date (`11/06/2019`) and time (`02:05:30 PM`) of a timestamp
pub fn split_timestamp(ts: Option<NaiveDateTime>) -> DateTimeSplit {
    match ts {
        Some(ts) => DateTimeSplit {
            date: Some(ts.format(DATE_FORMAT).to_string()),
            time: Some(ts.format(TIME_FORMAT).to_string()),
        },
        None => DateTimeSplit::default(),
    }
}

/// Parse a timestamp cell of the intermediate report. Blank or malformed
/// cells are `None`.
pub fn parse_report_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

/// A row of the final report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalRow {
    pub asked: DateTimeSplit,
    pub asker_name: Option<String>,
    pub responded: DateTimeSplit,
    pub responder_name: Option<String>,
    pub resolved: DateTimeSplit,
    pub msg_text: Option<String>,
    pub slack_link: Option<String>,
}

impl From<&SupportRequestRow> for FinalRow {
    fn from(row: &SupportRequestRow) -> Self {
        Self {
            asked: split_timestamp(row.ask_ts),
            asker_name: row.asker_name.clone(),
            responded: split_timestamp(row.respond_ts),
            responder_name: row.responder_name.clone(),
            resolved: split_timestamp(row.last_msg_ts),
            msg_text: Some(row.msg_text.clone()),
            slack_link: Some(row.slack_link.clone()),
        }
    }
}

fn format_timestamp(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
}

fn string_schema(columns: &[&str]) -> SchemaRef {
    Arc::new(Schema::new(
        columns
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

fn string_column<T>(rows: &[T], value: impl Fn(&T) -> Option<String>) -> ArrayRef {
    let values: Vec<Option<String>> = rows.iter().map(value).collect();
    Arc::new(StringArray::from(values)) as ArrayRef
}

fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).map_err(|e| AppError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .map_err(|e| AppError::Csv(e.to_string()))?;
    Ok(())
}

pub fn write_intermediate_csv(path: &Path, rows: &[SupportRequestRow]) -> Result<()> {
    // order must follow INTERMEDIATE_COLUMNS
    let batch = RecordBatch::try_new(
        string_schema(&INTERMEDIATE_COLUMNS),
        vec![
            string_column(rows, |r| format_timestamp(r.ask_ts)),
            string_column(rows, |r| r.asker_name.clone()),
            string_column(rows, |r| format_timestamp(r.last_msg_ts)),
            string_column(rows, |r| r.mentioner_handle.clone()),
            string_column(rows, |r| r.mentioner_name.clone()),
            string_column(rows, |r| Some(r.msg_text.clone())),
            string_column(rows, |r| format_timestamp(r.respond_ts)),
            string_column(rows, |r| r.responder_name.clone()),
            string_column(rows, |r| Some(r.slack_link.clone())),
            string_column(rows, |r| r.thread_ts.clone()),
            string_column(rows, |r| format_timestamp(Some(r.timestamp))),
        ],
    )
    .map_err(|e| AppError::Csv(e.to_string()))?;

    write_csv(path, &batch)
}

pub fn write_final_csv(path: &Path, rows: &[FinalRow]) -> Result<()> {
    // order must follow FINAL_COLUMNS
    let batch = RecordBatch::try_new(
        string_schema(&FINAL_COLUMNS),
        vec![
            string_column(rows, |r| r.asked.date.clone()),
            string_column(rows, |_| None),
            string_column(rows, |r| r.asked.time.clone()),
            string_column(rows, |r| r.asker_name.clone()),
            string_column(rows, |r| r.responded.date.clone()),
            string_column(rows, |r| r.responded.time.clone()),
            string_column(rows, |r| r.responder_name.clone()),
            string_column(rows, |r| r.resolved.date.clone()),
            string_column(rows, |r| r.resolved.time.clone()),
            string_column(rows, |r| r.msg_text.clone()),
            string_column(rows, |_| None),
            string_column(rows, |r| r.slack_link.clone()),
        ],
    )
    .map_err(|e| AppError::Csv(e.to_string()))?;

    write_csv(path, &batch)
}

fn column_values(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>> {
    let array = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::Csv(format!("missing column {name}")))?;

    Ok((0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i).to_string()))
        .collect())
}

fn split_cells(cells: Vec<Option<String>>) -> Vec<DateTimeSplit> {
    cells
        .into_iter()
        .map(|cell| split_timestamp(cell.as_deref().and_then(parse_report_timestamp)))
        .collect()
}

/// Rebuild the final report rows from an intermediate report on disk.
pub fn read_final_rows(intermediate_path: &Path) -> Result<Vec<FinalRow>> {
    let file = File::open(intermediate_path).map_err(|e| AppError::ReadFile {
        path: intermediate_path.display().to_string(),
        source: e,
    })?;

    let reader = ReaderBuilder::new(string_schema(&INTERMEDIATE_COLUMNS))
        .with_header(true)
        .build(file)
        .map_err(|e| AppError::Csv(e.to_string()))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| AppError::Csv(e.to_string()))?;

        let asked = split_cells(column_values(&batch, "ask_ts")?);
        let responded = split_cells(column_values(&batch, "respond_ts")?);
        let resolved = split_cells(column_values(&batch, "last_msg_ts")?);
        let asker_names = column_values(&batch, "asker_name")?;
        let responder_names = column_values(&batch, "responder_name")?;
        let texts = column_values(&batch, "msg_text")?;
        let links = column_values(&batch, "slack_link")?;

        let batch_rows = asked
            .into_iter()
            .zip(responded)
            .zip(resolved)
            .zip(asker_names)
            .zip(responder_names)
            .zip(texts)
            .zip(links)
            .map(
                |((((((asked, responded), resolved), asker_name), responder_name), msg_text), slack_link)| {
                    FinalRow {
                        asked,
                        asker_name,
                        responded,
                        responder_name,
                        resolved,
                        msg_text,
                        slack_link,
                    }
                },
            );
        rows.extend(batch_rows);
    }

    Ok(rows)
}
