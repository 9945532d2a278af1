use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, IntoUrl, Url};
use serde::Deserialize;

use crate::error::FetchError;
use crate::models::{Sample, Series};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_RANGE: &str = "Sheet1!A:B";
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Anything that can hand over a cleaned, date-ordered series.
#[async_trait]
pub trait SeriesProvider {
    async fn fetch_series(&self) -> Result<Series, FetchError>;

    /// Short description used in logs and report headers.
    fn describe(&self) -> String;
}

/// A raw `(date, weight)` pair before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub date: String,
    pub weight: String,
}

impl RawRow {
    pub fn new(date: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            weight: weight.into(),
        }
    }
}

/// Parses rows, drops the ones that do not yield a valid date and finite
/// weight, orders by date and keeps the last entry for each day.
pub fn clean_rows(rows: impl IntoIterator<Item = RawRow>) -> Series {
    let mut series: Series = Vec::new();

    for (line, row) in rows.into_iter().enumerate() {
        let Some(date) = parse_date(&row.date) else {
            tracing::warn!(line, date = %row.date, "dropping row with unreadable date");
            continue;
        };
        let Some(weight) = parse_weight(&row.weight) else {
            tracing::warn!(line, weight = %row.weight, "dropping row with unreadable weight");
            continue;
        };
        series.push(Sample::new(date, weight));
    }

    series.sort_by_key(|sample| sample.date);

    let mut deduped: Series = Vec::with_capacity(series.len());
    for sample in series {
        match deduped.last_mut() {
            Some(last) if last.date == sample.date => *last = sample,
            _ => deduped.push(sample),
        }
    }
    deduped
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

pub fn parse_weight(value: &str) -> Option<f64> {
    let normalized = value.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite())
}

async fn get_checked(client: &Client, url: impl IntoUrl) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(FetchError::Status { status, body });
    }

    Ok(body)
}

/// Reads the values range of a Google Sheet through the public API key.
pub struct SheetsProvider {
    client: Client,
    sheet_id: String,
    api_key: String,
    range: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsProvider {
    pub fn new(sheet_id: String, api_key: String, range: String) -> Self {
        Self {
            client: Client::new(),
            sheet_id,
            api_key,
            range,
        }
    }

    fn url(&self) -> Result<Url, FetchError> {
        let mut url = Url::parse(SHEETS_API).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(SHEETS_API.to_string()))?
            .extend([self.sheet_id.as_str(), "values", self.range.as_str()]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

/// First row of the range is the header.
pub fn parse_value_range(body: &str) -> Result<Series, FetchError> {
    let range: ValueRange = serde_json::from_str(body)?;
    let rows = range.values.into_iter().skip(1).map(|cells| {
        let mut cells = cells.into_iter().map(cell_text);
        RawRow {
            date: cells.next().unwrap_or_default(),
            weight: cells.next().unwrap_or_default(),
        }
    });
    Ok(clean_rows(rows))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SeriesProvider for SheetsProvider {
    async fn fetch_series(&self) -> Result<Series, FetchError> {
        tracing::info!(sheet = %self.sheet_id, range = %self.range, "fetching sheet values");
        let body = get_checked(&self.client, self.url()?).await?;
        parse_value_range(&body)
    }

    fn describe(&self) -> String {
        format!("Google Sheet {} ({})", self.sheet_id, self.range)
    }
}

/// Reads a JSON array of `{date, weight}` objects, where `weight` may be a
/// string or a number.
pub struct EndpointProvider {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct EndpointRow {
    #[serde(default)]
    date: serde_json::Value,
    #[serde(default)]
    weight: serde_json::Value,
}

impl EndpointProvider {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

pub fn parse_endpoint_rows(body: &str) -> Result<Series, FetchError> {
    let rows: Vec<EndpointRow> = serde_json::from_str(body)?;
    Ok(clean_rows(
        rows.into_iter()
            .map(|row| RawRow::new(cell_text(row.date), cell_text(row.weight))),
    ))
}

#[async_trait]
impl SeriesProvider for EndpointProvider {
    async fn fetch_series(&self) -> Result<Series, FetchError> {
        tracing::info!(url = %self.url, "fetching series from endpoint");
        let body = get_checked(&self.client, &self.url).await?;
        parse_endpoint_rows(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a local `date,weight` CSV file with a header row.
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Short or malformed records reach `clean_rows` and are dropped there.
/// Fields after the date are rejoined so an unquoted decimal comma
/// (`2024-04-02,81,5`) still reads as one weight.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Series, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let date = record.get(0).unwrap_or_default();
        let weight = record.iter().skip(1).collect::<Vec<_>>().join(",");
        rows.push(RawRow::new(date, weight));
    }

    Ok(clean_rows(rows))
}

#[async_trait]
impl SeriesProvider for CsvProvider {
    async fn fetch_series(&self) -> Result<Series, FetchError> {
        tracing::info!(path = %self.path.display(), "reading series from CSV");
        let contents = tokio::fs::read(&self.path).await?;
        read_csv(contents.as_slice())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
