//! Thin asynchronous client for the spreadsheet values API.
//!
//! - Reads the four reference tables from their sheets.
//! - Falls back to the embedded mock tables per table when a sheet cannot be read.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    time::SystemTime,
};

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    CarrierId, FscWindow, InteriorDeliveryRecord, RateTable, TableSnapshot, Zone, ZoneRecord,
};
use crate::infra::mock;
use crate::util::config::{SheetIds, Settings};

const DEFAULT_RANGE: &str = "A:Z";
const USER_AGENT: &str = concat!("freight-quote/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("base URL cannot carry a sheet path: {0}")]
    UnusableBaseUrl(String),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no sheet id configured for {0}")]
    MissingSheetId(&'static str),
    #[error("no API key configured")]
    MissingApiKey,
}

/// Where a table's contents came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableSource {
    Live,
    Mock,
    Cached,
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableSource::Live => "live",
            TableSource::Mock => "mock",
            TableSource::Cached => "cached",
        })
    }
}

#[derive(Clone, Debug)]
pub struct TablePayload<T> {
    pub data: T,
    pub source: TableSource,
}

impl<T> TablePayload<T> {
    fn new(data: T, source: TableSource) -> Self {
        Self { data, source }
    }
}

/// Per-table provenance of a loaded snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub zone_chart: TableSource,
    pub rate_tables: TableSource,
    pub fsc_schedule: TableSource,
    pub interior_delivery: TableSource,
    pub loaded_at: SystemTime,
}

impl LoadReport {
    pub fn uniform(source: TableSource) -> Self {
        Self {
            zone_chart: source,
            rate_tables: source,
            fsc_schedule: source,
            interior_delivery: source,
            loaded_at: SystemTime::now(),
        }
    }

    pub fn sources(&self) -> [(&'static str, TableSource); 4] {
        [
            ("zone chart", self.zone_chart),
            ("rate tables", self.rate_tables),
            ("fuel surcharge", self.fsc_schedule),
            ("interior delivery", self.interior_delivery),
        ]
    }

    pub fn is_live(&self) -> bool {
        self.sources()
            .iter()
            .all(|(_, source)| *source == TableSource::Live)
    }

    pub fn uses_mock(&self) -> bool {
        self.sources()
            .iter()
            .any(|(_, source)| *source == TableSource::Mock)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Cell>>,
}

/// A sheet cell read as text, whatever JSON type the API used.
#[derive(Debug)]
struct Cell(String);

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        string_from_json(deserializer).map(Cell)
    }
}

#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    sheet_ids: SheetIds,
}

impl SheetsClient {
    pub fn new(settings: &Settings) -> Result<Self, SheetsError> {
        let base_url = Url::parse(&settings.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(SheetsError::UnusableBaseUrl(settings.base_url.clone()));
        }
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.clone(),
            sheet_ids: settings.sheet_ids.clone(),
        })
    }

    /// Raw cell grid of one sheet. A sheet with no `values` is empty.
    pub async fn fetch_sheet_values(
        &self,
        sheet_id: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let api_key = self.api_key.as_deref().ok_or(SheetsError::MissingApiKey)?;
        let url = self.values_url(sheet_id, api_key)?;

        let response = self.http.get(url).send().await?.error_for_status()?;
        let range: ValueRange = response.json().await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.0).collect())
            .collect())
    }

    async fn fetch_named(
        &self,
        table: &'static str,
        sheet_id: Option<&str>,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let sheet_id = sheet_id.ok_or(SheetsError::MissingSheetId(table))?;
        let rows = self.fetch_sheet_values(sheet_id).await?;
        info!(table, rows = rows.len(), "fetched sheet");
        Ok(rows)
    }

    pub async fn fetch_zone_chart(&self) -> TablePayload<Vec<ZoneRecord>> {
        match self
            .fetch_named("zone chart", self.sheet_ids.zone_chart.as_deref())
            .await
        {
            Ok(rows) => TablePayload::new(zone_records(&rows), TableSource::Live),
            Err(error) => {
                warn!(%error, "zone chart unavailable, using mock data");
                TablePayload::new(mock::zone_chart(), TableSource::Mock)
            }
        }
    }

    /// The three carrier sheets are fetched together; if any one fails all
    /// three are replaced by mock data.
    pub async fn fetch_rate_tables(&self) -> TablePayload<BTreeMap<CarrierId, RateTable>> {
        let ids = &self.sheet_ids;
        let fetched = tokio::try_join!(
            self.fetch_named("UPS rates", ids.ups_rates.as_deref()),
            self.fetch_named("DHL rates", ids.dhl_rates.as_deref()),
            self.fetch_named("FEDEX rates", ids.fedex_rates.as_deref()),
        );

        match fetched {
            Ok((ups, dhl, fedex)) => {
                let tables: BTreeMap<CarrierId, RateTable> = [
                    (CarrierId::Ups, ups),
                    (CarrierId::Dhl, dhl),
                    (CarrierId::Fedex, fedex),
                ]
                .into_iter()
                .map(|(carrier, rows)| (carrier, rate_table(&rows)))
                .collect();
                TablePayload::new(tables, TableSource::Live)
            }
            Err(error) => {
                warn!(%error, "rate charts unavailable, using mock data");
                TablePayload::new(mock::rate_tables(), TableSource::Mock)
            }
        }
    }

    pub async fn fetch_fsc_schedule(&self) -> TablePayload<Vec<FscWindow>> {
        match self
            .fetch_named("fuel surcharge", self.sheet_ids.fsc.as_deref())
            .await
        {
            Ok(rows) => TablePayload::new(fsc_windows(&rows), TableSource::Live),
            Err(error) => {
                warn!(%error, "fuel surcharge schedule unavailable, using mock data");
                TablePayload::new(mock::fsc_schedule(), TableSource::Mock)
            }
        }
    }

    pub async fn fetch_interior_delivery(&self) -> TablePayload<Vec<InteriorDeliveryRecord>> {
        match self
            .fetch_named(
                "interior delivery",
                self.sheet_ids.interior_delivery.as_deref(),
            )
            .await
        {
            Ok(rows) => TablePayload::new(interior_records(&rows), TableSource::Live),
            Err(error) => {
                warn!(%error, "interior delivery charges unavailable, using mock data");
                TablePayload::new(mock::interior_delivery(), TableSource::Mock)
            }
        }
    }

    /// Load all four tables concurrently and assemble a snapshot.
    pub async fn load_snapshot(&self) -> (TableSnapshot, LoadReport) {
        let (zone_chart, rate_tables, fsc_schedule, interior_delivery) = tokio::join!(
            self.fetch_zone_chart(),
            self.fetch_rate_tables(),
            self.fetch_fsc_schedule(),
            self.fetch_interior_delivery(),
        );

        let report = LoadReport {
            zone_chart: zone_chart.source,
            rate_tables: rate_tables.source,
            fsc_schedule: fsc_schedule.source,
            interior_delivery: interior_delivery.source,
            loaded_at: SystemTime::now(),
        };
        let snapshot = TableSnapshot {
            zone_chart: zone_chart.data,
            rate_tables: rate_tables.data,
            fsc_schedule: fsc_schedule.data,
            interior_delivery: interior_delivery.data,
        };
        info!(
            zones = snapshot.zone_chart.len(),
            fsc_windows = snapshot.fsc_schedule.len(),
            interior = snapshot.interior_delivery.len(),
            live = report.is_live(),
            "reference tables loaded"
        );
        (snapshot, report)
    }

    fn values_url(&self, sheet_id: &str, api_key: &str) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::UnusableBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([sheet_id, "values", DEFAULT_RANGE]);
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

/// Turn a header row plus data rows into column-name → cell maps. Missing
/// cells read as empty strings.
pub fn rows_to_records(rows: &[Vec<String>]) -> Vec<HashMap<String, String>> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    data.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(index, name)| (name.clone(), row.get(index).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

fn column(record: &HashMap<String, String>, name: &str) -> String {
    record.get(name).cloned().unwrap_or_default()
}

pub fn zone_records(rows: &[Vec<String>]) -> Vec<ZoneRecord> {
    rows_to_records(rows)
        .iter()
        .map(|record| ZoneRecord {
            country: column(record, "Country"),
            carrier: column(record, "Carrier"),
            zone: column(record, "Zone"),
        })
        .collect()
}

pub fn fsc_windows(rows: &[Vec<String>]) -> Vec<FscWindow> {
    rows_to_records(rows)
        .iter()
        .map(|record| FscWindow {
            carrier: column(record, "Carrier"),
            start_date: column(record, "Starting Date"),
            end_date: column(record, "End Date"),
            fsc_percent: column(record, "FSC %"),
        })
        .collect()
}

pub fn interior_records(rows: &[Vec<String>]) -> Vec<InteriorDeliveryRecord> {
    rows_to_records(rows)
        .iter()
        .map(|record| InteriorDeliveryRecord {
            country: column(record, "Country"),
            amount: column(record, "Amount"),
        })
        .collect()
}

/// Build a rate table from a `Weight, Zone 1, Zone 2, ...` sheet.
///
/// Rows whose weight does not parse are skipped; rate cells that do not
/// parse become zero.
pub fn rate_table(rows: &[Vec<String>]) -> RateTable {
    let mut table = RateTable::new();
    let Some((header, data)) = rows.split_first() else {
        return table;
    };

    let zones: Vec<(usize, Zone)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, name)| Zone::from_header(name).ok().map(|zone| (index, zone)))
        .collect();

    for (_, zone) in &zones {
        table.add_zone(zone.clone());
    }

    for row in data {
        let Some(weight) = row.first().and_then(|cell| cell.trim().parse::<f64>().ok()) else {
            continue;
        };
        for (index, zone) in &zones {
            let rate = row
                .get(*index)
                .and_then(|cell| cell.trim().parse::<f64>().ok())
                .filter(|rate| rate.is_finite())
                .unwrap_or(0.0);
            table.insert(zone.clone(), weight, rate);
        }
    }

    table
}

fn string_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct CellText;

    impl<'de> serde::de::Visitor<'de> for CellText {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number, boolean or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(CellText)
}
