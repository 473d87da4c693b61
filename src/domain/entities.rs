use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three carriers every quote is compared across.
///
/// Declaration order is the display order (FedEx, DHL, UPS).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarrierId {
    Fedex,
    Dhl,
    Ups,
}

impl CarrierId {
    pub const ALL: [CarrierId; 3] = [CarrierId::Fedex, CarrierId::Dhl, CarrierId::Ups];

    /// Upper-case key used by the reference tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            CarrierId::Fedex => "FEDEX",
            CarrierId::Dhl => "DHL",
            CarrierId::Ups => "UPS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CarrierId::Fedex => "FedEx",
            CarrierId::Dhl => "DHL",
            CarrierId::Ups => "UPS",
        }
    }

    /// Case-insensitive comparison against a raw table cell.
    pub fn matches(&self, raw: &str) -> bool {
        raw.eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown carrier: {0}")]
pub struct UnknownCarrier(pub String);

impl FromStr for CarrierId {
    type Err = UnknownCarrier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CarrierId::ALL
            .into_iter()
            .find(|carrier| carrier.matches(s.trim()))
            .ok_or_else(|| UnknownCarrier(s.to_string()))
    }
}

/// Zone label as it appears in the zone chart (`"3"`) and, prefixed, in
/// rate sheet headers (`"Zone 3"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Zone(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneParseError {
    #[error("zone label is empty")]
    Empty,
    #[error("rate sheet header `{0}` is not a zone column")]
    NotAZoneHeader(String),
}

impl Zone {
    pub const HEADER_PREFIX: &'static str = "Zone ";

    /// Parse a bare zone label such as `"1"` or `" 4 "`.
    pub fn parse(label: &str) -> Result<Self, ZoneParseError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(ZoneParseError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Zone cell exactly as the zone chart holds it, untrimmed and possibly
    /// empty. A label with no matching rate sheet column prices at the
    /// default rate.
    pub fn from_chart(cell: &str) -> Self {
        Self(cell.to_string())
    }

    /// Parse a rate sheet column header such as `"Zone 2"`.
    pub fn from_header(header: &str) -> Result<Self, ZoneParseError> {
        header
            .strip_prefix(Self::HEADER_PREFIX)
            .ok_or_else(|| ZoneParseError::NotAZoneHeader(header.to_string()))
            .and_then(Self::parse)
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// Column header form, `"Zone <label>"`.
    pub fn header(&self) -> String {
        format!("{}{}", Self::HEADER_PREFIX, self.0)
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self("1".to_string())
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One zone chart row. Cells are kept as delivered by the data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub country: String,
    pub carrier: String,
    pub zone: String,
}

/// One fuel surcharge window. Dates stay as `YYYY-MM-DD` text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FscWindow {
    pub carrier: String,
    pub start_date: String,
    pub end_date: String,
    pub fsc_percent: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteriorDeliveryRecord {
    pub country: String,
    pub amount: String,
}

/// Optional per-carrier charges entered alongside a shipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierSurcharges {
    pub over_dimension: Option<f64>,
    pub over_weight: Option<f64>,
}

/// A single user submission, priced once per carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub id: String,
    pub company: String,
    pub customer_name: String,
    pub country: String,
    /// Informational only; quotes are never converted.
    pub currency: String,
    pub product_value: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub surcharges: BTreeMap<CarrierId, CarrierSurcharges>,
}

impl ShipmentRequest {
    pub fn surcharges_for(&self, carrier: CarrierId) -> CarrierSurcharges {
        self.surcharges.get(&carrier).copied().unwrap_or_default()
    }
}

/// Itemized cost for one carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub zone: Zone,
    pub base_rate: f64,
    pub air_freight: f64,
    pub demand_surcharge: f64,
    pub over_dimension: f64,
    pub over_weight: f64,
    pub interior_delivery: f64,
    /// Fraction, e.g. `0.155`.
    pub fsc_rate: f64,
    pub fsc_amount: f64,
    pub customs: f64,
    pub total_freight: f64,
    pub gst: f64,
    pub cushion: f64,
    pub final_total: f64,
}

impl CostBreakdown {
    /// FSC rate scaled for display (`15.5` for `0.155`).
    pub fn fsc_percent(&self) -> f64 {
        self.fsc_rate * 100.0
    }

    /// Quotes are reported in a single currency, so this is the final total.
    pub fn converted_amount(&self) -> f64 {
        self.final_total
    }
}

/// Side-by-side result for one shipment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierComparison {
    pub request_id: String,
    pub quotes: BTreeMap<CarrierId, CostBreakdown>,
}

impl CarrierComparison {
    pub fn get(&self, carrier: CarrierId) -> Option<&CostBreakdown> {
        self.quotes.get(&carrier)
    }

    /// Carrier with the lowest final total. Ties keep the earlier carrier.
    pub fn cheapest(&self) -> Option<(CarrierId, &CostBreakdown)> {
        self.quotes
            .iter()
            .fold(None, |best: Option<(CarrierId, &CostBreakdown)>, (carrier, quote)| {
                match best {
                    Some((_, current)) if current.final_total <= quote.final_total => best,
                    _ => Some((*carrier, quote)),
                }
            })
    }
}
