//! Pricing logic: reference tables, lookups and cost composition.

pub mod composer;
pub mod entities;
pub mod request;
pub mod resolver;
pub mod tables;

pub use composer::{
    compare_carriers, compute_cost, price_carrier, CostError, LookupAudit, PricedCarrier,
};
pub use entities::{
    CarrierComparison, CarrierId, CarrierSurcharges, CostBreakdown, FscWindow,
    InteriorDeliveryRecord, ShipmentRequest, UnknownCarrier, Zone, ZoneParseError, ZoneRecord,
};
pub use request::{FieldError, ShipmentForm, ValidationErrors};
pub use resolver::{
    resolve_customs, resolve_fsc, resolve_fsc_on, resolve_interior_delivery, resolve_rate,
    resolve_zone, today_utc, Lookup,
};
pub use tables::{RateTable, TableSnapshot, WeightBand};
