//! Cost composition: turns one shipment and one carrier into an itemized
//! breakdown.

use std::collections::BTreeMap;

use thiserror::Error;
use time::Date;
use tracing::debug;

use super::entities::{CarrierComparison, CarrierId, CostBreakdown, ShipmentRequest};
use super::resolver::{
    resolve_customs, resolve_fsc, resolve_interior_delivery, resolve_rate, resolve_zone,
};
use super::tables::TableSnapshot;

pub const DEMAND_SURCHARGE_RATE: f64 = 0.10;
pub const GST_RATE: f64 = 0.18;
pub const CUSHION_RATE: f64 = 0.13;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CostError {
    #[error("Freight data not loaded. Please wait or refresh the data.")]
    DataUnavailable,
}

/// Which lookups fell back to a default while pricing one carrier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupAudit {
    pub zone: bool,
    pub rate: bool,
    pub fsc: bool,
    pub interior_delivery: bool,
    pub customs: bool,
}

impl LookupAudit {
    pub fn any(&self) -> bool {
        self.zone || self.rate || self.fsc || self.interior_delivery || self.customs
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricedCarrier {
    pub carrier: CarrierId,
    pub breakdown: CostBreakdown,
    pub audit: LookupAudit,
}

/// Optional surcharge input; missing and non-finite values count as zero.
fn surcharge(value: Option<f64>) -> f64 {
    value.filter(|amount| amount.is_finite()).unwrap_or(0.0)
}

/// Price one carrier and record which lookups were defaulted.
pub fn price_carrier(
    request: &ShipmentRequest,
    carrier: CarrierId,
    tables: &TableSnapshot,
    today: Date,
) -> Result<PricedCarrier, CostError> {
    if !tables.is_loaded() {
        return Err(CostError::DataUnavailable);
    }
    Ok(price_loaded(request, carrier, tables, today))
}

fn price_loaded(
    request: &ShipmentRequest,
    carrier: CarrierId,
    tables: &TableSnapshot,
    today: Date,
) -> PricedCarrier {
    let weight = request.weight_kg;
    let country = request.country.as_str();
    let extras = request.surcharges_for(carrier);

    let zone = resolve_zone(&tables.zone_chart, country, carrier.as_str());
    let base_rate = resolve_rate(tables.rate_table(carrier), weight, zone.get());
    let air_freight = weight * *base_rate.get();
    let demand_surcharge = air_freight * DEMAND_SURCHARGE_RATE;
    let over_dimension = surcharge(extras.over_dimension);
    let over_weight = surcharge(extras.over_weight);
    let interior_delivery = resolve_interior_delivery(&tables.interior_delivery, country);
    let customs = resolve_customs(carrier.as_str());
    let fsc_rate = resolve_fsc(&tables.fsc_schedule, carrier.as_str(), today);

    let fsc_amount = (air_freight
        + demand_surcharge
        + over_dimension
        + over_weight
        + *interior_delivery.get())
        * *fsc_rate.get();
    let total_freight = air_freight
        + demand_surcharge
        + over_dimension
        + over_weight
        + *interior_delivery.get()
        + fsc_amount
        + *customs.get();
    let gst = total_freight * GST_RATE;
    let cushion = (total_freight + gst) * CUSHION_RATE;
    let final_total = total_freight + gst + cushion;

    let audit = LookupAudit {
        zone: zone.is_default(),
        rate: base_rate.is_default(),
        fsc: fsc_rate.is_default(),
        interior_delivery: interior_delivery.is_default(),
        customs: customs.is_default(),
    };
    debug!(%carrier, final_total, defaults = ?audit, "priced carrier");

    PricedCarrier {
        carrier,
        breakdown: CostBreakdown {
            zone: zone.value(),
            base_rate: base_rate.value(),
            air_freight,
            demand_surcharge,
            over_dimension,
            over_weight,
            interior_delivery: interior_delivery.value(),
            fsc_rate: fsc_rate.value(),
            fsc_amount,
            customs: customs.value(),
            total_freight,
            gst,
            cushion,
            final_total,
        },
        audit,
    }
}

/// Itemized cost of shipping `request` with `carrier`.
pub fn compute_cost(
    request: &ShipmentRequest,
    carrier: CarrierId,
    tables: &TableSnapshot,
    today: Date,
) -> Result<CostBreakdown, CostError> {
    price_carrier(request, carrier, tables, today).map(|priced| priced.breakdown)
}

/// Price every carrier for one shipment.
///
/// The loaded-data check runs once, before any lookup.
pub fn compare_carriers(
    request: &ShipmentRequest,
    tables: &TableSnapshot,
    today: Date,
) -> Result<CarrierComparison, CostError> {
    if !tables.is_loaded() {
        return Err(CostError::DataUnavailable);
    }

    let quotes: BTreeMap<CarrierId, CostBreakdown> = CarrierId::ALL
        .into_iter()
        .map(|carrier| (carrier, price_loaded(request, carrier, tables, today).breakdown))
        .collect();

    Ok(CarrierComparison {
        request_id: request.id.clone(),
        quotes,
    })
}
