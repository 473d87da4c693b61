//! Read-only snapshot of the four reference tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entities::{CarrierId, FscWindow, InteriorDeliveryRecord, Zone, ZoneRecord};

/// A weight breakpoint and the per-kilogram rate that applies up to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightBand {
    pub weight: f64,
    pub rate: f64,
}

/// Rates for one carrier: zone → weight bands sorted by ascending weight.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    zones: BTreeMap<Zone, Vec<WeightBand>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a zone with no bands yet.
    pub fn add_zone(&mut self, zone: Zone) {
        self.zones.entry(zone).or_default();
    }

    /// Insert or replace the rate at `weight`. NaN weights are ignored.
    pub fn insert(&mut self, zone: Zone, weight: f64, rate: f64) {
        if weight.is_nan() {
            return;
        }
        let bands = self.zones.entry(zone).or_default();
        match bands.binary_search_by(|band| band.weight.total_cmp(&weight)) {
            Ok(index) => bands[index].rate = rate,
            Err(index) => bands.insert(index, WeightBand { weight, rate }),
        }
    }

    pub fn with_rate(mut self, zone: Zone, weight: f64, rate: f64) -> Self {
        self.insert(zone, weight, rate);
        self
    }

    /// Bands for `zone`, or `None` when the zone has no column.
    pub fn bands(&self, zone: &Zone) -> Option<&[WeightBand]> {
        self.zones.get(zone).map(Vec::as_slice)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.keys()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// The tables every calculation reads. Built once per load and never
/// mutated by the pricing code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub zone_chart: Vec<ZoneRecord>,
    pub rate_tables: BTreeMap<CarrierId, RateTable>,
    pub fsc_schedule: Vec<FscWindow>,
    pub interior_delivery: Vec<InteriorDeliveryRecord>,
}

impl TableSnapshot {
    /// Whether enough data is present to price anything at all.
    pub fn is_loaded(&self) -> bool {
        !self.zone_chart.is_empty() && !self.rate_tables.is_empty()
    }

    pub fn rate_table(&self, carrier: CarrierId) -> Option<&RateTable> {
        self.rate_tables.get(&carrier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn zone(label: &str) -> Zone {
        Zone::parse(label).unwrap()
    }

    #[test]
    fn bands_stay_sorted_regardless_of_insert_order() {
        let table = RateTable::new()
            .with_rate(zone("1"), 10.0, 90.0)
            .with_rate(zone("1"), 0.5, 150.0)
            .with_rate(zone("1"), 5.0, 110.0);

        let weights: Vec<f64> = table
            .bands(&zone("1"))
            .unwrap()
            .iter()
            .map(|band| band.weight)
            .collect();
        assert_eq!(weights, vec![0.5, 5.0, 10.0]);
    }

    #[test]
    fn duplicate_weight_keeps_last_rate() {
        let table = RateTable::new()
            .with_rate(zone("2"), 5.0, 100.0)
            .with_rate(zone("2"), 5.0, 120.0);

        assert_eq!(
            table.bands(&zone("2")).unwrap(),
            &[WeightBand {
                weight: 5.0,
                rate: 120.0
            }]
        );
    }

    #[test]
    fn nan_weight_is_dropped() {
        let mut table = RateTable::new();
        table.add_zone(zone("1"));
        table.insert(zone("1"), f64::NAN, 300.0);
        assert_eq!(table.bands(&zone("1")).unwrap().len(), 0);
    }

    #[test]
    fn snapshot_requires_zone_chart_and_rates() {
        let mut snapshot = TableSnapshot::default();
        assert!(!snapshot.is_loaded());

        snapshot.zone_chart.push(ZoneRecord {
            country: "USA".into(),
            carrier: "DHL".into(),
            zone: "1".into(),
        });
        assert!(!snapshot.is_loaded());

        snapshot
            .rate_tables
            .insert(CarrierId::Dhl, RateTable::new().with_rate(zone("1"), 1.0, 1.0));
        assert!(snapshot.is_loaded());
    }
}
