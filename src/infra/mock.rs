//! Embedded tables used when the remote sheets cannot be read.

use std::collections::BTreeMap;

use crate::domain::{
    CarrierId, FscWindow, InteriorDeliveryRecord, RateTable, TableSnapshot, Zone, ZoneRecord,
};

const MOCK_WEIGHTS: [f64; 42] = [
    0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0,
    18.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 150.0, 200.0,
    250.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, 1000.0,
];

const MOCK_ZONES: u32 = 5;

fn carrier_multiplier(carrier: CarrierId) -> f64 {
    match carrier {
        CarrierId::Dhl => 1.1,
        CarrierId::Fedex => 1.05,
        CarrierId::Ups => 1.0,
    }
}

pub fn zone_chart() -> Vec<ZoneRecord> {
    [
        ("USA", "DHL", "1"),
        ("USA", "FEDEX", "2"),
        ("USA", "UPS", "1"),
        ("UK", "DHL", "2"),
        ("UK", "FEDEX", "1"),
        ("UK", "UPS", "2"),
    ]
    .into_iter()
    .map(|(country, carrier, zone)| ZoneRecord {
        country: country.to_string(),
        carrier: carrier.to_string(),
        zone: zone.to_string(),
    })
    .collect()
}

pub fn rate_table(carrier: CarrierId) -> RateTable {
    let mut table = RateTable::new();
    for zone_number in 1..=MOCK_ZONES {
        let Ok(zone) = Zone::parse(&zone_number.to_string()) else {
            continue;
        };
        let zone_multiplier = f64::from(zone_number) * 0.2;
        for weight in MOCK_WEIGHTS {
            let rate = (weight * 100.0 * (1.0 + zone_multiplier) * carrier_multiplier(carrier))
                .round();
            table.insert(zone.clone(), weight, rate);
        }
    }
    table
}

pub fn rate_tables() -> BTreeMap<CarrierId, RateTable> {
    CarrierId::ALL
        .into_iter()
        .map(|carrier| (carrier, rate_table(carrier)))
        .collect()
}

pub fn fsc_schedule() -> Vec<FscWindow> {
    [("DHL", "15.5"), ("FEDEX", "14.2"), ("UPS", "16.0")]
        .into_iter()
        .map(|(carrier, percent)| FscWindow {
            carrier: carrier.to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-12-31".to_string(),
            fsc_percent: percent.to_string(),
        })
        .collect()
}

pub fn interior_delivery() -> Vec<InteriorDeliveryRecord> {
    [
        ("USA", "1000"),
        ("UK", "1200"),
        ("Germany", "1100"),
        ("France", "1150"),
        ("India", "800"),
    ]
    .into_iter()
    .map(|(country, amount)| InteriorDeliveryRecord {
        country: country.to_string(),
        amount: amount.to_string(),
    })
    .collect()
}

/// All four mock tables together.
pub fn snapshot() -> TableSnapshot {
    TableSnapshot {
        zone_chart: zone_chart(),
        rate_tables: rate_tables(),
        fsc_schedule: fsc_schedule(),
        interior_delivery: interior_delivery(),
    }
}
