//! Lookups over the reference tables.
//!
//! Every lookup is total: a miss, or a malformed cell, degrades to a fixed
//! default so a price can always be produced. The [`Lookup`] wrapper keeps
//! track of which of the two happened.

use time::{macros::format_description, Date, OffsetDateTime};
use tracing::debug;

use super::entities::{FscWindow, InteriorDeliveryRecord, Zone, ZoneRecord};
use super::tables::RateTable;

pub const DEFAULT_RATE: f64 = 100.0;
pub const DEFAULT_FSC_RATE: f64 = 0.15;
pub const DEFAULT_INTERIOR_DELIVERY: f64 = 1000.0;
pub const DEFAULT_CUSTOMS: f64 = 2000.0;

const CUSTOMS_FEES: [(&str, f64); 3] = [("DHL", 4000.0), ("FEDEX", 2000.0), ("UPS", 2750.0)];

/// Outcome of a table lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    Default(T),
}

impl<T> Lookup<T> {
    pub fn value(self) -> T {
        match self {
            Lookup::Found(value) | Lookup::Default(value) => value,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Lookup::Found(value) | Lookup::Default(value) => value,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Lookup::Default(_))
    }
}

fn same_key(left: &str, right: &str) -> bool {
    left == right || left.to_uppercase() == right.to_uppercase()
}

/// Parse a numeric table cell. Empty, non-numeric and non-finite cells are
/// treated as absent.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Zone for a destination country and carrier. First matching row wins and
/// its cell is returned as written, even when blank.
pub fn resolve_zone(zone_chart: &[ZoneRecord], country: &str, carrier: &str) -> Lookup<Zone> {
    match zone_chart
        .iter()
        .find(|record| same_key(&record.country, country) && same_key(&record.carrier, carrier))
    {
        Some(record) => Lookup::Found(Zone::from_chart(&record.zone)),
        None => {
            debug!(country, carrier, "no zone chart entry, using zone 1");
            Lookup::Default(Zone::default())
        }
    }
}

/// Per-kilogram rate for `weight` in `zone`.
///
/// The weight is rounded up to the next band. Weights above the last band
/// use the last band. A missing table, missing zone, empty zone or a zero
/// rate all yield [`DEFAULT_RATE`].
pub fn resolve_rate(rate_table: Option<&RateTable>, weight: f64, zone: &Zone) -> Lookup<f64> {
    let Some(bands) = rate_table.and_then(|table| table.bands(zone)) else {
        debug!(zone = %zone, "zone missing from rate table, using default rate");
        return Lookup::Default(DEFAULT_RATE);
    };

    let band = bands
        .iter()
        .find(|band| band.weight >= weight)
        .or_else(|| bands.last());

    match band.map(|band| band.rate) {
        Some(rate) if rate != 0.0 && !rate.is_nan() => Lookup::Found(rate),
        _ => {
            debug!(zone = %zone, weight, "no usable rate band, using default rate");
            Lookup::Default(DEFAULT_RATE)
        }
    }
}

/// `YYYY-MM-DD` rendering used for schedule comparisons.
pub fn iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Current calendar date in UTC.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Active fuel surcharge for `carrier` on `today`, as a fraction.
pub fn resolve_fsc(schedule: &[FscWindow], carrier: &str, today: Date) -> Lookup<f64> {
    resolve_fsc_on(schedule, carrier, &iso_date(today))
}

/// Same as [`resolve_fsc`] with the date already rendered.
///
/// Window bounds are compared as text, which orders correctly only for
/// zero-padded `YYYY-MM-DD` values.
pub fn resolve_fsc_on(schedule: &[FscWindow], carrier: &str, today: &str) -> Lookup<f64> {
    let active = schedule.iter().find(|window| {
        same_key(&window.carrier, carrier)
            && today >= window.start_date.as_str()
            && today <= window.end_date.as_str()
    });

    match active.map(|window| parse_amount(&window.fsc_percent)) {
        Some(Some(percent)) => Lookup::Found(percent / 100.0),
        Some(None) => {
            debug!(carrier, today, "active FSC window has no usable percentage");
            Lookup::Default(DEFAULT_FSC_RATE)
        }
        None => {
            debug!(carrier, today, "no active FSC window");
            Lookup::Default(DEFAULT_FSC_RATE)
        }
    }
}

/// Interior delivery charge for a destination country.
pub fn resolve_interior_delivery(table: &[InteriorDeliveryRecord], country: &str) -> Lookup<f64> {
    let record = table.iter().find(|record| same_key(&record.country, country));

    match record.map(|record| parse_amount(&record.amount)) {
        Some(Some(amount)) => Lookup::Found(amount),
        _ => {
            debug!(country, "no usable interior delivery charge, using default");
            Lookup::Default(DEFAULT_INTERIOR_DELIVERY)
        }
    }
}

/// Flat customs clearance fee per carrier.
pub fn resolve_customs(carrier: &str) -> Lookup<f64> {
    CUSTOMS_FEES
        .iter()
        .find(|(key, _)| same_key(key, carrier))
        .map(|(_, fee)| Lookup::Found(*fee))
        .unwrap_or(Lookup::Default(DEFAULT_CUSTOMS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use time::macros::date;

    fn zone(label: &str) -> Zone {
        Zone::parse(label).unwrap()
    }

    fn zone_chart() -> Vec<ZoneRecord> {
        vec![
            ZoneRecord {
                country: "USA".into(),
                carrier: "DHL".into(),
                zone: "1".into(),
            },
            ZoneRecord {
                country: "USA".into(),
                carrier: "FEDEX".into(),
                zone: "2".into(),
            },
            ZoneRecord {
                country: "usa".into(),
                carrier: "fedex".into(),
                zone: "4".into(),
            },
            ZoneRecord {
                country: "Chile".into(),
                carrier: "UPS".into(),
                zone: "".into(),
            },
        ]
    }

    fn rates() -> RateTable {
        RateTable::new()
            .with_rate(zone("1"), 0.5, 700.0)
            .with_rate(zone("1"), 5.0, 500.0)
            .with_rate(zone("1"), 10.0, 450.0)
            .with_rate(zone("2"), 5.0, 0.0)
    }

    fn window(carrier: &str, start: &str, end: &str, percent: &str) -> FscWindow {
        FscWindow {
            carrier: carrier.into(),
            start_date: start.into(),
            end_date: end.into(),
            fsc_percent: percent.into(),
        }
    }

    #[rstest]
    #[case("usa", "dhl")]
    #[case("USA", "DHL")]
    #[case("Usa", "Dhl")]
    fn zone_match_ignores_case(#[case] country: &str, #[case] carrier: &str) {
        assert_eq!(
            resolve_zone(&zone_chart(), country, carrier),
            Lookup::Found(zone("1"))
        );
    }

    #[test]
    fn zone_first_match_wins() {
        assert_eq!(
            resolve_zone(&zone_chart(), "USA", "FedEx"),
            Lookup::Found(zone("2"))
        );
    }

    #[rstest]
    #[case("Narnia", "DHL")]
    #[case("USA", "UPS")]
    fn zone_defaults_to_one(#[case] country: &str, #[case] carrier: &str) {
        assert_eq!(
            resolve_zone(&zone_chart(), country, carrier),
            Lookup::Default(zone("1"))
        );
    }

    #[test]
    fn blank_zone_cell_is_returned_and_misses_the_rate_table() {
        let found = resolve_zone(&zone_chart(), "chile", "ups");
        assert_eq!(found, Lookup::Found(Zone::from_chart("")));
        assert_eq!(
            resolve_rate(Some(&rates()), 5.0, found.get()),
            Lookup::Default(DEFAULT_RATE)
        );
    }

    #[test]
    fn padded_zone_cell_does_not_match_trimmed_column() {
        let chart = vec![ZoneRecord {
            country: "Peru".into(),
            carrier: "DHL".into(),
            zone: " 1 ".into(),
        }];
        let found = resolve_zone(&chart, "Peru", "DHL");
        assert_eq!(found.get().label(), " 1 ");
        assert_eq!(
            resolve_rate(Some(&rates()), 5.0, found.get()),
            Lookup::Default(DEFAULT_RATE)
        );
    }

    #[rstest]
    #[case(0.1, 700.0)]
    #[case(0.5, 700.0)]
    #[case(0.6, 500.0)]
    #[case(5.0, 500.0)]
    #[case(5.01, 450.0)]
    #[case(10.0, 450.0)]
    fn rate_rounds_up_to_next_band(#[case] weight: f64, #[case] expected: f64) {
        assert_eq!(
            resolve_rate(Some(&rates()), weight, &zone("1")),
            Lookup::Found(expected)
        );
    }

    #[rstest]
    #[case(10.5)]
    #[case(250.0)]
    #[case(1e9)]
    fn rate_clamps_to_largest_band(#[case] weight: f64) {
        assert_eq!(
            resolve_rate(Some(&rates()), weight, &zone("1")),
            Lookup::Found(450.0)
        );
    }

    #[test]
    fn rate_defaults_for_missing_zone_table_or_zero_rate() {
        assert_eq!(
            resolve_rate(Some(&rates()), 5.0, &zone("9")),
            Lookup::Default(DEFAULT_RATE)
        );
        assert_eq!(
            resolve_rate(None, 5.0, &zone("1")),
            Lookup::Default(DEFAULT_RATE)
        );
        assert_eq!(
            resolve_rate(Some(&rates()), 5.0, &zone("2")),
            Lookup::Default(DEFAULT_RATE)
        );
    }

    #[test]
    fn rate_defaults_for_zone_without_bands() {
        let mut table = RateTable::new();
        table.add_zone(zone("3"));
        assert_eq!(
            resolve_rate(Some(&table), 1.0, &zone("3")),
            Lookup::Default(DEFAULT_RATE)
        );
    }

    #[test]
    fn fsc_uses_window_covering_today() {
        let schedule = vec![
            window("DHL", "2024-01-01", "2024-06-30", "12"),
            window("DHL", "2024-07-01", "2024-12-31", "15.5"),
        ];
        let rate = resolve_fsc(&schedule, "dhl", date!(2024 - 08 - 15));
        assert_eq!(rate, Lookup::Found(0.155));
    }

    #[rstest]
    #[case("2024-01-01")]
    #[case("2024-12-31")]
    fn fsc_window_bounds_are_inclusive(#[case] today: &str) {
        let schedule = vec![window("ups", "2024-01-01", "2024-12-31", "16")];
        assert_eq!(resolve_fsc_on(&schedule, "UPS", today), Lookup::Found(0.16));
    }

    #[test]
    fn fsc_defaults_without_active_window() {
        let schedule = vec![window("DHL", "2024-01-01", "2024-12-31", "15.5")];
        assert_eq!(
            resolve_fsc(&schedule, "DHL", date!(2026 - 10 - 17)),
            Lookup::Default(0.15)
        );
        assert_eq!(
            resolve_fsc(&schedule, "UPS", date!(2024 - 05 - 01)),
            Lookup::Default(0.15)
        );
    }

    #[test]
    fn fsc_defaults_for_malformed_percentage() {
        let schedule = vec![window("FEDEX", "2024-01-01", "2024-12-31", "n/a")];
        assert_eq!(
            resolve_fsc_on(&schedule, "FEDEX", "2024-03-03"),
            Lookup::Default(0.15)
        );
    }

    // Bounds are compared as text. Without zero padding "2024-9-1" sorts
    // after "2024-10-15", so a date inside the window is reported as outside.
    #[test]
    fn fsc_unpadded_dates_compare_as_text() {
        let schedule = vec![window("DHL", "2024-9-1", "2024-12-31", "20")];
        assert_eq!(
            resolve_fsc(&schedule, "DHL", date!(2024 - 10 - 15)),
            Lookup::Default(0.15)
        );
    }

    #[test]
    fn iso_date_is_zero_padded() {
        assert_eq!(iso_date(date!(2024 - 03 - 07)), "2024-03-07");
    }

    #[rstest]
    #[case("india", Lookup::Found(800.0))]
    #[case("INDIA", Lookup::Found(800.0))]
    #[case("Peru", Lookup::Default(1000.0))]
    #[case("Chad", Lookup::Default(1000.0))]
    fn interior_delivery_lookup(#[case] country: &str, #[case] expected: Lookup<f64>) {
        let table = vec![
            InteriorDeliveryRecord {
                country: "India".into(),
                amount: "800".into(),
            },
            InteriorDeliveryRecord {
                country: "Chad".into(),
                amount: "".into(),
            },
        ];
        assert_eq!(resolve_interior_delivery(&table, country), expected);
    }

    #[rstest]
    #[case("DHL", Lookup::Found(4000.0))]
    #[case("fedex", Lookup::Found(2000.0))]
    #[case("Ups", Lookup::Found(2750.0))]
    #[case("TNT", Lookup::Default(2000.0))]
    #[case("", Lookup::Default(2000.0))]
    fn customs_fees(#[case] carrier: &str, #[case] expected: Lookup<f64>) {
        assert_eq!(resolve_customs(carrier), expected);
    }

    #[rstest]
    #[case("15.5", Some(15.5))]
    #[case(" 1000 ", Some(1000.0))]
    #[case("", None)]
    #[case("abc", None)]
    #[case("NaN", None)]
    fn amount_parsing(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_amount(raw), expected);
    }
}
