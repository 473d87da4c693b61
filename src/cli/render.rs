//! Text and JSON rendering of quotes and table summaries.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::{
    CarrierComparison, CarrierId, CostBreakdown, ShipmentRequest, TableSnapshot,
};
use crate::infra::{LoadReport, TableSource};
use crate::util::format::{format_inr, format_percent};

const LABEL_WIDTH: usize = 20;

/// One carrier's breakdown plus the derived display figures.
#[derive(Serialize)]
pub struct QuoteLine<'a> {
    #[serde(flatten)]
    pub breakdown: &'a CostBreakdown,
    pub fsc_percent: f64,
    pub converted_amount: f64,
}

impl<'a> From<&'a CostBreakdown> for QuoteLine<'a> {
    fn from(breakdown: &'a CostBreakdown) -> Self {
        Self {
            breakdown,
            fsc_percent: breakdown.fsc_percent(),
            converted_amount: breakdown.converted_amount(),
        }
    }
}

#[derive(Serialize)]
pub struct QuoteReport<'a> {
    pub request: &'a ShipmentRequest,
    pub quotes: BTreeMap<CarrierId, QuoteLine<'a>>,
    pub cheapest: Option<CarrierId>,
    pub table_sources: &'a LoadReport,
}

impl<'a> QuoteReport<'a> {
    pub fn new(
        request: &'a ShipmentRequest,
        comparison: &'a CarrierComparison,
        report: &'a LoadReport,
    ) -> Self {
        Self {
            request,
            quotes: comparison
                .quotes
                .iter()
                .map(|(carrier, quote)| (*carrier, QuoteLine::from(quote)))
                .collect(),
            cheapest: comparison.cheapest().map(|(carrier, _)| carrier),
            table_sources: report,
        }
    }
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{value:>16}");
}

fn render_breakdown(out: &mut String, carrier: CarrierId, quote: &CostBreakdown) {
    let _ = writeln!(out, "{} (Zone {})", carrier.display_name(), quote.zone);
    line(out, "Base rate / kg", &format_inr(quote.base_rate));
    line(out, "Air Freight", &format_inr(quote.air_freight));
    line(out, "Demand Surcharge", &format_inr(quote.demand_surcharge));
    line(out, "Over Dimension", &format_inr(quote.over_dimension));
    line(out, "Over Weight", &format_inr(quote.over_weight));
    line(out, "Interior Delivery", &format_inr(quote.interior_delivery));
    line(
        out,
        &format!("FSC ({}%)", format_percent(quote.fsc_percent())),
        &format_inr(quote.fsc_amount),
    );
    line(out, "Customs", &format_inr(quote.customs));
    line(out, "Freight", &format_inr(quote.total_freight));
    line(out, "GST (18%)", &format_inr(quote.gst));
    line(out, "Cushion (13%)", &format_inr(quote.cushion));
    line(out, "Total", &format_inr(quote.final_total));
}

fn render_sources(out: &mut String, report: &LoadReport) {
    let sources: Vec<String> = report
        .sources()
        .iter()
        .map(|(name, source)| format!("{name}: {source}"))
        .collect();
    let _ = writeln!(out, "Tables: {}", sources.join(", "));
    if report.uses_mock() {
        let _ = writeln!(
            out,
            "Note: some tables could not be loaded and built-in sample data was used."
        );
    }
}

pub fn render_quote_text(
    request: &ShipmentRequest,
    comparison: &CarrierComparison,
    report: &LoadReport,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Quote {} for {} ({}) to {}, {} kg",
        request.id, request.company, request.customer_name, request.country, request.weight_kg
    );
    let _ = writeln!(out);

    for (carrier, quote) in &comparison.quotes {
        render_breakdown(&mut out, *carrier, quote);
        let _ = writeln!(out);
    }

    if let Some((carrier, quote)) = comparison.cheapest() {
        let _ = writeln!(
            out,
            "Cheapest: {} at {}",
            carrier.display_name(),
            format_inr(quote.final_total)
        );
    }
    render_sources(&mut out, report);
    out
}

pub fn render_quote_json(
    request: &ShipmentRequest,
    comparison: &CarrierComparison,
    report: &LoadReport,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&QuoteReport::new(request, comparison, report))
}

pub fn render_tables_text(snapshot: &TableSnapshot, report: &LoadReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Zone chart: {} rows", snapshot.zone_chart.len());
    for carrier in CarrierId::ALL {
        match snapshot.rate_table(carrier) {
            Some(table) => {
                let zones: Vec<String> = table
                    .zones()
                    .map(|zone| {
                        let bands = table.bands(zone).map_or(0, <[_]>::len);
                        format!("{} ({bands} bands)", zone.header())
                    })
                    .collect();
                let _ = writeln!(
                    out,
                    "{} rates: {}",
                    carrier.display_name(),
                    if table.is_empty() {
                        "no zones".to_string()
                    } else {
                        zones.join(", ")
                    }
                );
            }
            None => {
                let _ = writeln!(out, "{} rates: missing", carrier.display_name());
            }
        }
    }
    let _ = writeln!(out, "Fuel surcharge windows: {}", snapshot.fsc_schedule.len());
    for window in &snapshot.fsc_schedule {
        let _ = writeln!(
            out,
            "  {} {}..{} {}%",
            window.carrier, window.start_date, window.end_date, window.fsc_percent
        );
    }
    let _ = writeln!(
        out,
        "Interior delivery: {} countries",
        snapshot.interior_delivery.len()
    );
    render_sources(&mut out, report);
    if report.zone_chart == TableSource::Cached {
        let _ = writeln!(out, "Run with --refresh to fetch fresh tables.");
    }
    out
}
