//! Command-line front end.
//!
//! Commands:
//!   quote    - Price a shipment with every carrier
//!   tables   - Summarise the loaded reference tables
//!   version  - Print the version
//!   help     - Print usage

pub mod render;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    compare_carriers, today_utc, CarrierId, CostError, ShipmentForm, ValidationErrors,
};
use crate::infra::{load_tables, LoadOptions};
use crate::util::config::{ConfigError, Settings};
use crate::util::version::{version_label, APP_NAME};

pub const USAGE: &str = "\
Usage: freight-quote <command> [options]

Commands:
  quote     Compare FedEx, DHL and UPS costs for one shipment
  tables    Show the loaded reference tables
  version   Print the version
  help      Show this message

Quote options:
  --country <name>              Destination country (required)
  --weight <kg>                 Shipment weight in kg (required)
  --company <name>              Shipper company (required)
  --customer <name>             Customer name (required)
  --currency <code>             Currency label (required, display only)
  --product-value <amount>      Declared product value (required)
  --id <text>                   Quote identifier (default: random UUID)
  --fedex-over-dimension <amt>  Optional per-carrier charges; likewise
  --fedex-over-weight <amt>     --dhl-* and --ups-*
  --json                        Print JSON instead of a text report

Common options:
  --refresh                     Ignore cached tables and fetch them again
  --offline                     Use the built-in sample tables
  --cache <path>                Cache file location
  --verbose                     Debug logging (or set RUST_LOG)
";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("option {0} needs a value")]
    MissingValue(String),
    #[error("invalid shipment: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Cost(#[from] CostError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Quote { form: ShipmentForm, json: bool },
    Tables,
    Version,
    Help,
}

#[derive(Clone, Debug)]
pub struct Invocation {
    pub command: Command,
    pub load: LoadOptions,
    pub verbose: bool,
}

fn surcharge_slot<'a>(form: &'a mut ShipmentForm, flag: &str) -> Option<&'a mut String> {
    let rest = flag.strip_prefix("--")?;
    let (carrier, kind) = rest.split_once("-over-")?;
    let carrier: CarrierId = carrier.parse().ok()?;
    let map = match kind {
        "dimension" => &mut form.over_dimension,
        "weight" => &mut form.over_weight,
        _ => return None,
    };
    Some(map.entry(carrier).or_default())
}

/// Parse `args` (without the program name).
pub fn parse_args(args: &[String]) -> Result<Invocation, CliError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Invocation {
            command: Command::Help,
            load: LoadOptions::default(),
            verbose: false,
        });
    };

    let mut form = ShipmentForm::default();
    let mut json = false;
    let mut load = LoadOptions::default();
    let mut verbose = false;

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if arg.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        match flag {
            "--json" => json = true,
            "--refresh" => load.refresh = true,
            "--offline" => load.offline = true,
            "--verbose" | "-v" => verbose = true,
            _ => {
                let mut value = || {
                    inline
                        .clone()
                        .or_else(|| iter.next().cloned())
                        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
                };
                match flag {
                    "--country" => form.country = value()?,
                    "--weight" => form.weight = value()?,
                    "--company" => form.company = value()?,
                    "--customer" => form.customer_name = value()?,
                    "--currency" => form.currency = value()?,
                    "--product-value" => form.product_value = value()?,
                    "--id" => form.id = value()?,
                    "--cache" => load.cache_path = Some(PathBuf::from(value()?)),
                    _ => match surcharge_slot(&mut form, flag) {
                        Some(slot) => *slot = value()?,
                        None => return Err(CliError::UnknownOption(flag.to_string())),
                    },
                }
            }
        }
    }

    let command = match name.as_str() {
        "quote" => Command::Quote { form, json },
        "tables" => Command::Tables,
        "version" | "--version" => Command::Version,
        "help" | "--help" | "-h" => Command::Help,
        other => return Err(CliError::UnknownCommand(other.to_string())),
    };

    Ok(Invocation {
        command,
        load,
        verbose,
    })
}

/// Execute a parsed invocation, returning what should be printed.
pub async fn run(invocation: Invocation) -> Result<String, CliError> {
    match invocation.command {
        Command::Help => Ok(USAGE.to_string()),
        Command::Version => Ok(format!("{APP_NAME} {}\n", version_label())),
        Command::Tables => {
            let settings = Settings::load()?;
            let loaded = load_tables(&settings, &invocation.load).await;
            Ok(render::render_tables_text(&loaded.snapshot, &loaded.report))
        }
        Command::Quote { mut form, json } => {
            if form.id.trim().is_empty() {
                form.id = Uuid::new_v4().to_string();
            }
            let request = form.validate()?;
            let settings = Settings::load()?;
            let loaded = load_tables(&settings, &invocation.load).await;

            let comparison = compare_carriers(&request, &loaded.snapshot, today_utc())?;
            info!(id = %request.id, country = %request.country, "quote computed");

            if json {
                let mut out = render::render_quote_json(&request, &comparison, &loaded.report)?;
                out.push('\n');
                Ok(out)
            } else {
                Ok(render::render_quote_text(
                    &request,
                    &comparison,
                    &loaded.report,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn quote_flags_fill_the_form() {
        let invocation = parse_args(&args(&[
            "quote",
            "--country",
            "UK",
            "--weight=12.5",
            "--company",
            "Acme",
            "--dhl-over-dimension",
            "300",
            "--ups-over-weight=40",
            "--json",
            "--offline",
        ]))
        .unwrap();

        let Command::Quote { form, json } = invocation.command else {
            panic!("expected quote command");
        };
        assert!(json);
        assert!(invocation.load.offline);
        assert_eq!(form.country, "UK");
        assert_eq!(form.weight, "12.5");
        assert_eq!(
            form.over_dimension.get(&CarrierId::Dhl).map(String::as_str),
            Some("300")
        );
        assert_eq!(
            form.over_weight.get(&CarrierId::Ups).map(String::as_str),
            Some("40")
        );
    }

    #[test]
    fn no_arguments_means_help() {
        assert_eq!(parse_args(&[]).unwrap().command, Command::Help);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(
            parse_args(&args(&["ship"])),
            Err(CliError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_args(&args(&["quote", "--tnt-over-weight", "5"])),
            Err(CliError::UnknownOption(_))
        ));
        assert!(matches!(
            parse_args(&args(&["quote", "--weight"])),
            Err(CliError::MissingValue(_))
        ));
    }

    #[tokio::test]
    async fn offline_quote_renders_report() {
        let invocation = parse_args(&args(&[
            "quote",
            "--country",
            "India",
            "--weight",
            "2",
            "--company",
            "Acme",
            "--customer",
            "R. Iyer",
            "--currency",
            "INR",
            "--product-value",
            "5000",
            "--offline",
        ]))
        .unwrap();

        let output = run(invocation).await.unwrap();
        assert!(output.contains("DHL (Zone 1)"));
        assert!(output.contains("Interior Delivery"));
        assert!(output.contains("₹800.00"));
    }

    #[tokio::test]
    async fn invalid_quote_is_rejected_before_loading() {
        let invocation = parse_args(&args(&["quote", "--weight", "-3", "--offline"])).unwrap();
        assert!(matches!(run(invocation).await, Err(CliError::Invalid(_))));
    }
}
