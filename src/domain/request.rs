//! Raw shipment form input and its validation into a [`ShipmentRequest`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{CarrierId, CarrierSurcharges, ShipmentRequest};
use super::resolver::parse_amount;

/// Form fields exactly as typed. Optional surcharges may be blank.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentForm {
    pub id: String,
    pub company: String,
    pub customer_name: String,
    pub country: String,
    pub currency: String,
    pub product_value: String,
    pub weight: String,
    #[serde(default)]
    pub over_dimension: BTreeMap<CarrierId, String>,
    #[serde(default)]
    pub over_weight: BTreeMap<CarrierId, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: &'static str) {
        self.errors.push(FieldError {
            field: field.into(),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `field: message` pairs joined with `; `.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    message: &'static str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, message);
    }
    trimmed.to_string()
}

fn required_amount(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    missing: &'static str,
    negative: &'static str,
) -> f64 {
    if value.trim().is_empty() {
        errors.push(field, missing);
        return 0.0;
    }
    match parse_amount(value) {
        Some(amount) if amount >= 0.0 => amount,
        Some(_) => {
            errors.push(field, negative);
            0.0
        }
        None => {
            errors.push(field, missing);
            0.0
        }
    }
}

/// Blank or unparseable input is "not given"; negatives are rejected.
fn optional_amount(
    errors: &mut ValidationErrors,
    field: String,
    value: Option<&String>,
) -> Option<f64> {
    let amount = parse_amount(value?)?;
    if amount < 0.0 {
        errors.push(field, "Must be positive");
        return None;
    }
    Some(amount)
}

impl ShipmentForm {
    pub fn validate(&self) -> Result<ShipmentRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let id = required_text(&mut errors, "id", &self.id, "Unique ID is required");
        let company = required_text(&mut errors, "company", &self.company, "Company is required");
        let customer_name = required_text(
            &mut errors,
            "customer_name",
            &self.customer_name,
            "Customer Name is required",
        );
        let country = required_text(&mut errors, "country", &self.country, "Country is required");
        let currency =
            required_text(&mut errors, "currency", &self.currency, "Currency is required");
        let product_value = required_amount(
            &mut errors,
            "product_value",
            &self.product_value,
            "Product Value is required",
            "Value must be positive",
        );
        let weight_kg = required_amount(
            &mut errors,
            "weight",
            &self.weight,
            "Weight is required",
            "Weight must be positive",
        );

        let mut surcharges = BTreeMap::new();
        for carrier in CarrierId::ALL {
            let key = carrier.as_str().to_lowercase();
            let entry = CarrierSurcharges {
                over_dimension: optional_amount(
                    &mut errors,
                    format!("{key}_over_dimension"),
                    self.over_dimension.get(&carrier),
                ),
                over_weight: optional_amount(
                    &mut errors,
                    format!("{key}_over_weight"),
                    self.over_weight.get(&carrier),
                ),
            };
            if entry != CarrierSurcharges::default() {
                surcharges.insert(carrier, entry);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ShipmentRequest {
            id,
            company,
            customer_name,
            country,
            currency,
            product_value,
            weight_kg,
            surcharges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> ShipmentForm {
        ShipmentForm {
            id: "Q-77".into(),
            company: "Acme Exports".into(),
            customer_name: "R. Iyer".into(),
            country: " UK ".into(),
            currency: "GBP".into(),
            product_value: "1200".into(),
            weight: "12.5".into(),
            ..ShipmentForm::default()
        }
    }

    #[test]
    fn complete_form_becomes_request() {
        let mut form = filled();
        form.over_dimension.insert(CarrierId::Dhl, "300".into());
        form.over_weight.insert(CarrierId::Ups, "".into());
        form.over_weight.insert(CarrierId::Fedex, "abc".into());

        let request = form.validate().unwrap();
        assert_eq!(request.country, "UK");
        assert_eq!(request.weight_kg, 12.5);
        assert_eq!(
            request.surcharges_for(CarrierId::Dhl),
            CarrierSurcharges {
                over_dimension: Some(300.0),
                over_weight: None,
            }
        );
        assert_eq!(
            request.surcharges_for(CarrierId::Fedex),
            CarrierSurcharges::default()
        );
        assert_eq!(request.surcharges.len(), 1);
    }

    #[test]
    fn blank_form_reports_every_required_field() {
        let errors = ShipmentForm::default().validate().unwrap_err();

        assert_eq!(errors.errors.len(), 7);
        assert_eq!(errors.message_for("id"), Some("Unique ID is required"));
        assert_eq!(errors.message_for("weight"), Some("Weight is required"));
        assert_eq!(
            errors.message_for("product_value"),
            Some("Product Value is required")
        );
    }

    #[test]
    fn negative_numbers_are_rejected() {
        let mut form = filled();
        form.weight = "-1".into();
        form.product_value = "-5".into();
        form.over_weight.insert(CarrierId::Dhl, "-10".into());

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message_for("weight"), Some("Weight must be positive"));
        assert_eq!(
            errors.message_for("product_value"),
            Some("Value must be positive")
        );
        assert_eq!(errors.message_for("dhl_over_weight"), Some("Must be positive"));
    }

    #[test]
    fn error_message_lists_each_field() {
        let mut form = filled();
        form.company = " ".into();
        form.weight = "-2".into();

        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "company: Company is required; weight: Weight must be positive"
        );
    }

    #[test]
    fn zero_weight_is_allowed() {
        let mut form = filled();
        form.weight = "0".into();
        assert_eq!(form.validate().unwrap().weight_kg, 0.0);
    }
}
