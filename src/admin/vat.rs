//! VAT rate selection: a predefined national rate or a custom percentage

use crate::errors::FormError;

/// National rates offered by the dropdown, in display order
pub const PREDEFINED_RATES: [f64; 5] = [20.0, 10.0, 5.5, 2.1, 0.0];

pub const DEFAULT_RATE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub enum VatChoice {
    /// Dropdown value as displayed, e.g. "5.5"
    Predefined(String),
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VatSelection {
    choice: VatChoice,
    custom: String,
    /// Set once the custom value is typed; a stored rate is accepted as is
    typed: bool,
}

impl Default for VatSelection {
    fn default() -> Self {
        Self {
            choice: VatChoice::Predefined(format_rate(DEFAULT_RATE)),
            custom: String::new(),
            typed: false,
        }
    }
}

pub fn format_rate(rate: f64) -> String {
    format!("{}", rate)
}

fn in_range(rate: f64) -> bool {
    rate.is_finite() && (0.0..=100.0).contains(&rate)
}

impl VatSelection {
    /// Selection matching a stored rate
    pub fn from_rate(rate: f64) -> Self {
        if PREDEFINED_RATES.iter().any(|r| *r == rate) {
            Self {
                choice: VatChoice::Predefined(format_rate(rate)),
                custom: String::new(),
                typed: false,
            }
        } else {
            Self {
                choice: VatChoice::Custom,
                custom: format_rate(rate),
                typed: false,
            }
        }
    }

    pub fn choice(&self) -> &VatChoice {
        &self.choice
    }

    pub fn custom_value(&self) -> &str {
        &self.custom
    }

    pub fn is_custom(&self) -> bool {
        self.choice == VatChoice::Custom
    }

    /// Choose a dropdown value; clears any custom override
    pub fn select_predefined(&mut self, value: &str) {
        self.choice = VatChoice::Predefined(value.to_string());
        self.custom.clear();
        self.typed = false;
    }

    pub fn select_custom(&mut self) {
        self.choice = VatChoice::Custom;
    }

    pub fn set_custom_value(&mut self, value: &str) {
        self.custom = value.to_string();
        self.typed = true;
    }

    /// Move through the dropdown entries (predefined rates, then "custom")
    pub fn cycle(&mut self, forward: bool) {
        let slots = PREDEFINED_RATES.len() + 1;
        let current = match &self.choice {
            VatChoice::Predefined(value) => PREDEFINED_RATES
                .iter()
                .position(|r| format_rate(*r) == *value)
                .unwrap_or(0),
            VatChoice::Custom => PREDEFINED_RATES.len(),
        };
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        match PREDEFINED_RATES.get(next) {
            Some(rate) => self.select_predefined(&format_rate(*rate)),
            None => self.select_custom(),
        }
    }

    /// Rate submitted with the payload; always finite and within [0, 100]
    pub fn resolve(&self) -> f64 {
        match &self.choice {
            VatChoice::Predefined(value) => value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|rate| in_range(*rate))
                .unwrap_or(DEFAULT_RATE),
            VatChoice::Custom => self
                .custom
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|rate| in_range(*rate))
                .unwrap_or(0.0),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if !self.is_custom() {
            return Ok(());
        }
        let value = self.custom.trim();
        if value.is_empty() {
            return Err(FormError::CustomVatRequired);
        }
        let decimals = value.split_once('.').map(|(_, d)| d.len()).unwrap_or(0);
        match value.parse::<f64>() {
            Ok(rate) if in_range(rate) && (decimals <= 1 || !self.typed) => Ok(()),
            _ => Err(FormError::InvalidCustomVat(value.to_string())),
        }
    }

    pub fn display(&self) -> String {
        match &self.choice {
            VatChoice::Predefined(value) => format!("{} %", value),
            VatChoice::Custom => "Custom".to_string(),
        }
    }
}
