use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use thiserror::Error;

use crate::strategy::{options_for, BuySell, CallPut, PctType, YesNo, DEFAULT_STRATEGY};
use crate::utils::time::to_display;

/// Settings file picked up from the working directory when `--settings` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "omegabot.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Host for the raw TCP reachability check.
    pub host: String,
    pub port: u16,
    /// URL fetched when the TCP check fails.
    pub fallback_url: String,
    pub timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            host: "8.8.8.8".to_string(),
            port: 53,
            fallback_url: "http://www.google.com".to_string(),
            timeout_ms: 3_000,
        }
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub initial_delay_ms: u64,
    pub step_interval_ms: u64,
    /// Step budget used when the input file yields no links.
    pub max_steps: u32,
    /// Emit a progress line every this many steps.
    pub progress_every: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 2_000,
            step_interval_ms: 1_500,
            max_steps: 20,
            progress_every: 5,
        }
    }
}

impl RunSettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub interval_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

/// Settings of the tool itself, as opposed to the user's strategy [`Configuration`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub probe: ProbeSettings,
    pub run: RunSettings,
    pub watch: WatchSettings,
}

impl Settings {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file at {path}"))?;
        let settings: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to deserialize TOML settings at {path}"))?;
        Ok(settings)
    }

    /// Load an explicitly requested settings file, or the default one when it exists.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(explicit: Option<&str>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => {
                Self::from_file(DEFAULT_SETTINGS_FILE)
            }
            None => Ok(Self::default()),
        }
    }
}

/// The user's strategy, date range, funds and output configuration.
///
/// Every field has a default, so a partial file deserializes into a complete
/// record. Keys this version does not know about are kept in `extra` and
/// written back on save. Numeric fields also accept their value as text.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub ticker: String,
    pub strategy: String,
    pub pct_type: PctType,
    pub buy_sell: BuySell,
    pub call_put: CallPut,
    #[serde_as(deserialize_as = "PickFirst<(_, DisplayFromStr)>")]
    pub qty: u32,
    #[serde_as(deserialize_as = "PickFirst<(_, DisplayFromStr)>")]
    pub percent: f64,
    #[serde_as(deserialize_as = "PickFirst<(_, DisplayFromStr)>")]
    pub dte: u32,
    pub use_extract_dte: YesNo,
    pub round_strike: YesNo,
    #[serde_as(deserialize_as = "PickFirst<(_, DisplayFromStr)>")]
    pub multiplier: f64,

    /// `MM/DD/YYYY` or empty.
    pub start_date: String,
    pub end_date: String,

    pub output_folder: String,
    pub output_path: String,

    // Funds are kept as the text the user typed.
    pub starting_funds: String,
    pub margin_allocation_percent: String,
    pub max_contracts_per_trade: String,
    pub max_open_trades: String,
    pub max_allocation_amount: String,
    pub prune_oldest_trades: bool,
    pub ignore_margin_requirements: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            ticker: "SPY".to_string(),
            strategy: DEFAULT_STRATEGY.to_string(),
            pct_type: PctType::Delta,
            buy_sell: BuySell::Buy,
            call_put: CallPut::Put,
            qty: 1,
            percent: 15.0,
            dte: 90,
            use_extract_dte: YesNo::No,
            round_strike: YesNo::No,
            multiplier: 0.0,
            start_date: String::new(),
            end_date: String::new(),
            output_folder: String::new(),
            output_path: String::new(),
            starting_funds: "100000".to_string(),
            margin_allocation_percent: "10".to_string(),
            max_contracts_per_trade: "1".to_string(),
            max_open_trades: String::new(),
            max_allocation_amount: String::new(),
            prune_oldest_trades: false,
            ignore_margin_requirements: true,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("unknown configuration key `{0}`")]
    UnknownKey(String),

    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Configuration {
    /// Build a record from a stored JSON object one key at a time.
    ///
    /// A key whose value does not fit its field keeps the default; every other
    /// key is taken as stored. Returns the record and the rejected keys.
    pub fn from_stored(stored: Map<String, Value>) -> (Self, Vec<String>) {
        let mut merged = match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let mut rejected = Vec::new();

        for (key, value) in stored {
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value.clone());
            match serde_json::from_value::<Self>(Value::Object(candidate)) {
                Ok(_) => {
                    merged.insert(key, value);
                }
                Err(_) => rejected.push(key),
            }
        }

        let config = serde_json::from_value(Value::Object(merged)).unwrap_or_default();
        (config, rejected)
    }

    /// Labels of required fund fields that are empty.
    pub fn missing_funds(&self) -> Vec<&'static str> {
        [
            ("Starting Funds", &self.starting_funds),
            ("Margin Allocation", &self.margin_allocation_percent),
            ("Max Contracts/Trade", &self.max_contracts_per_trade),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// Pruning old trades only applies when a max open trades limit is set.
    pub fn normalize_funds(&mut self) {
        if self.max_open_trades.trim().is_empty() {
            self.prune_oldest_trades = false;
        }
    }

    /// One-line description of the strategy legs.
    pub fn strategy_summary(&self) -> String {
        format!(
            "{} {} | QTY: {} | %: {} | DTE: {}",
            self.buy_sell, self.call_put, self.qty, self.percent, self.dte
        )
    }

    /// One-line description of the fund settings, optional fields only when set.
    pub fn funds_summary(&self) -> String {
        let mut parts = vec![
            format!("Capital: ${}", self.starting_funds.trim()),
            format!("Margen: {}%", self.margin_allocation_percent.trim()),
            format!("Contratos/trade: {}", self.max_contracts_per_trade.trim()),
        ];
        if !self.max_open_trades.trim().is_empty() {
            parts.push(format!("Max trades: {}", self.max_open_trades.trim()));
            if self.prune_oldest_trades {
                parts.push("Prune oldest".to_string());
            }
        }
        if !self.max_allocation_amount.trim().is_empty() {
            parts.push(format!("Max asignación: ${}", self.max_allocation_amount.trim()));
        }
        if self.ignore_margin_requirements {
            parts.push("Ignora margen".to_string());
        }
        parts.join(" | ")
    }

    /// Set a single key from command-line text, typed after the field's current value.
    ///
    /// Date fields accept `YYYY-MM-DD` and are stored as `MM/DD/YYYY`.
    pub fn set_field(&mut self, key: &str, raw: &str) -> Result<(), FieldError> {
        let mut value = serde_json::to_value(&*self)?;
        let map = value
            .as_object_mut()
            .ok_or_else(|| FieldError::UnknownKey(key.to_string()))?;
        let current = map
            .get(key)
            .ok_or_else(|| FieldError::UnknownKey(key.to_string()))?;

        let invalid = || FieldError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        };
        if let Some(options) = options_for(key) {
            if !options.contains(&raw.trim()) {
                return Err(invalid());
            }
        }

        let next = match current {
            Value::Bool(_) => Value::Bool(parse_flag(raw).ok_or_else(invalid)?),
            Value::Number(_) => Value::Number(
                raw.trim()
                    .parse::<serde_json::Number>()
                    .map_err(|_| invalid())?,
            ),
            _ if key == "start_date" || key == "end_date" => {
                Value::String(to_display(raw.trim()))
            }
            _ if options_for(key).is_some() => Value::String(raw.trim().to_string()),
            _ => Value::String(raw.to_string()),
        };
        map.insert(key.to_string(), next);

        *self = serde_json::from_value(value).map_err(|_| invalid())?;
        Ok(())
    }
}
