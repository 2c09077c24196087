use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder value stored in `strategy` until the user picks one.
pub const DEFAULT_STRATEGY: &str = "Select strategy";

/// Strategies offered by the configuration form, placeholder first.
pub const AVAILABLE_STRATEGIES: [&str; 11] = [
    DEFAULT_STRATEGY,
    "Long Call",
    "Long Put",
    "Short Call",
    "Short Put",
    "Bull Call Spread",
    "Bear Put Spread",
    "Iron Condor",
    "Butterfly Spread",
    "Straddle",
    "Strangle",
];

/// Returns true when `strategy` names a real strategy rather than the placeholder.
///
/// Strategy selection is informational only; it never gates readiness.
pub fn strategy_selected(strategy: &str) -> bool {
    let strategy = strategy.trim();
    !strategy.is_empty() && strategy != DEFAULT_STRATEGY
}

/// How the strike selection percentage is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PctType {
    #[default]
    Delta,
    #[serde(rename = "OTM")]
    Otm,
    #[serde(rename = "Fixed Premium")]
    FixedPremium,
    #[serde(rename = "Strike Offset")]
    StrikeOffset,
    Percentage,
    Strike,
}

impl PctType {
    pub const ALL: [PctType; 6] = [
        PctType::Delta,
        PctType::Otm,
        PctType::FixedPremium,
        PctType::StrikeOffset,
        PctType::Percentage,
        PctType::Strike,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PctType::Delta => "Delta",
            PctType::Otm => "OTM",
            PctType::FixedPremium => "Fixed Premium",
            PctType::StrikeOffset => "Strike Offset",
            PctType::Percentage => "Percentage",
            PctType::Strike => "Strike",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuySell {
    #[default]
    Buy,
    Sell,
}

impl BuySell {
    pub const ALL: [BuySell; 2] = [BuySell::Buy, BuySell::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuySell::Buy => "Buy",
            BuySell::Sell => "Sell",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPut {
    Call,
    #[default]
    Put,
}

impl CallPut {
    pub const ALL: [CallPut; 2] = [CallPut::Call, CallPut::Put];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallPut::Call => "Call",
            CallPut::Put => "Put",
        }
    }
}

/// Yes/No switch as stored in the config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::Yes, YesNo::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(PctType, BuySell, CallPut, YesNo);

/// Configuration keys restricted to a fixed list of choices.
pub const OPTION_KEYS: [&str; 6] = [
    "strategy",
    "pct_type",
    "buy_sell",
    "call_put",
    "use_extract_dte",
    "round_strike",
];

/// Accepted values for a configuration key, or `None` for free-form keys.
pub fn options_for(key: &str) -> Option<Vec<&'static str>> {
    let options = match key {
        "strategy" => AVAILABLE_STRATEGIES.to_vec(),
        "pct_type" => PctType::ALL.iter().map(PctType::as_str).collect(),
        "buy_sell" => BuySell::ALL.iter().map(BuySell::as_str).collect(),
        "call_put" => CallPut::ALL.iter().map(CallPut::as_str).collect(),
        "use_extract_dte" | "round_strike" => YesNo::ALL.iter().map(YesNo::as_str).collect(),
        _ => return None,
    };
    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_not_a_selection() {
        assert!(!strategy_selected(DEFAULT_STRATEGY));
        assert!(!strategy_selected("   "));
        assert!(strategy_selected("Iron Condor"));
    }

    #[test]
    fn enums_serialize_with_form_labels() {
        assert_eq!(serde_json::to_string(&PctType::Percentage).unwrap(), "\"Percentage\"");
        assert_eq!(serde_json::to_string(&PctType::FixedPremium).unwrap(), "\"Fixed Premium\"");
        let parsed: PctType = serde_json::from_str("\"OTM\"").unwrap();
        assert_eq!(parsed, PctType::Otm);
        assert_eq!(serde_json::to_string(&CallPut::Put).unwrap(), "\"Put\"");
        let parsed: YesNo = serde_json::from_str("\"Yes\"").unwrap();
        assert!(parsed.is_yes());
        assert_eq!(BuySell::default().to_string(), "Buy");
    }

    #[test]
    fn option_lists_match_serialized_labels() {
        for key in OPTION_KEYS {
            assert!(options_for(key).is_some(), "{key}");
        }
        assert_eq!(options_for("strategy").unwrap().len(), AVAILABLE_STRATEGIES.len());
        assert_eq!(
            options_for("pct_type").unwrap(),
            vec!["Delta", "OTM", "Fixed Premium", "Strike Offset", "Percentage", "Strike"]
        );
        for label in options_for("pct_type").unwrap() {
            let parsed: PctType = serde_json::from_value(label.into()).unwrap();
            assert_eq!(parsed.as_str(), label);
        }
        assert_eq!(options_for("round_strike").unwrap(), vec!["Yes", "No"]);
        assert!(options_for("ticker").is_none());
    }
}
