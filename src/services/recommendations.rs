use crate::services::hydraulics::HoseState;
use serde::{Deserialize, Serialize};

pub const SUPPLY_DISCONNECTED_WARNING: &str = "Waarschuwing: Aanvoerslang is niet aangesloten";
pub const RETURN_DISCONNECTED_WARNING: &str = "Waarschuwing: Retourslang is niet aangesloten";

pub const LEAK_LINE_LABEL: &str = "system with leak line";
pub const DOUBLE_ACTING_LABEL: &str = "double-acting system";
pub const SINGLE_ACTING_LABEL: &str = "single-acting system";

// Same figures for every circuit; not taken from SystemType::parameters.
const MAX_PRESSURE: &str = "300 bar";
const REQUIRED_FLOW: &str = "60 l/min";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub system_type: String,
    pub required_hoses: u8,
    pub max_pressure: String,
    pub required_flow: String,
    pub warnings: Vec<String>,
}

pub fn compute_recommendations(hoses: &HoseState) -> Recommendations {
    let mut warnings = Vec::new();

    if !hoses.supply.connected {
        warnings.push(SUPPLY_DISCONNECTED_WARNING.to_string());
    }
    if !hoses.return_line.connected {
        warnings.push(RETURN_DISCONNECTED_WARNING.to_string());
    }

    let (label, required_hoses) = if hoses.leak.connected {
        (LEAK_LINE_LABEL, 3)
    } else if hoses.supply.connected && hoses.return_line.connected {
        (DOUBLE_ACTING_LABEL, 2)
    } else {
        (SINGLE_ACTING_LABEL, 2)
    };

    Recommendations {
        system_type: label.to_string(),
        required_hoses,
        max_pressure: MAX_PRESSURE.to_string(),
        required_flow: REQUIRED_FLOW.to_string(),
        warnings,
    }
}
