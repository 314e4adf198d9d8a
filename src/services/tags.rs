use serde::Serialize;

/// Reference data printed on a hose tag
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct TagInfo {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: &'static str,
    pub connection: &'static str,
    pub color: &'static str,
    pub max_pressure: &'static str,
    pub flow_rate: &'static str,
}

impl TagInfo {
    const UNKNOWN_FIELD: &str = "Onbekend";

    pub const UNKNOWN: TagInfo = TagInfo {
        kind: Self::UNKNOWN_FIELD,
        function: Self::UNKNOWN_FIELD,
        connection: Self::UNKNOWN_FIELD,
        color: Self::UNKNOWN_FIELD,
        max_pressure: Self::UNKNOWN_FIELD,
        flow_rate: Self::UNKNOWN_FIELD,
    };

    /// Look up a tag id, falling back to [`TagInfo::UNKNOWN`]
    pub fn lookup(tag_id: &str) -> TagInfo {
        Self::find(tag_id).unwrap_or(Self::UNKNOWN)
    }

    pub fn find(tag_id: &str) -> Option<TagInfo> {
        match tag_id {
            "SUPPLY_LEFT" => Some(TagInfo {
                kind: "Aanvoerslang",
                function: "Hydraulische olie naar werktuig",
                connection: "Ventiel A (links)",
                color: "Rood",
                max_pressure: "300 bar",
                flow_rate: "60 l/min",
            }),
            "RETURN_RIGHT" => Some(TagInfo {
                kind: "Retourslang",
                function: "Olie terug naar tank",
                connection: "Ventiel B (rechts)",
                color: "Blauw",
                max_pressure: "300 bar",
                flow_rate: "60 l/min",
            }),
            "LEAK" => Some(TagInfo {
                kind: "Lekleiding",
                function: "Afvoer lekkage-olie",
                connection: "Ventiel C (lekaansluiting)",
                color: "Geel",
                max_pressure: "10 bar",
                flow_rate: "5 l/min",
            }),
            _ => None,
        }
    }
}
