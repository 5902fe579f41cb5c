/// State registry for the air quality monitoring service.
///
/// Defines the canonical list of the 50 US states scraped from Berkeley
/// Earth, along with the USPS abbreviation the map collaborator needs for
/// its geojson feature join. This is the single source of truth for state
/// identifiers — all other modules should reference states from here rather
/// than hardcoding names.

// ---------------------------------------------------------------------------
// State metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored state.
pub struct State {
    /// Canonical feed identifier. Multi-word names use underscores
    /// (e.g. "New_Hampshire"), matching the Berkeley Earth URL scheme
    /// and the `state` column in the store.
    pub name: &'static str,
    /// Two-letter USPS abbreviation.
    pub postal: &'static str,
}

impl State {
    /// Human-readable name with underscores replaced by spaces.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// All monitored states, in alphabetical order by canonical name.
pub static STATE_REGISTRY: &[State] = &[
    State { name: "Alabama", postal: "AL" },
    State { name: "Alaska", postal: "AK" },
    State { name: "Arizona", postal: "AZ" },
    State { name: "Arkansas", postal: "AR" },
    State { name: "California", postal: "CA" },
    State { name: "Colorado", postal: "CO" },
    State { name: "Connecticut", postal: "CT" },
    State { name: "Delaware", postal: "DE" },
    State { name: "Florida", postal: "FL" },
    State { name: "Georgia", postal: "GA" },
    State { name: "Hawaii", postal: "HI" },
    State { name: "Idaho", postal: "ID" },
    State { name: "Illinois", postal: "IL" },
    State { name: "Indiana", postal: "IN" },
    State { name: "Iowa", postal: "IA" },
    State { name: "Kansas", postal: "KS" },
    State { name: "Kentucky", postal: "KY" },
    State { name: "Louisiana", postal: "LA" },
    State { name: "Maine", postal: "ME" },
    State { name: "Maryland", postal: "MD" },
    State { name: "Massachusetts", postal: "MA" },
    State { name: "Michigan", postal: "MI" },
    State { name: "Minnesota", postal: "MN" },
    State { name: "Mississippi", postal: "MS" },
    State { name: "Missouri", postal: "MO" },
    State { name: "Montana", postal: "MT" },
    State { name: "Nebraska", postal: "NE" },
    State { name: "Nevada", postal: "NV" },
    State { name: "New_Hampshire", postal: "NH" },
    State { name: "New_Jersey", postal: "NJ" },
    State { name: "New_Mexico", postal: "NM" },
    State { name: "New_York", postal: "NY" },
    State { name: "North_Carolina", postal: "NC" },
    State { name: "North_Dakota", postal: "ND" },
    State { name: "Ohio", postal: "OH" },
    State { name: "Oklahoma", postal: "OK" },
    State { name: "Oregon", postal: "OR" },
    State { name: "Pennsylvania", postal: "PA" },
    State { name: "Rhode_Island", postal: "RI" },
    State { name: "South_Carolina", postal: "SC" },
    State { name: "South_Dakota", postal: "SD" },
    State { name: "Tennessee", postal: "TN" },
    State { name: "Texas", postal: "TX" },
    State { name: "Utah", postal: "UT" },
    State { name: "Vermont", postal: "VT" },
    State { name: "Virginia", postal: "VA" },
    State { name: "Washington", postal: "WA" },
    State { name: "West_Virginia", postal: "WV" },
    State { name: "Wisconsin", postal: "WI" },
    State { name: "Wyoming", postal: "WY" },
];

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Canonical names of all monitored states, in registry order.
pub fn state_names() -> Vec<String> {
    STATE_REGISTRY.iter().map(|s| s.name.to_string()).collect()
}

/// Whether `name` is a canonical identifier of a monitored state.
pub fn is_monitored(name: &str) -> bool {
    STATE_REGISTRY.iter().any(|s| s.name == name)
}

/// USPS abbreviation for a canonical state name.
pub fn postal_for(name: &str) -> Option<&'static str> {
    STATE_REGISTRY
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.postal)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
