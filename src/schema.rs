/// Column-name constants for the crime dataset.
/// Single source of truth for the loader, the renderer and the HTTP layer.

// ── Raw (wide) identifying columns ──────────────────────────────────────────
pub mod raw {
    pub const STATE: &str = "state";
    pub const CITY: &str = "city";
    pub const POPULATION: &str = "population";
    pub const YEAR: &str = "year";
    pub const STATE_CITY: &str = "state_city";
    pub const LAT: &str = "lat";
    pub const LNG: &str = "lng";
    pub const POPULATION_SM: &str = "population_sm";
    pub const DENSITY: &str = "density";
    pub const LARGE_CITY: &str = "large_city";

    /// Every column that identifies a city-year. Anything else is a measure.
    pub const ID_COLUMNS: [&str; 10] = [
        STATE,
        CITY,
        POPULATION,
        YEAR,
        STATE_CITY,
        LAT,
        LNG,
        POPULATION_SM,
        DENSITY,
        LARGE_CITY,
    ];

    pub const TEXT_COLUMNS: [&str; 3] = [STATE, CITY, STATE_CITY];

    pub const NUMERIC_COLUMNS: [&str; 6] =
        [POPULATION, LAT, LNG, POPULATION_SM, DENSITY, LARGE_CITY];

    /// Columns whose absence makes the source unusable.
    pub const REQUIRED: [&str; 2] = [CITY, YEAR];
}

// ── Prepared (long) columns ─────────────────────────────────────────────────
pub mod prepared {
    pub const TYPE_CRIME: &str = "type_crime";
    pub const NUMBER_CRIMES: &str = "number_crimes";
}

// ── Category labels ─────────────────────────────────────────────────────────
pub mod category {
    pub const LABELS: [(&str, &str); 10] = [
        ("violentcrime", "Violent crime"),
        (
            "murderandnonnegligentmanslaug",
            "Murder and nonnegligent manslaughter",
        ),
        ("rape", "Rape"),
        ("robbery", "Robbery"),
        ("aggravatedassault", "Aggravated assault"),
        ("propertycrime", "Property crime"),
        ("burglary", "Burglary"),
        ("larcenytheft", "Larceny theft"),
        ("motorvehicletheft", "Motor vehicle theft"),
        ("arson", "Arson"),
    ];

    /// Display label for a raw measure column, if it has one.
    pub fn display_label(raw_key: &str) -> Option<&'static str> {
        LABELS
            .iter()
            .find(|(key, _)| *key == raw_key)
            .map(|(_, label)| *label)
    }
}
