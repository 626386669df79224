//! Emitter category codes as reported in field 17 of an OpenSky state vector.

/// Category code → description, indexed by code.
pub const CATEGORY_TABLE: &[(u8, &str)] = &[
    (0, "No information at all"),
    (1, "No ADS-B Emitter Category Information"),
    (2, "Light (< 15500 lbs)"),
    (3, "Small (15500 to 75000 lbs)"),
    (4, "Large (75000 to 300000 lbs)"),
    (5, "High Vortex Large (aircraft such as B-757)"),
    (6, "Heavy (> 300000 lbs)"),
    (7, "High Performance (> 5g acceleration and 400 kts)"),
    (8, "Rotorcraft"),
    (9, "Glider / sailplane"),
    (10, "Lighter-than-air"),
    (11, "Parachutist / Skydiver"),
    (12, "Ultralight / hang-glider / paraglider"),
    (13, "Reserved"),
    (14, "Unmanned Aerial Vehicle"),
    (15, "Space / Trans-atmospheric vehicle"),
    (16, "Surface Vehicle - Emergency Vehicle"),
    (17, "Surface Vehicle - Service Vehicle"),
    (18, "Point Obstacle (includes tethered balloons)"),
    (19, "Cluster Obstacle"),
    (20, "Line Obstacle"),
];

/// Category reported when the field is absent.
pub const CATEGORY_NONE: u8 = 0;

/// Categories worth calling out whenever they show up in a poll.
pub const NOTABLE_CATEGORIES: &[u8] = &[11, 14, 15];

/// Look up the description for a category code. Returns `None` for codes
/// outside the table.
pub fn describe(category: u8) -> Option<&'static str> {
    CATEGORY_TABLE
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, desc)| *desc)
}

/// True for parachutists, UAVs, and space vehicles.
pub fn is_notable(category: u8) -> bool {
    NOTABLE_CATEGORIES.contains(&category)
}
