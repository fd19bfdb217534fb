use std::collections::BTreeMap;

/// Style catalog offered to map consumers (name -> style URL).
const STYLES: &[(&str, &str)] = &[
    ("liberty", "https://tiles.openfreemap.org/styles/liberty"),
    ("bright", "https://tiles.openfreemap.org/styles/bright"),
    ("positron", "https://tiles.openfreemap.org/styles/positron"),
    ("fiord", "https://tiles.openfreemap.org/styles/fiord"),
    ("demotiles", "https://demotiles.maplibre.org/style.json"),
];

pub fn available_styles() -> BTreeMap<&'static str, &'static str> {
    STYLES.iter().copied().collect()
}

/// Map a catalog name to its URL; anything else is taken as a URL already.
pub fn resolve_style(name_or_url: &str) -> &str {
    STYLES
        .iter()
        .find(|(name, _)| *name == name_or_url)
        .map(|(_, url)| *url)
        .unwrap_or(name_or_url)
}
