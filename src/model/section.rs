use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The permanent default section. Cannot be renamed, deleted or removed.
pub const GENERAL: &str = "general";

/// The virtual "every section" view. Never stored in the registry.
pub const ALL: &str = "all";

/// Cap on sections other than `general`.
pub const MAX_CUSTOM_SECTIONS: usize = 5;

/// True for the two ids no user-created section may take.
pub fn is_reserved(id: &str) -> bool {
    id == GENERAL || id == ALL
}

/// Fixed set of swatch identifiers handed out to sections round-robin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_swatches")]
    pub swatches: Vec<String>,
    /// Returned by `color_of` for ids without an assignment
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            swatches: default_swatches(),
            fallback: default_fallback(),
        }
    }
}

fn default_swatches() -> Vec<String> {
    [
        "rose", "amber", "emerald", "cyan", "sky", "blue", "indigo", "violet", "fuchsia",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_fallback() -> String {
    "neutral".to_string()
}

impl Palette {
    /// Swatch for the `n`-th assignment, cycling through the palette.
    pub fn swatch(&self, n: usize) -> &str {
        if self.swatches.is_empty() {
            return &self.fallback;
        }
        &self.swatches[n % self.swatches.len()]
    }

    /// The color `general` starts with: the third swatch.
    pub fn general_default(&self) -> &str {
        self.swatches
            .get(2)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// Ordered section ids plus the color assigned to each.
///
/// The order is the display order and the target space for drag reorders.
/// The color map is keyed by section id and keeps insertion order so the
/// persisted record reads back identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    pub(crate) order: Vec<String>,
    pub(crate) colors: IndexMap<String, String>,
}

impl SectionRegistry {
    /// Registry holding only `general`, colored with the palette default.
    pub fn new(palette: &Palette) -> Self {
        let mut colors = IndexMap::new();
        colors.insert(GENERAL.to_string(), palette.general_default().to_string());
        SectionRegistry {
            order: vec![GENERAL.to_string()],
            colors,
        }
    }

    /// Build from stored records without validation. See `ops::check::repair`.
    pub fn from_parts(order: Vec<String>, colors: IndexMap<String, String>) -> Self {
        SectionRegistry { order, colors }
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn colors(&self) -> &IndexMap<String, String> {
        &self.colors
    }

    pub fn contains(&self, id: &str) -> bool {
        self.order.iter().any(|s| s == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|s| s == id)
    }

    /// Number of sections other than `general`.
    pub fn custom_count(&self) -> usize {
        self.order.iter().filter(|s| s.as_str() != GENERAL).count()
    }

    /// Assigned color, if any.
    pub fn color(&self, id: &str) -> Option<&str> {
        self.colors.get(id).map(String::as_str)
    }
}
