use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Backend-agnostic font configuration.
///
/// Describes where fonts come from using only standard library types. The
/// font factory converts it into a [`fontdb::Database`] once, via
/// [`font_config_to_fontdb`].
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Raw font files to register (TTF/OTF/TTC).
    pub custom_fonts: Vec<Arc<Vec<u8>>>,
    /// Concrete families for the two logical faces.
    pub generic_families: GenericFamilyMap,
    /// Whether to load system fonts (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Preferred families for each logical face, in priority order.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub proportional: Vec<String>,
    pub monospace: Vec<String>,
}

impl GenericFamilyMap {
    pub fn defaults() -> Self {
        Self {
            proportional: vec![
                "Arial".into(),
                "Helvetica".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Courier".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
        }
    }
}

/// Convert a [`FontConfig`] into a [`fontdb::Database`].
pub fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();

    if config.load_system_fonts {
        db.load_system_fonts();
    }

    for dir in &config.font_dirs {
        db.load_fonts_dir(dir);
    }

    for data in &config.custom_fonts {
        db.load_font_data(Vec::from(data.as_slice()));
    }

    apply_generic_families(&mut db, &config.generic_families);

    log::debug!(target: "coredraw", "font database has {} faces", db.len());
    db
}

/// Point the generic families at the first available preferred family.
///
/// When none of the preferences is installed, the alphabetically first
/// family in the database is used so lookups still resolve to a real face.
pub(crate) fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(fam, _lang)| fam.clone()))
        .collect();
    let Some(first) = available.iter().min().cloned() else {
        return;
    };

    let proportional = families
        .proportional
        .iter()
        .find(|f| available.contains(*f))
        .cloned()
        .unwrap_or_else(|| first.clone());
    db.set_sans_serif_family(proportional);

    let monospace = families
        .monospace
        .iter()
        .find(|f| available.contains(*f))
        .cloned()
        .unwrap_or(first);
    db.set_monospace_family(monospace);
}
