//! Font loading, registration and caching on top of fontdb.

use crate::config::{DrawConfig, FontPointTable};
use crate::font::{face_family_name, BoxFont, FaceFont, Font, FontFace, FontSize, FontStyle, HostFont};
use crate::font_config::{apply_generic_families, font_config_to_fontdb, GenericFamilyMap};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

type FontKey = (FontFace, FontStyle, FontSize);

/// Creates [`Font`]s from the font database.
///
/// Fonts requested by (face, style, size) are cached for the lifetime of the
/// factory. Lookups never fail: when no face matches, a [`BoxFont`] is bound
/// and a warning is logged.
pub struct FontFactory {
    db: RefCell<fontdb::Database>,
    families: GenericFamilyMap,
    points: FontPointTable,
    extra_shift: i32,
    default_key: FontKey,
    face_data: RefCell<HashMap<fontdb::ID, Arc<Vec<u8>>>>,
    cache: RefCell<HashMap<FontKey, Font>>,
}

impl FontFactory {
    pub fn new(config: &DrawConfig) -> Self {
        Self::with_database(config, font_config_to_fontdb(&config.font))
    }

    /// Build a factory over an already populated database.
    pub fn with_database(config: &DrawConfig, db: fontdb::Database) -> Self {
        Self {
            db: RefCell::new(db),
            families: config.font.generic_families.clone(),
            points: config.font_points,
            extra_shift: config.font_points_extra_shift,
            default_key: (config.default_face, config.default_style, config.default_size),
            face_data: RefCell::new(HashMap::new()),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn point_table(&self) -> &FontPointTable {
        &self.points
    }

    /// Font for a (face, style, size) triple. Repeated requests return the
    /// same instance.
    pub fn font(&self, face: FontFace, style: FontStyle, size: FontSize) -> Font {
        let key = (face, style, size);
        if let Some(font) = self.cache.borrow().get(&key) {
            return font.clone();
        }

        let points = self.points.points(size);
        let family = match face {
            FontFace::Monospace => fontdb::Family::Monospace,
            FontFace::Proportional => fontdb::Family::SansSerif,
        };
        let host = self.load_host(&[family], style, points).unwrap_or_else(|| {
            log::warn!(
                target: "coredraw",
                "no font face for {:?} {:?} {:?}, using fallback", face, style, size
            );
            Arc::new(BoxFont::new(points as f32))
        });

        let font = Font::new(face, style, size, points, host);
        self.cache.borrow_mut().insert(key, font.clone());
        font
    }

    /// The configured default font.
    pub fn default_font(&self) -> Font {
        let (face, style, size) = self.default_key;
        self.font(face, style, size)
    }

    /// Font for a named family at an explicit point size.
    ///
    /// The configured extra point shift is added to `points`. The face is
    /// classified as monospace when `'m'` and `'i'` have the same advance, and
    /// the size class is derived from the point table. Returns `None` when the
    /// family is not installed.
    pub fn font_by_name(&self, family: &str, style: FontStyle, points: u32) -> Option<Font> {
        let shifted = (points as i64 + self.extra_shift as i64).max(1) as u32;
        let Some(host) = self.load_host(&[fontdb::Family::Name(family)], style, shifted) else {
            log::warn!(target: "coredraw", "font family {:?} not found", family);
            return None;
        };

        let face = if host.advance('m') == host.advance('i') {
            FontFace::Monospace
        } else {
            FontFace::Proportional
        };
        let size = self.points.size_class(points);
        Some(Font::new(face, style, size, shifted, host))
    }

    /// Sorted, de-duplicated family names in the database.
    pub fn available_family_names(&self) -> Vec<String> {
        let db = self.db.borrow();
        let names: BTreeSet<String> = db
            .faces()
            .flat_map(|face| face.families.iter().map(|(fam, _lang)| fam.clone()))
            .collect();
        names.into_iter().collect()
    }

    /// Families with at least one face where `'m'` and `'i'` have equal
    /// advances.
    pub fn monospace_family_names(&self) -> Vec<String> {
        let db = self.db.borrow();
        let mut names = BTreeSet::new();
        for info in db.faces() {
            let monospace = db
                .with_face_data(info.id, |data, index| {
                    let face = ttf_parser::Face::parse(data, index).ok()?;
                    let advance = |ch| face.glyph_index(ch).and_then(|id| face.glyph_hor_advance(id));
                    Some(advance('m').is_some() && advance('m') == advance('i'))
                })
                .flatten()
                .unwrap_or(false);
            if monospace {
                names.extend(info.families.iter().map(|(fam, _lang)| fam.clone()));
            }
        }
        names.into_iter().collect()
    }

    /// Register a font from raw bytes.
    ///
    /// Returns the family name of the registered face, or `None` (after
    /// logging a warning) when the data is not a usable font.
    pub fn register_font_data(&self, data: Vec<u8>) -> Option<String> {
        let family = match ttf_parser::Face::parse(&data, 0) {
            Ok(face) => face_family_name(&face).unwrap_or_default(),
            Err(err) => {
                log::warn!(target: "coredraw", "cannot register font data: {}", err);
                return None;
            }
        };

        let mut db = self.db.borrow_mut();
        db.load_font_data(data);
        apply_generic_families(&mut db, &self.families);
        log::info!(target: "coredraw", "registered font family {:?}", family);
        Some(family)
    }

    /// Register a font file. See [`FontFactory::register_font_data`].
    pub fn register_font_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(data) => self.register_font_data(data),
            Err(err) => {
                log::warn!(target: "coredraw", "cannot read font file {}: {}", path.display(), err);
                None
            }
        }
    }

    fn load_host(
        &self,
        families: &[fontdb::Family<'_>],
        style: FontStyle,
        points: u32,
    ) -> Option<Arc<dyn HostFont>> {
        let (weight, font_style) = match style {
            FontStyle::Plain => (fontdb::Weight::NORMAL, fontdb::Style::Normal),
            FontStyle::Bold => (fontdb::Weight::BOLD, fontdb::Style::Normal),
            FontStyle::Italic => (fontdb::Weight::NORMAL, fontdb::Style::Italic),
        };
        let query = fontdb::Query {
            families,
            weight,
            stretch: fontdb::Stretch::Normal,
            style: font_style,
        };

        let db = self.db.borrow();
        let id = db.query(&query)?;
        let index = db.face(id)?.index;
        let data = self.face_bytes(&db, id)?;
        let host = FaceFont::new(data, index, points as f32)?;
        Some(Arc::new(host))
    }

    fn face_bytes(&self, db: &fontdb::Database, id: fontdb::ID) -> Option<Arc<Vec<u8>>> {
        if let Some(data) = self.face_data.borrow().get(&id) {
            return Some(data.clone());
        }
        let data = Arc::new(db.with_face_data(id, |data, _index| data.to_vec())?);
        self.face_data.borrow_mut().insert(id, data.clone());
        Some(data)
    }
}

impl fmt::Debug for FontFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFactory")
            .field("faces", &self.db.borrow().len())
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}
