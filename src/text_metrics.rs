use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use lru::LruCache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use ttf_parser::Face;

/// Default number of `(text, font)` measurements kept by [`TextMeasurer`].
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

const DEFAULT_FONT_SIZE: f64 = 16.0;
const LINE_HEIGHT: f64 = 1.2;
const ASCENT: f64 = 0.8;

static FONT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(italic|oblique|normal)\s+)?(?:(bold|bolder|lighter|normal|[1-9]00)\s+)?(\d+(?:\.\d+)?)(px|pt|em)?(?:/\S+)?\s+(.+?)\s*$",
    )
    .unwrap()
});

/// Size of a single line of text as laid out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the line box to the text baseline.
    pub baseline: f64,
}

/// A parsed CSS font shorthand such as `bold 12px Verdana, sans-serif`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub family: String,
}

impl FontSpec {
    pub fn parse(font: &str) -> Self {
        let Some(caps) = FONT_RE.captures(font) else {
            return FontSpec {
                size: DEFAULT_FONT_SIZE,
                bold: false,
                italic: false,
                family: font.trim().to_string(),
            };
        };
        let value: f64 = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(DEFAULT_FONT_SIZE);
        let size = match caps.get(4).map(|m| m.as_str()) {
            Some("pt") => value * 4.0 / 3.0,
            Some("em") => value * DEFAULT_FONT_SIZE,
            _ => value,
        };
        let bold = caps
            .get(2)
            .map(|m| matches!(m.as_str(), "bold" | "bolder" | "600" | "700" | "800" | "900"))
            .unwrap_or(false);
        let italic = caps
            .get(1)
            .map(|m| m.as_str() != "normal")
            .unwrap_or(false);
        FontSpec {
            size,
            bold,
            italic,
            family: caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default(),
        }
    }
}

/// The host text-metrics service used to size every piece of text.
pub trait TextMetrics {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextSize;
}

/// Deterministic estimate based on per-character width factors.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproximateMetrics;

impl TextMetrics for ApproximateMetrics {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextSize {
        let weight = if font.bold { 1.08 } else { 1.0 };
        let width: f64 = text
            .chars()
            .map(|ch| char_width_factor(ch) * font.size * weight)
            .sum();
        line_size(width, font.size)
    }
}

fn line_size(width: f64, font_size: f64) -> TextSize {
    let height = (font_size * LINE_HEIGHT).round();
    let half_leading = (height - font_size) / 2.0;
    TextSize {
        width: width.round(),
        height,
        baseline: (half_leading + font_size * ASCENT).round(),
    }
}

fn char_width_factor(ch: char) -> f64 {
    // Verdana-like advances relative to the font size.
    match ch {
        ' ' => 0.352,
        '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 0.364,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.454,
        'i' | 'j' | 'l' => 0.274,
        'f' | 't' | 'r' => 0.394,
        'I' => 0.421,
        'm' => 0.973,
        'w' => 0.818,
        'M' => 0.843,
        'W' => 0.989,
        'A'..='Z' => 0.684,
        'a'..='z' => 0.601,
        '0'..='9' => 0.636,
        '%' | '@' | '&' | '#' => 0.888,
        '-' => 0.454,
        _ => 0.636,
    }
}

/// Measures text with real font data discovered through `fontdb`.
///
/// Glyphs missing from the matched face fall back to the approximate width
/// factors, and families with no match at all are measured approximately.
pub struct FontDbMetrics {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl Default for FontDbMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FontDbMetrics {
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            loaded_system_fonts: true,
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, font: &FontSpec) -> Option<&FontFace> {
        let key = face_key(font);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font);
            if face.is_none() {
                tracing::debug!(family = %font.family, "no font face matched, using approximate metrics");
            }
            self.faces.insert(key.clone(), face);
        }
        self.faces.get(&key).and_then(|face| face.as_ref())
    }

    fn load_face(&mut self, font: &FontSpec) -> Option<FontFace> {
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font.family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" => order.push(FamilyToken::Generic(Family::SansSerif)),
                "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }
        let families: Vec<Family<'_>> = order
            .iter()
            .map(|token| match *token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: if font.bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: if font.italic { Style::Italic } else { Style::Normal },
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::load(data, index))
            .flatten()
    }
}

impl TextMetrics for FontDbMetrics {
    fn measure(&mut self, text: &str, font: &FontSpec) -> TextSize {
        let Some(face) = self.face(font) else {
            return ApproximateMetrics.measure(text, font);
        };
        face.measure(text, font.size)
    }
}

fn face_key(font: &FontSpec) -> String {
    format!("{}|{}|{}", font.family.trim(), font.bold, font.italic)
}

/// Metrics extracted from a parsed face. The raw data is kept so non-ASCII
/// glyphs can be looked up lazily.
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f64,
    ascender: f64,
    descender: f64,
    line_gap: f64,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn load(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data: data.to_vec(),
            index,
            units_per_em: face.units_per_em().max(1) as f64,
            ascender: face.ascender() as f64,
            descender: face.descender() as f64,
            line_gap: face.line_gap() as f64,
            ascii_advances,
        })
    }

    fn measure(&self, text: &str, font_size: f64) -> TextSize {
        let scale = font_size / self.units_per_em;
        let mut width = 0.0;
        let mut face: Option<Face<'_>> = None;
        for ch in text.chars() {
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else {
                if face.is_none() {
                    face = Face::parse(&self.data, self.index).ok();
                }
                face.as_ref().and_then(|face| {
                    face.glyph_index(ch)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                })
            };
            width += match advance {
                Some(advance) => advance as f64 * scale,
                None => char_width_factor(ch) * font_size,
            };
        }

        let content = (self.ascender - self.descender) * scale;
        let height = (content + self.line_gap * scale).round();
        let half_leading = (height - content) / 2.0;
        TextSize {
            width: width.round(),
            height,
            baseline: (half_leading + self.ascender * scale).round(),
        }
    }
}

/// Snapshot of the measurement cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

/// Bounded LRU front for a [`TextMetrics`] backend.
///
/// Owned by a chart and reused across refreshes; nothing here is global.
pub struct TextMeasurer {
    metrics: Box<dyn TextMetrics>,
    cache: LruCache<(String, String), TextSize>,
    hits: u64,
    misses: u64,
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new(Box::new(ApproximateMetrics))
    }
}

impl TextMeasurer {
    pub fn new(metrics: Box<dyn TextMetrics>) -> Self {
        Self::with_capacity(metrics, DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity is bumped to one entry.
    pub fn with_capacity(metrics: Box<dyn TextMetrics>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            metrics,
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn system_fonts() -> Self {
        Self::new(Box::new(FontDbMetrics::new()))
    }

    pub fn measure(&mut self, text: &str, font: &str) -> TextSize {
        let key = (text.to_string(), font.to_string());
        if let Some(size) = self.cache.get(&key) {
            self.hits += 1;
            return *size;
        }
        self.misses += 1;
        let size = self.metrics.measure(text, &FontSpec::parse(font));
        tracing::trace!(text, font, width = size.width, height = size.height, "measured text");
        self.cache.put(key, size);
        size
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn measure(&mut self, text: &str, font: &FontSpec) -> TextSize {
            TextSize {
                width: text.len() as f64 * font.size,
                height: font.size,
                baseline: font.size,
            }
        }
    }

    #[test]
    fn parses_font_shorthand() {
        let font = FontSpec::parse("bold 12px Verdana, sans-serif");
        assert_eq!(font.size, 12.0);
        assert!(font.bold);
        assert!(!font.italic);
        assert_eq!(font.family, "Verdana, sans-serif");

        let font = FontSpec::parse("italic 9pt Arial");
        assert_eq!(font.size, 12.0);
        assert!(font.italic);

        let font = FontSpec::parse("1.5em Georgia");
        assert_eq!(font.size, 24.0);
    }

    #[test]
    fn unparseable_font_keeps_default_size() {
        let font = FontSpec::parse("Verdana");
        assert_eq!(font.size, DEFAULT_FONT_SIZE);
        assert_eq!(font.family, "Verdana");
    }

    #[test]
    fn approximate_metrics_scale_with_size() {
        let mut metrics = ApproximateMetrics;
        let small = metrics.measure("Sales", &FontSpec::parse("12px Verdana"));
        let large = metrics.measure("Sales", &FontSpec::parse("24px Verdana"));
        assert!(large.width > small.width);
        assert_eq!(small.height, 14.0);
        assert!(small.baseline > 0.0 && small.baseline < small.height);
    }

    #[test]
    fn measurer_caches_by_text_and_font() {
        let mut measurer = TextMeasurer::new(Box::new(FixedMetrics));
        let first = measurer.measure("abc", "10px Verdana");
        let second = measurer.measure("abc", "10px Verdana");
        measurer.measure("abc", "20px Verdana");
        assert_eq!(first, second);
        let stats = measurer.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.size, 2);
    }

    #[test]
    fn measurer_evicts_least_recently_used() {
        let mut measurer = TextMeasurer::with_capacity(Box::new(FixedMetrics), 2);
        measurer.measure("a", "10px X");
        measurer.measure("b", "10px X");
        measurer.measure("a", "10px X");
        measurer.measure("c", "10px X");
        assert_eq!(measurer.stats().size, 2);
        measurer.measure("a", "10px X");
        assert_eq!(measurer.stats().hits, 2);
        measurer.measure("b", "10px X");
        assert_eq!(measurer.stats().misses, 4);
    }
}
