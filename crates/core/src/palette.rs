use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(byte(0)?, byte(2)?, byte(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Ordinal colour scale: each new key takes the next palette entry, wrapping
/// around once the palette is exhausted. A key always maps to the same colour.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb>,
    assigned: HashMap<String, Rgb>,
}

impl Palette {
    /// `colors` must not be empty; [`crate::config::ViewConfig::parsed_palette`]
    /// guarantees that.
    pub fn new(colors: Vec<Rgb>) -> Self {
        let colors = if colors.is_empty() { vec![Rgb(0x99, 0x99, 0x99)] } else { colors };
        Self {
            colors,
            assigned: HashMap::new(),
        }
    }

    pub fn color_for(&mut self, key: &str) -> Rgb {
        if let Some(c) = self.assigned.get(key) {
            return *c;
        }
        let c = self.colors[self.assigned.len() % self.colors.len()];
        self.assigned.insert(key.to_string(), c);
        c
    }

    pub fn get(&self, key: &str) -> Option<Rgb> {
        self.assigned.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#ff8000"), Some(Rgb(255, 128, 0)));
        assert_eq!(Rgb(255, 128, 0).to_hex(), "#ff8000");
        assert_eq!(Rgb::from_hex("ff8000"), None);
        assert_eq!(Rgb::from_hex("#ff80"), None);
        assert_eq!(Rgb::from_hex("#éé8000"), None);
    }

    #[test]
    fn palette_cycles_and_is_stable() {
        let mut p = Palette::new(vec![Rgb(1, 1, 1), Rgb(2, 2, 2)]);
        assert_eq!(p.color_for("a"), Rgb(1, 1, 1));
        assert_eq!(p.color_for("b"), Rgb(2, 2, 2));
        assert_eq!(p.color_for("c"), Rgb(1, 1, 1));
        assert_eq!(p.color_for("a"), Rgb(1, 1, 1));
        assert_eq!(p.get("b"), Some(Rgb(2, 2, 2)));
        assert_eq!(p.get("z"), None);
    }
}
