//! The items customers bring in, and their colors.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Packed `0xRRGGBB` color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff_ff_ff);

    #[inline] pub const fn r(self) -> u8 { (self.0 >> 16) as u8 }
    #[inline] pub const fn g(self) -> u8 { (self.0 >> 8) as u8 }
    #[inline] pub const fn b(self) -> u8 { self.0 as u8 }

    /// Channels scaled to `[0, 1]`.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(f32::from(self.r()), f32::from(self.g()), f32::from(self.b())) / 255.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Bottle,
    Tshirt,
    Pillow,
    Cup,
}

impl ItemKind {
    pub const fn name(self) -> &'static str {
        match self {
            ItemKind::Bottle => "bottle",
            ItemKind::Tshirt => "tshirt",
            ItemKind::Pillow => "pillow",
            ItemKind::Cup => "cup",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: ItemKind,
    #[serde(default = "white")]
    pub base_color: Rgb,
    pub printed_color: Rgb,
    /// Shirt of the customer bringing this item.
    pub shirt_color: Rgb,
}

fn white() -> Rgb {
    Rgb::WHITE
}

impl CatalogEntry {
    pub const fn new(kind: ItemKind, shirt_color: u32, printed_color: u32) -> Self {
        Self { kind, base_color: Rgb::WHITE, printed_color: Rgb(printed_color), shirt_color: Rgb(shirt_color) }
    }

    /// Object color before or after printing.
    #[inline]
    pub fn color(&self, printed: bool) -> Rgb {
        if printed { self.printed_color } else { self.base_color }
    }
}

pub const DEFAULT_CATALOG: [CatalogEntry; 4] = [
    CatalogEntry::new(ItemKind::Bottle, 0x4a90e2, 0xff6b6b),
    CatalogEntry::new(ItemKind::Tshirt, 0xe74c3c, 0x3498db),
    CatalogEntry::new(ItemKind::Pillow, 0x9b59b6, 0xf39c12),
    CatalogEntry::new(ItemKind::Cup, 0x27ae60, 0xe91e63),
];

pub fn default_catalog() -> Vec<CatalogEntry> {
    DEFAULT_CATALOG.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_unpack() {
        let c = Rgb(0x4a90e2);
        assert_eq!((c.r(), c.g(), c.b()), (0x4a, 0x90, 0xe2));
        assert_eq!(Rgb::WHITE.to_vec3(), Vec3::ONE);
    }

    #[test]
    fn entry_deserializes_with_default_base() {
        let e: CatalogEntry =
            serde_json::from_str(r#"{"kind":"cup","printed_color":16711680,"shirt_color":255}"#).unwrap();
        assert_eq!(e.kind, ItemKind::Cup);
        assert_eq!(e.base_color, Rgb::WHITE);
        assert_eq!(e.color(true), Rgb(0xff0000));
        assert_eq!(e.color(false), Rgb::WHITE);
    }

    #[test]
    fn default_catalog_starts_with_bottle() {
        assert_eq!(default_catalog()[0].kind, ItemKind::Bottle);
        assert_eq!(default_catalog().len(), 4);
    }
}
