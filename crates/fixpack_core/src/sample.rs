//! Built-in datasets for smoke-testing a consumer without external files.

use crate::domain::DomainKind;
use crate::value::Descriptor;
use image::{DynamicImage, Rgba, RgbaImage};
use serde_json::{json, Value};

struct SampleElement {
    z: u8,
    symbol: &'static str,
    name: &'static str,
    mass: f64,
    group: u8,
    period: u8,
    block: &'static str,
    category: &'static str,
    melt: f64,
    boil: f64,
    density: f64,
    en: Option<f64>,
}

macro_rules! el {
    ($z:expr, $sym:expr, $name:expr, $mass:expr, $g:expr, $p:expr, $b:expr, $cat:expr, $mp:expr, $bp:expr, $d:expr, $en:expr) => {
        SampleElement {
            z: $z,
            symbol: $sym,
            name: $name,
            mass: $mass,
            group: $g,
            period: $p,
            block: $b,
            category: $cat,
            melt: $mp,
            boil: $bp,
            density: $d,
            en: $en,
        }
    };
}

#[rustfmt::skip]
const ELEMENTS: [SampleElement; 20] = [
    el!(1, "H", "Hydrogen", 1.008, 1, 1, "s", "reactive nonmetal", 14.01, 20.28, 0.00008988, Some(2.20)),
    el!(2, "He", "Helium", 4.003, 18, 1, "s", "noble gas", 0.95, 4.22, 0.0001785, None),
    el!(3, "Li", "Lithium", 6.941, 1, 2, "s", "alkali metal", 453.69, 1615.0, 0.534, Some(0.98)),
    el!(4, "Be", "Beryllium", 9.012, 2, 2, "s", "alkaline earth metal", 1560.0, 2742.0, 1.85, Some(1.57)),
    el!(5, "B", "Boron", 10.811, 13, 2, "p", "metalloid", 2349.0, 4200.0, 2.34, Some(2.04)),
    el!(6, "C", "Carbon", 12.011, 14, 2, "p", "reactive nonmetal", 3915.0, 4098.0, 2.267, Some(2.55)),
    el!(7, "N", "Nitrogen", 14.007, 15, 2, "p", "reactive nonmetal", 63.15, 77.36, 0.0012506, Some(3.04)),
    el!(8, "O", "Oxygen", 15.999, 16, 2, "p", "reactive nonmetal", 54.36, 90.20, 0.001429, Some(3.44)),
    el!(9, "F", "Fluorine", 18.998, 17, 2, "p", "reactive nonmetal", 53.53, 85.03, 0.001696, Some(3.98)),
    el!(10, "Ne", "Neon", 20.180, 18, 2, "p", "noble gas", 24.56, 27.07, 0.0008999, None),
    el!(11, "Na", "Sodium", 22.990, 1, 3, "s", "alkali metal", 370.87, 1156.0, 0.971, Some(0.93)),
    el!(12, "Mg", "Magnesium", 24.305, 2, 3, "s", "alkaline earth metal", 923.0, 1363.0, 1.738, Some(1.31)),
    el!(13, "Al", "Aluminum", 26.982, 13, 3, "p", "post-transition metal", 933.47, 2792.0, 2.698, Some(1.61)),
    el!(14, "Si", "Silicon", 28.086, 14, 3, "p", "metalloid", 1687.0, 3538.0, 2.3296, Some(1.90)),
    el!(15, "P", "Phosphorus", 30.974, 15, 3, "p", "reactive nonmetal", 317.30, 550.0, 1.82, Some(2.19)),
    el!(16, "S", "Sulfur", 32.065, 16, 3, "p", "reactive nonmetal", 388.36, 717.87, 2.067, Some(2.58)),
    el!(17, "Cl", "Chlorine", 35.453, 17, 3, "p", "reactive nonmetal", 171.6, 239.11, 0.003214, Some(3.16)),
    el!(18, "Ar", "Argon", 39.948, 18, 3, "p", "noble gas", 83.80, 87.30, 0.0017837, None),
    el!(19, "K", "Potassium", 39.098, 1, 4, "s", "alkali metal", 336.53, 1032.0, 0.862, Some(0.82)),
    el!(20, "Ca", "Calcium", 40.078, 2, 4, "s", "alkaline earth metal", 1115.0, 1757.0, 1.54, Some(1.00)),
];

/// Phase at room temperature, from the boiling and melting points.
fn phase(e: &SampleElement) -> &'static str {
    match e.melt {
        _ if e.boil < 293.15 => "gas",
        m if m > 293.15 => "solid",
        _ => "liquid",
    }
}

pub fn elements() -> Value {
    let list: Vec<Value> = ELEMENTS
        .iter()
        .map(|e| {
            json!({
                "z": e.z, "symbol": e.symbol, "name": e.name, "mass": e.mass,
                "group": e.group, "period": e.period, "block": e.block, "category": e.category,
                "mp_k": e.melt, "bp_k": e.boil, "density": e.density, "en": e.en, "phase": phase(e),
            })
        })
        .collect();
    json!({ "elements": list })
}

pub fn creatures() -> Value {
    json!({ "creatures": [
        {"id": 1, "name": "Bulbasaur", "height": 7, "weight": 69, "types": ["grass", "poison"],
         "stats": {"hp": 45, "attack": 49, "defense": 49, "special_attack": 65, "special_defense": 65, "speed": 45},
         "genus": "Seed Pokémon",
         "flavor_text": "A strange seed was planted on its back at birth. The plant sprouts and grows with this Pokémon."},
        {"id": 4, "name": "Charmander", "height": 6, "weight": 85, "types": ["fire"],
         "stats": {"hp": 39, "attack": 52, "defense": 43, "special_attack": 60, "special_defense": 50, "speed": 65},
         "genus": "Lizard Pokémon",
         "flavor_text": "Obviously prefers hot places. When it rains, steam is said to spout from the tip of its tail."},
        {"id": 7, "name": "Squirtle", "height": 5, "weight": 90, "types": ["water"],
         "stats": {"hp": 44, "attack": 48, "defense": 65, "special_attack": 50, "special_defense": 64, "speed": 43},
         "genus": "Tiny Turtle Pokémon",
         "flavor_text": "After birth, its back swells and hardens into a shell. Powerfully sprays foam from its mouth."},
        {"id": 25, "name": "Pikachu", "height": 4, "weight": 60, "types": ["electric"],
         "stats": {"hp": 35, "attack": 55, "defense": 40, "special_attack": 50, "special_defense": 50, "speed": 90},
         "genus": "Mouse Pokémon",
         "flavor_text": "When several of these Pokémon gather, their electricity could build and cause lightning storms."},
        {"id": 133, "name": "Eevee", "height": 3, "weight": 65, "types": ["normal"],
         "stats": {"hp": 55, "attack": 55, "defense": 50, "special_attack": 45, "special_defense": 65, "speed": 55},
         "genus": "Evolution Pokémon"}
    ]})
}

pub fn dataset(kind: DomainKind) -> Value {
    match kind {
        DomainKind::Elements => elements(),
        DomainKind::Creatures => creatures(),
    }
}

pub fn descriptors(kind: DomainKind) -> Vec<Descriptor> {
    // built-in data always has the expected shape
    crate::dataset::from_value(dataset(kind), kind.list_fields()).unwrap_or_default()
}

/// A 96×96 RGBA figure derived from `key`: an opaque body on a transparent
/// background, with a shaded band and two eyes.
pub fn synthetic_sprite(key: u16) -> DynamicImage {
    const N: u32 = 96;
    let k = key as i64;
    let rx = 20 + (k * 7 % 20);
    let ry = 24 + (k * 11 % 16);
    let (cx, cy) = (N as i64 / 2, N as i64 / 2 + 4);
    let shade = (60 + (k * 37 % 140)) as u8;
    let img = RgbaImage::from_fn(N, N, |x, y| {
        let (dx, dy) = (x as i64 - cx, y as i64 - cy);
        let inside = dx * dx * ry * ry + dy * dy * rx * rx <= rx * rx * ry * ry;
        if !inside {
            return Rgba([0, 0, 0, 0]);
        }
        let eye = |ex: i64| (x as i64 - ex).pow(2) + (y as i64 - (cy - ry / 3)).pow(2) <= 9;
        if eye(cx - rx / 3) || eye(cx + rx / 3) {
            Rgba([0, 0, 0, 255])
        } else if dy > ry / 3 {
            Rgba([shade / 2, shade / 2, shade / 2, 255])
        } else {
            Rgba([shade, shade, 255 - shade / 2, 255])
        }
    });
    DynamicImage::ImageRgba8(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_sample_is_complete() {
        let d = descriptors(DomainKind::Elements);
        assert_eq!(d.len(), 20);
        assert_eq!(d[0].text("symbol"), Some("H"));
        assert_eq!(d[0].text("phase"), Some("gas"));
        assert_eq!(d[2].text("phase"), Some("solid"));
        assert!(d[1].get("en").is_absent());
    }

    #[test]
    fn creature_sample() {
        let d = descriptors(DomainKind::Creatures);
        assert_eq!(d.len(), 5);
        assert_eq!(d[3].number("id"), Some(25.0));
    }

    #[test]
    fn synthetic_sprites_differ_by_key() {
        let a = synthetic_sprite(1).to_rgba8();
        let b = synthetic_sprite(4).to_rgba8();
        assert_eq!(a.dimensions(), (96, 96));
        assert_ne!(a.as_raw(), b.as_raw());
        assert_eq!(a.get_pixel(0, 0).0[3], 0);
        assert_eq!(synthetic_sprite(1).to_rgba8().as_raw(), a.as_raw());
    }
}
