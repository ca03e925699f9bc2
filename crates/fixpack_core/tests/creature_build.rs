use fixpack_core::bitmap::bitmap_len;
use fixpack_core::config::CreatureConfig;
use fixpack_core::domain::creature::{CreatureDomain, SpriteSet};
use fixpack_core::reader::CreatureFiles;
use fixpack_core::{
    compile, compile_kind, dataset, sample, write_outputs, DomainKind, Format, PackConfig, PackError, ValidationError,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DATASET: &str = r#"{"pokemon": [
  {"id": 1, "name": "Bulbasaur", "types": ["grass", "poison"], "genus": "Seed Pokémon",
   "stats": {"hp": 45, "attack": 49, "defense": 49, "special_attack": 65, "special_defense": 65, "speed": 45}},
  {"id": 4, "name": "Charmander", "types": ["fire"], "genus": "Lizard Pokémon", "front_image": "charmander.png"},
  {"id": 7, "name": "Squirtle", "types": ["water"], "genus": "Tiny Turtle Pokémon"}
]}"#;

fn write_png(path: &Path, color: [u8; 4]) {
    let img = RgbaImage::from_fn(40, 40, |x, y| if (x / 5 + y / 5) % 2 == 0 { Rgba(color) } else { Rgba([0, 0, 0, 0]) });
    DynamicImage::ImageRgba8(img).save(path).unwrap();
}

fn build_from(images: &Path) -> fixpack_core::Compiled {
    let descs = dataset::parse(DATASET, DomainKind::Creatures.list_fields()).unwrap();
    let cfg = CreatureConfig { capacity: 16, ..Default::default() };
    compile(&CreatureDomain::new(cfg, SpriteSet::Dir(images.to_path_buf())), &descs, Format::Binary).unwrap()
}

fn sprites_of(c: &fixpack_core::Compiled) -> Vec<u8> {
    c.outputs.iter().find(|o| o.name == "creature_sprites.bin").unwrap().bytes.clone()
}

#[test]
fn broken_sprite_is_isolated() {
    let good = tempdir().unwrap();
    write_png(&good.path().join("001_front.png"), [0, 0, 0, 255]);
    write_png(&good.path().join("charmander.png"), [200, 30, 30, 255]);
    write_png(&good.path().join("007_front.png"), [30, 30, 200, 255]);

    let broken = tempdir().unwrap();
    write_png(&broken.path().join("001_front.png"), [0, 0, 0, 255]);
    write_png(&broken.path().join("charmander.png"), [200, 30, 30, 255]);
    fs::write(broken.path().join("007_front.png"), b"\x89PNG truncated").unwrap();

    let a = build_from(good.path());
    let b = build_from(broken.path());
    assert_eq!(a.report.degradations.failed_sprites, 0);
    assert_eq!(b.report.degradations.failed_sprites, 1);

    // same layout, only Squirtle's bitmap differs and is all zeros in `b`
    let (sa, sb) = (sprites_of(&a), sprites_of(&b));
    assert_eq!(sa.len(), sb.len());
    let out = tempdir().unwrap();
    write_outputs(&b, out.path()).unwrap();
    let f = CreatureFiles::open(out.path(), "creature").unwrap();
    let sq = f.records.get(7).unwrap();
    assert_eq!(f.sprite(&sq), Some(&vec![0u8; bitmap_len(64, 64)][..]));

    let other = tempdir().unwrap();
    write_outputs(&a, other.path()).unwrap();
    let g = CreatureFiles::open(other.path(), "creature").unwrap();
    for key in [1usize, 4] {
        let (ra, rb) = (g.records.get(key).unwrap(), f.records.get(key).unwrap());
        assert_eq!(g.sprite(&ra), f.sprite(&rb), "key {key}");
        assert!(g.sprite(&ra).unwrap().iter().any(|&b| b != 0));
    }
    assert_ne!(g.sprite(&g.records.get(7).unwrap()), f.sprite(&sq));
}

#[test]
fn binary_read_back() {
    let images = tempdir().unwrap();
    write_png(&images.path().join("001_front.png"), [0, 0, 0, 255]);
    let c = build_from(images.path());
    let out = tempdir().unwrap();
    write_outputs(&c, out.path()).unwrap();

    let f = CreatureFiles::open(out.path(), "creature").unwrap();
    assert_eq!(f.records.capacity(), 16);
    assert_eq!(f.names.len(), 16);
    assert_eq!(f.sprites.len(), 16);
    assert_eq!(f.index.iter().collect::<Vec<_>>(), vec![(1, 32), (4, 128), (7, 224)]);

    assert_eq!(f.name(1), Some("Bulbasaur"));
    assert_eq!(f.name(2), Some(""));
    assert_eq!(f.name(7), Some("Squirtle"));

    let b = f.records.get(1).unwrap();
    assert_eq!(b.stats, [45, 49, 49, 65, 65, 45]);
    assert_eq!((b.type1, b.type2), (5, 8));
    assert_eq!(f.genus(&b), Some("Seed Pokémon"));
    assert_eq!(f.flavor(&b), Some("No description available."));
    assert_eq!(f.sprites.get_blob(2), Some(&[][..]));
    assert_eq!(f.sprite(&b).map(<[u8]>::len), Some(512));

    let filled: Vec<usize> = f.records.filled().map(|(k, _)| k).collect();
    assert_eq!(filled, vec![1, 4, 7]);
    // two missing images
    assert_eq!(c.report.degradations.failed_sprites, 2);

    let manifest = fs::read_to_string(out.path().join("creature.manifest.json")).unwrap();
    assert!(manifest.contains("\"creature_sprites.bin\""));
}

#[test]
fn sample_creatures_have_synthetic_sprites() {
    let c = compile_kind(
        DomainKind::Creatures,
        &sample::descriptors(DomainKind::Creatures),
        &PackConfig::default(),
        Format::Binary,
        SpriteSet::Synthetic,
    )
    .unwrap();
    assert_eq!(c.report.filled, 5);
    assert_eq!(c.report.degradations.total(), 0);
    assert_eq!(c.report.capacity, 1026);
}

#[test]
fn header_form_carries_offset_lists() {
    let images = tempdir().unwrap();
    let descs = dataset::parse(DATASET, DomainKind::Creatures.list_fields()).unwrap();
    let cfg = CreatureConfig { capacity: 8, sprite_width: 8, sprite_height: 8, ..Default::default() };
    let c = compile(&CreatureDomain::new(cfg, SpriteSet::Dir(images.path().to_path_buf())), &descs, Format::Header)
        .unwrap();
    let text = String::from_utf8(c.outputs[0].bytes.clone()).unwrap();
    assert!(text.contains("const uint16_t CR_NAME_OFFSETS[] = {"));
    assert!(text.contains("const uint32_t CR_SPRITE_OFFSETS[] = {"));
    assert!(text.contains("const uint16_t CR_GENUS_COUNT = 3;"));
    assert!(text.contains("const PackedCreature CR_CREATURES[8] = {"));
}

#[test]
fn capacity_tops_out_at_u16_tables() {
    let descs = dataset::parse(r#"[{"id": 65534, "name": "Last"}]"#, DomainKind::Creatures.list_fields()).unwrap();
    let at = |capacity: usize| {
        let cfg = CreatureConfig { capacity, sprite_width: 8, sprite_height: 8, ..Default::default() };
        compile(&CreatureDomain::new(cfg, SpriteSet::Synthetic), &descs, Format::Binary)
    };

    let c = at(65_535).unwrap();
    assert_eq!(c.report.capacity, 65_535);
    let names = c.outputs.iter().find(|o| o.name == "creature_names.str").unwrap();
    assert_eq!(&names.bytes[..2], &65_535u16.to_le_bytes());

    match at(65_536) {
        Err(PackError::Validation(ValidationError::BadCapacity { capacity, limit })) => {
            assert_eq!((capacity, limit), (65_536, 65_535));
        }
        other => panic!("expected BadCapacity, got {:?}", other.map(|c| c.report)),
    }
}
