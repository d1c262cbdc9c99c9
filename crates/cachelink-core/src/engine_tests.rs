use crate::engine::{ANNIVERSARY_BSP_ADDRESS, MEMORY_LENGTH};
use crate::{CompressionScheme, Engine, MapType};

#[test]
fn cache_versions() {
    assert_eq!(Engine::Xbox.cache_version(), 5);
    assert_eq!(Engine::CustomEdition.cache_version(), 0x261);
    assert_eq!(Engine::Native.cache_version(), 0x1A86);
    assert_eq!(Engine::from_cache_version(7), Some(Engine::Retail));
    assert_eq!(Engine::from_cache_version(8), None);
}

#[test]
fn compressed_versions() {
    assert_eq!(
        Engine::CustomEdition.compressed_cache_version(),
        Some(0x861A_0261)
    );
    assert_eq!(Engine::Demo.compressed_cache_version(), Some(0x861A_0006));
    assert_eq!(Engine::Native.compressed_cache_version(), None);
    assert!(Engine::is_compressed_version(0x861A_0007));
    assert!(!Engine::is_compressed_version(7));
}

#[test]
fn anniversary_detected_by_base_address() {
    assert_eq!(
        Engine::from_base_address(0x4044_8000, 7),
        Some(Engine::Anniversary)
    );
    assert_eq!(
        Engine::from_base_address(0x4044_0000, 7),
        Some(Engine::Retail)
    );
}

#[test]
fn bsp_sits_at_end_of_tag_space() {
    let size = 0x1000;
    assert_eq!(
        Engine::CustomEdition.bsp_address(size),
        0x4044_0000 + MEMORY_LENGTH - size
    );
    assert_eq!(Engine::Anniversary.bsp_address(size), ANNIVERSARY_BSP_ADDRESS);
}

#[test]
fn compression_by_engine() {
    assert_eq!(
        Engine::Anniversary.compression(),
        Some(CompressionScheme::FixedBlock)
    );
    assert_eq!(Engine::Native.compression(), Some(CompressionScheme::Zstd));
    assert_eq!(Engine::Retail.compression(), None);
    assert_eq!(Engine::Native.zstd_levels(), 1..=19);
    assert_eq!(Engine::Xbox.zstd_levels(), 1..=9);
}

#[test]
fn engine_names_parse() {
    for &engine in Engine::ALL {
        assert_eq!(engine.name().parse::<Engine>(), Ok(engine));
    }
    assert_eq!("CUSTOM".parse::<Engine>(), Ok(Engine::CustomEdition));
    let err = "pc".parse::<Engine>().unwrap_err();
    assert!(err.starts_with("unknown engine 'pc'"));
}

#[test]
fn map_types() {
    assert_eq!(MapType::from_u16(1), Some(MapType::Multiplayer));
    assert_eq!(MapType::from_u16(9), None);
    assert_eq!(MapType::UserInterface.as_u16(), 2);
    assert_eq!(MapType::Multiplayer.to_string(), "multiplayer");
}
