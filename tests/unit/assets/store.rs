use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "lipsync_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn solid(width: u32, height: u32, px: [u8; 4]) -> image::RgbaImage {
    image::RgbaImage::from_pixel(width, height, image::Rgba(px))
}

#[test]
fn dir_source_rejects_missing_directory() {
    let err = DirSpriteSource::new(temp_dir("missing_sprites")).unwrap_err();
    assert!(matches!(err, LipsyncError::Configuration(_)));
}

#[test]
fn dir_source_locates_and_reads_dimensions() {
    let tmp = temp_dir("dir_source");
    std::fs::create_dir_all(&tmp).unwrap();
    solid(6, 4, [1, 2, 3, 255])
        .save(tmp.join("mouth_A.png"))
        .unwrap();

    let source = DirSpriteSource::new(&tmp).unwrap();
    assert_eq!(source.locate(MouthShape::A), Some(tmp.join("mouth_A.png")));
    assert_eq!(source.locate(MouthShape::B), None);
    assert_eq!(
        source.dimensions(MouthShape::A).unwrap(),
        Resolution {
            width: 6,
            height: 4
        }
    );
    let rgba = source.load_rgba(MouthShape::A).unwrap();
    assert_eq!(rgba.get_pixel(0, 0).0, [1, 2, 3, 255]);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn dir_frame_store_writes_absolute_png_paths() {
    let tmp = temp_dir("dir_frames");
    let store = DirFrameStore::create(&tmp).unwrap();
    let path = store
        .store(MouthShape::X, &solid(2, 2, [9, 9, 9, 128]))
        .unwrap();
    assert!(path.is_absolute());
    assert!(path.ends_with("mouth_X.png"));

    let back = image::open(&path).unwrap().into_rgba8();
    assert_eq!(back.get_pixel(1, 1).0, [9, 9, 9, 128]);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn in_memory_stores_round_trip_pixels() {
    let source = InMemorySpriteSource::new().with_sprite(MouthShape::C, solid(3, 3, [0; 4]));
    assert!(source.locate(MouthShape::C).is_some());
    assert!(source.locate(MouthShape::D).is_none());
    assert!(source.load_rgba(MouthShape::D).is_err());

    let frames = InMemoryFrameStore::default();
    assert!(frames.is_empty());
    let path = frames
        .store(MouthShape::C, &solid(3, 3, [5, 6, 7, 8]))
        .unwrap();
    assert_eq!(path, PathBuf::from("/frames/mouth_C.png"));
    assert_eq!(frames.len(), 1);
    assert_eq!(
        frames.frame(MouthShape::C).unwrap().get_pixel(2, 2).0,
        [5, 6, 7, 8]
    );
}
