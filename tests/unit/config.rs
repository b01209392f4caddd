use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("talkhead_cfg_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn minimal_config_gets_defaults_and_resolved_paths() {
    let dir = scratch_dir("minimal");
    let path = dir.join("talkhead.json");
    std::fs::write(
        &path,
        r#"{
            "generator": {"program": "lipsync"},
            "face_path": "pupsik_face.mp4",
            "idle_path": "images/big_pups_2.png"
        }"#,
    )
    .unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.pitch_shift, 6);
    assert!(cfg.lip_crop);
    assert_eq!(
        cfg.canvas,
        CanvasSize {
            width: 1080,
            height: 1080
        }
    );
    assert_eq!(cfg.display, DisplayKind::Ffplay);
    assert_eq!(cfg.secrets_path, dir.join("secrets.json"));
    assert_eq!(cfg.face_kind(), AssetKind::LoopingVideo);
    assert_eq!(cfg.idle_kind(), AssetKind::StillImage);
    assert!(cfg.correction.parallel);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn explicit_idle_kind_wins_over_extension() {
    let cfg: AppConfig = serde_json::from_str(
        r#"{
            "generator": {"program": "g", "args": ["{text}"]},
            "face_path": "f.png",
            "idle_path": "idle.bin",
            "idle_kind": "looping_video",
            "display": "null"
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.idle_kind(), AssetKind::LoopingVideo);
    assert_eq!(cfg.display, DisplayKind::Null);
}

#[test]
fn zero_canvas_and_missing_files_are_config_errors() {
    let cfg: AppConfig = serde_json::from_str(
        r#"{
            "generator": {"program": "g"},
            "face_path": "f.png",
            "idle_path": "i.png",
            "canvas": {"width": 0, "height": 10}
        }"#,
    )
    .unwrap();
    assert!(matches!(cfg.validate(), Err(TalkheadError::Config(_))));

    let err = AppConfig::load(Path::new("/no/such/talkhead.json")).unwrap_err();
    assert!(matches!(err, TalkheadError::Config(_)));
}

#[test]
fn secrets_require_a_key() {
    let dir = scratch_dir("secrets");
    let good = dir.join("secrets.json");
    std::fs::write(&good, r#"{"lip_api_key": "abc"}"#).unwrap();
    assert_eq!(Secrets::load(&good).unwrap().lip_api_key, "abc");
    assert!(!format!("{:?}", Secrets::load(&good).unwrap()).contains("abc"));

    let empty = dir.join("empty.json");
    std::fs::write(&empty, r#"{"lip_api_key": "  "}"#).unwrap();
    assert!(matches!(Secrets::load(&empty), Err(TalkheadError::Config(_))));

    let missing = dir.join("missing.json");
    std::fs::write(&missing, r#"{}"#).unwrap();
    assert!(matches!(Secrets::load(&missing), Err(TalkheadError::Config(_))));

    std::fs::remove_dir_all(dir).ok();
}
