use std::fs;
use std::path::Path;

use serde_yml::Value;
use tempfile::TempDir;

use gamedb_core::yaml::load_database;
use gamedb_merge::merge::{CONVERTED_FILE, MERGED_FILE, MergeOptions, run};
use gamedb_merge::progress::SilentProgress;

const UPSTREAM: &str = "\
SLUS-11111:
  name: Test Game (PlayStation2 Classic)
  compat: 5
  clampModes:
    vu0ClampMode: 0
  gsHWFixes:
    beforeDraw: GSC_IRem
    autoFlush: 1
SLUS-22222:
  name: Second Game
  compat: 4
  gameFixes:
    - EETimingHack
";

const ORIGINAL: &str = "\
SLUS-11111:
  name: Test Game (PlayStation 2 Classic)
  compat: 4
  clampModes:
    vuClampMode: 1
  gameFixes:
    - VuAddSubHack
SLPM-60149:
  name: Bakusou Dekotora Densetsu
  compat: 5
SLUS-33333:
  name: No Blocks Here
  compat: 2
";

const OVERRIDE: &str = "\
SLUS-22222:
  name: Override Name
  compat: 1
SLUS-20152:
  name: Burnout
  compat: 5
  speedHacks:
    mvuFlag: 1
";

fn setup(dir: &Path) -> MergeOptions {
    fs::write(dir.join("GameIndex.yaml"), UPSTREAM).unwrap();
    fs::create_dir(dir.join("files")).unwrap();
    fs::write(dir.join("files/GameIndex[original].yaml"), ORIGINAL).unwrap();
    fs::write(dir.join("files/GameIndex[override].yaml"), OVERRIDE).unwrap();
    MergeOptions {
        input: dir.join("GameIndex.yaml"),
        work_dir: dir.to_path_buf(),
    }
}

fn entry<'a>(db: &'a serde_yml::Mapping, id: &str) -> &'a serde_yml::Mapping {
    db.get(id).and_then(Value::as_mapping).unwrap()
}

fn block<'a>(db: &'a serde_yml::Mapping, id: &str, field: &str) -> &'a serde_yml::Mapping {
    entry(db, id).get(field).and_then(Value::as_mapping).unwrap()
}

#[test]
fn full_pipeline_produces_converted_and_merged_documents() {
    let tmp = TempDir::new().unwrap();
    let options = setup(tmp.path());

    let report = run(&options, &SilentProgress).unwrap();
    assert_eq!(report.converted_entries, 2);
    assert_eq!(report.merged_entries, 4);

    let converted_text = fs::read_to_string(tmp.path().join(CONVERTED_FILE)).unwrap();
    assert!(!converted_text.contains("GSC_IRem"));
    assert!(converted_text.contains("PlayStation 2 Classic"));

    let merged_text = fs::read_to_string(tmp.path().join(MERGED_FILE)).unwrap();
    assert!(!merged_text.contains("GSC_IRem"));
    assert!(!merged_text.contains(": null"));

    let merged = load_database(&tmp.path().join(MERGED_FILE)).unwrap();

    // Upstream order first, overlay-introduced entries appended.
    let ids: Vec<&str> = merged.keys().filter_map(Value::as_str).collect();
    assert_eq!(ids, vec!["SLUS-11111", "SLUS-22222", "SLPM-60149", "SLUS-20152"]);
}

#[test]
fn reconciled_entry_migrates_clamp_and_keeps_upstream_compat() {
    let tmp = TempDir::new().unwrap();
    let options = setup(tmp.path());
    run(&options, &SilentProgress).unwrap();
    let merged = load_database(&tmp.path().join(MERGED_FILE)).unwrap();

    let clamp = block(&merged, "SLUS-11111", "clampModes");
    assert!(clamp.get("vuClampMode").is_none());
    assert_eq!(clamp.get("vu0ClampMode"), Some(&Value::from(0)));

    let e = entry(&merged, "SLUS-11111");
    assert_eq!(e.get("compat"), Some(&Value::from(5)));

    // gsHWFixes fell back from the converted document; the ignored hook is gone.
    let hw = block(&merged, "SLUS-11111", "gsHWFixes");
    assert_eq!(hw.get("autoFlush"), Some(&Value::from(1)));
    assert!(hw.get("beforeDraw").is_none());

    let fixes: Vec<&str> = e
        .get("gameFixes")
        .and_then(Value::as_sequence)
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(fixes, vec!["VuAddSubHack"]);
}

#[test]
fn overrides_win_wholesale_and_irrelevant_original_entries_drop() {
    let tmp = TempDir::new().unwrap();
    let options = setup(tmp.path());
    run(&options, &SilentProgress).unwrap();
    let merged = load_database(&tmp.path().join(MERGED_FILE)).unwrap();

    let e = entry(&merged, "SLUS-22222");
    assert_eq!(e.get("name"), Some(&Value::from("Override Name")));
    assert_eq!(e.get("compat"), Some(&Value::from(1)));
    assert!(e.get("gameFixes").is_none());

    assert!(merged.get("SLUS-33333").is_none());
}

#[test]
fn corrections_cover_entries_introduced_by_overlays() {
    let tmp = TempDir::new().unwrap();
    let options = setup(tmp.path());
    run(&options, &SilentProgress).unwrap();
    let merged = load_database(&tmp.path().join(MERGED_FILE)).unwrap();

    // Introduced by the original-document overlay, no speedHacks anywhere.
    let hacks = block(&merged, "SLPM-60149", "speedHacks");
    assert_eq!(hacks.get("mvuFlag"), Some(&Value::from(0)));

    // Introduced by the override overlay with the wrong value; the second
    // reconciliation pass forces it back.
    let hacks = block(&merged, "SLUS-20152", "speedHacks");
    assert_eq!(hacks.get("mvuFlag"), Some(&Value::from(0)));
}

#[test]
fn no_temp_files_left_behind() {
    let tmp = TempDir::new().unwrap();
    let options = setup(tmp.path());
    run(&options, &SilentProgress).unwrap();

    for entry in fs::read_dir(tmp.path()).unwrap() {
        let name = entry.unwrap().file_name();
        assert!(
            !name.to_string_lossy().contains("GameIndex[temp]"),
            "leftover temp file: {name:?}"
        );
    }
}
