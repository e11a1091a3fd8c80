//! End-to-end extraction over on-disk archives and shards

#![allow(clippy::expect_used)]

mod common;

use common::{ArchiveBuilder, ShardBuilder, image_header, model_header, model_key, zlib};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use streamdb_extract::{
    BatchCounters, CsvReport, ExportConfig, ExportError, Extractor, FixedSpace, LookupPass,
    MemoryReport, NullReport, ResourceFile, Selection, open_shards,
};
use streamdb_formats::{AssetKind, ShardKey, StreamDbFile, ZlibCodec, dds};

const ICON_HASH: u64 = 0x0123_4567_89ab_cdef;
const ICON_MIPS: i32 = 9;
const HERO_HASH: u64 = 0x1111_2222_3333_4444;
const CRATE_HASH: u64 = 0x5555_6666_7777_8888;
const MISSING_HASH: u64 = 0x9999_aaaa_bbbb_cccc;
const CORRUPT_HASH: u64 = 0xdddd_eeee_ffff_0000;

struct Scenario {
    _dir: tempfile::TempDir,
    root: PathBuf,
    resources: PathBuf,
    listing: PathBuf,
    shards: Vec<PathBuf>,
    pixels: Vec<u8>,
    mesh: Vec<u8>,
    lwo: Vec<u8>,
}

impl Scenario {
    fn output(&self) -> PathBuf {
        self.root.join("out")
    }

    fn extractor(&self) -> Extractor<ResourceFile, StreamDbFile, ZlibCodec> {
        let resource = ResourceFile::with_listing(&self.resources, &self.listing).expect("archive");
        let shards = open_shards(&self.shards).expect("shards");
        Extractor::new(resource, shards, ZlibCodec, self.output())
    }
}

/// One archive with every outcome:
///
/// - `art/ui/icon.tga`: compressed image, direct match in shard 0
/// - `maps/e1m1/lightprobes/probe.tga`: filtered out
/// - `art/broken.tga`: header fails to inflate, not found
/// - `models/hero.md6mesh`: collision retry in shard 1
/// - `models/crate.lwo`: stored payload, off-by-one fallback in shard 0
/// - `models/missing.lwo`: in no shard, not found
/// - `models/corrupt.lwo`: resolved, payload fails to inflate, error
fn scenario() -> Scenario {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path().to_path_buf();

    let pixels: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let packed_pixels = zlib(&pixels);
    let mesh = b"md6mesh-vertex-data".repeat(40);
    let packed_mesh = zlib(&mesh);
    let lwo: Vec<u8> = (0..100u8).collect();

    let icon = image_header(64, 32, ICON_MIPS, 4096, packed_pixels.len() as u32);
    let probe = image_header(16, 16, 1, 64, 64);

    let (resources, listing) = ArchiveBuilder::new()
        .packed("art/ui/icon.tga", AssetKind::Image, ICON_HASH, &icon)
        .raw("maps/e1m1/lightprobes/probe.tga", AssetKind::Image, 0x42, &probe)
        .stored("art/broken.tga", AssetKind::Image, 0x43, b"not zlib at all", 0x5F)
        .raw(
            "models/hero.md6mesh",
            AssetKind::AnimatedModel,
            HERO_HASH,
            &model_header(AssetKind::AnimatedModel, mesh.len() as u32, packed_mesh.len() as u32),
        )
        .raw(
            "models/crate.lwo",
            AssetKind::StaticModel,
            CRATE_HASH,
            &model_header(AssetKind::StaticModel, 100, 100),
        )
        .raw(
            "models/missing.lwo",
            AssetKind::StaticModel,
            MISSING_HASH,
            &model_header(AssetKind::StaticModel, 10, 10),
        )
        .raw(
            "models/corrupt.lwo",
            AssetKind::StaticModel,
            CORRUPT_HASH,
            &model_header(AssetKind::StaticModel, 400, 32),
        )
        .write(&root, "gameresources");

    let shard0 = ShardBuilder::new()
        .block(ShardKey::derive(ICON_HASH, ICON_MIPS), &packed_pixels)
        .block(model_key(CRATE_HASH).prev(), &lwo)
        .block(model_key(CORRUPT_HASH), &[0xEE; 32])
        .write(&root.join("gameresources_0.streamdb"));
    let shard1 = ShardBuilder::new()
        .block(model_key(HERO_HASH), &[0u8; 7])
        .block(model_key(HERO_HASH).next(), &packed_mesh)
        .write(&root.join("gameresources_1.streamdb"));

    Scenario {
        _dir: dir,
        root,
        resources,
        listing,
        shards: vec![shard0, shard1],
        pixels,
        mesh,
        lwo,
    }
}

fn counters(written: u64, not_found: u64, errors: u64) -> BatchCounters {
    BatchCounters {
        written,
        not_found,
        errors,
    }
}

/// Every file under `dir` with its bytes, sorted by path
fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    fn walk(dir: &Path, out: &mut Vec<(PathBuf, Vec<u8>)>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("entry").path();
            if path.is_dir() {
                walk(&path, out);
            } else {
                let bytes = fs::read(&path).expect("read file");
                out.push((path, bytes));
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, &mut files);
    files.sort();
    files
}

#[test]
fn test_extracts_every_kind() {
    let scenario = scenario();
    let summary = scenario
        .extractor()
        .run(&FixedSpace(u64::MAX), &NullReport)
        .expect("run");

    assert_eq!(summary.get(AssetKind::Image), Some(counters(1, 1, 0)));
    assert_eq!(summary.get(AssetKind::AnimatedModel), Some(counters(1, 0, 0)));
    assert_eq!(summary.get(AssetKind::StaticModel), Some(counters(1, 1, 1)));
    assert_eq!(summary.total(), counters(3, 2, 1));

    let out = scenario.output();
    let icon = fs::read(out.join("art/ui/icon.tga")).expect("icon");
    assert_eq!(&icon[..dds::DDS_HEADER_SIZE], &dds::image_header(64, 32, 4096));
    assert_eq!(&icon[dds::DDS_HEADER_SIZE..], scenario.pixels.as_slice());

    assert_eq!(
        fs::read(out.join("models/hero.md6mesh")).expect("mesh"),
        scenario.mesh
    );
    assert_eq!(
        fs::read(out.join("models/crate.lwo")).expect("lwo"),
        scenario.lwo
    );

    assert!(!out.join("maps").exists());
    assert!(!out.join("art/broken.tga").exists());
    assert!(!out.join("models/missing.lwo").exists());
    assert!(!out.join("models/corrupt.lwo").exists());
}

#[test]
fn test_lookup_passes() {
    let scenario = scenario();
    let lists = scenario.extractor().build_lists();
    let pass_of = |name: &str| {
        lists
            .iter()
            .flat_map(|list| list.candidates())
            .find(|c| c.name == name)
            .and_then(|c| c.location.as_ref())
            .map(|loc| (loc.shard_id, loc.pass))
    };

    assert_eq!(pass_of("art/ui/icon.tga"), Some((0, LookupPass::Direct)));
    assert_eq!(
        pass_of("models/hero.md6mesh"),
        Some((1, LookupPass::CollisionRetry))
    );
    assert_eq!(pass_of("models/crate.lwo"), Some((0, LookupPass::OffByOne)));
    assert_eq!(pass_of("models/missing.lwo"), None);
    assert_eq!(pass_of("art/broken.tga"), None);
}

#[test]
fn test_repeated_run_is_identical() {
    let scenario = scenario();
    let reports = scenario.root.join("reports");
    let extractor = scenario.extractor();

    let first = extractor
        .run(&FixedSpace(u64::MAX), &CsvReport::create(&reports).expect("reports"))
        .expect("first run");
    let first_files = snapshot(&scenario.output());
    let first_reports = snapshot(&reports);

    let second = extractor
        .run(&FixedSpace(u64::MAX), &CsvReport::create(&reports).expect("reports"))
        .expect("second run");

    assert_eq!(first, second);
    assert_eq!(first_files, snapshot(&scenario.output()));
    assert_eq!(first_reports, snapshot(&reports));
}

#[test]
fn test_insufficient_space_writes_nothing() {
    let scenario = scenario();
    // Payload sizes of every resolved candidate, the DDS prefix is not counted
    let needed = 4096 + scenario.mesh.len() as u64 + 100 + 400;

    let err = scenario
        .extractor()
        .run(&FixedSpace(needed - 1), &NullReport)
        .expect_err("not enough space");

    assert!(matches!(
        err,
        ExportError::InsufficientSpace { required, available, .. }
            if required == needed && available == needed - 1
    ));
    assert!(!scenario.output().exists());

    scenario
        .extractor()
        .run(&FixedSpace(needed), &NullReport)
        .expect("exactly enough");
    assert!(scenario.output().join("models/crate.lwo").is_file());
}

#[test]
fn test_report_rows() {
    let scenario = scenario();
    let reports = MemoryReport::new();
    scenario
        .extractor()
        .run(&FixedSpace(u64::MAX), &reports)
        .expect("run");

    let matched: Vec<(String, i64, Option<String>)> = reports
        .matched_rows()
        .into_iter()
        .map(|row| (row.name, row.shard_id, row.shard_name))
        .collect();
    assert_eq!(
        matched,
        vec![
            (
                "art/ui/icon.tga".to_string(),
                0,
                Some("gameresources_0.streamdb".to_string())
            ),
            (
                "models/hero.md6mesh".to_string(),
                1,
                Some("gameresources_1.streamdb".to_string())
            ),
            (
                "models/crate.lwo".to_string(),
                0,
                Some("gameresources_0.streamdb".to_string())
            ),
            (
                "models/corrupt.lwo".to_string(),
                0,
                Some("gameresources_0.streamdb".to_string())
            ),
        ]
    );

    let unmatched = reports.unmatched_rows();
    let names: Vec<&str> = unmatched.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["art/broken.tga", "models/missing.lwo"]);
    assert!(unmatched.iter().all(|row| row.shard_id == -1));

    // Header decode failed, so no key was computed
    assert_eq!(unmatched[0].lookup_key, 0);
    assert_eq!(unmatched[1].lookup_key, model_key(MISSING_HASH).get());

    // The computed key is reported, not the key the fallback matched
    let crate_row = reports
        .matched_rows()
        .into_iter()
        .find(|row| row.name == "models/crate.lwo")
        .expect("crate row");
    assert_eq!(crate_row.lookup_key, model_key(CRATE_HASH).get());
}

#[test]
fn test_csv_report_files() {
    let scenario = scenario();
    let reports = scenario.root.join("reports");
    scenario
        .extractor()
        .run(&FixedSpace(u64::MAX), &CsvReport::create(&reports).expect("reports"))
        .expect("run");

    let matched = fs::read_to_string(reports.join("matched.csv")).expect("matched");
    let unmatched = fs::read_to_string(reports.join("unmatched.csv")).expect("unmatched");

    assert_eq!(matched.lines().count(), 4);
    assert_eq!(unmatched.lines().count(), 2);
    assert!(
        matched
            .lines()
            .next()
            .is_some_and(|line| line.starts_with("\"art/ui/icon.tga\",")
                && line.ends_with(",2,0,\"gameresources_0.streamdb\""))
    );
    assert!(unmatched.lines().all(|line| line.ends_with(",-1")));
}

#[test]
fn test_selection_limits_extraction() {
    let scenario = scenario();
    let mut selection = Selection::new();
    selection.insert(AssetKind::StaticModel, "models/crate.lwo");

    let summary = scenario
        .extractor()
        .with_selection(selection)
        .run(&FixedSpace(u64::MAX), &NullReport)
        .expect("run");

    assert_eq!(summary.get(AssetKind::Image), Some(counters(0, 0, 0)));
    assert_eq!(summary.get(AssetKind::AnimatedModel), Some(counters(0, 0, 0)));
    assert_eq!(summary.get(AssetKind::StaticModel), Some(counters(1, 0, 0)));

    let files = snapshot(&scenario.output());
    assert_eq!(files.len(), 1);
    assert!(files[0].0.ends_with("models/crate.lwo"));
}

#[test]
fn test_run_from_config() {
    let scenario = scenario();
    let selection = scenario.root.join("selection.json");
    fs::write(
        &selection,
        r#"{"image": ["art/ui/icon.tga"], "animated_model": ["models/hero.md6mesh"]}"#,
    )
    .expect("selection");

    let config = ExportConfig::new(&scenario.resources, &scenario.listing)
        .with_shard_dir(&scenario.root)
        .with_output_root(scenario.output())
        .with_kinds(vec![AssetKind::AnimatedModel, AssetKind::Image])
        .with_selection(&selection);

    let summary = Extractor::from_config(&config, ZlibCodec)
        .expect("extractor")
        .run(&FixedSpace(u64::MAX), &NullReport)
        .expect("run");

    let kinds: Vec<AssetKind> = summary.batches.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, vec![AssetKind::AnimatedModel, AssetKind::Image]);
    assert_eq!(summary.total(), counters(2, 0, 0));
    assert!(scenario.output().join("models/hero.md6mesh").is_file());
    assert!(scenario.output().join("art/ui/icon.tga").is_file());
}

#[test]
fn test_missing_shard_is_config_error() {
    let scenario = scenario();
    let config = ExportConfig::new(&scenario.resources, &scenario.listing)
        .with_shard(scenario.root.join("absent.streamdb"))
        .with_output_root(scenario.output());

    assert!(matches!(
        Extractor::from_config(&config, ZlibCodec),
        Err(ExportError::Config(_))
    ));
}
