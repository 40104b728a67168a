//! Integration tests for the pipeline module.
//!
//! These tests run the whole scan, compare, resolve and report flow against
//! real image files on disk:
//! - Exact and re-encoded duplicates
//! - Every retention mode
//! - Deletion failures and fatal input errors
//! - The JSON report contract

use assert_fs::prelude::*;
use assert_fs::TempDir;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use image_dedup::core::pipeline::Pipeline;
use image_dedup::core::resolver::FileRemover;
use image_dedup::core::{DuplicateGroup, GroupingMode, MatchKind, RetentionPolicy};
use image_dedup::error::{DeleteError, ScanError};
use image_dedup::DedupError;
use predicates::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

fn png_bytes(image: RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn solid(width: u32, height: u32, value: u8) -> Vec<u8> {
    png_bytes(RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255])))
}

fn pattern(width: u32, height: u32) -> Vec<u8> {
    png_bytes(RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([230, 40, 40, 255])
        } else {
            Rgba([20, 20, 200, 255])
        }
    }))
}

fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 2) as u8, (y * 2) as u8, 128])
    })
}

fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    gradient_rgb(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 95)
        .encode_image(&gradient_rgb(width, height))
        .unwrap();
    bytes
}

fn report_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default()
}

fn read_report(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

/// Remover that refuses to delete anything
struct LockedRemover;

impl FileRemover for LockedRemover {
    fn remove(&self, path: &Path) -> Result<(), DeleteError> {
        Err(DeleteError::PermissionDenied {
            path: path.to_path_buf(),
        })
    }
}

#[test]
fn auto_keep_first_deletes_all_but_the_first_copy() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("a.png").write_binary(&pattern(40, 40)).unwrap();
    photos.child("b.png").write_binary(&pattern(40, 40)).unwrap();
    photos.child("c.png").write_binary(&solid(40, 40, 90)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .policy(RetentionPolicy::AutoKeepFirst)
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.total_candidates, 3);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].match_kind, MatchKind::Exact);

    photos.child("a.png").assert(predicate::path::exists());
    photos.child("b.png").assert(predicate::path::missing());
    photos.child("c.png").assert(predicate::path::exists());

    let report = read_report(&result.report_path);
    let b = photos.path().join("b.png");
    assert_eq!(report["deletedFiles"], serde_json::json!([b]));
    assert_eq!(
        report["duplicateGroups"],
        serde_json::json!([[photos.path().join("a.png"), b]])
    );
}

#[test]
fn list_only_never_deletes() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("one.png").write_binary(&pattern(32, 32)).unwrap();
    photos.child("two.png").write_binary(&pattern(32, 32)).unwrap();
    photos.child("three.png").write_binary(&pattern(32, 32)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 3);
    assert_eq!(result.deleted_count(), 0);
    for name in ["one.png", "two.png", "three.png"] {
        photos.child(name).assert(predicate::path::exists());
    }
}

#[test]
fn reencoded_copy_is_a_similar_duplicate() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("original.png").write_binary(&gradient_png(64, 64)).unwrap();
    photos.child("saved.jpg").write_binary(&gradient_jpeg(64, 64)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].match_kind, MatchKind::Similar);
}

#[test]
fn different_sizes_are_not_duplicates() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("square.png").write_binary(&solid(40, 40, 50)).unwrap();
    photos.child("wide.png").write_binary(&solid(80, 40, 50)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert!(result.groups.is_empty());
}

#[test]
fn corrupt_files_are_never_grouped() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("broken1.jpg").write_binary(b"not an image").unwrap();
    photos.child("broken2.jpg").write_binary(b"not an image").unwrap();
    photos.child("fine.png").write_binary(&solid(10, 10, 1)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .policy(RetentionPolicy::AutoKeepFirst)
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.total_candidates, 3);
    assert!(result.groups.is_empty());
    photos.child("broken2.jpg").assert(predicate::path::exists());
}

#[test]
fn empty_directory_writes_empty_report() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("notes.txt").write_str("not a candidate").unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.total_candidates, 0);
    assert_eq!(report_files(reports.path()), vec![result.report_path.clone()]);

    let report = read_report(&result.report_path);
    assert_eq!(report["duplicateGroups"], serde_json::json!([]));
    assert_eq!(report["deletedFiles"], serde_json::json!([]));
    assert!(report["timestamp"].is_string());
}

#[test]
fn missing_directory_is_fatal_and_writes_no_report() {
    let reports = TempDir::new().unwrap();
    let missing = reports.path().join("does-not-exist");

    let mut pipeline = Pipeline::builder()
        .directory(&missing)
        .report_dir(reports.path().join("out"))
        .build()
        .unwrap();
    let result = pipeline.run();

    assert!(matches!(
        result,
        Err(DedupError::Scan(ScanError::DirectoryNotFound { .. }))
    ));
    reports.child("out").assert(predicate::path::missing());
}

#[test]
fn failed_deletions_are_reported_not_fatal() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("a.png").write_binary(&pattern(24, 24)).unwrap();
    photos.child("b.png").write_binary(&pattern(24, 24)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .policy(RetentionPolicy::AutoKeepFirst)
        .remover(Box::new(LockedRemover))
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.deleted_count(), 0);
    assert_eq!(result.failed_count(), 1);
    photos.child("b.png").assert(predicate::path::exists());

    let report = read_report(&result.report_path);
    assert_eq!(report["deletedFiles"], serde_json::json!([]));
    let failed = &report["failedDeletions"][0];
    assert_eq!(failed["path"], serde_json::json!(photos.path().join("b.png")));
    assert!(failed["reason"]
        .as_str()
        .unwrap()
        .contains("Permission denied"));
}

#[test]
fn interactive_choice_keeps_the_chosen_member() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("a.png").write_binary(&pattern(24, 24)).unwrap();
    photos.child("b.png").write_binary(&pattern(24, 24)).unwrap();
    photos.child("c.png").write_binary(&pattern(24, 24)).unwrap();

    let chooser = |group: &DuplicateGroup| group.members.last().cloned();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .policy(RetentionPolicy::interactive(chooser))
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.deleted_count(), 2);
    photos.child("a.png").assert(predicate::path::missing());
    photos.child("b.png").assert(predicate::path::missing());
    photos.child("c.png").assert(predicate::path::exists());
}

#[test]
fn interactive_without_choice_keeps_everything() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    photos.child("a.png").write_binary(&pattern(24, 24)).unwrap();
    photos.child("b.png").write_binary(&pattern(24, 24)).unwrap();

    let chooser = |_: &DuplicateGroup| -> Option<PathBuf> { None };

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .policy(RetentionPolicy::interactive(chooser))
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.deleted_count(), 0);
    photos.child("b.png").assert(predicate::path::exists());
}

#[test]
fn anchor_grouping_is_not_transitive() {
    let photos = TempDir::new().unwrap();
    let reports = TempDir::new().unwrap();
    // 20 matches both 0 and 40, but 0 and 40 differ beyond tolerance.
    photos.child("a.png").write_binary(&solid(20, 20, 20)).unwrap();
    photos.child("b.png").write_binary(&solid(20, 20, 0)).unwrap();
    photos.child("c.png").write_binary(&solid(20, 20, 40)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos.path())
        .report_dir(reports.path())
        .build()
        .unwrap();
    let anchored = pipeline.run().unwrap();
    assert_eq!(anchored.groups.len(), 1);
    assert_eq!(anchored.groups[0].len(), 3);

    // Anchored on 0, the 40 image is out of reach even though 20 bridges them.
    let photos_b_first = TempDir::new().unwrap();
    photos_b_first.child("a.png").write_binary(&solid(20, 20, 0)).unwrap();
    photos_b_first.child("b.png").write_binary(&solid(20, 20, 20)).unwrap();
    photos_b_first.child("c.png").write_binary(&solid(20, 20, 40)).unwrap();

    let mut pipeline = Pipeline::builder()
        .directory(photos_b_first.path())
        .report_dir(reports.path())
        .build()
        .unwrap();
    let result = pipeline.run().unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].members,
        vec![
            photos_b_first.path().join("a.png"),
            photos_b_first.path().join("b.png"),
        ]
    );

    let mut connected = Pipeline::builder()
        .directory(photos_b_first.path())
        .report_dir(reports.path())
        .grouping_mode(GroupingMode::Connected)
        .build()
        .unwrap();
    let result = connected.run().unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 3);
}
