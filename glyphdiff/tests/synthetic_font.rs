// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end runs over scripted backends.

mod common;

use std::fs;
use std::path::Path;

use common::{Glyph, ScriptedBackend, font_path, init_logging};
use glyphdiff::{CaptureSource, RunConfig, RunError, RunSummary, run};
use kompari::{ImageDifference, compare_images, load_image};

/// Base build: glyph 0 is a space, 1 is a 2×2 block, 2 is a 3×1 bar.
fn base_backend() -> ScriptedBackend {
    ScriptedBackend::new(
        "base",
        vec![Glyph::Blank, Glyph::solid(2, 2), Glyph::solid(3, 1)],
    )
}

/// Test build: glyph 1 grew to 3×3 and a fourth glyph exists only here.
fn test_backend() -> ScriptedBackend {
    ScriptedBackend::new(
        "test",
        vec![
            Glyph::Blank,
            Glyph::solid(3, 3),
            Glyph::solid(3, 1),
            Glyph::solid(2, 1),
        ],
    )
}

fn config(out_dir: &Path) -> RunConfig {
    RunConfig {
        char_size: 16,
        out_dir: out_dir.to_path_buf(),
        ..RunConfig::default()
    }
}

fn report_rows(out_dir: &Path) -> Vec<String> {
    let doc = fs::read_to_string(out_dir.join("index.html")).expect("report written");
    doc.lines()
        .filter(|line| line.starts_with("<tr><td>"))
        .map(str::to_owned)
        .collect()
}

fn ranked_ids(summary: &RunSummary) -> Vec<u32> {
    summary.ranking.divergent().map(|r| r.glyph_id).collect()
}

#[test]
fn divergent_glyphs_are_ranked_and_captured() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let (base, test) = (base_backend(), test_backend());
    let summary = run(&base, &test, &font_path(), &config(out.path())).unwrap();

    assert_eq!((summary.base_glyphs, summary.test_glyphs), (3, 4));
    assert_eq!(ranked_ids(&summary), [1, 3], "ranked divergent glyphs");
    assert_eq!(summary.rows, 2, "report rows");

    let rows = report_rows(out.path());
    assert_eq!(rows.len(), 2, "{rows:#?}");
    assert!(
        rows[0].starts_with("<tr><td>0</td><td>1</td><td>5.00</td>"),
        "|4 - 9| first: {}",
        rows[0]
    );
    assert!(
        rows[1].starts_with("<tr><td>1</td><td>3</td><td>2.00</td>"),
        "test-only glyph second: {}",
        rows[1]
    );
    assert!(rows[1].contains("(empty)"), "no base image for glyph 3");

    let images = out.path().join("images");
    for name in ["base_1.png", "test_1.png", "test_3.png"] {
        assert!(images.join(name).is_file(), "{name} missing");
    }
    for name in ["base_0.png", "test_0.png", "base_2.png", "test_2.png", "base_3.png"] {
        assert!(!images.join(name).exists(), "{name} should not be written");
    }
}

#[test]
fn capture_passes_render_only_divergent_glyphs() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let (base, test) = (base_backend(), test_backend());
    let summary = run(&base, &test, &font_path(), &config(out.path())).unwrap();

    // Hash pass, then only glyph 1 again; glyph 3 is past the base face's end.
    assert_eq!(base.journal.rendered(), [0, 1, 2, 1]);
    assert_eq!(test.journal.rendered(), [0, 1, 2, 3, 1, 3]);

    let (_, capture_base) = summary.passes[2];
    assert_eq!(capture_base.skipped_matching, 2, "glyphs 0 and 2");
    assert_eq!(capture_base.captured, 1, "glyph 1");
    let (_, capture_test) = summary.passes[3];
    assert_eq!(capture_test.captured, 2, "glyphs 1 and 3");
}

#[test]
fn report_images_resolve_and_decode() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let (base, test) = (base_backend(), test_backend());
    run(&base, &test, &font_path(), &config(out.path())).unwrap();

    let mut sources = Vec::new();
    for row in report_rows(out.path()) {
        for piece in row.split("<img src=\"").skip(1) {
            let src = piece.split('"').next().unwrap();
            sources.push(src.to_owned());
        }
    }
    assert_eq!(sources.len(), 3, "{sources:?}");
    for src in &sources {
        let image = load_image(&out.path().join(src)).expect("readable PNG");
        assert!(image.width() > 0 && image.height() > 0, "{src} is empty");
    }

    let grown = load_image(&out.path().join("images/test_1.png")).unwrap();
    assert_eq!((grown.width(), grown.height()), (3, 3), "test glyph 1 size");
    assert_eq!(grown.get_pixel(1, 1).0, [0, 0, 0, 255], "full ink is black");
}

#[test]
fn identical_runs_produce_identical_output() {
    init_logging();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let font = font_path();
    run(&base_backend(), &test_backend(), &font, &config(first.path())).unwrap();
    run(&base_backend(), &test_backend(), &font, &config(second.path())).unwrap();

    let read = |dir: &Path, name: &str| fs::read(dir.join(name)).unwrap();
    assert_eq!(
        read(first.path(), "index.html"),
        read(second.path(), "index.html"),
        "report differs between runs"
    );
    for name in ["images/base_1.png", "images/test_1.png", "images/test_3.png"] {
        assert_eq!(
            read(first.path(), name),
            read(second.path(), name),
            "{name} differs between runs"
        );
    }
}

#[test]
fn rerun_into_same_directory_overwrites() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let config = config(out.path());
    run(&base_backend(), &test_backend(), &font_path(), &config).unwrap();
    let before = fs::read(out.path().join("index.html")).unwrap();
    run(&base_backend(), &test_backend(), &font_path(), &config).unwrap();
    let after = fs::read(out.path().join("index.html")).unwrap();
    assert_eq!(before, after, "rerun changed the report");
}

#[test]
fn legacy_capture_source_renders_both_sides_with_test_build() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let config = RunConfig {
        capture_base_with: CaptureSource::TestBackend,
        ..config(out.path())
    };
    let (base, test) = (base_backend(), test_backend());
    let summary = run(&base, &test, &font_path(), &config).unwrap();

    assert_eq!(base.journal.rendered(), [0, 1, 2], "base only hashes");
    assert_eq!(test.journal.rendered(), [0, 1, 2, 3, 1, 3, 1, 3]);

    let images = out.path().join("images");
    for id in [1, 3] {
        let base_png = load_image(&images.join(format!("base_{id}.png"))).unwrap();
        let test_png = load_image(&images.join(format!("test_{id}.png"))).unwrap();
        assert!(
            matches!(compare_images(&base_png, &test_png), ImageDifference::None),
            "glyph {id}: both captures come from the test build"
        );
    }
    assert!(ranked_ids(&summary).is_empty(), "every difference collapses");
    assert!(report_rows(out.path()).is_empty(), "no rows");
}

#[test]
fn render_failure_degrades_without_ending_the_run() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let base = ScriptedBackend::new(
        "base",
        vec![Glyph::solid(1, 1), Glyph::Broken, Glyph::solid(2, 2)],
    );
    let test = ScriptedBackend::new(
        "test",
        vec![Glyph::solid(1, 1), Glyph::solid(2, 1), Glyph::solid(2, 2)],
    );
    let summary = run(&base, &test, &font_path(), &config(out.path())).unwrap();

    assert_eq!(summary.passes[0].1.failed, 1, "hash-base failure");
    assert_eq!(summary.passes[2].1.failed, 1, "capture-base failure");
    assert_eq!(ranked_ids(&summary), [1], "failed side counts as no ink");
    let record = summary.ranking.records()[0].clone();
    assert_eq!(record.difference, 2.0, "test ink only");
    assert!(record.base_image.is_none(), "nothing captured for base");
}

#[test]
fn glyph_missing_from_test_build_is_reported() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let base = ScriptedBackend::new(
        "base",
        vec![Glyph::Blank, Glyph::solid(1, 1), Glyph::solid(2, 2)],
    );
    let test = ScriptedBackend::new("test", vec![Glyph::Blank, Glyph::solid(1, 1)]);
    let summary = run(&base, &test, &font_path(), &config(out.path())).unwrap();

    assert_eq!((summary.base_glyphs, summary.test_glyphs), (3, 2));
    assert_eq!(ranked_ids(&summary), [2], "base-only glyph");
    assert_eq!(test.journal.rendered(), [0, 1], "test never renders glyph 2");

    let rows = report_rows(out.path());
    assert_eq!(rows.len(), 1, "{rows:#?}");
    assert!(
        rows[0].starts_with("<tr><td>0</td><td>2</td><td>4.00</td>"),
        "base ink is the difference: {}",
        rows[0]
    );
    assert!(rows[0].contains("(empty)"), "no test image for glyph 2");
    assert!(out.path().join("images/base_2.png").is_file(), "base captured");
}

#[test]
fn vanished_and_failed_test_glyphs_keep_their_base_ink() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let base = ScriptedBackend::new(
        "base",
        vec![Glyph::solid(2, 2), Glyph::solid(3, 1), Glyph::solid(1, 1)],
    );
    let test = ScriptedBackend::new(
        "test",
        vec![Glyph::Blank, Glyph::Broken, Glyph::solid(1, 1)],
    );
    let summary = run(&base, &test, &font_path(), &config(out.path())).unwrap();

    assert_eq!(ranked_ids(&summary), [0, 1], "empty and failed test sides");
    let differences: Vec<f64> = summary
        .ranking
        .divergent()
        .map(|r| r.difference)
        .collect();
    assert_eq!(differences, [4.0, 3.0], "base ink only");
    assert_eq!(summary.passes[3].1.skipped_empty, 1, "glyph 0");
    assert_eq!(summary.passes[3].1.failed, 1, "glyph 1");
}

#[test]
fn faces_are_closed_exactly_once() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let (base, test) = (base_backend(), test_backend());
    run(&base, &test, &font_path(), &config(out.path())).unwrap();
    for journal in [&base.journal, &test.journal] {
        assert_eq!((journal.opened(), journal.closed()), (1, 1));
    }
}

#[test]
fn face_failure_is_fatal_and_releases_the_other_face() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let base = base_backend();
    let test = ScriptedBackend::refusing("test");
    let config = config(out.path());
    let err = run(&base, &test, &font_path(), &config).unwrap_err();

    assert!(matches!(err, RunError::Face(_)), "unexpected {err:?}");
    assert!(err.to_string().contains("refuses"), "{err}");
    assert_eq!((base.journal.opened(), base.journal.closed()), (1, 1));
    assert!(base.journal.rendered().is_empty(), "no glyph work");
    assert!(!config.report_path().exists(), "no report on fatal error");
}

#[test]
fn unusable_output_directory_is_fatal_before_any_face_opens() {
    init_logging();
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    let (base, test) = (base_backend(), test_backend());
    let err = run(&base, &test, &font_path(), &config(&blocker)).unwrap_err();

    assert!(matches!(err, RunError::Artifacts(_)), "unexpected {err:?}");
    assert_eq!(base.journal.opened(), 0, "base never opened");
    assert_eq!(test.journal.opened(), 0, "test never opened");
}
