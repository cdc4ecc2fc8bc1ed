//! Integration tests for the sorting pipeline.
//!
//! These tests verify end-to-end behavior including:
//! - Unreadable files with and without ignore-errors
//! - Output naming and file counts
//! - Identical results across worker counts

use histogram_sorter::core::comparator::HistogramMetric;
use histogram_sorter::core::output::OperationMode;
use histogram_sorter::core::pipeline::Sorter;
use histogram_sorter::error::{ExtractError, InputError, SequenceError, SorterError};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str, colour: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(12, 12, Rgb(colour)).save(&path).unwrap();
    path
}

/// Four readable images and one file that only looks like one
fn five_inputs(dir: &Path) -> (Vec<PathBuf>, PathBuf) {
    let broken = dir.join("c_broken.png");
    fs::write(&broken, b"this is not a valid image file").unwrap();

    let inputs = vec![
        write_png(dir, "a_red.png", [240, 20, 20]),
        write_png(dir, "b_green.png", [20, 240, 20]),
        broken.clone(),
        write_png(dir, "d_blue.png", [20, 20, 240]),
        write_png(dir, "e_orange.png", [240, 120, 20]),
    ];
    (inputs, broken)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn unreadable_file_aborts_without_ignore_errors() {
    let temp = TempDir::new().unwrap();
    let (inputs, broken) = five_inputs(temp.path());
    let out_dir = temp.path().join("sorted");

    let result = Sorter::builder()
        .paths(inputs)
        .output_dir(out_dir.clone())
        .build()
        .run();

    match result {
        Err(SorterError::Extract(e)) => {
            assert_eq!(e.path(), &broken);
            assert!(e.to_string().contains("c_broken.png"));
            assert!(matches!(e, ExtractError::DecodeError { .. }));
        }
        other => panic!("expected extraction failure, got {:?}", other),
    }

    // Nothing was materialized
    assert!(!out_dir.exists());
}

#[test]
fn unreadable_file_is_skipped_with_ignore_errors() {
    let temp = TempDir::new().unwrap();
    let (inputs, broken) = five_inputs(temp.path());
    let out_dir = temp.path().join("sorted");

    let result = Sorter::builder()
        .paths(inputs)
        .output_dir(out_dir.clone())
        .ignore_errors(true)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_images, 5);
    assert_eq!(result.order.len(), 4);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].path, broken);
    assert_eq!(result.output_failures(), 0);

    let names = file_names(&out_dir);
    assert_eq!(names.len(), 4);
    assert!(names.iter().all(|n| !n.contains("broken")));
    // Sequence starts from the first surviving input
    assert!(names.contains(&"1_a_red.png".to_string()));
}

#[test]
fn orange_sits_between_red_and_the_rest() {
    let temp = TempDir::new().unwrap();
    let (mut inputs, _) = five_inputs(temp.path());
    inputs.retain(|p| !p.to_string_lossy().contains("broken"));

    let result = Sorter::builder()
        .paths(inputs)
        .dry_run(true)
        .build()
        .run()
        .unwrap();

    let names: Vec<String> = result
        .order
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names[0], "a_red.png");
    assert_eq!(names[1], "e_orange.png");
}

#[test]
fn worker_count_does_not_change_order() {
    let temp = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (0..20u32)
        .map(|i| {
            let colour = [(i * 12) as u8, (255 - i * 12) as u8, ((i * 37) % 255) as u8];
            write_png(temp.path(), &format!("img{:02}.png", i), colour)
        })
        .collect();

    let run = |threads: usize| {
        Sorter::builder()
            .paths(inputs.clone())
            .threads(threads)
            .metric(HistogramMetric::ChiSquare)
            .dry_run(true)
            .build()
            .run()
            .unwrap()
    };

    let sequential = run(1);
    let parallel = run(4);

    assert_eq!(sequential.order, parallel.order);
    assert_eq!(sequential.total_distance, parallel.total_distance);
}

#[test]
fn single_image_is_copied_as_first() {
    let temp = TempDir::new().unwrap();
    let only = write_png(temp.path(), "only.png", [10, 10, 10]);
    let out_dir = temp.path().join("out");

    let result = Sorter::builder()
        .paths(vec![only.clone()])
        .output_dir(out_dir.clone())
        .build()
        .run()
        .unwrap();

    assert_eq!(result.permutation.as_slice(), &[0]);
    assert_eq!(result.total_distance, 0.0);
    assert_eq!(file_names(&out_dir), vec!["1_only.png"]);
}

#[test]
fn move_mode_empties_the_source() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir(&src).unwrap();
    write_png(&src, "a.png", [200, 0, 0]);
    write_png(&src, "b.png", [0, 0, 200]);
    let out_dir = temp.path().join("out");

    Sorter::builder()
        .paths(vec![src.clone()])
        .output_dir(out_dir.clone())
        .operation(OperationMode::Move)
        .build()
        .run()
        .unwrap();

    assert!(file_names(&src).is_empty());
    assert_eq!(file_names(&out_dir), vec!["1_a.png", "2_b.png"]);
}

#[test]
fn all_inputs_unreadable_is_reported() {
    let temp = TempDir::new().unwrap();
    let broken = temp.path().join("broken.jpg");
    fs::write(&broken, b"nope").unwrap();

    let result = Sorter::builder()
        .paths(vec![broken])
        .ignore_errors(true)
        .output_dir(temp.path().join("out"))
        .build()
        .run();

    assert!(matches!(
        result,
        Err(SorterError::Sequence(SequenceError::EmptyInput))
    ));
}

#[test]
fn missing_input_is_rejected_up_front() {
    let result = Sorter::builder()
        .paths(vec![PathBuf::from("/nonexistent/path/photo.png")])
        .dry_run(true)
        .build()
        .run();

    assert!(matches!(
        result,
        Err(SorterError::Input(InputError::NotFound { .. }))
    ));
}

#[test]
fn missing_input_is_skipped_with_ignore_errors() {
    let temp = TempDir::new().unwrap();
    let a = write_png(temp.path(), "a.png", [200, 0, 0]);
    let missing = temp.path().join("missing.png");

    let result = Sorter::builder()
        .paths(vec![missing.clone(), a.clone()])
        .ignore_errors(true)
        .dry_run(true)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.order, vec![a]);
    assert_eq!(result.total_images, 2);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].path, missing);
}

#[cfg(unix)]
#[test]
fn symlinked_image_in_directory_is_sorted() {
    let temp = TempDir::new().unwrap();
    let real = temp.path().join("real");
    let input = temp.path().join("in");
    fs::create_dir(&real).unwrap();
    fs::create_dir(&input).unwrap();
    write_png(&real, "a.png", [200, 0, 0]);
    write_png(&input, "b.png", [0, 0, 200]);
    std::os::unix::fs::symlink(real.join("a.png"), input.join("link.png")).unwrap();
    let out_dir = temp.path().join("out");

    let result = Sorter::builder()
        .paths(vec![input])
        .output_dir(out_dir.clone())
        .build()
        .run()
        .unwrap();

    assert_eq!(result.order.len(), 2);
    assert_eq!(file_names(&out_dir), vec!["1_b.png", "2_link.png"]);
}

#[cfg(unix)]
#[test]
fn unreadable_directory_entry_follows_ignore_errors() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    fs::create_dir(&input).unwrap();
    write_png(&input, "a.png", [200, 0, 0]);
    let dangling = input.join("gone");
    std::os::unix::fs::symlink(temp.path().join("nowhere"), &dangling).unwrap();

    let run = |ignore: bool| {
        Sorter::builder()
            .paths(vec![input.clone()])
            .recursive(true)
            .follow_symlinks(true)
            .ignore_errors(ignore)
            .dry_run(true)
            .build()
            .run()
    };

    assert!(matches!(
        run(false),
        Err(SorterError::Input(InputError::ReadDirectory { .. }))
    ));

    let result = run(true).unwrap();
    assert_eq!(result.order, vec![input.join("a.png")]);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].path, dangling);
}
