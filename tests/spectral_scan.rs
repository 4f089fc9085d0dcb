// tests/spectral_scan.rs

mod common;

use std::error::Error;
use std::path::{Path, PathBuf};

use spectree::fs::RealFileSystem;
use spectree::fs::mock::MockFileSystem;
use spectree::spectral::{FileNamePattern, GroupKey, Variable, scan_directories};
use spectree_test_utils::builders::{SpectrumFileBuilder, StationFixture};

type TestResult = Result<(), Box<dyn Error>>;

fn fixture(station: u32, year: i32) -> StationFixture {
    StationFixture::uniform(
        station,
        year,
        SpectrumFileBuilder::new()
            .frequencies(&[0.1])
            .row([year as i64, 1, 1, 0, 0], &[1.0]),
    )
}

#[test]
fn file_names_follow_station_variable_year() -> TestResult {
    let pattern = FileNamePattern::new()?;

    let file = pattern
        .parse(Path::new("/data/buoys/41001w2019.txt.gz"))
        .expect("valid name");
    assert_eq!(file.station, 41001);
    assert_eq!(file.variable, Variable::W);
    assert_eq!(file.year, 2019);
    assert_eq!(
        file.key(),
        GroupKey {
            year: 2019,
            station: 41001
        }
    );

    for rejected in [
        "41001w2019.txt",
        "41001x2019.txt.gz",
        "w2019.txt.gz",
        "41001W2019.txt.gz",
        "41001w2019.txt.gz.bak",
        "readme.md",
    ] {
        assert!(
            pattern.parse(Path::new(rejected)).is_none(),
            "{rejected} should not match"
        );
    }
    Ok(())
}

#[test]
fn complete_group_is_found_with_files_in_variable_order() -> TestResult {
    common::init_tracing();
    let fs = MockFileSystem::new();
    let dir = Path::new("/data");
    fixture(12, 2020).add_to(&fs, dir);

    let outcome = scan_directories(&fs, &[dir.to_path_buf()])?;

    assert_eq!(outcome.complete.len(), 1);
    assert!(outcome.incomplete.is_empty());
    assert_eq!(outcome.files_seen, 5);

    let group = &outcome.complete[0];
    assert_eq!(
        group.key,
        GroupKey {
            year: 2020,
            station: 12
        }
    );
    let variables: Vec<Variable> = group.files.iter().map(|f| f.variable).collect();
    assert_eq!(variables, Variable::ALL.to_vec());
    Ok(())
}

#[test]
fn groups_missing_a_variable_are_incomplete() -> TestResult {
    let fs = MockFileSystem::new();
    let dir = Path::new("/data");
    fixture(12, 2020).without(Variable::K).add_to(&fs, dir);
    fixture(13, 2020).add_to(&fs, dir);

    let outcome = scan_directories(&fs, &[dir.to_path_buf()])?;

    assert_eq!(outcome.complete.len(), 1);
    assert_eq!(outcome.complete[0].key.station, 13);
    assert_eq!(outcome.incomplete.len(), 1);
    assert_eq!(outcome.incomplete[0].key.station, 12);
    assert_eq!(outcome.incomplete[0].files.len(), 4);
    Ok(())
}

#[test]
fn unrelated_files_are_ignored() -> TestResult {
    let fs = MockFileSystem::new();
    let dir = Path::new("/data");
    fixture(12, 2020).add_to(&fs, dir);
    fs.add_file("/data/notes.txt", b"hello".to_vec());
    fs.add_file("/data/12w2020.txt", b"uncompressed".to_vec());

    let outcome = scan_directories(&fs, &[dir.to_path_buf()])?;

    assert_eq!(outcome.files_seen, 5);
    assert_eq!(outcome.complete.len(), 1);
    Ok(())
}

#[test]
fn groups_are_ordered_by_year_then_station() -> TestResult {
    let fs = MockFileSystem::new();
    let dir = Path::new("/data");
    fixture(30, 2019).add_to(&fs, dir);
    fixture(7, 2021).add_to(&fs, dir);
    fixture(12, 2019).add_to(&fs, dir);

    let outcome = scan_directories(&fs, &[dir.to_path_buf()])?;

    let keys: Vec<(i32, u32)> = outcome
        .complete
        .iter()
        .map(|g| (g.key.year, g.key.station))
        .collect();
    assert_eq!(keys, vec![(2019, 12), (2019, 30), (2021, 7)]);
    Ok(())
}

#[test]
fn a_group_may_span_several_directories() -> TestResult {
    let fs = MockFileSystem::new();
    let full = fixture(12, 2020);
    full.clone()
        .without(Variable::W)
        .without(Variable::D)
        .add_to(&fs, Path::new("/a"));
    StationFixture::new(12, 2020)
        .with(Variable::W, SpectrumFileBuilder::new())
        .with(Variable::D, SpectrumFileBuilder::new())
        .add_to(&fs, Path::new("/b/nested"));

    let outcome = scan_directories(&fs, &[PathBuf::from("/a"), PathBuf::from("/b")])?;

    assert_eq!(outcome.complete.len(), 1);
    assert_eq!(outcome.files_seen, 5);
    Ok(())
}

#[test]
fn repeated_input_directories_do_not_duplicate_files() -> TestResult {
    let fs = MockFileSystem::new();
    let dir = PathBuf::from("/data");
    fixture(12, 2020).add_to(&fs, &dir);

    let outcome = scan_directories(&fs, &[dir.clone(), dir])?;

    assert_eq!(outcome.files_seen, 5);
    assert_eq!(outcome.complete.len(), 1);
    assert!(outcome.incomplete.is_empty());
    Ok(())
}

#[test]
fn missing_directory_is_skipped() -> TestResult {
    common::init_tracing();
    let fs = MockFileSystem::new();
    fixture(12, 2020).add_to(&fs, Path::new("/data"));

    let outcome = scan_directories(
        &fs,
        &[PathBuf::from("/does/not/exist"), PathBuf::from("/data")],
    )?;

    assert_eq!(outcome.complete.len(), 1);
    Ok(())
}

#[test]
fn real_directory_is_walked_recursively() -> TestResult {
    let tmp = tempfile::tempdir()?;
    fixture(12, 2020).write_to(&tmp.path().join("deep").join("er"))?;
    fixture(14, 2020).write_to(tmp.path())?;

    let outcome = scan_directories(&RealFileSystem, &[tmp.path().to_path_buf()])?;

    assert_eq!(outcome.complete.len(), 2);
    assert_eq!(outcome.files_seen, 10);
    Ok(())
}

#[test]
fn unreadable_subdirectory_does_not_hide_its_siblings() -> TestResult {
    common::init_tracing();
    let fs = MockFileSystem::new();
    fixture(12, 2020).add_to(&fs, Path::new("/data/locked"));
    fixture(13, 2020).add_to(&fs, Path::new("/data/open"));
    fixture(14, 2021).add_to(&fs, Path::new("/data"));
    fs.lock_dir("/data/locked");

    let outcome = scan_directories(&fs, &[PathBuf::from("/data")])?;

    let stations: Vec<u32> = outcome.complete.iter().map(|g| g.key.station).collect();
    assert_eq!(stations, vec![13, 14]);
    assert_eq!(outcome.files_seen, 10);
    Ok(())
}

#[test]
fn unreadable_input_directory_is_skipped() -> TestResult {
    let fs = MockFileSystem::new();
    fixture(12, 2020).add_to(&fs, Path::new("/locked"));
    fixture(13, 2020).add_to(&fs, Path::new("/open"));
    fs.lock_dir("/locked");

    let outcome = scan_directories(&fs, &[PathBuf::from("/locked"), PathBuf::from("/open")])?;

    assert_eq!(outcome.complete.len(), 1);
    assert_eq!(outcome.complete[0].key.station, 13);
    Ok(())
}

#[test]
fn zero_padded_station_is_its_own_group() -> TestResult {
    let fs = MockFileSystem::new();
    let dir = Path::new("/data");
    fixture(12, 2020).add_to(&fs, dir);
    let payload = SpectrumFileBuilder::new()
        .frequencies(&[0.1])
        .row([2020, 1, 1, 0, 0], &[1.0])
        .gzip();
    for variable in Variable::ALL {
        fs.add_file(dir.join(format!("012{}2020.txt.gz", variable.code())), payload.clone());
    }

    let outcome = scan_directories(&fs, &[dir.to_path_buf()])?;

    assert_eq!(outcome.files_seen, 10);
    assert!(outcome.incomplete.is_empty());
    assert_eq!(outcome.complete.len(), 2);
    for group in &outcome.complete {
        assert_eq!(group.key.station, 12);
        assert_eq!(group.files.len(), 5);
        let digits: Vec<&str> = group.files.iter().map(|f| f.station_digits.as_str()).collect();
        assert!(digits.windows(2).all(|pair| pair[0] == pair[1]), "{digits:?}");
    }
    Ok(())
}
