// tests/pipeline_end_to_end.rs

mod common;

use std::error::Error;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use spectree::cli::CliArgs;
use spectree::config::ConfigFile;
use spectree::engine::Services;
use spectree::errors::Result as SpectreeResult;
use spectree::fs::RealFileSystem;
use spectree::fs::mock::MockFileSystem;
use spectree::pipeline::RunSummary;
use spectree::run_pipeline;
use spectree::spectral::Variable;
use spectree::types::Target;
use spectree_test_utils::builders::{ConfigFileBuilder, SpectrumFileBuilder, StationFixture};

type TestResult = Result<(), Box<dyn Error>>;

const INPUT: &str = "/input";
const OUTPUT: &str = "/out";

/// Density 2 and all directional terms 0 over a single bin: variance 1/pi.
fn station(station: u32, year: i32, hours: &[i64]) -> StationFixture {
    let mut density = SpectrumFileBuilder::new().frequencies(&[0.1]);
    let mut flat = SpectrumFileBuilder::new().frequencies(&[0.1]);
    for hour in hours {
        density = density.row([year as i64, 6, 1, *hour, 0], &[2.0]);
        flat = flat.row([year as i64, 6, 1, *hour, 0], &[0.0]);
    }
    StationFixture::uniform(station, year, flat).with(Variable::W, density)
}

fn row(year: i32, station: u32, variance: f64) -> String {
    format!("{year},{station},{variance:.6}")
}

fn sorted_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    lines.sort();
    lines
}

async fn run_mock(fs: &MockFileSystem, config: ConfigFile) -> SpectreeResult<RunSummary> {
    let services = common::mock_services(fs, &common::quiet_env(), config);
    common::with_timeout(run_pipeline(vec![PathBuf::from(INPUT)], services)).await
}

fn out(name: &str) -> PathBuf {
    Path::new(OUTPUT).join(name)
}

#[tokio::test]
async fn local_run_writes_year_rows_and_totals() -> TestResult {
    common::init_tracing();
    let fs = MockFileSystem::new();
    station(12, 2020, &[0, 1]).add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 1);
    assert_eq!(summary.spectra, 2);
    assert!((summary.variance_sum - 2.0 / PI).abs() < 1e-9);
    assert!(summary.started_at.is_some());

    let rows = fs.contents(out("2020.out")).expect("year output");
    assert_eq!(rows, format!("{}\n{}\n", row(2020, 12, 1.0 / PI), row(2020, 12, 1.0 / PI)));
    assert_eq!(fs.contents(out("nspectra.log")).as_deref(), Some("2\n"));
    assert_eq!(fs.contents(out("sumspectra.log")).as_deref(), Some("0.636620\n"));

    let time = fs.contents(out("time.log")).expect("time log");
    assert!(time.trim().parse::<u64>().is_ok(), "time log holds microseconds: {time:?}");
    Ok(())
}

#[tokio::test]
async fn remote_placement_gives_the_same_results() -> TestResult {
    common::init_tracing();
    let fs = MockFileSystem::new();
    station(12, 2020, &[0, 1, 2]).add_to(&fs, Path::new(INPUT));
    station(40, 2020, &[5]).add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new()
        .output_dir(OUTPUT)
        .directory_placement(Target::Remote)
        .group_placement(Target::Remote)
        .workers(2)
        .build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.spectra, 4);

    let rows = fs.contents(out("2020.out")).expect("year output");
    let mut expected = vec![
        row(2020, 12, 1.0 / PI),
        row(2020, 12, 1.0 / PI),
        row(2020, 12, 1.0 / PI),
        row(2020, 40, 1.0 / PI),
    ];
    expected.sort();
    assert_eq!(sorted_lines(&rows), expected);
    assert_eq!(fs.contents(out("nspectra.log")).as_deref(), Some("4\n"));
    Ok(())
}

#[tokio::test]
async fn groups_carrying_their_parent_complete() -> TestResult {
    let fs = MockFileSystem::new();
    station(12, 2020, &[0]).add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new()
        .output_dir(OUTPUT)
        .directory_placement(Target::Local)
        .group_placement(Target::Remote)
        .group_carries_parent(true)
        .workers(1)
        .build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 1);
    assert_eq!(summary.spectra, 1);
    assert_eq!(
        fs.contents(out("2020.out")),
        Some(format!("{}\n", row(2020, 12, 1.0 / PI)))
    );
    Ok(())
}

#[tokio::test]
async fn rows_land_in_the_file_of_their_year() -> TestResult {
    let fs = MockFileSystem::new();
    station(12, 2019, &[0]).add_to(&fs, Path::new(INPUT));
    station(12, 2020, &[0, 1]).add_to(&fs, Path::new(INPUT));
    station(13, 2020, &[3]).add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 3);
    let y2019 = fs.contents(out("2019.out")).expect("2019 output");
    let y2020 = fs.contents(out("2020.out")).expect("2020 output");
    assert_eq!(y2019.lines().count(), 1);
    assert!(y2019.starts_with("2019,12,"));
    assert_eq!(y2020.lines().count(), 3);
    assert_eq!(y2020.lines().filter(|l| l.starts_with("2020,13,")).count(), 1);
    Ok(())
}

#[tokio::test]
async fn no_complete_group_still_writes_totals() -> TestResult {
    let fs = MockFileSystem::new();
    station(12, 2020, &[0])
        .without(Variable::D)
        .add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 0);
    assert_eq!(summary.spectra, 0);
    assert_eq!(fs.contents(out("2020.out")), None);
    assert_eq!(fs.contents(out("nspectra.log")).as_deref(), Some("0\n"));
    assert_eq!(fs.contents(out("sumspectra.log")).as_deref(), Some("0.000000\n"));
    assert!(fs.contents(out("time.log")).is_some());
    Ok(())
}

#[tokio::test]
async fn group_whose_records_are_all_incomplete_produces_no_rows() -> TestResult {
    let fs = MockFileSystem::new();
    let ragged = SpectrumFileBuilder::new()
        .frequencies(&[0.1, 0.2])
        .row([2020, 6, 1, 0, 0], &[1.0, 1.0]);
    station(12, 2020, &[0])
        .with(Variable::J, ragged)
        .add_to(&fs, Path::new(INPUT));
    station(40, 2020, &[0]).add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.spectra, 1);
    assert_eq!(
        fs.contents(out("2020.out")),
        Some(format!("{}\n", row(2020, 40, 1.0 / PI)))
    );
    // One line per log: the directory finished exactly once.
    assert_eq!(fs.contents(out("nspectra.log")).as_deref(), Some("1\n"));
    assert_eq!(fs.contents(out("sumspectra.log")).as_deref(), Some("0.318310\n"));
    assert_eq!(fs.contents(out("time.log")).map(|t| t.lines().count()), Some(1));
    Ok(())
}

#[tokio::test]
async fn unreadable_file_contributes_no_records() -> TestResult {
    common::init_tracing();
    let fs = MockFileSystem::new();
    let fixture = station(12, 2020, &[0, 1]);
    fixture.add_to(&fs, Path::new(INPUT));
    fs.add_file(
        fixture.path_of(Path::new(INPUT), Variable::K),
        b"not gzip at all".to_vec(),
    );

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.groups, 1);
    assert_eq!(summary.spectra, 0);
    assert_eq!(fs.contents(out("2020.out")), None);
    Ok(())
}

#[tokio::test]
async fn missing_value_sentinels_count_as_zero() -> TestResult {
    let fs = MockFileSystem::new();
    let missing_density = SpectrumFileBuilder::new()
        .frequencies(&[0.1])
        .row([2020, 6, 1, 0, 0], &[999.0]);
    station(12, 2020, &[0])
        .with(Variable::W, missing_density)
        .add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    run_mock(&fs, config).await?;

    assert_eq!(
        fs.contents(out("2020.out")).as_deref(),
        Some("2020,12,0.000000\n")
    );
    Ok(())
}

#[tokio::test]
async fn frequencies_come_from_the_density_header() -> TestResult {
    let fs = MockFileSystem::new();
    // Two values everywhere, but only the density header lists a single bin.
    let wide_header = SpectrumFileBuilder::new()
        .frequencies(&[0.1, 0.2, 0.3])
        .row([2020, 6, 1, 0, 0], &[0.0, 0.0]);
    let narrow_density = SpectrumFileBuilder::new()
        .frequencies(&[0.1])
        .row([2020, 6, 1, 0, 0], &[2.0, 2.0]);
    StationFixture::uniform(12, 2020, wide_header)
        .with(Variable::W, narrow_density)
        .add_to(&fs, Path::new(INPUT));

    let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
    let summary = run_mock(&fs, config).await?;

    assert_eq!(summary.spectra, 1);
    assert!(
        (summary.variance_sum - 1.0 / PI).abs() < 1e-9,
        "one bin expected, got {}",
        summary.variance_sum
    );
    Ok(())
}

#[tokio::test]
async fn real_directories_are_processed_end_to_end() -> TestResult {
    common::init_tracing();
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    station(12, 2020, &[0, 1]).write_to(&input.path().join("buoy12"))?;

    let config = ConfigFileBuilder::new()
        .output_dir(output.path())
        .workers(2)
        .build();
    let services = Arc::new(Services::new(
        Arc::new(RealFileSystem),
        Arc::new(common::quiet_env()),
        config,
    ));

    let summary =
        common::with_timeout(run_pipeline(vec![input.path().to_path_buf()], services)).await?;

    assert_eq!(summary.spectra, 2);
    let rows = common::read_or_empty(&output.path().join("2020.out"));
    assert_eq!(rows.lines().count(), 2);
    assert!(rows.lines().all(|l| l.starts_with("2020,12,")));
    assert_eq!(common::read_or_empty(&output.path().join("nspectra.log")), "2\n");
    Ok(())
}

#[tokio::test]
async fn totals_logs_accumulate_across_runs() -> TestResult {
    let fs = MockFileSystem::new();
    station(12, 2020, &[0]).add_to(&fs, Path::new(INPUT));

    for _ in 0..2 {
        let config = ConfigFileBuilder::new().output_dir(OUTPUT).all_local().build();
        run_mock(&fs, config).await?;
    }

    assert_eq!(fs.contents(out("nspectra.log")).as_deref(), Some("1\n1\n"));
    assert_eq!(fs.contents(out("2020.out")).map(|r| r.lines().count()), Some(2));
    Ok(())
}

#[tokio::test]
async fn cli_entry_point_runs_with_overrides() -> TestResult {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    station(7, 2018, &[0]).write_to(input.path())?;

    let args = CliArgs::try_parse_from([
        "spectree".to_string(),
        input.path().display().to_string(),
        "--output-dir".to_string(),
        output.path().display().to_string(),
        "--workers".to_string(),
        "1".to_string(),
        "--group-placement".to_string(),
        "local".to_string(),
    ])?;
    assert_eq!(args.group_placement, Some(Target::Local));

    common::with_timeout(spectree::run(args)).await?;

    let rows = common::read_or_empty(&output.path().join("2018.out"));
    assert!(rows.starts_with("2018,7,"), "{rows:?}");
    Ok(())
}

#[tokio::test]
async fn dry_run_writes_nothing() -> TestResult {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    station(7, 2018, &[0]).write_to(input.path())?;

    let args = CliArgs::try_parse_from([
        "spectree".to_string(),
        input.path().display().to_string(),
        "--output-dir".to_string(),
        output.path().display().to_string(),
        "--dry-run".to_string(),
    ])?;

    common::with_timeout(spectree::run(args)).await?;

    assert_eq!(std::fs::read_dir(output.path())?.count(), 0);
    Ok(())
}
