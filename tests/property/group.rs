use std::path::{Path, PathBuf};
use std::sync::Arc;

use proptest::prelude::*;
use spectree::config::ConfigFile;
use spectree::engine::{CoreCommand, CoreRuntime, Placement, Services};
use spectree::fs::mock::MockFileSystem;
use spectree::pipeline::{GroupPhase, GroupTask, Kernel};
use spectree::spectral::{SpectrumGroup, Timestamp, VARIABLE_COUNT, Variable, scan_directories};
use spectree_test_utils::builders::{SpectrumFileBuilder, StationFixture};
use spectree_test_utils::fake_env::FakeEnvironment;

/// Header bins and (hour, values) rows of one variable file.
type FileSpec = (Vec<f64>, Vec<(i64, Vec<f64>)>);

fn file_spec() -> impl Strategy<Value = FileSpec> {
    (
        proptest::collection::vec(0.01f64..1.0, 0..4),
        proptest::collection::vec(
            (0i64..6, proptest::collection::vec(-50.0f64..50.0, 1..4)),
            0..8,
        ),
    )
}

fn seed_group(specs: &[FileSpec]) -> (MockFileSystem, SpectrumGroup) {
    let fs = MockFileSystem::new();
    let mut fixture = StationFixture::new(7, 2021);
    for (variable, (header, rows)) in Variable::ALL.into_iter().zip(specs) {
        let mut builder = SpectrumFileBuilder::new().frequencies(header);
        for (hour, values) in rows {
            builder = builder.row([2021, 2, 3, *hour, 0], values);
        }
        fixture = fixture.with(variable, builder);
    }
    fixture.add_to(&fs, Path::new("/in"));

    let mut outcome = scan_directories(&fs, &[PathBuf::from("/in")]).expect("scan");
    let group = outcome.complete.pop().expect("one complete group");
    (fs, group)
}

/// Run `group` as the root of a fresh local-only core.
fn run_group(fs: &MockFileSystem, group: SpectrumGroup) -> GroupTask {
    let services = Arc::new(Services::new(
        Arc::new(fs.clone()),
        Arc::new(FakeEnvironment::new("property-host")),
        ConfigFile::default(),
    ));
    let mut core = CoreRuntime::<Kernel>::new(services, Placement::local_only());

    let step = core
        .start(Kernel::Group(GroupTask::new(group)))
        .expect("group runs");
    step.commands
        .into_iter()
        .find_map(|command| match command {
            CoreCommand::Finished(Kernel::Group(task)) => Some(task),
            _ => None,
        })
        .expect("group finished")
}

fn variance_bits(task: &GroupTask) -> Vec<(Timestamp, u64)> {
    task.variances()
        .iter()
        .map(|(timestamp, variance)| (*timestamp, variance.to_bits()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn group_result_does_not_depend_on_file_completion_order(
        specs in proptest::collection::vec(file_spec(), VARIABLE_COUNT),
        order in Just((0..VARIABLE_COUNT).collect::<Vec<usize>>()).prop_shuffle(),
    ) {
        let (fs, group) = seed_group(&specs);
        let mut shuffled = group.clone();
        shuffled.files = order.iter().map(|&index| group.files[index].clone()).collect();

        let canonical = run_group(&fs, group);
        let permuted = run_group(&fs, shuffled);

        prop_assert_eq!(canonical.phase(), GroupPhase::Processing);
        prop_assert_eq!(permuted.phase(), GroupPhase::Processing);
        prop_assert_eq!(canonical.num_processed(), permuted.num_processed());
        prop_assert_eq!(variance_bits(&canonical), variance_bits(&permuted));
        prop_assert_eq!(canonical.output_rows(), permuted.output_rows());
    }
}
