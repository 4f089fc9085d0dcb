use std::collections::BTreeMap;

use proptest::prelude::*;
use spectree::spectral::{
    MissingValue, SpectrumMatrix, SpectrumSlots, Timestamp, VARIABLE_COUNT, Variable,
    compute_variance, parse_spectrum,
};

type Records = BTreeMap<Timestamp, Vec<f64>>;

// Five record maps over a shared set of timestamps; vector lengths vary so
// that some timestamps end up incomplete.
fn group_records() -> impl Strategy<Value = Vec<Records>> {
    let one_variable = proptest::collection::btree_map(
        (0i64..20).prop_map(Timestamp),
        proptest::collection::vec(-10.0f64..10.0, 1..4),
        0..8,
    );
    proptest::collection::vec(one_variable, VARIABLE_COUNT)
}

fn slots_strategy(len: usize) -> impl Strategy<Value = SpectrumSlots> {
    proptest::array::uniform5(proptest::collection::vec(-100.0f64..100.0, len))
}

fn assemble(records: &[Records], order: &[Variable]) -> SpectrumMatrix {
    let mut matrix = SpectrumMatrix::new();
    for variable in order {
        matrix.insert_variable(*variable, records[variable.slot()].clone());
    }
    matrix
}

proptest! {
    #[test]
    fn matrix_does_not_depend_on_file_arrival_order(
        records in group_records(),
        order in Just(Variable::ALL.to_vec()).prop_shuffle(),
    ) {
        let mut in_order = assemble(&records, &Variable::ALL);
        let mut shuffled = assemble(&records, &order);
        prop_assert_eq!(&in_order, &shuffled);

        let removed_in_order = in_order.remove_incomplete_records();
        let removed_shuffled = shuffled.remove_incomplete_records();
        prop_assert_eq!(removed_in_order, removed_shuffled);
        prop_assert_eq!(in_order, shuffled);
    }

    #[test]
    fn repaired_matrix_only_holds_equal_length_records(records in group_records()) {
        let mut matrix = assemble(&records, &Variable::ALL);
        let before = matrix.len();

        let removed = matrix.remove_incomplete_records();

        prop_assert_eq!(before - removed, matrix.len());
        for timestamp in matrix.timestamps() {
            let slots = matrix.get(timestamp).expect("listed timestamp");
            prop_assert!(slots.iter().all(|slot| slot.len() == slots[0].len()));
        }
    }

    #[test]
    fn extra_frequencies_do_not_change_the_variance(
        slots in slots_strategy(4),
        extra in proptest::collection::vec(0.0f64..1.0, 0..6),
    ) {
        let frequencies = vec![0.1, 0.2, 0.3, 0.4];
        let mut longer = frequencies.clone();
        longer.extend(extra);

        let exact = compute_variance(&slots, &frequencies);
        let padded = compute_variance(&slots, &longer);

        prop_assert!(exact.is_finite());
        prop_assert_eq!(exact.to_bits(), padded.to_bits());
    }

    #[test]
    fn sentinels_are_zeroed_and_other_values_kept(
        value in -5000.0f64..5000.0,
        sentinel in -1000.0f64..1000.0,
    ) {
        let missing = MissingValue { sentinel, tolerance: 0.1 };
        let normalized = missing.normalize(value);

        if (value - sentinel).abs() < 0.1 {
            prop_assert_eq!(normalized, 0.0);
        } else {
            prop_assert_eq!(normalized, value);
        }
    }

    #[test]
    fn parser_never_fails_on_arbitrary_text(text in "[0-9a-z#. \n-]{0,200}") {
        let spectrum = parse_spectrum(text.as_bytes(), MissingValue::default());
        prop_assert!(spectrum.is_ok());
    }
}
