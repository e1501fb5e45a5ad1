use rand::{prelude::Distribution, Rng};

use crate::containers::{TupleView, TupleViewFactory};

/// Samples tuples of whole numbers in `-100..=100`, which every element kind can represent exactly
pub(crate) struct SmallIntegerTuples {
    pub tuple_size: usize,
}

impl Distribution<Vec<f64>> for SmallIntegerTuples {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.tuple_size)
            .map(|_| rng.gen_range(-100..=100) as f64)
            .collect()
    }
}

/// Creates a `TupleView` with `count` random tuples, returning the view and the tuples it holds
pub(crate) fn random_tuple_view<R: Rng>(
    rng: &mut R,
    factory: &TupleViewFactory,
    count: usize,
) -> (TupleView, Vec<Vec<f64>>) {
    let tuples = rng
        .sample_iter(SmallIntegerTuples {
            tuple_size: factory.tuple_size(),
        })
        .take(count)
        .collect::<Vec<_>>();
    let mut view = factory.new_buffer(0).unwrap();
    for tuple in &tuples {
        view.push_tuple(tuple).unwrap();
    }
    (view, tuples)
}
