use bale_core::{
    containers::{
        new_tuple_buffer, CompoundStringBuffer, CompoundTupleBuffer, TupleView, TupleViewFactory,
    },
    layout::{AllocationMode, ElementKind, PrimitiveElement},
    storage::{PrimitiveStore, StoreFactory},
    BufferError, Result,
};
use itertools::Itertools;
use rand::{thread_rng, Rng};

const MODES: [AllocationMode; 2] = [AllocationMode::Direct, AllocationMode::Managed];
const ROW: &[f64] = &[1.0, 2.0];

fn view_from_rows(factory: &TupleViewFactory, rows: &[&[f64]]) -> Result<TupleView> {
    let mut view = factory.new_buffer(0)?;
    for row in rows {
        view.push_tuple(*row)?;
    }
    Ok(view)
}

#[test]
fn string_buffer_trims_sub_strings() -> Result<()> {
    let mut buffer = CompoundStringBuffer::new(4, 8)?;
    for point in ["  Point A  ", "Point B", "  Point C"].iter() {
        buffer.append_sub_buffer(*point)?;
    }
    assert_eq!(3, buffer.num_sub_buffers());
    assert_eq!("Point A", buffer.get_sub_string(0)?);
    assert_eq!("Point C", buffer.get_sub_string(2)?);
    Ok(())
}

#[test]
fn float_tuples_are_stored_contiguously() -> Result<()> {
    let mut view = TupleViewFactory::float32(3).new_buffer(2)?;
    view.set_tuple(0, &[1.0f32, 2.0, 3.0])?;
    view.set_tuple(1, &[4.0f32, 5.0, 6.0])?;
    assert_eq!(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], view.elements::<f32>()?);
    assert_eq!(24, view.as_bytes().len());
    Ok(())
}

#[test]
fn new_buffers_hold_zeroed_tuples() -> Result<()> {
    let mut rng = thread_rng();
    for kind in ElementKind::ALL.iter().copied() {
        for mode in MODES.iter().copied() {
            let tuple_size = rng.gen_range(1..8);
            let tuple_count = rng.gen_range(0..32);
            let view = new_tuple_buffer(tuple_size, kind, mode, tuple_count)?;
            assert_eq!(tuple_count, view.len());
            for index in 0..tuple_count {
                let tuple = view.get_tuple::<f64>(index)?;
                assert_eq!(tuple_size, tuple.len());
                assert!(tuple.iter().all(|value| *value == 0.0));
            }
        }
    }
    Ok(())
}

fn check_tuple_round_trip<T: PrimitiveElement>(values: &[T]) -> Result<()> {
    for mode in MODES.iter().copied() {
        let factory = TupleViewFactory::of::<T>(values.len()).with_allocation_mode(mode);
        let mut view = factory.new_buffer(4)?;
        view.set_tuple(2, values)?;
        assert_eq!(values, view.get_tuple::<T>(2)?.as_slice());
        assert_eq!(values, view.tuple::<T>(2)?);
        assert_eq!(vec![T::default(); values.len()], view.get_tuple::<T>(3)?);
    }
    Ok(())
}

#[test]
fn tuples_round_trip_for_all_kinds() -> Result<()> {
    check_tuple_round_trip(&[i8::MIN, -1, 0, i8::MAX])?;
    check_tuple_round_trip(&[i16::MIN, 1234, i16::MAX])?;
    check_tuple_round_trip(&[i32::MIN, -77, i32::MAX])?;
    check_tuple_round_trip(&[f32::MIN, 0.25, f32::MAX])?;
    check_tuple_round_trip(&[f64::MIN_POSITIVE, -1e300, 3.5])?;
    Ok(())
}

#[test]
fn sub_buffer_indices_are_bounds_checked() -> Result<()> {
    let buffer = ["a", "b", "c"].iter().collect::<CompoundStringBuffer>();
    assert_eq!("a", buffer.get_sub_string(0)?);
    assert_eq!("c", buffer.get_sub_string(2)?);
    assert_eq!(
        Err(BufferError::IndexOutOfBounds { index: 3, len: 3 }),
        buffer.get_sub_string(3)
    );
    assert!(buffer.sub_str(usize::MAX).is_err());

    let empty = CompoundTupleBuffer::new(TupleViewFactory::int8(2), 0, 0)?;
    assert!(matches!(
        empty.get_sub_buffer(0),
        Err(BufferError::IndexOutOfBounds { index: 0, len: 0 })
    ));
    Ok(())
}

#[test]
fn tuple_indices_are_bounds_checked() -> Result<()> {
    for mode in MODES.iter().copied() {
        for count in [0, 1, 7].iter().copied() {
            let view = new_tuple_buffer(3, ElementKind::F32, mode, count)?;
            if count > 0 {
                assert_eq!(3, view.get_tuple::<f64>(0)?.len());
                assert_eq!(3, view.tuple::<f32>(count - 1)?.len());
            }
            let expected = BufferError::IndexOutOfBounds {
                index: count,
                len: count,
            };
            assert_eq!(Err(expected.clone()), view.get_tuple::<f32>(count));
            assert_eq!(Err(expected), view.tuple::<f32>(count));
        }
    }
    Ok(())
}

#[test]
fn append_increases_count_by_one() -> Result<()> {
    let factory = TupleViewFactory::float64(2);
    let mut buffer = CompoundTupleBuffer::new(factory, 1, 1)?;
    for count in 0..10 {
        assert_eq!(count, buffer.num_sub_buffers());
        let rows = (0..count).map(|_| ROW).collect::<Vec<_>>();
        let index = buffer.append_sub_buffer(&view_from_rows(&factory, &rows)?)?;
        assert_eq!(count, index);
        assert_eq!(count + 1, buffer.num_sub_buffers());
    }
    Ok(())
}

#[test]
fn subset_is_independent_of_source() -> Result<()> {
    let factory = TupleViewFactory::int32(2);
    let mut buffer = CompoundTupleBuffer::new(factory, 2, 2)?;
    buffer.append_sub_buffer(&view_from_rows(&factory, &[&[1.0, 1.0]])?)?;
    buffer.append_sub_buffer(&view_from_rows(&factory, &[&[2.0, 2.0], &[2.0, 2.0]])?)?;
    buffer.append_sub_buffer(&view_from_rows(&factory, &[&[3.0, 3.0]])?)?;

    let mut subset = buffer.subset(&[2, 0])?;
    assert_eq!(2, subset.num_sub_buffers());
    assert_eq!(buffer.get_sub_buffer(2)?, subset.get_sub_buffer(0)?);
    assert_eq!(buffer.get_sub_buffer(0)?, subset.get_sub_buffer(1)?);

    buffer.append_sub_buffer(&view_from_rows(&factory, &[&[4.0, 4.0]])?)?;
    subset.append_sub_buffer(&view_from_rows(&factory, &[&[5.0, 5.0]])?)?;
    assert_eq!(&[3, 3], subset.sub_elements::<i32>(0)?);
    assert_eq!(&[1, 1], subset.sub_elements::<i32>(1)?);
    assert_eq!(&[5, 5], subset.sub_elements::<i32>(2)?);
    assert_eq!(4, buffer.num_sub_buffers());
    assert_eq!(&[4, 4], buffer.sub_elements::<i32>(3)?);
    Ok(())
}

#[test]
fn subset_allows_repeated_indices() -> Result<()> {
    let buffer = ["x", "y"].iter().collect::<CompoundStringBuffer>();
    let subset = buffer.subset(&[1, 1, 0, 1])?;
    assert_eq!(
        vec!["y", "y", "x", "y"],
        subset.sub_strs().collect::<Vec<_>>()
    );
    assert_eq!("yyxy", subset.backing_buffer().as_str());
    Ok(())
}

#[test]
fn growth_preserves_all_sub_buffers() -> Result<()> {
    let mut buffer = CompoundStringBuffer::new(2, 3)?;
    let mut capacities = vec![buffer.capacity()];
    let expected = (0..50).map(|index| format!("entry {}", index)).collect_vec();
    for entry in &expected {
        buffer.append_sub_buffer(entry.as_str())?;
        capacities.push(buffer.capacity());
    }
    let growth_events = capacities.iter().dedup().count() - 1;
    assert!(growth_events >= 2);
    for (index, entry) in expected.iter().enumerate() {
        assert_eq!(*entry, buffer.get_sub_string(index)?);
    }
    Ok(())
}

#[test]
fn direct_and_managed_memory_behave_the_same() -> Result<()> {
    let mut rng = thread_rng();
    let values = (0..100).map(|_| rng.gen_range(-1000.0f64..1000.0)).collect_vec();
    let mut stores = MODES
        .iter()
        .map(|mode| PrimitiveStore::allocate(ElementKind::F64, 0, *mode))
        .collect::<Result<Vec<_>>>()?;
    for store in stores.iter_mut() {
        store.extend_from_slice(&values)?;
        store.set_f64(17, 42.0)?;
        store.truncate(60);
        store.resize(80)?;
    }
    assert_eq!(stores[0], stores[1]);
    assert_eq!(stores[0].as_bytes(), stores[1].as_bytes());
    assert_eq!(0.0, stores[1].get_f64(79)?);
    assert_eq!(42.0, stores[0].get_f64(17)?);
    Ok(())
}

#[test]
fn store_factory_and_tuple_factory_agree() -> Result<()> {
    let store = StoreFactory::managed::<i16>().new_store(6)?;
    let view = TupleView::from_store(3, store)?;
    let expected = TupleViewFactory::int16(3)
        .with_allocation_mode(AllocationMode::Managed)
        .new_buffer(2)?;
    assert_eq!(expected, view);
    Ok(())
}
