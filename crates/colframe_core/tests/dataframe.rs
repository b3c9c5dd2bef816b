use colframe_core::compute::cmp::CmpOp;
use colframe_core::groupby::AggKind;
use colframe_core::indexer::Indexed;
use colframe_core::{DataFrame, DataType, ErrorKind, JoinType, ScalarValue, Series, frame};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn groupby_frame() -> DataFrame {
    frame! {
        "a" => vec!["a", "b", "a", "b", "b", "c"],
        "b" => vec![1_i64, 2, 3, 4, 5, 6],
        "c" => vec![6_i64, 5, 4, 3, 2, 1],
    }
    .unwrap()
}

fn join_frames() -> (DataFrame, DataFrame) {
    let left = frame! {
        "a" => vec!["a", "b", "a", "z"],
        "b" => vec![1_i64, 2, 3, 4],
        "c" => vec![6_i64, 5, 4, 3],
    }
    .unwrap();
    let right = frame! {
        "a" => vec!["b", "c", "b", "a"],
        "k" => vec![0_i64, 3, 9, 6],
        "c" => vec![1_i64, 0, 2, 1],
    }
    .unwrap();
    (left, right)
}

#[test]
fn init_length_mismatch() {
    logutil::init_test();

    let df = frame! {
        "a" => vec![1_i64, 2, 3],
        "b" => vec![1.0_f64, 2.0, 3.0],
    }
    .unwrap();
    assert_eq!((3, 2), df.shape());

    let err = frame! {
        "a" => vec![1_i64, 2, 3],
        "b" => vec![1.0_f64, 2.0, 3.0, 4.0],
    }
    .unwrap_err();
    assert_eq!(ErrorKind::Shape, err.kind());
}

#[test]
fn selection() {
    logutil::init_test();

    let df = frame! {
        "a" => vec![1_i64, 2, 3],
        "b" => vec![1.0_f64, 2.0, 3.0],
        "c" => vec!["a", "b", "c"],
    }
    .unwrap();

    assert_eq!(DataType::Int64, df.column("a").unwrap().dtype());
    assert_eq!(DataType::Float64, df.column("b").unwrap().dtype());
    assert_eq!(DataType::Utf8, df.column("c").unwrap().dtype());

    let out = df.index_columns(vec!["a", "b"]).unwrap().into_frame().unwrap();
    assert_eq!(vec!["a", "b"], out.column_names());

    let out = df.index(vec![true, false, true], ..).unwrap();
    assert_eq!(2, out.shape().0);

    assert_eq!((2, 1), df.index(vec![true, false, true], "b").unwrap().shape());
    assert_eq!(
        (1, 2),
        df.index(vec![true, false, false], vec!["a", "b"]).unwrap().shape()
    );
    assert_eq!((2, 1), df.index(vec![0_usize, 1], "b").unwrap().shape());
    assert_eq!((1, 2), df.index(vec![2_usize], vec!["a", "b"]).unwrap().shape());

    assert_eq!("a", df.select_at_idx(0).unwrap().name());

    let a = df.column("a").unwrap();
    assert!(matches!(df.index_columns("a").unwrap(), Indexed::Series(s) if std::ptr::eq(s, a)));
    assert_eq!(ScalarValue::UInt64(3), a.eq(a).unwrap().sum().unwrap());

    let err = df.column("c").unwrap().eq(a).unwrap_err();
    assert_eq!(ErrorKind::Type, err.kind());
}

#[test]
fn sort_in_place() {
    let mut df = frame! {
        "a" => vec![2_i64, 1, 3],
        "b" => vec![1_i64, 2, 3],
    }
    .unwrap();
    df.sort_in_place("a").unwrap();

    let expected = frame! {
        "a" => vec![1_i64, 2, 3],
        "b" => vec![2_i64, 1, 3],
    }
    .unwrap();
    assert!(df.frame_equal(&expected));
}

#[test]
fn sort_idempotent() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..10 {
        let keys: Vec<Option<i64>> = (0..200)
            .map(|_| {
                if rng.random_bool(0.1) {
                    None
                } else {
                    Some(rng.random_range(0..20))
                }
            })
            .collect();
        let values: Vec<f64> = (0..200).map(|_| rng.random()).collect();

        let df = frame! { "k" => keys, "v" => values }.unwrap();
        assert!(df.frame_equal(&df));

        let once = df.sort("k").unwrap();
        let twice = once.sort("k").unwrap();
        assert!(once.frame_equal(&twice));

        let k = once.column("k").unwrap();
        assert_eq!(df.column("k").unwrap().null_count(), k.null_count());
        // Nulls sort last.
        let first_null = (0..k.len()).find(|&idx| k.get(idx).unwrap().is_null());
        if let Some(first_null) = first_null {
            assert!((first_null..k.len()).all(|idx| k.get(idx).unwrap().is_null()));
        }
    }
}

#[test]
fn replace() {
    let mut df = frame! {
        "a" => vec![2_i64, 1, 3],
        "b" => vec![1_i64, 2, 3],
    }
    .unwrap();
    let s = Series::new("c", vec![true, false, true]);
    df.replace("a", s.clone()).unwrap();

    let expected = frame! {
        "c" => vec![true, false, true],
        "b" => vec![1_i64, 2, 3],
    }
    .unwrap();
    assert!(df.frame_equal(&expected));
    assert!(df.column("c").unwrap().series_equal(&s));
    assert_eq!(ErrorKind::Lookup, df.column("a").unwrap_err().kind());
}

#[test]
fn slice() {
    let df = frame! {
        "a" => vec![2_i64, 1, 3],
        "b" => vec!["a", "b", "c"],
    }
    .unwrap();

    let expected = frame! {
        "a" => vec![1_i64, 3],
        "b" => vec!["b", "c"],
    }
    .unwrap();
    assert!(df.slice(1, 2).frame_equal(&expected));
}

#[test]
fn head_tail() {
    let df = frame! {
        "a" => (0..10).collect::<Vec<i64>>(),
        "b" => (0..10).collect::<Vec<i64>>(),
    }
    .unwrap();

    assert_eq!(5, df.head(5).height());
    assert_eq!(5, df.tail(5).height());
    assert!(!df.head(5).frame_equal(&df.tail(5)));

    assert_eq!(10, df.head(100).height());
    assert_eq!(10, df.tail(100).height());
    assert!(df.head(100).frame_equal(&df.tail(100)));
}

#[test]
fn groupby() {
    logutil::init_test();

    let df = groupby_frame();
    let keys = vec!["a", "b", "c"];

    struct TestCase {
        column: &'static str,
        kind: AggKind,
        expected: Series,
    }

    let cases = [
        TestCase {
            column: "b",
            kind: AggKind::Sum,
            expected: Series::new("", vec![4_i64, 11, 6]),
        },
        TestCase {
            column: "c",
            kind: AggKind::Sum,
            expected: Series::new("", vec![10_i64, 10, 1]),
        },
        TestCase {
            column: "b",
            kind: AggKind::Min,
            expected: Series::new("", vec![1_i64, 2, 6]),
        },
        TestCase {
            column: "b",
            kind: AggKind::Max,
            expected: Series::new("", vec![3_i64, 5, 6]),
        },
        TestCase {
            column: "b",
            kind: AggKind::Mean,
            expected: Series::new("", vec![2.0, (2.0 + 4.0 + 5.0) / 3.0, 6.0]),
        },
        TestCase {
            column: "b",
            kind: AggKind::Last,
            expected: Series::new("", vec![3_i64, 5, 6]),
        },
        TestCase {
            column: "b",
            kind: AggKind::First,
            expected: Series::new("", vec![1_i64, 2, 6]),
        },
        TestCase {
            column: "b",
            kind: AggKind::Count,
            expected: Series::new("", vec![2_u64, 3, 1]),
        },
        TestCase {
            column: "b",
            kind: AggKind::NUnique,
            expected: Series::new("", vec![2_u64, 3, 1]),
        },
    ];

    for case in cases {
        let out = df.groupby(&["a"]).unwrap().agg(case.column, case.kind).unwrap();
        let expected = DataFrame::new(vec![Series::new("a", keys.clone()), case.expected]).unwrap();
        assert!(out.frame_equal(&expected), "{}: {out}", case.kind);
    }

    let out = df.groupby(&["a"]).unwrap().select("b").unwrap().quantile(0.3).unwrap();
    assert_eq!((3, 2), out.shape());
    assert_eq!(DataType::Float64, out.column("").unwrap().dtype());
}

#[test]
fn groupby_first_seen_order() {
    let df = frame! {
        "k" => vec!["z", "y", "z", "x"],
        "v" => vec![Some(1_i32), None, Some(3), None],
    }
    .unwrap();

    let out = df.groupby(&["k"]).unwrap().select("v").unwrap().sum().unwrap();
    let expected = frame! {
        "k" => vec!["z", "y", "x"],
        "" => vec![Some(4_i64), None, None],
    }
    .unwrap();
    assert!(out.frame_equal(&expected), "{out}");
}

#[test]
fn join() {
    logutil::init_test();

    let (left, right) = join_frames();

    let joined = left
        .join(&right, &["a"], &["a"], JoinType::Inner)
        .unwrap()
        .sort("a")
        .unwrap();
    assert!(joined.column("b").unwrap().series_equal(&Series::new("", vec![1_i64, 3, 2, 2])));

    let joined = left
        .join(&right, &["a"], &["a"], JoinType::Left)
        .unwrap()
        .sort("a")
        .unwrap();
    assert_eq!(
        ScalarValue::UInt64(1),
        joined.column("c_right").unwrap().is_null().sum().unwrap()
    );
    assert!(
        joined
            .column("b")
            .unwrap()
            .series_equal(&Series::new("", vec![1_i64, 3, 2, 2, 4]))
    );

    // The unmatched left key has nulls on the right side.
    let z = joined
        .filter(&joined.column("a").unwrap().compare_scalar("z", CmpOp::Eq).unwrap())
        .unwrap();
    assert_eq!(1, z.height());
    assert_eq!(ScalarValue::Null, z.column("k").unwrap().get(0).unwrap());

    let joined = left
        .join(&right, &["a"], &["a"], JoinType::Outer)
        .unwrap()
        .sort("a")
        .unwrap();
    assert_eq!(6, joined.height());
    assert_eq!(0, joined.column("a").unwrap().null_count());
    assert_eq!(1, joined.column("c_right").unwrap().null_count());
    assert_eq!(1, joined.column("c").unwrap().null_count());
    assert_eq!(1, joined.column("b").unwrap().null_count());
    assert_eq!(
        vec!["a", "b", "c", "k", "c_right"],
        joined.column_names()
    );
}

#[test]
fn hstack() {
    let mut df = frame! {
        "a" => vec![2_i64, 1, 3],
        "b" => vec!["a", "b", "c"],
    }
    .unwrap();
    df.hstack_mut(&[Series::new("stacked", vec![-1_i64, -1, -1])])
        .unwrap();

    assert_eq!((3, 3), df.shape());
    assert_eq!(vec!["a", "b", "stacked"], df.column_names());
}

#[test]
fn drop() {
    let df = frame! {
        "a" => vec![2_i64, 1, 3],
        "b" => vec!["a", "b", "c"],
        "c" => vec![1_i64, 2, 3],
    }
    .unwrap();
    assert_eq!((3, 2), df.drop("a").unwrap().shape());

    let mut df = df;
    let s = df.drop_in_place("a").unwrap();
    assert_eq!("a", s.name());
    assert_eq!((3, 2), df.shape());
}

#[test]
fn set_values() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let foo: Vec<f64> = (0..10).map(|_| rng.random()).collect();

    let mut df = frame! {
        "foo" => foo,
        "bar" => (0..10).collect::<Vec<i64>>(),
        "ham" => vec!["h"; 10],
    }
    .unwrap();

    let new: Vec<f64> = (0..10).map(|_| rng.random()).collect();
    df.set_column(Series::new("new", new.clone())).unwrap();

    let mask = df.column("new").unwrap().compare_scalar(0.5, CmpOp::Gt).unwrap();
    df.column_mut("new").unwrap().set_at_mask(&mask, 1).unwrap();

    let expected: Vec<f64> = new.iter().map(|&v| if v > 0.5 { 1.0 } else { v }).collect();
    assert!(df.column("new").unwrap().series_equal(&Series::new("", expected)));

    let err = df.column_mut("new").unwrap().set_at_mask(&mask, "x").unwrap_err();
    assert_eq!(ErrorKind::Type, err.kind());
}
