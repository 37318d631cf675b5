use std::cmp::Ordering;
use std::sync::Arc;

use infoloss_value::{AggregateFunction, InformationLoss};
use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;

fn multi(values: Vec<f64>, function: AggregateFunction) -> InformationLoss {
    let weights: Arc<[f64]> = vec![1.0; values.len()].into();
    InformationLoss::multi(values, weights, function).unwrap()
}

fn function() -> impl Strategy<Value = AggregateFunction> {
    prop::sample::select(AggregateFunction::ALL.to_vec())
}

proptest! {
    #[test]
    fn single_compare_is_antisymmetric(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let (x, y) = (InformationLoss::single(a), InformationLoss::single(b));
        prop_assert_eq!(x.compare(&y).unwrap(), y.compare(&x).unwrap().reverse());
    }

    #[test]
    fn multi_compare_is_antisymmetric(
        f in function(),
        a in prop::collection::vec(0.0f64..1.0, 3),
        b in prop::collection::vec(0.0f64..1.0, 3),
    ) {
        let (x, y) = (multi(a, f), multi(b, f));
        prop_assert_eq!(x.compare(&y).unwrap(), y.compare(&x).unwrap().reverse());
    }

    #[test]
    fn relative_hits_the_bounds(
        f in function(),
        a in prop::collection::vec(0.0f64..1.0, 2),
        b in prop::collection::vec(0.0f64..1.0, 2),
    ) {
        let (x, y) = (multi(a, f), multi(b, f));
        let (min, max) = (x.min(&y).unwrap(), x.max(&y).unwrap());
        prop_assert_eq!(min.relative_to(&min, &max).unwrap(), 0.0);
        if min.compare(&max).unwrap() != Ordering::Equal {
            prop_assert_eq!(max.relative_to(&min, &max).unwrap(), 1.0);
        }
    }

    #[test]
    fn score_order_is_inverted(a in -1000i64..1000, b in -1000i64..1000) {
        let x = InformationLoss::reliable_score(BigRational::from_integer(BigInt::from(a)));
        let y = InformationLoss::reliable_score(BigRational::from_integer(BigInt::from(b)));
        prop_assert_eq!(x.compare(&y).unwrap(), b.cmp(&a));
        let (s, t) = (InformationLoss::score(a as f64), InformationLoss::score(b as f64));
        prop_assert_eq!(s.compare(&t).unwrap(), b.cmp(&a));
    }

    #[test]
    fn relative_stays_in_unit_interval(v in -10.0f64..10.0, lo in -5.0f64..0.0, hi in 0.0f64..5.0) {
        let r = InformationLoss::single(v)
            .relative_to(&InformationLoss::single(lo), &InformationLoss::single(hi))
            .unwrap();
        prop_assert!((0.0..=1.0).contains(&r));
    }
}
