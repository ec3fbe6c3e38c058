use kmfix::make_projection;
use nalgebra::DVector;
use proptest::prelude::*;

fn point() -> impl Strategy<Value = (f64, f64)> {
    (-50.0f64..50.0, -50.0f64..50.0)
}

proptest! {
    #[test]
    fn projection_is_non_expansive(
        center in point(),
        radius in 0.1f64..10.0,
        a in point(),
        b in point(),
    ) {
        let p = make_projection(DVector::from_vec(vec![center.0, center.1]), radius).unwrap();
        let x = DVector::from_vec(vec![a.0, a.1]);
        let y = DVector::from_vec(vec![b.0, b.1]);
        let px = p.project(&x).unwrap();
        let py = p.project(&y).unwrap();
        prop_assert!((&px - &py).norm() <= (&x - &y).norm() + 1e-9);
    }

    #[test]
    fn projection_lands_in_ball_and_is_idempotent(
        center in point(),
        radius in 0.1f64..10.0,
        a in point(),
    ) {
        let p = make_projection(DVector::from_vec(vec![center.0, center.1]), radius).unwrap();
        let x = DVector::from_vec(vec![a.0, a.1]);
        let px = p.project(&x).unwrap();
        prop_assert!((&px - p.center()).norm() <= radius * (1.0 + 1e-12));
        let ppx = p.project(&px).unwrap();
        prop_assert!((&ppx - &px).norm() <= 1e-9);
    }
}
