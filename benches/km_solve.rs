use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kmfix::{make_mapping, KrasnoselskiiMann};
use nalgebra::DVector;

fn km_solve(c: &mut Criterion) {
    let centers = vec![
        DVector::from_vec(vec![1.0, 2.0]),
        DVector::from_vec(vec![0.0, 3.0]),
        DVector::from_vec(vec![-1.0, 1.0]),
        DVector::from_vec(vec![0.0, 2.0]),
    ];
    let radii = [1.5, 1.0, 2.0, 1.0];
    let third = 1.0 / 3.0;
    let sequential = make_mapping(&centers, &radii, None).unwrap();
    let weighted = make_mapping(&centers, &radii, Some(&[third, third, third])).unwrap();
    let x0 = DVector::from_vec(vec![6.0, 4.0]);

    let mut group = c.benchmark_group("km_solve");
    for (label, mapping) in [("sequential", &sequential), ("weighted", &weighted)] {
        let mut km = KrasnoselskiiMann::named(0.5, mapping, label).unwrap();
        group.bench_function(label, |b| {
            b.iter(|| km.solve(black_box(&x0), black_box(200)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, km_solve);
criterion_main!(benches);
