use ndarray::{Array1, Array2};
use reg_engine::{fit_elastic_net, predict, r2_score, train_test_split, ElasticNetConfig, Mt19937};

fn uniform(mt: &mut Mt19937) -> f64 {
    mt.next_u32() as f64 / u32::MAX as f64
}

fn dataset(n: usize) -> (Array2<f64>, Array1<f64>) {
    let mut mt = Mt19937::new(11);
    let x = Array2::from_shape_fn((n, 3), |_| uniform(&mut mt));
    let noise = Array1::from_shape_fn(n, |_| (uniform(&mut mt) - 0.5) * 0.1);
    let y = x.dot(&ndarray::array![3.0, -2.0, 0.5]) + 1.0 + noise;
    (x, y)
}

#[test]
fn descent_with_tiny_alpha_matches_closed_form() {
    let (x, y) = dataset(60);
    let ols = fit_elastic_net(&x, &y, &ElasticNetConfig::new(0.0, 0.5)).unwrap();
    let mut cfg = ElasticNetConfig::new(1e-7, 0.5);
    cfg.tol = 1e-12;
    cfg.max_iter = 100_000;
    let cd = fit_elastic_net(&x, &y, &cfg).unwrap();
    for (a, b) in ols.coef.iter().zip(cd.coef.iter()) {
        assert!((a - b).abs() < 1e-3, "ols {:?} vs cd {:?}", ols.coef, cd.coef);
    }
    assert!((ols.intercept - cd.intercept).abs() < 1e-3);
}

#[test]
fn stronger_penalty_never_grows_l1_norm() {
    let (x, y) = dataset(60);
    let norms: Vec<f64> = [0.0001, 0.001, 0.01, 0.1, 1.0].iter()
                                                           .map(|a| {
                                                               let mut cfg = ElasticNetConfig::new(*a, 1.0);
                                                               cfg.tol = 1e-10;
                                                               cfg.max_iter = 100_000;
                                                               let fit = fit_elastic_net(&x, &y, &cfg).unwrap();
                                                               fit.coef.iter().map(|v| v.abs()).sum()
                                                           })
                                                           .collect();
    for w in norms.windows(2) {
        assert!(w[1] <= w[0] + 1e-9, "{norms:?}");
    }
}

#[test]
fn held_out_score_is_high_for_linear_data() {
    let (x, y) = dataset(80);
    let split = train_test_split(80, 0.25, 0).unwrap();
    let x_train = x.select(ndarray::Axis(0), &split.train);
    let y_train = y.select(ndarray::Axis(0), &split.train);
    let x_test = x.select(ndarray::Axis(0), &split.test);
    let y_test = y.select(ndarray::Axis(0), &split.test);
    let fit = fit_elastic_net(&x_train, &y_train, &ElasticNetConfig::new(0.0, 0.5)).unwrap();
    let r2 = r2_score(&y_test, &predict(&x_test, &fit.coef, fit.intercept).unwrap()).unwrap();
    assert!(r2 > 0.95, "r2 = {r2}");
}
