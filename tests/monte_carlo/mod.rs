use helix_track::mc::MonteCarlo;
use helix_track::od::prelude::*;

#[test]
fn uncertainty_contraction() {
    crate::init_logger();
    // Without process noise and with precise hits, each layer can only tighten the offset estimate
    let cfg = RecoConfig::builder()
        .measurement_error_std(0.5)
        .process_noise_angle_var(0.0)
        .build();
    let mc = MonteCarlo::new("contraction".to_string(), cfg).unwrap();
    let results = mc.run(64);

    assert_eq!(results.runs.len(), 64);
    assert_eq!(results.failures(), 0);
    for (expected, run) in results.runs.iter().enumerate() {
        assert_eq!(run.index, expected);
        assert_eq!(run.seed, mc.run_seed(expected));
    }

    let covar_yy = results.mean_covar_yy().unwrap();
    assert_eq!(covar_yy.len(), 10);
    assert!(covar_yy[0] < 0.25);
    for pair in covar_yy.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "{covar_yy:?}");
    }

    let rms = results.rms_error_y().unwrap();
    assert!(rms.iter().all(|err| err.is_finite() && *err < 1.0), "{rms:?}");
}

#[test]
fn residual_ratio_is_consistent() {
    // The prior covariance matches the seed perturbation, and the truth has no scattering
    let cfg = RecoConfig::builder()
        .process_noise_angle_var(0.0)
        .seed_perturbation_std(StateDiag::new(5.0, 0.1))
        .initial_covariance_diag(StateDiag::new(25.0, 0.01))
        .build();
    let mc = MonteCarlo::new("consistency".to_string(), cfg).unwrap();
    let results = mc.run(200);
    assert_eq!(results.failures(), 0);

    // The normalized innovation squared has a unit mean for a consistent filter
    let ratios = results.mean_residual_ratio().unwrap();
    let overall = ratios.iter().sum::<f64>() / ratios.len() as f64;
    assert!((0.8..1.2).contains(&overall), "{ratios:?}");
}

#[test]
fn adjacent_runs_are_distinct() {
    let mc = MonteCarlo::new("distinct".to_string(), RecoConfig::default()).unwrap();
    let results = mc.run(6);
    let outputs = results.successes().collect::<Vec<_>>();
    assert_eq!(outputs.len(), 6);
    for (i, first) in outputs.iter().enumerate() {
        for second in &outputs[i + 1..] {
            assert_ne!(first.hits, second.hits);
            assert_ne!(first.filtered, second.filtered);
        }
    }
}

#[test]
fn resumed_runs_match() {
    let mc = MonteCarlo::new("resume".to_string(), RecoConfig::default()).unwrap();
    let full = mc.run(6);
    let resumed = mc.resume_run(3, 3);
    for (run, resumed) in full.runs[3..].iter().zip(resumed.runs.iter()) {
        assert_eq!(run.index, resumed.index);
        assert_eq!(run.result.as_ref().unwrap(), resumed.result.as_ref().unwrap());
    }
}

#[test]
fn runs_match_standalone_scenarios() {
    let cfg = RecoConfig::builder().seed(99).build();
    let mc = MonteCarlo::new("standalone".to_string(), cfg.clone()).unwrap();
    let results = mc.run(2);

    let mut second = cfg;
    second.seed = 100;
    let standalone = Scenario::new(second).unwrap().run().unwrap();
    assert_eq!(results.runs[1].result.as_ref().unwrap(), &standalone);
}

#[test]
fn failed_runs_are_counted() {
    // Tracks that bend too much for the model fail every run
    let cfg = RecoConfig::builder().cos_phi_epsilon(0.9).build();
    let results = MonteCarlo::new("failing".to_string(), cfg).unwrap().run(4);
    assert_eq!(results.failures(), 4);
    assert_eq!(results.successes().count(), 0);
    assert!(results.mean_covar_yy().is_err());
}
