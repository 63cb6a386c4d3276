use crate::noise::OUNoise;

#[test]
fn test_same_seed_same_trajectory() {
    let mut a = OUNoise::seeded(4, 0.0, 0.35, 0.1, 1234);
    let mut b = OUNoise::seeded(4, 0.0, 0.35, 0.1, 1234);

    a.reset();
    b.reset();
    for _ in 0..50 {
        assert_eq!(a.sample(), b.sample());
    }
}

#[test]
fn test_reseed_replays_trajectory() {
    let mut noise = OUNoise::seeded(3, 0.0, 0.35, 0.1, 7);
    noise.reset();
    let first: Vec<_> = (0..10).map(|_| noise.sample()).collect();

    noise.reseed(7);
    noise.reset();
    let second: Vec<_> = (0..10).map(|_| noise.sample()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_different_seeds_differ() {
    let mut a = OUNoise::seeded(4, 0.0, 0.35, 0.1, 1);
    let mut b = OUNoise::seeded(4, 0.0, 0.35, 0.1, 2);
    assert_ne!(a.sample(), b.sample());
}

#[test]
fn test_samples_are_correlated() {
    // Consecutive OU samples stay close; i.i.d. draws with the same spread would not
    let mut noise = OUNoise::seeded(1, 0.0, 0.15, 0.2, 99);
    let samples: Vec<f32> = (0..2000).map(|_| noise.sample()[0]).collect();

    let mean = samples.iter().sum::<f32>() / samples.len() as f32;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / samples.len() as f32;
    let lag_one = samples.windows(2).map(|w| (w[0] - mean) * (w[1] - mean)).sum::<f32>()
        / (samples.len() - 1) as f32;

    assert!(lag_one / variance > 0.5);
}

#[test]
fn test_mean_reversion() {
    let mut noise = OUNoise::seeded(2, 5.0, 0.35, 0.01, 3);
    noise.reset();
    for _ in 0..200 {
        noise.sample();
    }
    assert!(noise.state().iter().all(|&x| (x - 5.0).abs() < 0.5));
    assert_eq!(noise.size(), 2);
}
