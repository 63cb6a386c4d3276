pub mod test_noise;
