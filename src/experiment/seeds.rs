use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Largest seed drawn, `2^31 - 2`.
pub const MAX_SEED: u64 = (1 << 31) - 2;

/// Per-experiment seeds drawn once from a seeded master generator.
///
/// Every sample size of experiment `i` is simulated from `seed(i)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSchedule {
  master_seed: u64,
  seeds: Vec<u64>,
}

impl SeedSchedule {
  pub fn draw(master_seed: u64, ex_num: usize) -> Self {
    let mut master = StdRng::seed_from_u64(master_seed);
    let seeds = (0..ex_num).map(|_| master.gen_range(0..=MAX_SEED)).collect();
    Self { master_seed, seeds }
  }

  pub fn master_seed(&self) -> u64 {
    self.master_seed
  }

  pub fn seed(&self, i: usize) -> u64 {
    self.seeds[i]
  }

  pub fn len(&self) -> usize {
    self.seeds.len()
  }

  pub fn is_empty(&self) -> bool {
    self.seeds.is_empty()
  }

  pub fn as_slice(&self) -> &[u64] {
    &self.seeds
  }
}
