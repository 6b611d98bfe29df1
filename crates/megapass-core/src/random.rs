//! Random source collaborator

use rand::Rng;

/// Source of bounded random integers
pub trait RandomSource {
    /// Return a uniformly distributed integer in `[0, bound)`
    fn next_int(&mut self, bound: u32) -> u32;
}

/// Random source backed by the thread-local rng
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_int(&mut self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound)
    }
}
