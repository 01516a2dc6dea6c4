//! Deterministic random streams for parallel runs.
//!
//! A run draws all randomness from one root generator. Before any work is
//! handed to the thread pool, the root is asked for one 256-bit seed block
//! per chunk, in chunk order, and each chunk gets its own generator built
//! from its block. The split therefore depends only on the root seed and the
//! number of chunks, never on how many threads execute the chunks or in
//! which order they finish.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::errors::SimulationError;

/// Random stream type used throughout the simulator.
pub type Stream = Xoshiro256PlusPlus;

/// Maximum number of 32-bit words accepted as a seed.
pub const MAX_SEED_WORDS: usize = 256;

/// Number of words drawn from system entropy when no seed is given.
const ENTROPY_WORDS: usize = 8;

/// The seed of a run's root stream.
///
/// The words are kept so that a run seeded from entropy can report the seed
/// it used and be reproduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSeed {
    words: Vec<u32>,
}

impl RootSeed {
    /// Seed from an explicit list of 1 to [`MAX_SEED_WORDS`] words.
    pub fn from_words(words: Vec<u32>) -> Result<Self, SimulationError> {
        if words.is_empty() {
            return Err(SimulationError::InvalidSeed("seed list is empty".to_string()));
        }
        if words.len() > MAX_SEED_WORDS {
            return Err(SimulationError::InvalidSeed(format!(
                "seed list has {} words, at most {MAX_SEED_WORDS} are allowed",
                words.len()
            )));
        }
        Ok(Self { words })
    }

    /// Seed from system entropy.
    pub fn from_entropy() -> Self {
        let mut rng = rand::rng();
        let words = (0..ENTROPY_WORDS).map(|_| rng.next_u32()).collect();
        Self { words }
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// The root stream for this seed.
    ///
    /// All words contribute to the 256-bit generator state: each is folded
    /// into one of four SplitMix64 lanes, so seeds that differ in any word
    /// give unrelated streams.
    pub fn stream(&self) -> Stream {
        let mut lanes = [
            0x243f_6a88_85a3_08d3_u64,
            0x1319_8a2e_0370_7344,
            0xa409_3822_299f_31d0,
            0x082e_fa98_ec4e_6c89,
        ];
        for (i, &word) in self.words.iter().enumerate() {
            let lane = &mut lanes[i % 4];
            *lane = splitmix64(*lane ^ u64::from(word) ^ ((i as u64) << 32));
        }
        // Mix the word count in so that trailing zero words still matter.
        lanes[0] = splitmix64(lanes[0] ^ self.words.len() as u64);

        let mut seed = [0u8; 32];
        for (chunk, lane) in seed.chunks_exact_mut(8).zip(lanes) {
            chunk.copy_from_slice(&splitmix64(lane).to_le_bytes());
        }
        Stream::from_seed(seed)
    }
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derive `k` independent streams from `root`.
///
/// One 32-byte seed block per child is drawn from `root` sequentially, so
/// the same root state and `k` always give the same children.
pub fn split_streams(k: usize, root: &mut Stream) -> Vec<Stream> {
    (0..k)
        .map(|_| {
            let mut block = [0u8; 32];
            root.fill_bytes(&mut block);
            Stream::from_seed(block)
        })
        .collect()
}

/// Split `total` units into `k` ordered chunks whose sizes differ by at most one.
///
/// The first `total % k` chunks hold one extra unit.
pub fn chunk_sizes(k: usize, total: usize) -> Result<Vec<usize>, SimulationError> {
    if k == 0 {
        return Err(SimulationError::InvalidChunkCount);
    }
    let (base, extra) = (total / k, total % k);
    Ok((0..k).map(|i| if i < extra { base + 1 } else { base }).collect())
}

/// Run `task(size_i, stream_i)` for every chunk on the rayon pool.
///
/// Results are returned in chunk order. The first error aborts the run and is
/// returned; no partial results are kept. Fails with
/// [`SimulationError::StreamCountMismatch`] unless there is exactly one
/// stream per chunk.
pub fn run_parallel<T, E, F>(sizes: &[usize], streams: Vec<Stream>, task: F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send + From<SimulationError>,
    F: Fn(usize, Stream) -> Result<T, E> + Sync + Send,
{
    if sizes.len() != streams.len() {
        return Err(SimulationError::StreamCountMismatch {
            chunks: sizes.len(),
            streams: streams.len(),
        }
        .into());
    }
    sizes
        .par_iter()
        .zip(streams.into_par_iter())
        .map(|(&size, stream)| task(size, stream))
        .collect()
}

/// Number of workers in the current rayon pool.
pub fn available_workers() -> usize {
    rayon::current_num_threads()
}
