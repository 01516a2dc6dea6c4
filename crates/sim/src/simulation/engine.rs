//! Simulation engine.
//!
//! A run wires the pieces together: the root seed gives one root stream, the
//! root stream is split into one stream per chunk, the sites are divided into
//! chunks, and every chunk is simulated on the rayon pool with its own
//! stream. Chunk results are concatenated in chunk order, so the output
//! depends only on the seed and the chunk count.

use log::{debug, info};

use crate::base::{Alignment, State};
use crate::errors::SimulationError;
use crate::model::PhyloModel;
use crate::simulation::markov::{SiteBlock, TreeSampler};
use crate::simulation::streams::{self, RootSeed};
use crate::tree::{Node, Tree};

/// A configured simulation. Build one with
/// [`SimulationBuilder`](crate::simulation::SimulationBuilder).
#[derive(Debug, Clone)]
pub struct Simulation {
    model: PhyloModel,
    tree: Tree<Node>,
    sites: usize,
    seed: RootSeed,
    chunks: usize,
}

/// Everything produced by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    /// Leaf sequences, in leaf order.
    pub alignment: Alignment,
    /// The seed words the run used; replaying them reproduces the run.
    pub seed_words: Vec<u32>,
    /// Mixture component index of every site.
    pub site_components: Vec<usize>,
    /// States of every node, ancestors included, shaped like the tree.
    pub states: Tree<Vec<State>>,
}

impl Simulation {
    pub(crate) fn from_parts(
        model: PhyloModel,
        tree: Tree<Node>,
        sites: usize,
        seed: RootSeed,
        chunks: usize,
    ) -> Result<Self, SimulationError> {
        if chunks == 0 {
            return Err(SimulationError::InvalidChunkCount);
        }
        model.validate()?;
        tree.validate()?;
        Ok(Self {
            model,
            tree,
            sites,
            seed,
            chunks,
        })
    }

    pub fn model(&self) -> &PhyloModel {
        &self.model
    }

    pub fn tree(&self) -> &Tree<Node> {
        &self.tree
    }

    pub fn sites(&self) -> usize {
        self.sites
    }

    pub fn seed(&self) -> &RootSeed {
        &self.seed
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Run the simulation.
    ///
    /// # Errors
    /// Fails before any sampling if the model or tree is invalid. A failure
    /// in any chunk aborts the whole run.
    pub fn run(&self) -> Result<SimulationOutput, SimulationError> {
        info!(
            "Simulating {} sites on {} leaves with model '{}' ({} chunks, seed {:?})",
            self.sites,
            self.tree.n_leaves(),
            self.model.name(),
            self.chunks,
            self.seed.words()
        );

        let sampler = TreeSampler::new(&self.model, &self.tree)?;

        let mut root = self.seed.stream();
        let chunk_streams = streams::split_streams(self.chunks, &mut root);
        let sizes = streams::chunk_sizes(self.chunks, self.sites)?;
        debug!("Chunk sizes: {sizes:?}");

        let blocks = streams::run_parallel(&sizes, chunk_streams, |size, mut stream| {
            Ok::<SiteBlock, SimulationError>(sampler.simulate_sites(size, &mut stream))
        })?;

        let mut blocks = blocks.into_iter();
        let mut merged = match blocks.next() {
            Some(first) => first,
            None => sampler.simulate_sites(0, &mut root),
        };
        for block in blocks {
            merged.append(block);
        }

        let alignment = sampler.to_alignment(&merged)?;
        info!(
            "Simulated alignment of {} sequences x {} sites",
            alignment.n_sequences(),
            alignment.n_sites()
        );

        Ok(SimulationOutput {
            alignment,
            seed_words: self.seed.words().to_vec(),
            site_components: merged.components,
            states: merged.states,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubstitutionModel;

    fn star() -> Tree<Node> {
        Tree::node(
            Node::new("root", 0.0),
            vec![
                Tree::leaf(Node::new("A", 0.2)),
                Tree::leaf(Node::new("B", 0.4)),
                Tree::leaf(Node::new("C", 0.8)),
            ],
        )
    }

    fn simulation(seed: Vec<u32>, chunks: usize, sites: usize) -> Simulation {
        Simulation::from_parts(
            SubstitutionModel::jc().unwrap().into(),
            star(),
            sites,
            RootSeed::from_words(seed).unwrap(),
            chunks,
        )
        .unwrap()
    }

    #[test]
    fn test_run_shapes_output() {
        let out = simulation(vec![1, 2, 3], 3, 100).run().unwrap();
        assert_eq!(out.alignment.n_sites(), 100);
        assert_eq!(out.alignment.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(out.seed_words, vec![1, 2, 3]);
        assert_eq!(out.site_components.len(), 100);
        assert_eq!(out.states.value.len(), 100);
        assert_eq!(out.alignment.get("C"), Some(out.states.children[2].value.as_slice()));
    }

    #[test]
    fn test_run_is_reproducible() {
        let a = simulation(vec![99], 4, 257).run().unwrap();
        let b = simulation(vec![99], 4, 257).run().unwrap();
        assert_eq!(a, b);

        let other = simulation(vec![100], 4, 257).run().unwrap();
        assert_ne!(a.alignment, other.alignment);
    }

    #[test]
    fn test_more_chunks_than_sites() {
        let out = simulation(vec![5], 8, 3).run().unwrap();
        assert_eq!(out.alignment.n_sites(), 3);
    }

    #[test]
    fn test_zero_sites() {
        let out = simulation(vec![5], 2, 0).run().unwrap();
        assert_eq!(out.alignment.n_sites(), 0);
        assert_eq!(out.alignment.n_sequences(), 3);
    }

    #[test]
    fn test_zero_chunks_rejected() {
        let err = Simulation::from_parts(
            SubstitutionModel::jc().unwrap().into(),
            star(),
            10,
            RootSeed::from_words(vec![1]).unwrap(),
            0,
        )
        .unwrap_err();
        assert_eq!(err, SimulationError::InvalidChunkCount);
    }
}
