//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring a run with defaults for everything
//! except the model and the tree.

use crate::errors::SimulationError;
use crate::model::PhyloModel;
use crate::simulation::streams::{self, RootSeed};
use crate::simulation::Simulation;
use crate::tree::{Node, Tree};

/// Default number of sites.
pub const DEFAULT_SITES: usize = 1000;

/// Builder for constructing [`Simulation`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use seqevo_sim::model::SubstitutionModel;
/// use seqevo_sim::simulation::SimulationBuilder;
/// use seqevo_sim::tree::{Node, Tree};
///
/// let tree = Tree::node(
///     Node::new("root", 0.0),
///     vec![Tree::leaf(Node::new("A", 0.1)), Tree::leaf(Node::new("B", 0.2))],
/// );
/// let output = SimulationBuilder::new()
///     .model(SubstitutionModel::jc().unwrap())
///     .tree(tree)
///     .sites(50)
///     .seed(vec![42])
///     .chunks(2)
///     .build()
///     .unwrap()
///     .run()
///     .unwrap();
/// assert_eq!(output.alignment.n_sites(), 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    // Required parameters
    model: Option<PhyloModel>,
    tree: Option<Tree<Node>>,

    // Optional parameters
    sites: Option<usize>,      // Default: DEFAULT_SITES
    seed: Option<Vec<u32>>,    // Default: system entropy
    chunks: Option<usize>,     // Default: rayon worker count
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model (required).
    pub fn model(mut self, model: impl Into<PhyloModel>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the tree (required).
    pub fn tree(mut self, tree: Tree<Node>) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Set the number of sites to simulate.
    pub fn sites(mut self, sites: usize) -> Self {
        self.sites = Some(sites);
        self
    }

    /// Seed the run with up to 256 words.
    pub fn seed(mut self, words: Vec<u32>) -> Self {
        self.seed = Some(words);
        self
    }

    /// Set the number of chunks the sites are split into.
    ///
    /// Output is reproducible for a fixed seed and chunk count.
    pub fn chunks(mut self, chunks: usize) -> Self {
        self.chunks = Some(chunks);
        self
    }

    /// Validate all parameters and build the simulation.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        let model = self.model.ok_or(SimulationError::MissingRequired("model"))?;
        let tree = self.tree.ok_or(SimulationError::MissingRequired("tree"))?;
        let seed = match self.seed {
            Some(words) => RootSeed::from_words(words)?,
            None => RootSeed::from_entropy(),
        };
        let chunks = self.chunks.unwrap_or_else(streams::available_workers);
        Simulation::from_parts(model, tree, self.sites.unwrap_or(DEFAULT_SITES), seed, chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubstitutionModel;

    fn tree() -> Tree<Node> {
        Tree::node(
            Node::new("root", 0.0),
            vec![Tree::leaf(Node::new("A", 0.1)), Tree::leaf(Node::new("B", 0.1))],
        )
    }

    #[test]
    fn test_builder_defaults() {
        let sim = SimulationBuilder::new()
            .model(SubstitutionModel::jc().unwrap())
            .tree(tree())
            .build()
            .unwrap();
        assert_eq!(sim.sites(), DEFAULT_SITES);
        assert_eq!(sim.chunks(), streams::available_workers());
        assert!(!sim.seed().words().is_empty());
    }

    #[test]
    fn test_builder_missing_required() {
        let err = SimulationBuilder::new().tree(tree()).build().unwrap_err();
        assert_eq!(err, SimulationError::MissingRequired("model"));

        let err = SimulationBuilder::new()
            .model(SubstitutionModel::jc().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err, SimulationError::MissingRequired("tree"));
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        let base = SimulationBuilder::new()
            .model(SubstitutionModel::jc().unwrap())
            .tree(tree());
        assert!(matches!(
            base.clone().seed(vec![]).build(),
            Err(SimulationError::InvalidSeed(_))
        ));
        assert_eq!(
            base.chunks(0).build().unwrap_err(),
            SimulationError::InvalidChunkCount
        );
    }
}
