//! Markov process along a tree.
//!
//! For every site, a mixture component is drawn by weight, the root state is
//! drawn from that component's stationary distribution, and states are then
//! propagated from parent to child: the child state is drawn from row
//! `parent` of `expm(Q·t)` for the child's branch length `t`.
//!
//! All transition matrices are computed once, up front, by [`TreeSampler::new`].
//! Sampling afterwards only performs categorical draws and cannot fail.

use std::collections::HashMap;
use std::sync::Arc;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::base::{AlignedSequence, Alignment, Alphabet, State};
use crate::errors::{ModelError, SimulationError};
use crate::model::{PhyloModel, SubstitutionModel};
use crate::tree::{Node, Tree};

/// One categorical sampler per parent state.
type TransitionRows = Arc<Vec<WeightedIndex<f64>>>;

/// Samplers of one mixture component.
#[derive(Debug, Clone)]
struct ComponentSampler {
    root: WeightedIndex<f64>,
    /// Transition rows of the branch above each node; empty at the root.
    edges: Tree<TransitionRows>,
}

/// A model and tree prepared for repeated sampling.
#[derive(Debug, Clone)]
pub struct TreeSampler {
    alphabet: Alphabet,
    leaf_names: Vec<String>,
    shape: Tree<()>,
    components: Vec<ComponentSampler>,
    /// `None` when there is only one component.
    component_choice: Option<WeightedIndex<f64>>,
}

/// States sampled for a run of consecutive sites.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteBlock {
    /// Mixture component used at each site.
    pub components: Vec<usize>,
    /// States of every node at each site, shaped like the input tree.
    pub states: Tree<Vec<State>>,
}

impl TreeSampler {
    /// Validate `model` and `tree` and precompute all transition matrices.
    ///
    /// Matrix exponentials are cached per component and branch length.
    ///
    /// # Errors
    /// Returns the model or tree validation error, or an error if a
    /// transition row cannot be sampled from.
    pub fn new(model: &PhyloModel, tree: &Tree<Node>) -> Result<Self, SimulationError> {
        model.validate()?;
        tree.validate()?;
        let alphabet = model.alphabet()?;

        let weighted = model.weighted_components();
        let components = weighted
            .iter()
            .map(|(_, component)| prepare_component(component, tree))
            .collect::<Result<Vec<_>, ModelError>>()?;

        let component_choice = if weighted.len() > 1 {
            let weights: Vec<f64> = weighted.iter().map(|(w, _)| *w).collect();
            Some(
                WeightedIndex::new(&weights)
                    .map_err(|e| sampling_error(model.name(), format!("mixture weights: {e}")))?,
            )
        } else {
            None
        };

        Ok(Self {
            alphabet,
            leaf_names: tree.leaf_names().into_iter().map(str::to_string).collect(),
            shape: tree.map(|_| ()),
            components,
            component_choice,
        })
    }

    #[inline]
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn leaf_names(&self) -> &[String] {
        &self.leaf_names
    }

    #[inline]
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Sample `n_sites` consecutive sites.
    ///
    /// Per site, the draws are: component (mixtures only), root state, then
    /// one draw per non-root node in pre-order.
    pub fn simulate_sites<R: Rng + ?Sized>(&self, n_sites: usize, rng: &mut R) -> SiteBlock {
        let mut states = self.shape.map(|_| Vec::with_capacity(n_sites));
        let mut components = Vec::with_capacity(n_sites);

        for _ in 0..n_sites {
            let index = self.component_choice.as_ref().map_or(0, |choice| choice.sample(rng));
            let sampler = &self.components[index];
            let root = sampler.root.sample(rng) as State;
            states.value.push(root);
            descend(&sampler.edges, &mut states, root, rng);
            components.push(index);
        }

        SiteBlock { components, states }
    }

    /// Assemble the leaf rows of `block` into an alignment, in leaf order.
    pub fn to_alignment(&self, block: &SiteBlock) -> Result<Alignment, SimulationError> {
        let sequences = self
            .leaf_names
            .iter()
            .zip(block.states.leaves())
            .map(|(name, states)| AlignedSequence::new(name.clone(), states.clone()))
            .collect();
        Ok(Alignment::new(self.alphabet, sequences)?)
    }
}

impl SiteBlock {
    pub fn n_sites(&self) -> usize {
        self.components.len()
    }

    /// Append the sites of `other` after those of `self`.
    ///
    /// Both blocks must come from the same [`TreeSampler`].
    pub fn append(&mut self, other: SiteBlock) {
        self.components.extend(other.components);
        append_states(&mut self.states, other.states);
    }
}

fn append_states(acc: &mut Tree<Vec<State>>, other: Tree<Vec<State>>) {
    let mut pending = vec![(acc, other)];
    while let Some((acc, mut other)) = pending.pop() {
        acc.value.append(&mut other.value);
        let children = std::mem::take(&mut other.children);
        pending.extend(acc.children.iter_mut().zip(children));
    }
}

/// Draw the state of every non-root node in pre-order, given the root state.
fn descend<R: Rng + ?Sized>(
    edges: &Tree<TransitionRows>,
    states: &mut Tree<Vec<State>>,
    root: State,
    rng: &mut R,
) {
    let mut pending: Vec<(&Tree<TransitionRows>, &mut Tree<Vec<State>>, State)> = edges
        .children
        .iter()
        .zip(states.children.iter_mut())
        .rev()
        .map(|(edge, out)| (edge, out, root))
        .collect();
    while let Some((edge, out, parent)) = pending.pop() {
        let state = edge.value[parent as usize].sample(rng) as State;
        out.value.push(state);
        pending.extend(
            edge.children
                .iter()
                .zip(out.children.iter_mut())
                .rev()
                .map(|(edge, out)| (edge, out, state)),
        );
    }
}

fn prepare_component(model: &SubstitutionModel, tree: &Tree<Node>) -> Result<ComponentSampler, ModelError> {
    let root = WeightedIndex::new(model.stationary_distribution().iter())
        .map_err(|e| sampling_error(model.name(), format!("stationary distribution: {e}")))?;
    let mut cache: HashMap<u64, TransitionRows> = HashMap::new();
    let mut at_root = true;
    // The root has no branch above it; `try_map` visits it first.
    let edges = tree.try_map(|node| -> Result<TransitionRows, ModelError> {
        if std::mem::take(&mut at_root) {
            return Ok(Arc::new(Vec::new()));
        }
        let t = node.branch_length;
        if let Some(rows) = cache.get(&t.to_bits()) {
            return Ok(Arc::clone(rows));
        }
        let rows = Arc::new(transition_rows(model, t)?);
        cache.insert(t.to_bits(), Arc::clone(&rows));
        Ok(rows)
    })?;
    Ok(ComponentSampler { root, edges })
}

fn transition_rows(model: &SubstitutionModel, t: f64) -> Result<Vec<WeightedIndex<f64>>, ModelError> {
    let p = model.transition_probabilities(t)?;
    p.row_iter()
        .enumerate()
        .map(|(i, row)| {
            // Round-off in expm can leave entries slightly below zero.
            let weights: Vec<f64> = row.iter().map(|&x| x.max(0.0)).collect();
            WeightedIndex::new(&weights).map_err(|e| {
                sampling_error(model.name(), format!("transition row {i} at t = {t}: {e}"))
            })
        })
        .collect()
}

fn sampling_error(model: &str, reason: String) -> ModelError {
    ModelError::InvalidDistribution {
        model: model.to_string(),
        reason,
    }
}

/// Simulate an alignment of `n_sites` on one thread.
pub fn simulate_alignment<R: Rng + ?Sized>(
    model: &PhyloModel,
    tree: &Tree<Node>,
    n_sites: usize,
    rng: &mut R,
) -> Result<Alignment, SimulationError> {
    let sampler = TreeSampler::new(model, tree)?;
    let block = sampler.simulate_sites(n_sites, rng);
    sampler.to_alignment(&block)
}
