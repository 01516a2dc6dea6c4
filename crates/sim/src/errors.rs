use thiserror::Error;

use crate::base::Alphabet;

/// Errors raised while building or transforming substitution and mixture
/// models.
///
/// All of these indicate a malformed model. They are detected at
/// construction or validation time and are never retried, with the single
/// exception of [`ModelError::QuadratureFailure`] (see
/// [`crate::model::gamma`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Matrix and vector sizes disagree with each other or with the alphabet.
    #[error("Dimension mismatch in model '{model}': expected {expected}, found {found}")]
    DimensionMismatch {
        model: String,
        expected: usize,
        found: usize,
    },

    /// The stationary distribution has negative entries or does not sum to one.
    #[error("Invalid stationary distribution in model '{model}': {reason}")]
    InvalidDistribution { model: String, reason: String },

    /// The alphabet has no generator (extended or ambiguous characters).
    #[error("Unsupported alphabet for a substitution model: {0}")]
    UnsupportedAlphabet(Alphabet),

    /// Two lists that are paired positionally have different lengths.
    #[error("Length mismatch in '{name}': {left} weights vs {right} models")]
    LengthMismatch {
        name: String,
        left: usize,
        right: usize,
    },

    /// Mixture components disagree on the alphabet.
    #[error(
        "Inconsistent alphabet in mixture '{mixture}': component {component} uses {found}, expected {expected}"
    )]
    InconsistentAlphabet {
        mixture: String,
        component: usize,
        expected: Alphabet,
        found: Alphabet,
    },

    /// A mixture weight is negative or not finite.
    #[error("Invalid weight {weight} for component {component} of mixture '{mixture}'")]
    NegativeWeight {
        mixture: String,
        component: usize,
        weight: f64,
    },

    /// A mixture has no components.
    #[error("Mixture '{0}' has no components")]
    EmptyMixture(String),

    /// A numeric parameter is outside its valid domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numerical integration did not reach the requested tolerance.
    #[error(
        "Quadrature did not converge on [{lower}, {upper}]: error estimate {estimate:e} exceeds tolerance {tolerance:e}"
    )]
    QuadratureFailure {
        lower: f64,
        upper: f64,
        estimate: f64,
        tolerance: f64,
    },
}

/// Errors raised while validating a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// A branch length is negative or not finite.
    #[error("Invalid branch length {length} on node '{label}'")]
    InvalidBranchLength { label: String, length: f64 },

    /// A leaf has an empty name.
    #[error("Leaf {0} has an empty name")]
    EmptyLeafName(usize),

    /// Two leaves share a name.
    #[error("Duplicate leaf name '{0}'")]
    DuplicateLeafName(String),
}

/// Errors raised while assembling or combining alignments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    /// A sequence does not have the alignment's width.
    #[error("Sequence '{name}' has length {found}, expected {expected}")]
    UnequalLength {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Two alignments stacked on top of each other differ in width.
    #[error("Cannot join alignments of width {top} and {bottom}")]
    WidthMismatch { top: usize, bottom: usize },

    /// Two alignments concatenated side by side differ in their sequence names.
    #[error("Cannot concatenate alignments: sequence {index} is '{left}' vs '{right}'")]
    NameMismatch {
        index: usize,
        left: String,
        right: String,
    },

    /// Two alignments use different alphabets.
    #[error("Cannot combine alignments over {left} and {right}")]
    InconsistentAlphabet { left: Alphabet, right: Alphabet },
}

/// Errors surfaced by a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// The seed word list is empty or longer than allowed.
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Zero chunks were requested for a run.
    #[error("Number of chunks must be at least 1")]
    InvalidChunkCount,

    /// The number of random streams differs from the number of chunks.
    #[error("Got {streams} random streams for {chunks} chunks")]
    StreamCountMismatch { chunks: usize, streams: usize },

    /// A required builder parameter was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingRequired(&'static str),
}

/// Errors raised while loading a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or does not match the schema.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display_names_component() {
        let err = ModelError::NegativeWeight {
            mixture: "cat".to_string(),
            component: 2,
            weight: -0.5,
        };
        let msg = format!("{err}");
        assert!(msg.contains("cat"));
        assert!(msg.contains("component 2"));
        assert!(msg.contains("-0.5"));
    }

    #[test]
    fn test_tree_error_display() {
        let err = TreeError::InvalidBranchLength {
            label: "human".to_string(),
            length: -1.0,
        };
        assert_eq!(format!("{err}"), "Invalid branch length -1 on node 'human'");
    }

    #[test]
    fn test_simulation_error_is_transparent() {
        let err: SimulationError = ModelError::EmptyMixture("empty".to_string()).into();
        assert_eq!(format!("{err}"), "Mixture 'empty' has no components");
    }
}
