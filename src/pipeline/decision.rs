//! Turning the model's output vector into a label.

use std::fmt;

/// Number of classes the model predicts.
pub const NUM_CLASSES: usize = 3;

/// Class probabilities, index-aligned with [`LABELS`].
pub type OutputVector = [f32; NUM_CLASSES];

/// Classes the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Cat,
    Dog,
    Panda,
}

/// Labels in the order of the model's output units. Must change together with
/// the model file.
pub const LABELS: [Label; NUM_CLASSES] = [Label::Cat, Label::Dog, Label::Panda];

impl Label {
    /// Label for an output index, if there is one.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        LABELS.get(index).copied()
    }

    /// Upper-case name shown to the user.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "CAT",
            Self::Dog => "DOG",
            Self::Panda => "PANDA",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting value of the running maximum in [`argmax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Floor {
    /// Entries must be strictly positive to be selected. An all-zero or
    /// all-negative vector has no class.
    #[default]
    Zero,
    /// Any finite entry can be selected; only an empty or all-NaN vector has
    /// no class.
    NegInfinity,
}

impl Floor {
    /// The running maximum's initial value.
    #[must_use]
    pub const fn value(self) -> f32 {
        match self {
            Self::Zero => 0.0,
            Self::NegInfinity => f32::NEG_INFINITY,
        }
    }
}

/// Index of the largest entry strictly above `floor`.
///
/// Ties go to the first index since later entries must be strictly greater to
/// replace the current best. NaN never compares greater and is never selected.
#[must_use]
pub fn argmax(probs: &[f32], floor: Floor) -> Option<usize> {
    let mut best = None;
    let mut best_value = floor.value();

    for (i, &p) in probs.iter().enumerate() {
        if p > best_value {
            best_value = p;
            best = Some(i);
        }
    }

    best
}

/// Result of one classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Winning class, or `None` when no entry exceeded the floor.
    pub label: Option<Label>,
    /// Raw model output.
    pub probabilities: OutputVector,
}

impl Prediction {
    /// Pick the label for an output vector.
    #[must_use]
    pub fn decide(probabilities: OutputVector, floor: Floor) -> Self {
        let label = argmax(&probabilities, floor).and_then(Label::from_index);
        Self {
            label,
            probabilities,
        }
    }

    /// Probability of the winning class.
    #[must_use]
    pub fn confidence(&self) -> Option<f32> {
        self.label
            .and_then(|label| LABELS.iter().position(|&l| l == label))
            .map(|i| self.probabilities[i])
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{label}")?,
            None => f.write_str("NO CLASS")?,
        }
        write!(f, "\nProbs:{:?}", self.probabilities)
    }
}
