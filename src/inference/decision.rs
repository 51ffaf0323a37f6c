//! Confidence-gated decision over a probability vector.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{ClassLabel, LabelCatalog};
use crate::utils::error::{PlantDocError, Result};

/// Minimum top probability for a confident result (inclusive)
pub const CONFIDENCE_THRESHOLD: f32 = 0.50;

/// Per-class scores from one inference call, in label-catalog order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the largest finite entry; ties go to the lowest index
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in self.0.iter().enumerate() {
            if !p.is_finite() {
                continue;
            }
            match best {
                Some((_, top)) if p <= top => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Largest finite entry
    pub fn max(&self) -> Option<f32> {
        self.argmax().map(|i| self.0[i])
    }

}

/// Result of gating the top prediction against the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationResult {
    /// Top probability below the threshold; no label is reported
    Uncertain,
    /// `confidence` is exactly the maximum entry of the vector
    Confident { label: ClassLabel, confidence: f32 },
}

impl ClassificationResult {
    pub fn is_confident(&self) -> bool {
        matches!(self, ClassificationResult::Confident { .. })
    }
}

/// Applies the fixed threshold using a label catalog
#[derive(Debug, Clone, Copy)]
pub struct ClassificationDecision<'a> {
    labels: &'a LabelCatalog,
}

impl<'a> ClassificationDecision<'a> {
    pub fn new(labels: &'a LabelCatalog) -> Self {
        Self { labels }
    }

    pub fn threshold(&self) -> f32 {
        CONFIDENCE_THRESHOLD
    }

    /// Map a probability vector to `Uncertain` or `Confident`.
    ///
    /// A vector whose length differs from the catalog is rejected rather
    /// than indexed, since it means the model and labels are out of step.
    pub fn decide(&self, probabilities: &ProbabilityVector) -> Result<ClassificationResult> {
        if probabilities.len() != self.labels.len() {
            return Err(PlantDocError::InvalidProbabilityVector {
                expected: self.labels.len(),
                actual: probabilities.len(),
            });
        }

        let index = probabilities.argmax().ok_or_else(|| {
            PlantDocError::Inference("model returned no finite probabilities".to_string())
        })?;
        let confidence = probabilities.as_slice()[index];

        debug!(index, confidence, "top prediction");

        if confidence < CONFIDENCE_THRESHOLD {
            return Ok(ClassificationResult::Uncertain);
        }

        let label = self
            .labels
            .get(index)
            .cloned()
            .ok_or(PlantDocError::InvalidProbabilityVector {
                expected: self.labels.len(),
                actual: probabilities.len(),
            })?;

        Ok(ClassificationResult::Confident { label, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> LabelCatalog {
        LabelCatalog::from_names(names.iter().copied()).unwrap()
    }

    fn decide(names: &[&str], values: &[f32]) -> Result<ClassificationResult> {
        let labels = catalog(names);
        ClassificationDecision::new(&labels).decide(&ProbabilityVector::new(values.to_vec()))
    }

    #[test]
    fn test_threshold_boundary_is_confident() {
        let result = decide(&["A", "B", "C"], &[0.5, 0.2, 0.3]).unwrap();
        assert_eq!(
            result,
            ClassificationResult::Confident {
                label: ClassLabel::new("A").unwrap(),
                confidence: 0.5
            }
        );
    }

    #[test]
    fn test_uniform_vector_is_uncertain() {
        let result = decide(&["A", "B", "C", "D"], &[0.25, 0.25, 0.25, 0.25]).unwrap();
        assert_eq!(result, ClassificationResult::Uncertain);
        assert!(!result.is_confident());
    }

    #[test]
    fn test_clear_winner() {
        let result = decide(&["A", "B", "C", "D"], &[0.1, 0.05, 0.80, 0.05]).unwrap();
        match result {
            ClassificationResult::Confident { label, confidence } => {
                assert_eq!(label.as_str(), "C");
                assert_eq!(confidence, 0.80);
            }
            other => panic!("expected confident, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let vector = ProbabilityVector::new(vec![0.4, 0.4, 0.2]);
        assert_eq!(vector.argmax(), Some(0));
        assert_eq!(vector.max(), Some(0.4));

        let result = decide(&["A", "B", "C"], &[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(result, ClassificationResult::Uncertain);
    }

    #[test]
    fn test_confidence_equals_max_and_label_equals_argmax() {
        let names = ["A", "B", "C", "D", "E"];
        let vectors: [[f32; 5]; 4] = [
            [0.0, 0.0, 0.0, 0.0, 1.0],
            [0.6, 0.1, 0.1, 0.1, 0.1],
            [0.05, 0.7, 0.05, 0.1, 0.1],
            [0.1, 0.1, 0.25, 0.5, 0.05],
        ];
        for values in vectors {
            let vector = ProbabilityVector::new(values.to_vec());
            let labels = catalog(&names);
            match ClassificationDecision::new(&labels).decide(&vector).unwrap() {
                ClassificationResult::Confident { label, confidence } => {
                    assert_eq!(Some(confidence), vector.max());
                    assert_eq!(Some(&label), labels.get(vector.argmax().unwrap()));
                }
                ClassificationResult::Uncertain => panic!("expected confident for {:?}", values),
            }
        }
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = decide(&["A", "B"], &[0.9, 0.05, 0.05]).unwrap_err();
        assert!(matches!(
            err,
            PlantDocError::InvalidProbabilityVector {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_non_finite_entries_are_skipped() {
        let vector = ProbabilityVector::new(vec![f32::NAN, 0.3, 0.7]);
        assert_eq!(vector.argmax(), Some(2));

        let err = decide(&["A", "B"], &[f32::NAN, f32::NAN]).unwrap_err();
        assert!(matches!(err, PlantDocError::Inference(_)));
    }

    #[test]
    fn test_threshold_value() {
        let labels = catalog(&["A"]);
        assert_eq!(ClassificationDecision::new(&labels).threshold(), 0.5);
    }
}
