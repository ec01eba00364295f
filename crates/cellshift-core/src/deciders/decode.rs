//! Decode rules: scorer output vector -> target cell.
//!
//! Output index `i` always refers to the `i`-th cell in ascending [`CellId`]
//! order, the same order the inter-site features are built in.

use serde::{Deserialize, Serialize};

use crate::domain::{CellId, InferenceFailure};

/// How the scorer's output vector selects a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeRule {
    /// One score per cell. The highest score wins; ties pick the lowest index.
    #[default]
    ArgMaxCells,
    /// Index 0 is a reserved "no handover" class, followed by one score per cell.
    ArgMaxWithHold,
}

/// Result of decoding one output vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Cell(CellId),
    Hold,
}

impl DecodeRule {
    /// Output length the scorer must produce for `cell_count` cells.
    pub fn output_len(&self, cell_count: usize) -> usize {
        match self {
            DecodeRule::ArgMaxCells => cell_count,
            DecodeRule::ArgMaxWithHold => cell_count + 1,
        }
    }

    /// `cells` must be sorted by ascending id.
    pub fn decode(&self, output: &[f64], cells: &[CellId]) -> Result<Target, InferenceFailure> {
        let expected = self.output_len(cells.len());
        if output.len() != expected {
            return Err(InferenceFailure::OutputLength {
                expected,
                actual: output.len(),
            });
        }
        let best = arg_max(output)?;
        match self {
            DecodeRule::ArgMaxCells => Ok(Target::Cell(cells[best])),
            DecodeRule::ArgMaxWithHold if best == 0 => Ok(Target::Hold),
            DecodeRule::ArgMaxWithHold => Ok(Target::Cell(cells[best - 1])),
        }
    }
}

/// Index of the maximum; the first index wins ties. Empty input is an
/// output-length error.
fn arg_max(values: &[f64]) -> Result<usize, InferenceFailure> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(InferenceFailure::NonFiniteOutput(idx));
        }
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx).ok_or(InferenceFailure::OutputLength {
        expected: 1,
        actual: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CELLS: [CellId; 3] = [CellId(1), CellId(2), CellId(5)];

    #[rstest]
    #[case::first(vec![0.9, 0.1, 0.0], Target::Cell(CellId(1)))]
    #[case::last(vec![0.1, 0.2, 0.7], Target::Cell(CellId(5)))]
    #[case::tie_picks_lowest(vec![0.2, 0.4, 0.4], Target::Cell(CellId(2)))]
    #[case::negative_scores(vec![-3.0, -1.0, -2.0], Target::Cell(CellId(2)))]
    fn arg_max_cells(#[case] output: Vec<f64>, #[case] expected: Target) {
        assert_eq!(DecodeRule::ArgMaxCells.decode(&output, &CELLS).unwrap(), expected);
    }

    #[rstest]
    #[case::hold(vec![0.8, 0.1, 0.05, 0.05], Target::Hold)]
    #[case::cell(vec![0.1, 0.1, 0.7, 0.1], Target::Cell(CellId(2)))]
    #[case::tie_with_hold_holds(vec![0.5, 0.5, 0.0, 0.0], Target::Hold)]
    fn arg_max_with_hold(#[case] output: Vec<f64>, #[case] expected: Target) {
        assert_eq!(DecodeRule::ArgMaxWithHold.decode(&output, &CELLS).unwrap(), expected);
    }

    #[rstest]
    #[case::cells_too_short(DecodeRule::ArgMaxCells, vec![1.0, 0.0])]
    #[case::cells_too_long(DecodeRule::ArgMaxCells, vec![1.0, 0.0, 0.0, 0.0])]
    #[case::hold_missing_slot(DecodeRule::ArgMaxWithHold, vec![1.0, 0.0, 0.0])]
    fn wrong_length_is_rejected(#[case] rule: DecodeRule, #[case] output: Vec<f64>) {
        assert!(matches!(
            rule.decode(&output, &CELLS),
            Err(InferenceFailure::OutputLength { .. })
        ));
    }

    #[test]
    fn nan_is_rejected() {
        let err = DecodeRule::ArgMaxCells
            .decode(&[0.1, f64::NAN, 0.3], &CELLS)
            .unwrap_err();
        assert!(matches!(err, InferenceFailure::NonFiniteOutput(1)));
    }

    #[test]
    fn rule_names_in_config() {
        let s = serde_json::to_string(&DecodeRule::ArgMaxWithHold).unwrap();
        assert_eq!(s, "\"arg-max-with-hold\"");
        assert_eq!(DecodeRule::default(), DecodeRule::ArgMaxCells);
    }
}
