use crate::error::{SuperGlueError, SuperGlueResult};
use ndarray::ArrayD;
use sg_core::Correspondence;

/// Output tensor: per query keypoint the matched train index, `-1` if unmatched
pub const MATCHES0: &str = "matches0";

/// Decode a query-to-train assignment vector.
///
/// Accepts shape `[1, N0]` or `[N0]`. Query indices are visited in ascending
/// order and negative entries are skipped. Only this direction is decoded;
/// `matches1` is never consulted, so two query keypoints naming the same
/// train keypoint are both reported.
pub fn decode_assignment(
    matches0: &ArrayD<i64>,
    n_query: usize,
    n_train: usize,
) -> SuperGlueResult<Vec<Correspondence>> {
    let shape = matches0.shape();
    let well_formed = match shape {
        [n] => *n == n_query,
        [1, n] => *n == n_query,
        _ => false,
    };
    if !well_formed {
        return Err(SuperGlueError::AssignmentShape {
            expected: n_query,
            actual: shape.to_vec(),
        });
    }

    let mut correspondences = Vec::new();
    for (query_idx, &train_idx) in matches0.iter().enumerate() {
        if train_idx < 0 {
            continue;
        }
        if train_idx as u64 >= n_train as u64 {
            return Err(SuperGlueError::AssignmentOutOfRange {
                query_idx,
                train_idx,
                n_train,
            });
        }
        correspondences.push(Correspondence::new(query_idx, train_idx as usize));
    }
    Ok(correspondences)
}
