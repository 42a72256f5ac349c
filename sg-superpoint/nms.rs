use crate::error::{SuperPointError, SuperPointResult};
use log::debug;
use ndarray::{s, Array2};
use sg_core::Keypoint;

/// Greedy grid non-maximum suppression.
///
/// Candidates are visited by descending confidence (stable, so equal scores
/// keep their input order). A candidate whose cell is still free is kept and
/// claims every cell within Chebyshev distance `radius`; later candidates
/// landing on a claimed cell are dropped. The result is in acceptance order.
/// A radius `<= 0` returns the input unchanged.
pub fn non_maximum_suppression(
    candidates: Vec<Keypoint>,
    height: usize,
    width: usize,
    radius: i32,
) -> SuperPointResult<Vec<Keypoint>> {
    if radius <= 0 || candidates.is_empty() {
        return Ok(candidates);
    }

    let cells = candidates
        .iter()
        .map(|kp| cell_of(kp, height, width))
        .collect::<SuperPointResult<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .confidence
            .total_cmp(&candidates[a].confidence)
    });

    let r = radius as usize;
    let mut occupied = Array2::from_elem((height, width), false);
    let mut kept = Vec::new();

    for idx in order {
        let (y, x) = cells[idx];
        if occupied[[y, x]] {
            continue;
        }
        kept.push(candidates[idx]);

        let y0 = y.saturating_sub(r);
        let x0 = x.saturating_sub(r);
        let y1 = (y + r + 1).min(height);
        let x1 = (x + r + 1).min(width);
        occupied.slice_mut(s![y0..y1, x0..x1]).fill(true);
    }

    debug!(
        "nms radius {} kept {} of {} candidates",
        radius,
        kept.len(),
        candidates.len()
    );
    Ok(kept)
}

fn cell_of(kp: &Keypoint, height: usize, width: usize) -> SuperPointResult<(usize, usize)> {
    let x = kp.x.round();
    let y = kp.y.round();
    if !(x >= 0.0 && y >= 0.0 && (x as usize) < width && (y as usize) < height) {
        return Err(SuperPointError::KeypointOutOfBounds {
            x: kp.x,
            y: kp.y,
            width,
            height,
        });
    }
    Ok((y as usize, x as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chebyshev(a: &Keypoint, b: &Keypoint) -> f32 {
        (a.x - b.x).abs().max((a.y - b.y).abs())
    }

    #[test]
    fn test_suppresses_close_neighbour() {
        let candidates = vec![
            Keypoint::new(5.0, 5.0, 0.9),
            Keypoint::new(6.0, 6.0, 0.8),
            Keypoint::new(20.0, 20.0, 0.5),
        ];
        let kept = non_maximum_suppression(candidates, 32, 32, 3).unwrap();
        assert_eq!(
            kept,
            vec![Keypoint::new(5.0, 5.0, 0.9), Keypoint::new(20.0, 20.0, 0.5)]
        );
    }

    #[test]
    fn test_output_is_confidence_ordered() {
        let candidates = vec![
            Keypoint::new(1.0, 1.0, 0.2),
            Keypoint::new(10.0, 1.0, 0.7),
            Keypoint::new(20.0, 1.0, 0.4),
        ];
        let kept = non_maximum_suppression(candidates, 4, 32, 2).unwrap();
        let scores: Vec<f32> = kept.iter().map(|k| k.confidence).collect();
        assert_eq!(scores, vec![0.7, 0.4, 0.2]);
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let candidates = vec![
            Keypoint::new(4.0, 4.0, 0.5),
            Keypoint::new(5.0, 4.0, 0.5),
            Keypoint::new(3.0, 4.0, 0.5),
        ];
        let kept = non_maximum_suppression(candidates, 10, 10, 1).unwrap();
        assert_eq!(kept, vec![Keypoint::new(4.0, 4.0, 0.5)]);
    }

    #[test]
    fn test_window_is_clipped_at_edges() {
        let candidates = vec![Keypoint::new(0.0, 0.0, 0.9), Keypoint::new(3.0, 0.0, 0.8)];
        let kept = non_maximum_suppression(candidates, 4, 4, 2).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_non_positive_radius_is_identity() {
        let candidates = vec![Keypoint::new(1.0, 1.0, 0.1), Keypoint::new(1.0, 2.0, 0.9)];
        for radius in [0, -3] {
            let kept = non_maximum_suppression(candidates.clone(), 4, 4, radius).unwrap();
            assert_eq!(kept, candidates);
        }
    }

    #[test]
    fn test_out_of_bounds_candidate() {
        let candidates = vec![Keypoint::new(12.0, 1.0, 0.1)];
        assert!(matches!(
            non_maximum_suppression(candidates, 4, 4, 1),
            Err(SuperPointError::KeypointOutOfBounds { .. })
        ));
    }

    fn candidates_strategy() -> impl Strategy<Value = Vec<Keypoint>> {
        proptest::collection::vec((0usize..40, 0usize..30, 0.0f32..1.0), 0..120).prop_map(|v| {
            v.into_iter()
                .map(|(x, y, s)| Keypoint::new(x as f32, y as f32, s))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_kept_points_respect_radius(candidates in candidates_strategy(), radius in 1i32..6) {
            let kept = non_maximum_suppression(candidates, 30, 40, radius).unwrap();
            for (i, a) in kept.iter().enumerate() {
                for b in &kept[i + 1..] {
                    prop_assert!(chebyshev(a, b) >= radius as f32);
                }
            }
        }

        #[test]
        fn prop_dropped_points_are_covered(candidates in candidates_strategy(), radius in 1i32..6) {
            let kept = non_maximum_suppression(candidates.clone(), 30, 40, radius).unwrap();
            for c in &candidates {
                if kept.contains(c) {
                    continue;
                }
                let covered = kept
                    .iter()
                    .any(|k| k.confidence >= c.confidence && chebyshev(k, c) <= radius as f32);
                prop_assert!(covered, "{:?} dropped without a stronger neighbour", c);
            }
        }
    }
}
