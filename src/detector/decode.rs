//! Turning raw landmark-model output into [`crate::landmarks::DetectedHand`]s.

use super::DetectorError;
use crate::landmarks::{LANDMARK_COUNT, Landmark};
#[cfg(any(feature = "torch", test))]
use crate::landmarks::{DetectedHand, Handedness};

#[cfg(any(feature = "torch", test))]
const COORDS: usize = LANDMARK_COUNT * 3;

/// Exactly one point per landmark, in landmark index order.
pub(super) fn landmark_array(
    points: &[Landmark],
) -> Result<[Landmark; LANDMARK_COUNT], DetectorError> {
    <[Landmark; LANDMARK_COUNT]>::try_from(points).map_err(|_| {
        DetectorError::Output(format!(
            "expected {LANDMARK_COUNT} landmarks, got {}",
            points.len()
        ))
    })
}

/// Decode `[x0, y0, z0, .., x20, y20, z20, presence, (right_prob)]`.
///
/// Returns no hand when `presence` is below `min_presence`. Without the
/// trailing probability the handedness stays unknown.
#[cfg(any(feature = "torch", test))]
pub(super) fn decode_single_hand(
    values: &[f32],
    min_presence: f32,
) -> Result<Vec<DetectedHand>, DetectorError> {
    if values.len() < COORDS + 1 {
        return Err(DetectorError::Output(format!(
            "expected at least {} values, got {}",
            COORDS + 1,
            values.len()
        )));
    }

    let presence = values[COORDS];
    if presence < min_presence {
        return Ok(Vec::new());
    }

    let points: Vec<Landmark> = values[..COORDS]
        .chunks_exact(3)
        .map(|xyz| Landmark::new(xyz[0], xyz[1], xyz[2]))
        .collect();
    let landmarks = landmark_array(&points)?;
    let handedness = values.get(COORDS + 1).map(|&p| {
        if p > 0.5 {
            Handedness::Right
        } else {
            Handedness::Left
        }
    });

    Ok(vec![DetectedHand {
        landmarks,
        handedness,
        score: presence,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::index;

    fn output(presence: f32, right_prob: Option<f32>) -> Vec<f32> {
        let mut values: Vec<f32> = (0..COORDS).map(|i| i as f32 / 100.0).collect();
        values.push(presence);
        values.extend(right_prob);
        values
    }

    #[test]
    fn short_output_is_rejected() {
        let err = decode_single_hand(&[0.0; COORDS], 0.5).unwrap_err();
        assert!(matches!(err, DetectorError::Output(_)));
    }

    #[test]
    fn low_presence_means_no_hand() {
        let hands = decode_single_hand(&output(0.3, Some(0.9)), 0.7).unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn coordinates_are_read_in_xyz_triples() {
        let hands = decode_single_hand(&output(0.9, None), 0.7).unwrap();
        assert_eq!(hands.len(), 1);
        let hand = &hands[0];
        assert_eq!(hand.score, 0.9);
        assert_eq!(
            *hand.landmark(index::THUMB_TIP),
            Landmark::new(0.12, 0.13, 0.14)
        );
    }

    #[test]
    fn handedness_needs_the_trailing_probability() {
        let without = decode_single_hand(&output(0.9, None), 0.7).unwrap();
        assert_eq!(without[0].handedness, None);

        let right = decode_single_hand(&output(0.9, Some(0.8)), 0.7).unwrap();
        assert_eq!(right[0].handedness, Some(Handedness::Right));

        let left = decode_single_hand(&output(0.9, Some(0.2)), 0.7).unwrap();
        assert_eq!(left[0].handedness, Some(Handedness::Left));
    }

    #[test]
    fn landmark_lists_must_be_complete() {
        let point = Landmark::new(0.5, 0.5, 0.0);
        assert!(matches!(
            landmark_array(&[point; LANDMARK_COUNT - 1]),
            Err(DetectorError::Output(_))
        ));
        assert!(matches!(
            landmark_array(&[point; LANDMARK_COUNT + 1]),
            Err(DetectorError::Output(_))
        ));
        let hand = landmark_array(&[point; LANDMARK_COUNT]).unwrap();
        assert_eq!(hand[index::PINKY_TIP], point);
    }
}
