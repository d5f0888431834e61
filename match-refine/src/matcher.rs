use crate::{CandidateMatch, RankedCandidatePair};
use bitarray::{BitArray, Hamming};
use space::{Knn, LinearKnn};

/// Brute force Hamming matching of every target descriptor against all model descriptors.
///
/// Yields the two nearest model features of each target feature, nearest first.
/// Target features are skipped when the model has fewer than two descriptors.
pub fn match_two_nearest<const B: usize>(
    model: &[BitArray<B>],
    target: &[BitArray<B>],
) -> Vec<RankedCandidatePair> {
    let knn_model = LinearKnn {
        metric: Hamming,
        iter: model.iter(),
    };
    target
        .iter()
        .enumerate()
        .filter_map(|(target_ix, descriptor)| {
            let neighbors = knn_model.knn(descriptor, 2);
            if neighbors.len() < 2 {
                return None;
            }
            Some(RankedCandidatePair::new(
                CandidateMatch::new(
                    target_ix,
                    neighbors[0].index,
                    neighbors[0].distance as u32,
                ),
                CandidateMatch::new(
                    target_ix,
                    neighbors[1].index,
                    neighbors[1].distance as u32,
                ),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(ones: usize) -> BitArray<4> {
        let mut bytes = [0u8; 4];
        for bit in 0..ones {
            bytes[bit / 8] |= 1 << (bit % 8);
        }
        BitArray::new(bytes)
    }

    #[test]
    fn ranks_two_nearest() {
        let model = [descriptor(20), descriptor(3), descriptor(9), descriptor(4)];
        let target = [descriptor(2), descriptor(10)];
        let pairs = match_two_nearest(&model, &target);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].best, CandidateMatch::new(0, 1, 1));
        assert_eq!(pairs[0].second, CandidateMatch::new(0, 3, 2));
        assert_eq!(pairs[1].best, CandidateMatch::new(1, 2, 1));
        assert_eq!(pairs[1].second, CandidateMatch::new(1, 3, 6));
    }

    #[test]
    fn equal_distances_pick_two_distinct_features() {
        let model = [descriptor(5), descriptor(5), descriptor(5)];
        let pairs = match_two_nearest(&model, &[descriptor(5)]);
        assert_eq!(pairs.len(), 1);
        assert_ne!(pairs[0].best.model, pairs[0].second.model);
        assert_eq!(pairs[0].best.distance, 0);
        assert_eq!(pairs[0].second.distance, 0);
    }

    #[test]
    fn second_neighbor_never_closer_than_first() {
        let model: Vec<BitArray<4>> = (0..32).map(|n| descriptor((n * 7) % 32)).collect();
        let target: Vec<BitArray<4>> = (0..32).map(descriptor).collect();
        let pairs = match_two_nearest(&model, &target);
        assert_eq!(pairs.len(), 32);
        assert!(pairs.iter().all(|p| p.best.distance <= p.second.distance));
        assert!(pairs
            .iter()
            .enumerate()
            .all(|(ix, p)| p.best.target == ix && p.best.distance == 0));
    }

    #[test]
    fn needs_two_model_features() {
        assert!(match_two_nearest(&[descriptor(1)], &[descriptor(1)]).is_empty());
        assert!(match_two_nearest::<4>(&[], &[descriptor(1)]).is_empty());
    }
}
