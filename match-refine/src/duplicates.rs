use crate::Correspondence;
use std::collections::HashMap;

/// Collapses many-to-one correspondences onto their closest claim.
///
/// Descriptor matching is not bijective: several target features may pick the
/// same model feature as their nearest neighbor. Only the one with the smallest
/// distance is kept. On an exact tie the first one encountered wins. The output
/// lists each retained model feature at the position where it first appeared.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DuplicateResolver;

impl DuplicateResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, correspondences: &[Correspondence]) -> Vec<Correspondence> {
        let mut kept: Vec<Correspondence> = Vec::with_capacity(correspondences.len());
        // Model index to its slot in `kept`.
        let mut slots: HashMap<usize, usize> = HashMap::with_capacity(correspondences.len());
        for &correspondence in correspondences {
            match slots.get(&correspondence.model) {
                Some(&slot) => {
                    if correspondence.distance < kept[slot].distance {
                        kept[slot] = correspondence;
                    }
                }
                None => {
                    slots.insert(correspondence.model, kept.len());
                    kept.push(correspondence);
                }
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CandidateMatch;
    use quickcheck_macros::quickcheck;
    use std::collections::HashSet;

    fn correspondences(raw: &[(u8, u8)]) -> Vec<Correspondence> {
        raw.iter()
            .enumerate()
            .map(|(target, &(model, distance))| {
                CandidateMatch::new(target, (model % 16) as usize, distance as u32)
            })
            .collect()
    }

    #[test]
    fn keeps_closest_claim_at_first_position() {
        let input = [
            CandidateMatch::new(0, 7, 40),
            CandidateMatch::new(1, 3, 20),
            CandidateMatch::new(2, 7, 15),
            CandidateMatch::new(3, 5, 9),
            CandidateMatch::new(4, 3, 25),
        ];
        let resolved = DuplicateResolver::new().resolve(&input);
        assert_eq!(resolved, vec![input[2], input[1], input[3]]);
    }

    #[test]
    fn exact_tie_keeps_first_seen() {
        let input = [CandidateMatch::new(0, 1, 12), CandidateMatch::new(1, 1, 12)];
        assert_eq!(DuplicateResolver::new().resolve(&input), vec![input[0]]);
    }

    #[test]
    fn unique_input_is_unchanged() {
        let input = [
            CandidateMatch::new(4, 0, 1),
            CandidateMatch::new(2, 2, 3),
            CandidateMatch::new(9, 1, 2),
        ];
        assert_eq!(DuplicateResolver::new().resolve(&input), input.to_vec());
    }

    #[test]
    fn empty_input() {
        assert!(DuplicateResolver::new().resolve(&[]).is_empty());
    }

    #[quickcheck]
    fn model_indices_are_distinct(raw: Vec<(u8, u8)>) -> bool {
        let resolved = DuplicateResolver::new().resolve(&correspondences(&raw));
        let models: HashSet<usize> = resolved.iter().map(|c| c.model).collect();
        models.len() == resolved.len()
    }

    #[quickcheck]
    fn keeps_minimum_distance_per_model(raw: Vec<(u8, u8)>) -> bool {
        let input = correspondences(&raw);
        let resolved = DuplicateResolver::new().resolve(&input);
        let all_present = input
            .iter()
            .all(|c| resolved.iter().any(|r| r.model == c.model));
        all_present
            && resolved.iter().all(|r| {
                input
                    .iter()
                    .filter(|c| c.model == r.model)
                    .all(|c| r.distance <= c.distance)
            })
    }

    #[quickcheck]
    fn idempotent(raw: Vec<(u8, u8)>) -> bool {
        let resolver = DuplicateResolver::new();
        let once = resolver.resolve(&correspondences(&raw));
        resolver.resolve(&once) == once
    }
}
