use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, BoxId, Keypoint, KeypointMatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxMatch {
    pub curr_id: BoxId,
    /// number of correspondences shared by the two boxes
    pub votes: usize,
}

/// Previous-frame to current-frame box identities of one frame pair.
///
/// Current boxes without any supporting correspondence, or that lost their
/// previous box to a better supported current box, are listed in `unmatched`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxMatches {
    pub matches: BTreeMap<BoxId, BoxMatch>,
    pub unmatched: Vec<BoxId>,
}

impl BoxMatches {
    pub fn get(&self, prev_id: BoxId) -> Option<BoxId> {
        self.matches.get(&prev_id).map(|m| m.curr_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

fn enclosing_ids(boxes: &[BoundingBox], kp: &Keypoint) -> Vec<BoxId> {
    boxes
        .iter()
        .filter(|b| b.roi.contains(kp.pt))
        .map(|b| b.box_id)
        .collect()
}

/// Counts, for every (previous box, current box) pair, the correspondences whose
/// previous keypoint lies in the first and current keypoint in the second.
pub fn count_box_votes(
    kpt_matches: &[KeypointMatch],
    prev_boxes: &[BoundingBox],
    kpts_prev: &[Keypoint],
    curr_boxes: &[BoundingBox],
    kpts_curr: &[Keypoint],
) -> HashMap<(BoxId, BoxId), usize> {
    let mut votes = HashMap::new();
    for m in kpt_matches {
        let (Some(kp_prev), Some(kp_curr)) = (kpts_prev.get(m.query_idx), kpts_curr.get(m.train_idx))
        else {
            log::warn!(
                "skip match {} -> {} with index out of range",
                m.query_idx,
                m.train_idx
            );
            continue;
        };
        let prev_ids = enclosing_ids(prev_boxes, kp_prev);
        if prev_ids.is_empty() {
            continue;
        }
        for curr_id in enclosing_ids(curr_boxes, kp_curr) {
            for prev_id in &prev_ids {
                *votes.entry((*prev_id, curr_id)).or_insert(0) += 1;
            }
        }
    }
    votes
}

/// Resolves box identities between two frames by correspondence voting.
///
/// Every current box takes the previous box it shares the most correspondences
/// with. Ties keep the first previous box in list order. When several current
/// boxes pick the same previous box, the one with more votes keeps it and an
/// equal count keeps the earlier current box.
pub fn match_bounding_boxes(
    kpt_matches: &[KeypointMatch],
    prev_boxes: &[BoundingBox],
    kpts_prev: &[Keypoint],
    curr_boxes: &[BoundingBox],
    kpts_curr: &[Keypoint],
) -> BoxMatches {
    let votes = count_box_votes(kpt_matches, prev_boxes, kpts_prev, curr_boxes, kpts_curr);

    let mut result = BoxMatches::default();
    for curr in curr_boxes {
        let mut best: Option<(BoxId, usize)> = None;
        for prev in prev_boxes {
            let count = votes.get(&(prev.box_id, curr.box_id)).copied().unwrap_or(0);
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((prev.box_id, count));
            }
        }
        let Some((prev_id, count)) = best else {
            result.unmatched.push(curr.box_id);
            continue;
        };
        let candidate = BoxMatch {
            curr_id: curr.box_id,
            votes: count,
        };
        match result.matches.get(&prev_id) {
            Some(existing) if existing.votes >= count => {
                result.unmatched.push(curr.box_id);
            }
            Some(existing) => {
                result.unmatched.push(existing.curr_id);
                result.matches.insert(prev_id, candidate);
            }
            None => {
                result.matches.insert(prev_id, candidate);
            }
        }
    }
    log::trace!(
        "resolved {} box pairs, {} current boxes unmatched",
        result.len(),
        result.unmatched.len()
    );
    result
}
