//! Resolution planning.

use super::types::{Dimensions, Rendition};

/// Ordered renditions to produce for one source.
///
/// Always non-empty, ascending and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionPlan {
    renditions: Vec<Rendition>,
}

impl RenditionPlan {
    /// The renditions, lowest first.
    pub fn renditions(&self) -> &[Rendition] {
        &self.renditions
    }

    /// The highest rendition in the plan.
    pub fn ceiling(&self) -> Rendition {
        // Non-empty by construction.
        self.renditions
            .last()
            .copied()
            .unwrap_or(Rendition::LOWEST)
    }

    pub fn len(&self) -> usize {
        self.renditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renditions.is_empty()
    }
}

impl<'a> IntoIterator for &'a RenditionPlan {
    type Item = &'a Rendition;
    type IntoIter = std::slice::Iter<'a, Rendition>;

    fn into_iter(self) -> Self::IntoIter {
        self.renditions.iter()
    }
}

/// Classifies a source into the highest tier whose threshold it meets.
///
/// Sources below every threshold classify as the lowest tier.
pub fn classify(width: u32, height: u32) -> Rendition {
    let source = Dimensions::new(width, height);
    Rendition::ALL
        .into_iter()
        .rev()
        .find(|r| source.covers(r.threshold()))
        .unwrap_or(Rendition::LOWEST)
}

/// Plans every tier from the lowest up to the source's classification.
///
/// Intermediate tiers may upscale a source that sits between thresholds.
pub fn plan(width: u32, height: u32) -> RenditionPlan {
    let ceiling = classify(width, height);
    RenditionPlan {
        renditions: Rendition::ALL
            .into_iter()
            .take_while(|r| *r <= ceiling)
            .collect(),
    }
}
