//! Rendition tiers and resolution planning.
//!
//! The rendition table is closed: five tiers from 240p to 1080p, each with a
//! classification threshold and an encode target. [`plan`] picks the tiers to
//! produce for a source from its native dimensions.

mod planner;
mod types;

pub use planner::{classify, plan, RenditionPlan};
pub use types::{Dimensions, Rendition, UnknownRendition};
