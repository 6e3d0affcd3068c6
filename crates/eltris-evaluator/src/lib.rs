pub use self::{features::*, placement_evaluator::*, weights::*};

pub(crate) mod features;
pub(crate) mod placement_evaluator;
pub(crate) mod weights;
