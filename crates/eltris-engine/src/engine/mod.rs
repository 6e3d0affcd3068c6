pub use self::{piece_bag::*, session::*, stats::*};

pub(crate) mod piece_bag;
pub(crate) mod session;
pub(crate) mod stats;
