pub use self::search::*;

pub(crate) mod search;
