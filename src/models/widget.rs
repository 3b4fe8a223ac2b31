//! Widget resource model

use serde::{Deserialize, Serialize};

/// A widget as stored and served by the demo resource.
///
/// The JSON encoding of this struct is the representation hashed into the
/// widget's validator token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub id: u64,
    pub name: String,
    pub quantity: u32,
}
