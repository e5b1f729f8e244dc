use hashbrown::HashMap;

use crate::types::{FrameId, FrameNo, MatchId};

/// Secondary index from a key to the ids filed under it.
pub type VecIndex<K, V> = HashMap<K, Vec<V>>;

/// Frame ids per match, keyed by frame number within each match.
pub type FrameNoIndex = HashMap<MatchId, HashMap<FrameNo, FrameId>>;
