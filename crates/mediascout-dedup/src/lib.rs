//! Candidate deduplication: exact-URL (stage 1) then optional fuzzy
//! near-duplicate merge (stage 2).

mod similarity;
mod stage1;
mod stage2;

pub use similarity::token_set_ratio;
pub use stage1::exact_dedup;
pub use stage2::fuzzy_dedup;
