//! Publisher clients used by Daybreak to get the morning post out.
//!
//! Currently only the Typefully pipeline is implemented: account (social set)
//! lookup, the three-step media upload, and draft creation with immediate
//! publishing.
pub mod typefully;
