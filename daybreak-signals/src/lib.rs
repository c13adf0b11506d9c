//! Morning-context signal sources: market mood and crypto headlines.
//!
//! These feed the post generator with something concrete to riff on. Both
//! clients are read-only, unauthenticated-or-lightly-authenticated GETs, and
//! both are *optional* inputs: a run that cannot reach them still posts, it
//! just says less.

pub mod market;
pub mod news;

pub use market::{MarketApi, MarketSentiment, MarketSnapshot};
pub use news::NewsApi;
