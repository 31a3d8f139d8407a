pub mod assembler;
pub mod baseline;
pub mod geo;
pub mod pipeline;
pub mod scorer;
pub mod tier;

pub use baseline::{CarbonBaselineSource, EpdBaselineClient};
pub use pipeline::{PipelineSettings, RankingOrchestrator};
pub use scorer::{BoundedRelevanceScorer, MatchScorer, RelevanceApiScorer};
pub use tier::TierThresholds;
