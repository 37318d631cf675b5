pub mod aecs;
pub mod ambiguity;
pub mod classification;
pub mod discernibility;
pub mod entropy;
pub mod entropy_il;
pub mod entropy_nonmonotonic;
pub mod height;
pub mod kl;
pub mod loss;
pub mod payout;
pub mod precision;
pub mod sse;
pub mod static_loss;

pub use aecs::AecsMetric;
pub use ambiguity::AmbiguityMetric;
pub use classification::ClassificationMetric;
pub use discernibility::DiscernibilityMetric;
pub use entropy::{EntropyMetric, EntropyMetricPrecomputed};
pub use entropy_il::EntropyBasedMetric;
pub use entropy_nonmonotonic::{NonMonotonicEntropyMetric, NonMonotonicEntropyMetricPrecomputed};
pub use height::HeightMetric;
pub use kl::KlDivergenceMetric;
pub use loss::{LossMetric, LossMetricPrecomputed};
pub use payout::{PayoutConfiguration, PublisherPayoutMetric};
pub use precision::PrecisionMetric;
pub use sse::SseMetric;
pub use static_loss::{StaticMetric, StaticTables};
