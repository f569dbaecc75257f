pub mod aggregator;
pub mod classifier;
pub mod news;

pub use aggregator::SignalAggregator;
pub use classifier::{HttpClassifier, LexiconClassifier};
pub use news::{article_texts, NewsWindow};
