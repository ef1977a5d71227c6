//! Trend collector
//!
//! Scrapes headline and topic snippets from Japanese news and entertainment
//! sites into a JSON snapshot that seeds dialogue prompts.

pub mod crawler;
pub mod sources;
pub mod collector;

pub use crawler::{RateLimiter, WebCrawler};
pub use sources::{MovieTrend, TopicItem, TrendSource};
pub use collector::{load_fresh, TrendCollector, TrendData};
