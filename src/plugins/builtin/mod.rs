//! Plugins compiled into the binary, enabled through `plugins.builtins`

pub mod weather;
pub mod world_time;
pub mod web_search;

pub use weather::WeatherPlugin;
pub use world_time::WorldTimePlugin;
pub use web_search::WebSearchPlugin;
