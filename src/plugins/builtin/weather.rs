//! Weather forecast plugin: `天気予報 <都市名>`
//!
//! Cities are resolved through a prefecture -> region -> city table, then
//! today's and tomorrow's forecast is scraped from the forecast page.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::application::errors::{PluginError, PluginResult};
use crate::infrastructure::config::WeatherConfig;
use crate::plugins::Plugin;

const TRIGGER: &str = "天気予報 ";
const DAY_LABELS: [&str; 2] = ["今日", "明日"];

/// A city resolved from the mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityLocation {
    pub prefecture: String,
    pub region_code: String,
    pub city: String,
    pub city_code: String,
}

/// Lookup table, kept in file order so the first match wins
#[derive(Debug, Clone, Default)]
pub struct CityMapping {
    locations: Vec<CityLocation>,
}

impl CityMapping {
    pub fn from_json(value: &Value) -> Self {
        let mut locations = Vec::new();
        let Some(prefectures) = value.as_object() else {
            return Self { locations };
        };
        for (prefecture, regions) in prefectures {
            let Some(regions) = regions.as_object() else { continue };
            for (region_code, cities) in regions {
                let Some(cities) = cities.as_object() else { continue };
                for (city, city_code) in cities {
                    let code = match city_code {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    locations.push(CityLocation {
                        prefecture: prefecture.clone(),
                        region_code: region_code.clone(),
                        city: city.clone(),
                        city_code: code,
                    });
                }
            }
        }
        Self { locations }
    }

    pub fn load(path: impl AsRef<Path>) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PluginError::Load(format!("Failed to read city mapping: {}", e)))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| PluginError::Load(format!("Failed to parse city mapping: {}", e)))?;
        Ok(Self::from_json(&value))
    }

    pub fn find(&self, city: &str) -> Option<&CityLocation> {
        self.locations.iter().find(|l| l.city == city)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// One day of forecast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastDay {
    pub label: String,
    pub date: String,
    pub weather: String,
    pub temperature: String,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_text(element: &ElementRef, sel: &Selector) -> Option<String> {
    element
        .select(sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
}

/// Extract today's and tomorrow's forecast; `None` when the page lacks them
pub fn parse_forecast(html: &str) -> Option<Vec<ForecastDay>> {
    let document = Html::parse_document(html);
    let section_sel = selector("div.forecastCity")?;
    let cell_sel = selector("td")?;
    let date_sel = selector("p.date")?;
    let pict_sel = selector("p.pict")?;
    let img_sel = selector("img")?;
    let temp_sel = selector("ul.temp")?;
    let high_sel = selector("li.high em")?;
    let low_sel = selector("li.low em")?;

    let section = document.select(&section_sel).next()?;
    let cells: Vec<ElementRef> = section
        .select(&cell_sel)
        .filter(|cell| cell.select(&date_sel).next().is_some())
        .collect();

    if cells.len() < 2 {
        tracing::warn!("Forecast page has {} day cells, expected 2", cells.len());
        return None;
    }

    let days = cells
        .iter()
        .zip(DAY_LABELS)
        .map(|(cell, label)| {
            let date = first_text(cell, &date_sel).unwrap_or_default();

            let weather = match cell.select(&pict_sel).next() {
                Some(pict) => match pict.select(&img_sel).next() {
                    Some(img) => img.value().attr("alt").unwrap_or_default().trim().to_string(),
                    None => pict.text().collect::<String>().trim().to_string(),
                },
                None => String::new(),
            };

            let temperature = match cell.select(&temp_sel).next() {
                Some(temp) => {
                    let high = first_text(&temp, &high_sel).unwrap_or_default();
                    let low = first_text(&temp, &low_sel).unwrap_or_default();
                    format!("最高: {}℃, 最低: {}℃", high, low)
                }
                None => String::new(),
            };

            ForecastDay {
                label: label.to_string(),
                date,
                weather,
                temperature,
            }
        })
        .collect();

    Some(days)
}

pub fn format_forecast(location: &CityLocation, days: &[ForecastDay]) -> String {
    let mut output = format!("{} {} の天気予報\n", location.prefecture, location.city);
    for day in days {
        output.push_str(&format!("\n 📅：*{}*\n", day.date));
        output.push_str(&format!(" 🌤 ：*{}*\n", day.weather));
        output.push_str(&format!(" 🌡 ：*{}*\n", day.temperature));
    }
    output
}

fn unavailable(city: &str) -> String {
    format!("⚠️ '{}' の天気情報を取得できませんでした。", city)
}

pub struct WeatherPlugin {
    client: Client,
    base_url: String,
    mapping: CityMapping,
}

impl WeatherPlugin {
    pub fn new(mapping: CityMapping, base_url: impl Into<String>, timeout_secs: u64) -> PluginResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PluginError::Load(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            mapping,
        })
    }

    /// A missing mapping file still registers the plugin so weather
    /// requests get an explicit failure message.
    pub fn from_config(config: &WeatherConfig) -> PluginResult<Self> {
        let mapping = CityMapping::load(&config.mapping_file).unwrap_or_else(|e| {
            tracing::warn!("{} ({})", e, config.mapping_file.display());
            CityMapping::default()
        });
        tracing::info!("Weather plugin knows {} cities", mapping.len());
        Self::new(mapping, &config.base_url, config.timeout_secs)
    }

    fn forecast_url(&self, location: &CityLocation) -> String {
        format!(
            "{}/{}/{}.html",
            self.base_url.trim_end_matches('/'),
            location.region_code,
            location.city_code
        )
    }

    async fn fetch_forecast(&self, location: &CityLocation) -> Option<Vec<ForecastDay>> {
        let url = self.forecast_url(location);
        tracing::debug!("Fetching forecast: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!("Forecast request returned {}", r.status());
                return None;
            }
            Err(e) => {
                tracing::warn!("Forecast request failed: {}", e);
                return None;
            }
        };

        let html = response.text().await.ok()?;
        parse_forecast(&html)
    }
}

#[async_trait]
impl Plugin for WeatherPlugin {
    fn name(&self) -> &str {
        "Weather Forecast Info"
    }

    fn description(&self) -> &str {
        "Today's and tomorrow's forecast for Japanese cities"
    }

    fn usage(&self) -> Option<&str> {
        Some("天気予報：天気予報+半角SP+都市名(県庁所在地他)")
    }

    async fn on_message(&self, text: &str) -> Option<String> {
        let city = text.strip_prefix(TRIGGER)?.trim();

        let Some(location) = self.mapping.find(city) else {
            tracing::info!("City '{}' not in mapping", city);
            return Some(unavailable(city));
        };

        match self.fetch_forecast(location).await {
            Some(days) => Some(format_forecast(location, &days)),
            None => Some(unavailable(city)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FORECAST_HTML: &str = r#"
        <div class="forecastCity"><table><tr>
          <td>
            <p class="date"><span>3月1日(金)</span></p>
            <p class="pict"><img src="x.gif" alt=" 晴れ "></p>
            <ul class="temp"><li class="high"><em>15</em>℃</li><li class="low"><em>6</em>℃</li></ul>
          </td>
          <td>
            <p class="date">3月2日(土)</p>
            <p class="pict">曇り</p>
          </td>
          <td><p>no date here</p></td>
        </tr></table></div>"#;

    fn mapping() -> CityMapping {
        CityMapping::from_json(&json!({
            "東京都": {"4410": {"東京": "4410"}},
            "大阪": {"6200": {"大阪": "6200"}},
            "北海道": {"1400": {"府中": "1400"}},
            "広島": {"6710": {"府中": "6710"}}
        }))
    }

    #[test]
    fn test_mapping_first_match_in_file_order() {
        let m = mapping();
        assert_eq!(m.len(), 4);
        let fuchu = m.find("府中").unwrap();
        assert_eq!(fuchu.prefecture, "北海道");
        assert_eq!(fuchu.region_code, "1400");
        assert!(m.find("名古屋").is_none());
    }

    #[test]
    fn test_parse_forecast() {
        let days = parse_forecast(FORECAST_HTML).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0], ForecastDay {
            label: "今日".to_string(),
            date: "3月1日(金)".to_string(),
            weather: "晴れ".to_string(),
            temperature: "最高: 15℃, 最低: 6℃".to_string(),
        });
        assert_eq!(days[1].label, "明日");
        assert_eq!(days[1].weather, "曇り");
        assert_eq!(days[1].temperature, "");
    }

    #[test]
    fn test_parse_forecast_missing_data() {
        assert!(parse_forecast("<html><body>nothing</body></html>").is_none());
        let one_day = r#"<div class="forecastCity"><table><tr><td><p class="date">d</p></td></tr></table></div>"#;
        assert!(parse_forecast(one_day).is_none());
    }

    #[test]
    fn test_format_forecast() {
        let location = mapping().find("東京").cloned().unwrap();
        let days = parse_forecast(FORECAST_HTML).unwrap();
        let text = format_forecast(&location, &days);
        assert!(text.starts_with("東京都 東京 の天気予報\n"));
        assert!(text.contains("\n 📅：*3月1日(金)*\n 🌤 ：*晴れ*\n 🌡 ：*最高: 15℃, 最低: 6℃*\n"));
    }

    #[tokio::test]
    async fn test_unknown_city_and_trigger() {
        let plugin = WeatherPlugin::new(mapping(), "http://127.0.0.1:9", 1).unwrap();
        assert!(plugin.on_message("天気予報").await.is_none());
        assert!(plugin.on_message("明日の天気予報 東京").await.is_none());
        assert_eq!(
            plugin.on_message("天気予報 名古屋").await,
            Some("⚠️ '名古屋' の天気情報を取得できませんでした。".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_unavailable() {
        let plugin = WeatherPlugin::new(mapping(), "http://127.0.0.1:9/weather/", 1).unwrap();
        let location = plugin.mapping.find("東京").cloned().unwrap();
        assert_eq!(plugin.forecast_url(&location), "http://127.0.0.1:9/weather/4410/4410.html");
        assert_eq!(
            plugin.on_message("天気予報 東京").await,
            Some("⚠️ '東京' の天気情報を取得できませんでした。".to_string())
        );
    }
}
