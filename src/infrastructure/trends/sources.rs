//! Trend sources and their HTML extraction rules

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// A movie currently showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieTrend {
    pub title: String,
    pub release_date: String,
    pub official_site: String,
}

/// One entry under a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicItem {
    Headline(String),
    Movie(MovieTrend),
}

impl TopicItem {
    /// The text that feeds `trending_words`
    pub fn word(&self) -> &str {
        match self {
            TopicItem::Headline(s) => s,
            TopicItem::Movie(m) => &m.title,
        }
    }
}

/// Sites scraped for trends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendSource {
    Music,
    Movies,
    Wikipedia,
    Chiebukuro,
}

impl TrendSource {
    pub const ALL: [TrendSource; 4] = [
        TrendSource::Music,
        TrendSource::Movies,
        TrendSource::Wikipedia,
        TrendSource::Chiebukuro,
    ];

    /// Topic key in the saved trend data
    pub fn topic(&self) -> &'static str {
        match self {
            TrendSource::Music => "音楽",
            TrendSource::Movies => "映画",
            TrendSource::Wikipedia => "Wikipedia",
            TrendSource::Chiebukuro => "Yahoo知恵袋",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            TrendSource::Music => "https://www.udiscovermusic.jp/music/news",
            TrendSource::Movies => "https://uscinemas.jp/now-showing/",
            TrendSource::Wikipedia => "https://ja.wikipedia.org/wiki/Portal:今日の出来事",
            TrendSource::Chiebukuro => "https://chiebukuro.yahoo.co.jp/?tab=1",
        }
    }

    /// Whether scraped entries are translated before saving
    pub fn translated(&self) -> bool {
        !matches!(self, TrendSource::Wikipedia)
    }

    pub fn parse(&self, html: &str) -> Vec<TopicItem> {
        let document = Html::parse_document(html);
        match self {
            TrendSource::Music => headlines(&document, ".mvp-blog-story-text h2"),
            TrendSource::Movies => movies(&document),
            TrendSource::Wikipedia => headlines(&document, ".mw-headline, .mw-heading h2, .mw-heading h3"),
            TrendSource::Chiebukuro => headlines(&document, "[class*='ListItem__Question'] h2"),
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {}", css, e);
            None
        }
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn headlines(document: &Html, css: &str) -> Vec<TopicItem> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .map(TopicItem::Headline)
        .collect()
}

fn movies(document: &Html) -> Vec<TopicItem> {
    let (Some(boxes), Some(title), Some(release), Some(link)) = (
        selector(".now-showing-box"),
        selector("h3"),
        selector(".red-heading p"),
        selector("a[href*='http']"),
    ) else {
        return Vec::new();
    };

    document
        .select(&boxes)
        .map(|movie_box| {
            let first_text = |sel: &Selector| {
                movie_box.select(sel).next().map(|el| element_text(&el)).unwrap_or_default()
            };
            MovieTrend {
                title: first_text(&title),
                release_date: first_text(&release),
                official_site: movie_box
                    .select(&link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or_default()
                    .to_string(),
            }
        })
        .map(TopicItem::Movie)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_headlines() {
        let html = r#"<div class="mvp-blog-story-text"><h2> 新譜リリース </h2></div>
            <div class="mvp-blog-story-text"><h2>来日公演決定</h2></div>
            <div class="other"><h2>ignored</h2></div>"#;
        let items = TrendSource::Music.parse(html);
        assert_eq!(items, vec![
            TopicItem::Headline("新譜リリース".to_string()),
            TopicItem::Headline("来日公演決定".to_string()),
        ]);
    }

    #[test]
    fn test_movie_boxes() {
        let html = r#"
            <div class="now-showing-box">
              <h3>映画A</h3>
              <div class="red-heading"><p>2024年3月1日公開</p></div>
              <a href="/local">local</a>
              <a href="https://movie-a.example.com">公式</a>
            </div>
            <div class="now-showing-box"><h3>映画B</h3></div>"#;
        let items = TrendSource::Movies.parse(html);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], TopicItem::Movie(MovieTrend {
            title: "映画A".to_string(),
            release_date: "2024年3月1日公開".to_string(),
            official_site: "https://movie-a.example.com".to_string(),
        }));
        assert_eq!(items[1].word(), "映画B");
    }

    #[test]
    fn test_wikipedia_both_heading_styles() {
        let html = r#"<h2><span class="mw-headline">3月1日</span></h2>
            <div class="mw-heading mw-heading2"><h2 id="x">3月2日</h2></div>"#;
        let words: Vec<String> = TrendSource::Wikipedia.parse(html).iter().map(|i| i.word().to_string()).collect();
        assert_eq!(words, vec!["3月1日", "3月2日"]);
    }

    #[test]
    fn test_chiebukuro_questions() {
        let html = r#"<li class="ClapLv2TopListItem_Chie-ListItem__Question__11BeL"><h2>質問です</h2></li>"#;
        assert_eq!(TrendSource::Chiebukuro.parse(html), vec![TopicItem::Headline("質問です".to_string())]);
    }

    #[test]
    fn test_topic_item_json_shape() {
        let json = r#"["見出し", {"title": "T", "release_date": "D", "official_site": ""}]"#;
        let items: Vec<TopicItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].word(), "見出し");
        assert_eq!(items[1].word(), "T");
    }
}
