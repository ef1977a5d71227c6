//! World clock plugin: `時刻 <都市名>`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use chrono_tz::{Africa, America, Asia, Australia, Europe};

use crate::plugins::Plugin;

const TRIGGER: &str = "時刻 ";

/// Supported cities and their time zones
const CITY_TIMEZONES: &[(&str, Tz)] = &[
    // Asia / Oceania
    ("東京", Asia::Tokyo),
    ("北京", Asia::Shanghai),
    ("香港", Asia::Hong_Kong),
    ("ソウル", Asia::Seoul),
    ("シンガポール", Asia::Singapore),
    ("ムンバイ", Asia::Kolkata),
    ("ドバイ", Asia::Dubai),
    ("シドニー", Australia::Sydney),
    // Americas
    ("ニューヨーク", America::New_York),
    ("ワシントンD.C.", America::New_York),
    ("ボストン", America::New_York),
    ("マイアミ", America::New_York),
    ("シカゴ", America::Chicago),
    ("ダラス", America::Chicago),
    ("デンバー", America::Denver),
    ("フェニックス", America::Phoenix),
    ("ロサンゼルス", America::Los_Angeles),
    ("サンフランシスコ", America::Los_Angeles),
    ("シアトル", America::Los_Angeles),
    // Europe
    ("ロンドン", Europe::London),
    ("パリ", Europe::Paris),
    ("ベルリン", Europe::Berlin),
    ("マドリード", Europe::Madrid),
    ("ローマ", Europe::Rome),
    ("アムステルダム", Europe::Amsterdam),
    ("ブリュッセル", Europe::Brussels),
    ("ストックホルム", Europe::Stockholm),
    ("ウィーン", Europe::Vienna),
    ("ジュネーブ", Europe::Zurich),
    ("チューリッヒ", Europe::Zurich),
    ("オスロ", Europe::Oslo),
    ("ヘルシンキ", Europe::Helsinki),
    ("モスクワ", Europe::Moscow),
    // South America / Africa
    ("リオデジャネイロ", America::Sao_Paulo),
    ("ブエノスアイレス", America::Argentina::Buenos_Aires),
    ("ヨハネスブルグ", Africa::Johannesburg),
];

pub fn timezone_for(city: &str) -> Option<Tz> {
    CITY_TIMEZONES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, tz)| *tz)
}

/// Format the local time of `city` at instant `now`
pub fn world_time_at(city: &str, now: DateTime<Utc>) -> String {
    match timezone_for(city) {
        Some(tz) => {
            let local = now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S");
            format!("🕒 {}の現在時刻: {}", city, local)
        }
        None => format!("⚠️ '{}' の時刻情報は取得できません。", city),
    }
}

pub struct WorldTimePlugin;

impl WorldTimePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WorldTimePlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for WorldTimePlugin {
    fn name(&self) -> &str {
        "World Time Info"
    }

    fn description(&self) -> &str {
        "Current time in major world cities"
    }

    fn usage(&self) -> Option<&str> {
        Some("世界時刻：時刻+半角SP+都市名(外国主要都市)")
    }

    async fn on_message(&self, text: &str) -> Option<String> {
        let city = text.strip_prefix(TRIGGER)?.trim();
        Some(world_time_at(city, Utc::now()))
    }
}
