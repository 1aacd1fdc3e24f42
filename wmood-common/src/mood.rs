//! Weather condition → mood classification
//!
//! A weather condition string (e.g. OpenWeatherMap's `weather[0].main`, or any
//! free text such as "light rain showers") is classified by case-insensitive
//! substring match against a fixed, ordered keyword table. The first matching
//! row wins; conditions matching no row fall back to [`Mood::Popular`].
//!
//! Each mood owns an ordered list of catalog search terms, most specific first.

use serde::Serialize;

/// Mood category derived from a weather condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sunny,
    Rainy,
    Stormy,
    Cloudy,
    Snowy,
    Foggy,
    Windy,
    Hazy,
    /// Catch-all for conditions matching no keyword
    Popular,
}

/// Ordered keyword table. Order is significant: first match wins.
const KEYWORD_TABLE: &[(Mood, &[&str])] = &[
    (Mood::Sunny, &["clear", "sunny"]),
    (Mood::Rainy, &["rain", "drizzle"]),
    (Mood::Stormy, &["storm", "thunder"]),
    (Mood::Cloudy, &["cloud", "overcast"]),
    (Mood::Snowy, &["snow", "cold"]),
    (Mood::Foggy, &["fog", "mist"]),
    (Mood::Windy, &["wind", "breeze"]),
    (Mood::Hazy, &["haze", "smoke"]),
];

impl Mood {
    /// Classify a weather condition string
    pub fn from_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();

        KEYWORD_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| condition.contains(k)))
            .map(|(mood, _)| *mood)
            .unwrap_or(Mood::Popular)
    }

    /// Catalog search terms in priority order
    pub fn search_terms(&self) -> &'static [&'static str] {
        match self {
            Mood::Sunny => &["sunny", "happy", "summer", "pop", "upbeat"],
            Mood::Rainy => &["rainy", "chill", "acoustic", "calm", "lo-fi"],
            Mood::Stormy => &["epic", "rock", "intense", "powerful", "metal"],
            Mood::Cloudy => &["indie", "mellow", "thoughtful", "alternative", "dream-pop"],
            Mood::Snowy => &["winter", "cozy", "ambient", "chill", "fireplace"],
            Mood::Foggy => &["mysterious", "ambient", "atmospheric", "ethereal", "dreamy"],
            Mood::Windy => &["epic", "cinematic", "orchestral", "adventure", "travel"],
            Mood::Hazy => &["mysterious", "dark", "ambient", "electronic", "synth"],
            Mood::Popular => &["popular", "hits", "trending", "viral"],
        }
    }

    /// Display label shown alongside recommendations
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Sunny => "Sunny Vibes 🎉",
            Mood::Rainy => "Rainy Chill 🌧️",
            Mood::Stormy => "Stormy Energy ⚡",
            Mood::Cloudy => "Cloudy Moods ☁️",
            Mood::Snowy => "Cozy Snow ❄️",
            Mood::Foggy => "Mysterious Fog 🌫️",
            Mood::Windy => "Windy Adventure 🌬️",
            Mood::Hazy => "Mysterious Haze 💨",
            Mood::Popular => "Good Vibes 🎵",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mood::Sunny => "Bright and energetic music for sunny days",
            Mood::Rainy => "Calm and soothing music for rainy days",
            Mood::Stormy => "Powerful and intense music for stormy weather",
            Mood::Cloudy => "Thoughtful and mellow music for cloudy days",
            Mood::Snowy => "Warm and cozy music for cold days",
            Mood::Foggy => "Atmospheric and mysterious music for foggy days",
            Mood::Windy => "Epic and adventurous music for windy days",
            Mood::Hazy => "Dark and atmospheric music for hazy conditions",
            Mood::Popular => "Great music for your current weather",
        }
    }
}

/// Classified mood plus the condition it was derived from
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodQuery {
    condition: String,
    mood: Mood,
}

impl MoodQuery {
    pub fn classify(condition: impl Into<String>) -> Self {
        let condition = condition.into();
        let mood = Mood::from_condition(&condition);
        Self { condition, mood }
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn search_terms(&self) -> &'static [&'static str] {
        self.mood.search_terms()
    }
}
