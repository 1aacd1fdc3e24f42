//! # WeatherMood Common Library
//!
//! Shared code for the WeatherMood services:
//! - Error type and result alias
//! - Bootstrap configuration (TOML, environment, compiled defaults)
//! - Weather condition → mood classification
//! - Catalog track model

pub mod config;
pub mod error;
pub mod mood;
pub mod track;

pub use error::{Error, Result};
pub use mood::{Mood, MoodQuery};
pub use track::{CollectionRef, TimeRange, Track};
