use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::timeline::{SlideDescriptor, Timeline};

/// A loaded deck: the timeline the engine runs against, plus the bits the
/// presenter terminal shows (title, per-slide speaker notes).
#[derive(Debug, Clone)]
pub struct Deck {
    pub title: Option<String>,
    pub timeline: Timeline,
    /// Speaker notes, parallel to the timeline's slide order.
    pub notes: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct DeckFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slides: Vec<DeckSlide>,
}

#[derive(Debug, Deserialize)]
struct DeckSlide {
    id: String,
    title: String,
    #[serde(default)]
    minutes: Option<f64>,
    #[serde(default)]
    seconds: Option<u64>,
    #[serde(default)]
    notes: Option<String>,
}

impl DeckSlide {
    /// Target duration from `seconds`, or `minutes` (fractions allowed).
    fn target(&self) -> Result<Duration> {
        match (self.seconds, self.minutes) {
            (Some(secs), _) => Ok(Duration::from_secs(secs)),
            (None, Some(mins)) if mins > 0.0 => Ok(Duration::from_secs((mins * 60.0).round() as u64)),
            (None, Some(_)) => anyhow::bail!("Slide '{}' has a non-positive duration", self.id),
            (None, None) => anyhow::bail!("Slide '{}' needs `minutes` or `seconds`", self.id),
        }
    }
}

pub fn load(path: &Path) -> Result<Deck> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read deck {}", path.display()))?;
    parse(&contents).with_context(|| format!("Invalid deck {}", path.display()))
}

pub fn parse(contents: &str) -> Result<Deck> {
    let file: DeckFile = serde_yaml::from_str(contents)?;

    let mut slides = Vec::with_capacity(file.slides.len());
    let mut notes = Vec::with_capacity(file.slides.len());
    for slide in &file.slides {
        slides.push(SlideDescriptor {
            id: slide.id.clone(),
            title: slide.title.clone(),
            target: slide.target()?,
        });
        notes.push(slide.notes.clone());
    }

    Ok(Deck {
        title: file.title,
        timeline: Timeline::new(slides)?,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_deck() {
        let deck = parse(
            r#"
title: Clinical demo
slides:
  - id: intro
    title: Welcome
    minutes: 2
  - id: dashboard
    title: Live dashboard
    seconds: 90
    notes: Switch to the patient view here
"#,
        )
        .unwrap();

        assert_eq!(deck.title.as_deref(), Some("Clinical demo"));
        assert_eq!(deck.timeline.len(), 2);
        assert_eq!(
            deck.timeline.get(0).unwrap().target,
            Duration::from_secs(120)
        );
        assert_eq!(
            deck.timeline.get(1).unwrap().target,
            Duration::from_secs(90)
        );
        assert_eq!(
            deck.notes[1].as_deref(),
            Some("Switch to the patient view here")
        );
    }

    #[test]
    fn test_fractional_minutes() {
        let deck = parse("slides:\n  - {id: a, title: A, minutes: 1.5}\n").unwrap();
        assert_eq!(deck.timeline.get(0).unwrap().target, Duration::from_secs(90));
    }

    #[test]
    fn test_seconds_take_precedence_over_minutes() {
        let deck = parse("slides:\n  - {id: a, title: A, minutes: 5, seconds: 45}\n").unwrap();
        assert_eq!(deck.timeline.get(0).unwrap().target, Duration::from_secs(45));
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(parse("title: Nothing\nslides: []\n").is_err());
    }

    #[test]
    fn test_missing_duration_rejected() {
        assert!(parse("slides:\n  - {id: a, title: A}\n").is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = parse(
            "slides:\n  - {id: a, title: First, seconds: 10}\n  - {id: a, title: Second, seconds: 10}\n",
        );
        assert!(result.is_err());
    }
}
