use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;

/// One unit in the fixed presentation sequence, with a target display duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDescriptor {
    pub id: String,
    pub title: String,
    pub target: Duration,
}

/// The ordered, immutable slide sequence plus its expected-time arithmetic.
///
/// A `Timeline` is built once at startup and never mutated. An empty sequence,
/// a duplicate id, or a zero target duration is a configuration error caught
/// at construction, so every method below is infallible.
#[derive(Debug, Clone)]
pub struct Timeline {
    slides: Vec<SlideDescriptor>,
}

impl Timeline {
    pub fn new(slides: Vec<SlideDescriptor>) -> Result<Self> {
        if slides.is_empty() {
            anyhow::bail!("A timeline needs at least one slide");
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for slide in &slides {
            if slide.target.is_zero() {
                anyhow::bail!("Slide '{}' has a zero target duration", slide.id);
            }
            if !seen.insert(slide.id.as_str()) {
                anyhow::bail!("Duplicate slide id '{}'", slide.id);
            }
        }
        Ok(Self { slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn get(&self, index: usize) -> Option<&SlideDescriptor> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[SlideDescriptor] {
        &self.slides
    }

    /// Position of the slide with the given id, if present.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    /// Sum of target durations of all slides strictly before `index`.
    ///
    /// An index past the end yields the full total, which keeps pacing
    /// arithmetic well-defined for a snapshot frozen at completion.
    pub fn expected_elapsed_at(&self, index: usize) -> Duration {
        self.slides
            .iter()
            .take(index)
            .map(|s| s.target)
            .sum()
    }

    pub fn total_target(&self) -> Duration {
        self.expected_elapsed_at(self.slides.len())
    }
}
