pub mod clock;
pub mod pacing;
pub mod snapshot;
pub mod timeline;
pub mod walkthrough;

#[cfg(test)]
mod tests;

pub use pacing::{Pace, PaceThresholds, PaceVerdict, analyze};
pub use snapshot::{Status, WalkthroughSnapshot};
pub use timeline::{SlideDescriptor, Timeline};
pub use walkthrough::{Walkthrough, WalkthroughView, format_clock};
