//! Story text generation.
//!
//! Stories are single sentences built from a fixed set of [`TEMPLATES`],
//! each placeholder filled with a random fragment from its [`Slot`].
//!
//! ```rust
//! use rand::SeedableRng;
//!
//! forest_stories::story::validate_templates()?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(3);
//! let story = forest_stories::story::generate_story(&mut rng);
//! assert!(!story.contains('{'));
//! # Ok::<(), forest_stories::story::StoryError>(())
//! ```

pub mod template;
pub mod vocabulary;

pub use template::{generate_story, validate_templates, TEMPLATES};
pub use vocabulary::Slot;

#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    #[error("no story templates defined")]
    NoTemplates,
    #[error("template {template:?} references unknown slot '{name}'")]
    UnknownSlot { template: String, name: String },
    #[error("template {0:?} has an unterminated placeholder")]
    Unterminated(String),
    #[error("phrase slot '{0}' has no fragments")]
    EmptySlot(&'static str),
}
