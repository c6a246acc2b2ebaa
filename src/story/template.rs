use rand::seq::SliceRandom;
use rand::Rng;

use super::vocabulary::Slot;
use super::StoryError;

/// Sentence templates. Placeholders are `{slot_name}`.
pub const TEMPLATES: &[&str] = &[
    "I remember {activity} in the {location}, {sensory_detail}.",
    "There was this magical time I {action} near the {natural_feature}, {memory_detail}.",
    "I'll never forget {specific_moment} in the {environment}, {emotional_detail}.",
    "One summer afternoon, while {activity}, I experienced {specific_moment} that left me {emotional_detail}.",
    "The memory of {action} by the {natural_feature} remains vivid in my mind, {sensory_detail}.",
    "I often think back to that day in the {location} when {specific_moment} happened, {emotional_detail}.",
    "While {activity} through the {environment}, I encountered {specific_moment} and felt {emotional_detail}.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn split_parts(template: &str) -> Result<Vec<Part<'_>>, StoryError> {
    let mut parts = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            parts.push(Part::Text(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| StoryError::Unterminated(template.to_string()))?;
        parts.push(Part::Placeholder(&after[..close]));
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        parts.push(Part::Text(rest));
    }
    Ok(parts)
}

/// Slots referenced by `template`, in order of appearance.
pub fn referenced_slots(template: &str) -> Result<Vec<Slot>, StoryError> {
    split_parts(template)?
        .into_iter()
        .filter_map(|part| match part {
            Part::Placeholder(name) => Some(name),
            Part::Text(_) => None,
        })
        .map(|name| {
            Slot::from_name(name).ok_or_else(|| StoryError::UnknownSlot {
                template: template.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// Check that every template parses and only references populated slots.
///
/// Run once at startup; after it passes, [`generate_story`] cannot fall
/// back to leaving a placeholder unfilled.
pub fn validate_templates() -> Result<(), StoryError> {
    if TEMPLATES.is_empty() {
        return Err(StoryError::NoTemplates);
    }
    for template in TEMPLATES {
        for slot in referenced_slots(template)? {
            if slot.fragments().is_empty() {
                return Err(StoryError::EmptySlot(slot.name()));
            }
        }
    }
    Ok(())
}

/// Fill `template`, drawing one fragment per placeholder.
///
/// Placeholders that do not name a populated slot are kept verbatim.
pub fn fill_template<R: Rng + ?Sized>(template: &str, rng: &mut R) -> String {
    let parts = match split_parts(template) {
        Ok(parts) => parts,
        Err(e) => {
            log::warn!("Template left unfilled: {e}");
            return template.to_string();
        }
    };

    let mut story = String::with_capacity(template.len() * 3);
    for part in parts {
        match part {
            Part::Text(text) => story.push_str(text),
            Part::Placeholder(name) => {
                match Slot::from_name(name).and_then(|slot| slot.fragments().choose(rng)) {
                    Some(fragment) => story.push_str(fragment),
                    None => {
                        story.push('{');
                        story.push_str(name);
                        story.push('}');
                    }
                }
            }
        }
    }
    story
}

/// Generate one story from a uniformly chosen template.
pub fn generate_story<R: Rng + ?Sized>(rng: &mut R) -> String {
    match TEMPLATES.choose(rng) {
        Some(template) => fill_template(template, rng),
        None => String::new(),
    }
}
