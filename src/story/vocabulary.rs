/// Grammatical role a template placeholder can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Activity,
    Location,
    SensoryDetail,
    Action,
    NaturalFeature,
    SpecificMoment,
    Environment,
    EmotionalDetail,
    MemoryDetail,
}

impl Slot {
    pub const ALL: [Slot; 9] = [
        Slot::Activity,
        Slot::Location,
        Slot::SensoryDetail,
        Slot::Action,
        Slot::NaturalFeature,
        Slot::SpecificMoment,
        Slot::Environment,
        Slot::EmotionalDetail,
        Slot::MemoryDetail,
    ];

    /// Placeholder name used inside templates, e.g. `{sensory_detail}`.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Activity => "activity",
            Slot::Location => "location",
            Slot::SensoryDetail => "sensory_detail",
            Slot::Action => "action",
            Slot::NaturalFeature => "natural_feature",
            Slot::SpecificMoment => "specific_moment",
            Slot::Environment => "environment",
            Slot::EmotionalDetail => "emotional_detail",
            Slot::MemoryDetail => "memory_detail",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.name() == name)
    }

    /// Interchangeable fragments for this slot.
    pub fn fragments(self) -> &'static [&'static str] {
        match self {
            Slot::Activity => ACTIVITIES,
            Slot::Location => LOCATIONS,
            Slot::SensoryDetail => SENSORY_DETAILS,
            Slot::Action => ACTIONS,
            Slot::NaturalFeature => NATURAL_FEATURES,
            Slot::SpecificMoment => SPECIFIC_MOMENTS,
            Slot::Environment => ENVIRONMENTS,
            Slot::EmotionalDetail => EMOTIONAL_DETAILS,
            Slot::MemoryDetail => MEMORY_DETAILS,
        }
    }
}

const ACTIVITIES: &[&str] = &[
    "hiking",
    "camping",
    "exploring",
    "birdwatching",
    "fishing",
    "foraging",
    "photographing wildlife",
    "stargazing",
    "tracking animals",
    "meditating",
    "painting landscapes",
    "writing in my journal",
    "collecting rocks",
    "identifying plants",
    "building a shelter",
    "canoeing",
    "rock climbing",
];

const LOCATIONS: &[&str] = &[
    "ancient redwood forest",
    "mountain trail",
    "secluded alpine lake",
    "dense pine woods",
    "sun-dappled meadow",
    "misty river valley",
    "hidden waterfall grotto",
    "old growth forest",
    "moss-covered canyon",
    "wildflower-filled clearing",
    "rocky mountain summit",
    "serene forest pond",
    "babbling brook side",
    "oak tree grove",
    "birch tree forest",
    "cedar woodland",
];

const SENSORY_DETAILS: &[&str] = &[
    "the earthy scent of damp soil and decaying leaves filling my nostrils",
    "the symphony of birdsong echoing through the canopy above me",
    "the cool, refreshing mist from the waterfall kissing my face",
    "the warm golden sunlight filtering through the emerald green leaves",
    "the satisfying crunch of autumn leaves under my hiking boots",
    "the gentle whisper of wind dancing through the pine needles",
    "the sweet fragrance of wildflowers carried on the afternoon breeze",
    "the crisp, clean mountain air filling my lungs with each breath",
    "the distant rumble of thunder promising a summer storm",
    "the melodic babbling of the stream composing nature's music",
    "the damp, rich smell of moss and fungi on fallen logs",
    "the electric silence broken only by my own heartbeat",
];

const ACTIONS: &[&str] = &[
    "sat silently",
    "walked leisurely",
    "rested contemplatively",
    "watched intently",
    "listened carefully",
    "wandered aimlessly",
    "explored curiously",
    "waited patiently",
    "observed keenly",
    "sketched quickly",
    "photographed diligently",
    "meditated deeply",
    "napped peacefully",
    "reflected thoughtfully",
    "prayed gratefully",
    "dreamed wistfully",
];

const NATURAL_FEATURES: &[&str] = &[
    "cascading waterfall",
    "crystal-clear river",
    "ancient oak tree",
    "sheer cliff face",
    "sunny clearing",
    "hidden cave",
    "eagle's nest",
    "beaver dam",
    "berry patch",
    "animal trail",
    "rock formation",
    "natural spring",
    "wildflower field",
    "fallen giant sequoia",
    "owl's perch",
    "deer crossing",
];

const SPECIFIC_MOMENTS: &[&str] = &[
    "that breathtaking sunset over the mountains",
    "the unexpected eagle sighting",
    "the sudden summer storm passing through",
    "discovering the hidden animal path",
    "witnessing the birth of a fawn",
    "the meteor shower in the clear night sky",
    "finding the abandoned bird's nest",
    "the encounter with the curious fox",
    "the morning when frost painted everything silver",
    "the autumn colors explosion",
    "the silent snowfall blanketing the forest",
    "the first spring buds appearing",
];

const ENVIRONMENTS: &[&str] = &[
    "deep forest",
    "snow-capped mountains",
    "peaceful valley",
    "untamed wilderness",
    "national park",
    "protected reserve",
    "remote backcountry",
    "ancient woodland",
    "coastal rainforest",
    "alpine meadow",
    "river delta",
    "canyon lands",
    "old growth ecosystem",
    "biodiversity hotspot",
    "conservation area",
];

const EMOTIONAL_DETAILS: &[&str] = &[
    "feeling completely at peace with the world",
    "overwhelmed by nature's raw beauty",
    "connected to something greater than myself",
    "humbled by the ancient trees",
    "filled with childlike wonder and excitement",
    "completely present in the moment",
    "washed clean of all urban stress and worries",
    "reconnected with my primal self",
    "inspired by the resilience of nature",
    "grateful for this moment of solitude",
    "awestruck by the intricate web of life",
    "rejuvenated in mind, body, and spirit",
];

const MEMORY_DETAILS: &[&str] = &[
    "watching the stars gradually appear in the twilight sky",
    "listening to the owls begin their nocturnal conversations",
    "feeling the cool evening breeze whisper through the trees",
    "smelling the wood smoke from my campfire mixing with pine",
    "tasting the fresh wild berries I had gathered earlier",
    "hearing the distant howl of a lone wolf echoing through the valley",
    "witnessing the dance of fireflies creating living constellations",
    "feeling the first drops of rain on my outstretched hand",
    "watching the moon rise over the silhouette of distant peaks",
    "hearing the crackle of frost underfoot in the morning stillness",
];
