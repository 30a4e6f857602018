//! Valence and emotion word tables.
//!
//! One canonical lexicon, versioned by [`LEXICON_VERSION`]. Extend the sets
//! for genre tuning and bump the version so reports stay comparable.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const LEXICON_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Emotion categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Trust,
    Disgust,
    Surprise,
    Anticipation,
}

impl Emotion {
    pub const COUNT: usize = 8;

    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Trust,
        Emotion::Disgust,
        Emotion::Surprise,
        Emotion::Anticipation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Trust => "trust",
            Emotion::Disgust => "disgust",
            Emotion::Surprise => "surprise",
            Emotion::Anticipation => "anticipation",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    /// The word set for this category.
    pub fn words(self) -> &'static HashSet<&'static str> {
        &EMOTION_WORDS[self.slot()]
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category counts. Every category is always present, zero included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmotionCounts([u32; Emotion::COUNT]);

impl EmotionCounts {
    pub fn get(&self, emotion: Emotion) -> u32 {
        self.0[emotion.slot()]
    }

    pub fn add(&mut self, emotion: Emotion, n: u32) {
        self.0[emotion.slot()] += n;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, u32)> + '_ {
        Emotion::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl Serialize for EmotionCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Emotion::COUNT))?;
        for (emotion, count) in self.iter() {
            map.serialize_entry(emotion.as_str(), &count)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Word sets
// ---------------------------------------------------------------------------

pub static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "joy", "love", "glad", "hope", "delight", "cheer", "smile", "trust", "safe", "calm",
        "relief", "brave", "confident", "win", "happy", "pleased", "laugh", "grin", "joyful",
    ]
    .into_iter()
    .collect()
});

pub static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "sad", "angry", "anger", "fear", "afraid", "terror", "panic", "hurt", "bleed", "pain",
        "cry", "fail", "lose", "danger", "threat", "sorrow", "gloom", "mourn", "tears", "grief",
        "lonely",
    ]
    .into_iter()
    .collect()
});

static EMOTION_WORDS: Lazy<[HashSet<&'static str>; Emotion::COUNT]> = Lazy::new(|| {
    let set = |words: &[&'static str]| words.iter().copied().collect::<HashSet<_>>();
    [
        set(&["joy", "delight", "happy", "glad", "smile", "cheer", "pleased", "laugh", "grin"]),
        set(&["sad", "sorrow", "gloom", "mourn", "cry", "tears", "grief", "lonely"]),
        set(&["anger", "angry", "rage", "fury", "irritate", "annoyed", "hate", "jealous"]),
        set(&["fear", "afraid", "scare", "terror", "panic", "anxiety", "dread", "threat"]),
        set(&["trust", "safe", "secure", "faith", "reliance", "certain"]),
        set(&["disgust", "gross", "nausea", "repulse", "vile", "filthy", "revolt"]),
        set(&["surprise", "shock", "startle", "astonish", "sudden", "unexpected"]),
        set(&["anticipate", "eager", "expect", "await", "hope", "yearn", "ready"]),
    ]
});
