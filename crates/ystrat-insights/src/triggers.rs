//! Static psychological trigger registry.
//!
//! One block per tone: the trigger ids recorded in strategy metadata, the
//! lever instructions rendered into prompts, the scoring lexicons used by
//! the emotion optimizer, and the fallback title patterns.

use ystrat_models::Tone;

/// A single psychological lever the generation model is asked to apply.
#[derive(Debug, Clone, Copy)]
pub struct TriggerBlock {
    pub id: &'static str,
    pub instruction: &'static str,
}

/// Trigger blocks for a tone, in prompt order.
pub fn trigger_blocks(tone: Tone) -> &'static [TriggerBlock] {
    match tone {
        Tone::Curiosity => &[
            TriggerBlock {
                id: "open_loop",
                instruction: "Open a loop the viewer must click to close: pose a question the title does not answer.",
            },
            TriggerBlock {
                id: "secret_reveal",
                instruction: "Frame the content as revealing something hidden or rarely discussed.",
            },
            TriggerBlock {
                id: "pattern_interrupt",
                instruction: "Contradict a common assumption the audience holds.",
            },
        ],
        Tone::Authority => &[
            TriggerBlock {
                id: "credential",
                instruction: "Signal expertise: years of experience, credentials, or a track record.",
            },
            TriggerBlock {
                id: "numbers_proof",
                instruction: "Use concrete numbers and measurable results in titles.",
            },
            TriggerBlock {
                id: "research_backed",
                instruction: "Reference research, testing, or proven methods.",
            },
        ],
        Tone::Fear => &[
            TriggerBlock {
                id: "loss_aversion",
                instruction: "Emphasize what the viewer stands to lose by not watching.",
            },
            TriggerBlock {
                id: "mistake_warning",
                instruction: "Warn about a common costly mistake and how to avoid it.",
            },
            TriggerBlock {
                id: "urgency",
                instruction: "Make the risk feel current, not hypothetical.",
            },
        ],
        Tone::Persuasive => &[
            TriggerBlock {
                id: "social_proof",
                instruction: "Invoke the crowd: what thousands of others are already doing.",
            },
            TriggerBlock {
                id: "transformation",
                instruction: "Promise a concrete before/after transformation.",
            },
            TriggerBlock {
                id: "exclusivity",
                instruction: "Position the content as exclusive or hard to find elsewhere.",
            },
        ],
        Tone::Engaging => &[
            TriggerBlock {
                id: "companionship",
                instruction: "Invite the viewer along: use inclusive, first-person-plural framing.",
            },
            TriggerBlock {
                id: "relatability",
                instruction: "Anchor on an experience the audience recognizes from their own life.",
            },
            TriggerBlock {
                id: "enthusiasm",
                instruction: "Keep the energy high and the language vivid without overpromising.",
            },
        ],
    }
}

/// Ids of the triggers applied for a tone, in registry order.
pub fn trigger_ids(tone: Tone) -> Vec<String> {
    trigger_blocks(tone).iter().map(|b| b.id.to_string()).collect()
}

/// Tone-specific scoring lexicon. Lowercase words; a title scores once per
/// hit.
pub fn tone_lexicon(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Curiosity => &[
            "secret", "hidden", "truth", "revealed", "surprising", "nobody", "discover",
            "mystery", "unknown",
        ],
        Tone::Authority => &[
            "expert", "proven", "professional", "complete", "guide", "masterclass", "research",
            "certified", "advanced",
        ],
        Tone::Fear => &[
            "mistake", "avoid", "warning", "danger", "stop", "wrong", "worst", "ruin", "risk",
        ],
        Tone::Persuasive => &[
            "best", "ultimate", "transform", "guaranteed", "exclusive", "results", "join",
            "instant", "limited",
        ],
        Tone::Engaging => &[
            "amazing", "fun", "together", "journey", "awesome", "incredible", "love", "explore",
            "build",
        ],
    }
}

/// Tone-independent power words.
pub const POWER_WORDS: &[&str] = &[
    "free", "new", "now", "easy", "fast", "simple", "powerful", "essential",
];

/// Phrases that flag a title as low-quality clickbait.
pub const BANNED_PHRASES: &[&str] = &[
    "(not clickbait)",
    "gone wrong",
    "100% working",
    "click here",
    "you won't believe",
];

/// Title patterns for the deterministic fallback set. `{kw}` is replaced
/// with a mined keyword, `{goal}` with the brief goal.
pub fn fallback_title_patterns(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Curiosity => &[
            "The Secret Behind {kw} Nobody Talks About",
            "What I Discovered When I Tried {kw}",
            "The Hidden Truth About {kw} Explained",
            "Why {kw} Works Differently Than You Think",
            "The Surprising Side of {kw} Revealed",
        ],
        Tone::Authority => &[
            "The Complete Expert Guide to {kw}",
            "Proven {kw} Strategies That Actually Work",
            "Master {kw}: A Professional Walkthrough",
            "{kw} Explained by Numbers and Results",
            "The Research-Backed Approach to {kw}",
        ],
        Tone::Fear => &[
            "The {kw} Mistake That Ruins Most Channels",
            "Avoid These {kw} Errors Before It's Too Late",
            "Warning Signs Your {kw} Plan Is Failing",
            "The Costly Truth About Ignoring {kw}",
            "Stop Doing {kw} Wrong: A Damage Report",
        ],
        Tone::Persuasive => &[
            "The Ultimate {kw} System for Real Results",
            "Transform Your Channel with {kw} Today",
            "Join Thousands Already Winning at {kw}",
            "The Best {kw} Playbook You Will Find",
            "Guaranteed Progress: {kw} Step by Step",
        ],
        Tone::Engaging => &[
            "Let's Explore {kw} Together from Scratch",
            "Building with {kw}: An Honest Journey",
            "The Fun Way to Finally Understand {kw}",
            "Come Along as We Master {kw} Live",
            "An Amazing {kw} Project Anyone Can Follow",
        ],
    }
}
