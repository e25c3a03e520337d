//! Card descriptors — the one piece of external configuration. A JSON file
//! may supply them; anything short of six valid entries falls back to the
//! built-in set, never a partial mix.

use std::path::Path;

use serde::Deserialize;

use crate::anim::Rgb;

/// Number of cards in the ensemble. Slots, launch paths and the occlusion
/// map are all sized to this.
pub const CARD_COUNT: usize = 6;

/// Icon glyph drawn procedurally by the sprite shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Code,
    Palette,
    Chart,
    Chip,
    Rocket,
    Bolt,
}

impl Icon {
    /// Shader frame index for this glyph.
    pub fn frame(self) -> u32 {
        match self {
            Icon::Code => 5,
            Icon::Palette => 6,
            Icon::Chart => 7,
            Icon::Chip => 8,
            Icon::Rocket => 9,
            Icon::Bolt => 10,
        }
    }

    /// Unknown names map to Code, matching the fallback-friendly contract.
    fn from_name(name: &str) -> Self {
        match name {
            "palette" => Icon::Palette,
            "chart" => Icon::Chart,
            "chip" => Icon::Chip,
            "rocket" => Icon::Rocket,
            "bolt" => Icon::Bolt,
            _ => Icon::Code,
        }
    }
}

/// Raw descriptor as supplied by the card file.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDescriptor {
    #[serde(default)]
    pub icon: String,
    pub label: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub accent: String,
    pub link: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub population: String,
}

/// A resolved card ready for layout and rendering.
#[derive(Debug, Clone)]
pub struct Card {
    pub icon: Icon,
    pub label: String,
    pub subtitle: String,
    pub accent: Rgb,
    pub link: String,
    pub detail: String,
    pub duration: String,
    pub population: String,
}

const DEFAULT_ACCENT: Rgb = [137.0, 180.0, 250.0];

/// Parse "#rrggbb" into channels. Anything else gets the default accent.
fn parse_accent(s: &str) -> Rgb {
    let hex = s.trim().strip_prefix('#').unwrap_or("");
    if hex.len() != 6 {
        return DEFAULT_ACCENT;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => [r as f32, g as f32, b as f32],
        _ => DEFAULT_ACCENT,
    }
}

impl Card {
    fn from_descriptor(d: &CardDescriptor) -> Self {
        Self {
            icon: Icon::from_name(&d.icon),
            label: d.label.clone(),
            subtitle: d.subtitle.clone(),
            accent: parse_accent(&d.accent),
            link: d.link.clone(),
            detail: d.detail.clone(),
            duration: d.duration.clone(),
            population: d.population.clone(),
        }
    }
}

struct FallbackCard {
    icon: Icon,
    label: &'static str,
    subtitle: &'static str,
    accent: Rgb,
    link: &'static str,
    detail: &'static str,
    duration: &'static str,
    population: &'static str,
}

/// Built-in ensemble used whenever the supplied list is absent or short.
const FALLBACK: [FallbackCard; CARD_COUNT] = [
    FallbackCard {
        icon: Icon::Code,
        label: "Frontend",
        subtitle: "React · TypeScript",
        accent: [137.0, 180.0, 250.0],
        link: "/courses/web-dev",
        detail: "Modern web development with React and TypeScript, from components to production builds.",
        duration: "6 months",
        population: "120+",
    },
    FallbackCard {
        icon: Icon::Palette,
        label: "Design",
        subtitle: "UI · UX",
        accent: [249.0, 226.0, 175.0],
        link: "/courses/design",
        detail: "User-centered interface design in Figma — research, wireframes, and polished handoff.",
        duration: "4 months",
        population: "85+",
    },
    FallbackCard {
        icon: Icon::Chart,
        label: "IT PM",
        subtitle: "Agile · Scrum",
        accent: [166.0, 227.0, 161.0],
        link: "/courses/it-pm",
        detail: "Become an IT project manager — Agile, Scrum, and leading delivery teams.",
        duration: "3 months",
        population: "60+",
    },
    FallbackCard {
        icon: Icon::Chip,
        label: "Backend",
        subtitle: "Node · Database",
        accent: [243.0, 139.0, 168.0],
        link: "/courses/backend-dev",
        detail: "Server-side programming with Node.js and relational databases.",
        duration: "6 months",
        population: "95+",
    },
    FallbackCard {
        icon: Icon::Rocket,
        label: "DevOps",
        subtitle: "CI · CD",
        accent: [203.0, 166.0, 247.0],
        link: "/courses/devops",
        detail: "Docker, CI/CD pipelines, and cloud infrastructure from first deploy to on-call.",
        duration: "5 months",
        population: "45+",
    },
    FallbackCard {
        icon: Icon::Bolt,
        label: "AI / ML",
        subtitle: "Python · ML",
        accent: [245.0, 224.0, 220.0],
        link: "/courses/ai-ml",
        detail: "Machine learning in Python with TensorFlow and PyTorch, data to deployed model.",
        duration: "6 months",
        population: "70+",
    },
];

fn fallback_cards() -> Vec<Card> {
    FALLBACK
        .iter()
        .map(|f| Card {
            icon: f.icon,
            label: f.label.to_string(),
            subtitle: f.subtitle.to_string(),
            accent: f.accent,
            link: f.link.to_string(),
            detail: f.detail.to_string(),
            duration: f.duration.to_string(),
            population: f.population.to_string(),
        })
        .collect()
}

/// Resolve supplied descriptors into exactly CARD_COUNT cards.
/// Fewer than CARD_COUNT supplied means the whole fallback set — the
/// ensemble is never a mix of supplied and built-in entries.
pub fn resolve(supplied: Option<&[CardDescriptor]>) -> Vec<Card> {
    match supplied {
        Some(list) if list.len() >= CARD_COUNT => list
            .iter()
            .take(CARD_COUNT)
            .map(Card::from_descriptor)
            .collect(),
        Some(list) => {
            if !list.is_empty() {
                log::warn!(
                    "card file supplied {} descriptors, need {}; using built-in set",
                    list.len(),
                    CARD_COUNT
                );
            }
            fallback_cards()
        }
        None => fallback_cards(),
    }
}

fn load_descriptors(path: &Path) -> Result<Vec<CardDescriptor>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load cards from an optional file path, falling back on any failure.
pub fn load(path: Option<&Path>) -> Vec<Card> {
    let Some(path) = path else {
        return resolve(None);
    };
    match load_descriptors(path) {
        Ok(list) => {
            log::info!("loaded {} card descriptors from {}", list.len(), path.display());
            resolve(Some(&list))
        }
        Err(e) => {
            log::warn!("card file {} unusable ({e}); using built-in set", path.display());
            resolve(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(label: &str) -> CardDescriptor {
        CardDescriptor {
            icon: "rocket".into(),
            label: label.into(),
            subtitle: "sub".into(),
            accent: "#112233".into(),
            link: format!("/courses/{label}"),
            detail: "detail".into(),
            duration: "2 months".into(),
            population: "10+".into(),
        }
    }

    #[test]
    fn empty_and_short_lists_use_full_fallback() {
        for n in [0usize, 1, 5] {
            let supplied: Vec<CardDescriptor> = (0..n).map(|i| descriptor(&format!("c{i}"))).collect();
            let cards = resolve(Some(&supplied));
            assert_eq!(cards.len(), CARD_COUNT);
            assert_eq!(cards[0].label, "Frontend");
            assert_eq!(cards[5].label, "AI / ML");
        }
    }

    #[test]
    fn six_supplied_are_used_verbatim() {
        let supplied: Vec<CardDescriptor> = (0..6).map(|i| descriptor(&format!("c{i}"))).collect();
        let cards = resolve(Some(&supplied));
        assert_eq!(cards.len(), CARD_COUNT);
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card.label, format!("c{i}"));
            assert_eq!(card.accent, [0x11 as f32, 0x22 as f32, 0x33 as f32]);
            assert_eq!(card.icon, Icon::Rocket);
        }
    }

    #[test]
    fn more_than_six_truncates() {
        let supplied: Vec<CardDescriptor> = (0..9).map(|i| descriptor(&format!("c{i}"))).collect();
        let cards = resolve(Some(&supplied));
        assert_eq!(cards.len(), CARD_COUNT);
        assert_eq!(cards[5].label, "c5");
    }

    #[test]
    fn bad_accent_gets_default() {
        assert_eq!(parse_accent("not-a-color"), DEFAULT_ACCENT);
        assert_eq!(parse_accent("#12"), DEFAULT_ACCENT);
        assert_eq!(parse_accent("#a6e3a1"), [0xa6 as f32, 0xe3 as f32, 0xa1 as f32]);
    }

    #[test]
    fn unknown_icon_maps_to_code() {
        assert_eq!(Icon::from_name("sparkles"), Icon::Code);
        assert_eq!(Icon::from_name("bolt"), Icon::Bolt);
    }

    #[test]
    fn missing_file_falls_back() {
        let cards = load(Some(Path::new("/definitely/not/here.json")));
        assert_eq!(cards.len(), CARD_COUNT);
        assert_eq!(cards[0].label, "Frontend");
    }
}
