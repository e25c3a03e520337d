//! Hover, tilt, and click handling for the settled card ensemble.

use glam::Vec2;

use crate::anim::Spring;
use crate::cards::{Card, CARD_COUNT};
use crate::choreo::SLOTS;

/// Card body dimensions in logical pixels.
pub const CARD_W: f32 = 155.0;
pub const CARD_H: f32 = 180.0;

/// Which card's front face fades when a given card is hovered — a fixed
/// pairing that sells the overlapping-cards illusion. Left/center cards
/// open rightward over their neighbor; right-column cards open leftward.
pub const OCCLUSION: [usize; CARD_COUNT] = [1, 2, 1, 4, 5, 4];

/// Side the detail panel opens on, chosen so it never spills outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSide {
    Left,
    Right,
}

/// Right-column cards open left; everything else opens right.
pub fn panel_side(index: usize) -> PanelSide {
    if SLOTS[index].x > 0.0 {
        PanelSide::Left
    } else {
        PanelSide::Right
    }
}

/// Exclusive hover record — at most one card at a time, newest wins.
pub struct HoverState {
    hovered: Option<usize>,
}

impl HoverState {
    pub fn new() -> Self {
        Self { hovered: None }
    }

    pub fn set(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// The neighbor whose front face hides while the hover lasts.
    pub fn occluded(&self) -> Option<usize> {
        self.hovered.map(|i| OCCLUSION[i])
    }

    /// The shared flag the trail simulator reads.
    pub fn suppress_trail(&self) -> bool {
        self.hovered.is_some()
    }
}

/// Card index under the pointer, if any. `center` is the ensemble center
/// in surface coordinates; `parallax` the current tilt shift.
pub fn hit_test(center: Vec2, parallax: Vec2, pointer: Vec2) -> Option<usize> {
    for (i, slot) in SLOTS.iter().enumerate() {
        let card_center = center + *slot + parallax;
        let d = pointer - card_center;
        if d.x.abs() <= CARD_W * 0.5 && d.y.abs() <= CARD_H * 0.5 {
            return Some(i);
        }
    }
    None
}

/// Pointer range (px from center) mapped onto the full tilt swing.
const TILT_RANGE: f32 = 250.0;
/// Maximum ensemble tilt in degrees.
const TILT_MAX_DEG: f32 = 3.0;
/// Pixels of card shift per degree of tilt.
const PARALLAX_PER_DEG: f32 = 2.5;

/// Spring-smoothed ensemble tilt driven by pointer position.
pub struct Tilt {
    x: Spring,
    y: Spring,
}

impl Tilt {
    pub fn new() -> Self {
        Self {
            x: Spring::new(60.0, 20.0),
            y: Spring::new(60.0, 20.0),
        }
    }

    /// `offset` is the pointer position relative to the ensemble center;
    /// None (pointer gone) relaxes back to level.
    pub fn step(&mut self, offset: Option<Vec2>, dt: f32) {
        let target = match offset {
            Some(o) => Vec2::new(
                (-o.y / TILT_RANGE).clamp(-1.0, 1.0) * TILT_MAX_DEG,
                (o.x / TILT_RANGE).clamp(-1.0, 1.0) * TILT_MAX_DEG,
            ),
            None => Vec2::ZERO,
        };
        self.x.step(target.x, dt);
        self.y.step(target.y, dt);
    }

    /// Small uniform shift applied to card positions.
    pub fn parallax(&self) -> Vec2 {
        Vec2::new(self.y.value, -self.x.value) * PARALLAX_PER_DEG
    }
}

/// Emitted when a card (or its panel's call-to-action) is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub link: String,
}

/// A click on the hovered card navigates to its link.
pub fn click(hover: &HoverState, cards: &[Card]) -> Option<Navigation> {
    let index = hover.hovered()?;
    let card = cards.get(index)?;
    Some(Navigation {
        link: card.link.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;

    #[test]
    fn hover_is_exclusive_and_newest_wins() {
        let mut h = HoverState::new();
        assert_eq!(h.hovered(), None);
        h.set(Some(2));
        assert_eq!(h.hovered(), Some(2));
        h.set(Some(4));
        assert_eq!(h.hovered(), Some(4));
        h.set(None);
        assert_eq!(h.hovered(), None);
        assert!(!h.suppress_trail());
    }

    #[test]
    fn every_card_occludes_exactly_one_neighbor() {
        for (i, &j) in OCCLUSION.iter().enumerate() {
            assert_ne!(i, j);
            assert!(j < CARD_COUNT);
        }
    }

    #[test]
    fn panel_opens_toward_the_ensemble_center() {
        assert_eq!(panel_side(0), PanelSide::Right);
        assert_eq!(panel_side(1), PanelSide::Right);
        assert_eq!(panel_side(2), PanelSide::Left);
        assert_eq!(panel_side(3), PanelSide::Right);
        assert_eq!(panel_side(5), PanelSide::Left);
    }

    #[test]
    fn hit_test_finds_cards_and_misses_gaps() {
        let center = Vec2::new(640.0, 360.0);
        // Dead center of card 4 (slot (0, 110)).
        assert_eq!(
            hit_test(center, Vec2::ZERO, center + Vec2::new(0.0, 110.0)),
            Some(4)
        );
        // Just outside card 4's right edge.
        assert_eq!(
            hit_test(
                center,
                Vec2::ZERO,
                center + Vec2::new(CARD_W * 0.5 + 1.0, 110.0)
            ),
            None
        );
        // Ensemble center is between the rows.
        assert_eq!(hit_test(center, Vec2::ZERO, center), None);
    }

    #[test]
    fn hit_test_follows_parallax() {
        let center = Vec2::new(640.0, 360.0);
        let parallax = Vec2::new(40.0, 0.0);
        let pointer = center + Vec2::new(0.0, 110.0);
        // Shifted card no longer sits under the unshifted center point
        // at its left edge region, but the shifted center does hit.
        assert_eq!(hit_test(center, parallax, pointer + parallax), Some(4));
    }

    #[test]
    fn tilt_is_bounded_and_relaxes_to_level() {
        let mut tilt = Tilt::new();
        for _ in 0..300 {
            tilt.step(Some(Vec2::new(10_000.0, -10_000.0)), 1.0 / 60.0);
        }
        let p = tilt.parallax();
        assert!(p.length() <= TILT_MAX_DEG * PARALLAX_PER_DEG * 2.0);

        for _ in 0..600 {
            tilt.step(None, 1.0 / 60.0);
        }
        assert!(tilt.parallax().length() < 0.05);
    }

    #[test]
    fn click_routes_to_the_hovered_card_link() {
        let cards = cards::resolve(None);
        let mut h = HoverState::new();
        assert!(click(&h, &cards).is_none());
        h.set(Some(3));
        let nav = click(&h, &cards).unwrap();
        assert_eq!(nav.link, "/courses/backend-dev");
    }
}
