//! What the key grid shows while the keypad is awake.

use app_core::{keys, Color, Delay, LedSink};
use rand::Rng;
use storage::Registry;

pub const FLASH_MS: u64 = 30;
pub const FAILURE_MS: u64 = 500;

/// Keys that can carry macros, in grid order.
pub const FUNCTION_KEYS: [u8; 12] = [1, 2, 3, 5, 6, 7, 9, 10, 11, 13, 14, 15];

pub const DIE_ROLLS: u64 = 20;

/// Colour of a navigation key while `current` is selected.
pub fn nav_indicator(registry: &Registry, current: usize, key: u8) -> Color {
    match keys::nav_layer(key) {
        Some(layer) if layer == current => Color::SELECTED_LAYER,
        Some(layer) if layer < registry.layer_count() => Color::UNSELECTED_LAYER,
        _ => Color::OFF,
    }
}

/// Resting colour of `key` on `layer`.
pub fn idle_color(registry: &Registry, layer: usize, key: u8) -> Color {
    if keys::is_nav_key(key) {
        nav_indicator(registry, layer, key)
    } else {
        registry
            .get_action(layer, key)
            .map_or(Color::OFF, |action| action.color)
    }
}

/// Paints the whole grid for `layer`: macro colours plus navigation indicators.
pub fn render_layer(registry: &Registry, layer: usize, leds: &mut dyn LedSink) {
    for key in keys::all() {
        leds.set_color(key, idle_color(registry, layer, key));
    }
}

/// White, off, white, off.
pub fn flash_confirm(key: u8, leds: &mut dyn LedSink, delay: &mut dyn Delay) {
    for color in [Color::WHITE, Color::OFF, Color::WHITE] {
        leds.set_color(key, color);
        delay.delay_ms(FLASH_MS);
    }
    leds.set_color(key, Color::OFF);
}

pub fn flash_failure(key: u8, leds: &mut dyn LedSink, delay: &mut dyn Delay) {
    leds.set_color(key, Color::RED);
    delay.delay_ms(FAILURE_MS);
}

/// Keys lit for each face of a six-sided die.
pub fn die_pips(face: u8) -> &'static [u8] {
    match face {
        1 => &[6],
        2 => &[2, 10],
        3 => &[9, 6, 3],
        4 => &[1, 3, 9, 11],
        5 => &[1, 3, 9, 11, 6],
        6 => &[1, 3, 5, 7, 9, 11],
        _ => &[],
    }
}

pub fn show_die(face: u8, leds: &mut dyn LedSink) {
    for key in FUNCTION_KEYS {
        leds.set_color(key, Color::OFF);
    }
    for &key in die_pips(face) {
        leds.set_color(key, Color::WHITE);
    }
}

/// Tumbles through faces, slowing down, and returns the one it lands on.
/// Consecutive faces always differ.
pub fn roll_die(rng: &mut impl Rng, leds: &mut dyn LedSink, delay: &mut dyn Delay) -> u8 {
    let mut face = 0;
    for count in 0..DIE_ROLLS {
        let mut next = rng.gen_range(1..=6);
        while next == face {
            next = rng.gen_range(1..=6);
        }
        face = next;
        show_die(face, leds);
        delay.delay_ms(50 + 10 * count);
    }
    face
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Grid([Color; 16]);

    impl LedSink for Grid {
        fn set_color(&mut self, key: u8, color: Color) {
            self.0[usize::from(key)] = color;
        }
    }

    #[derive(Default)]
    struct Waits(Vec<u64>);

    impl Delay for Waits {
        fn delay_ms(&mut self, ms: u64) {
            self.0.push(ms);
        }
    }

    fn registry(layers: usize) -> Registry {
        let layers: Vec<String> = (0..layers)
            .map(|i| {
                format!(r#"{{ "keys": {{ "{}": {{ "type": "text", "value": "x", "color": "1,2,3" }} }} }}"#, i + 1)
            })
            .collect();
        Registry::from_json_str(&format!(r#"{{ "layers": [{}] }}"#, layers.join(","))).unwrap()
    }

    #[test]
    fn indicators_follow_layer_count() {
        let reg = registry(2);
        assert_eq!(nav_indicator(&reg, 1, 4), Color::SELECTED_LAYER);
        assert_eq!(nav_indicator(&reg, 1, 0), Color::UNSELECTED_LAYER);
        assert_eq!(nav_indicator(&reg, 1, 8), Color::OFF);
        assert_eq!(nav_indicator(&reg, 1, 12), Color::OFF);
    }

    #[test]
    fn render_shows_macros_and_one_selected_indicator() {
        let reg = registry(3);
        let mut grid = Grid([Color::WHITE; 16]);
        render_layer(&reg, 2, &mut grid);

        assert_eq!(grid.0[3], Color::new(1, 2, 3));
        assert_eq!(grid.0[1], Color::OFF);
        let selected = grid.0.iter().filter(|c| **c == Color::SELECTED_LAYER).count();
        assert_eq!(selected, 1);
        assert_eq!(grid.0[8], Color::SELECTED_LAYER);
    }

    #[test]
    fn confirm_flash_timing() {
        let mut grid = Grid::default();
        let mut waits = Waits::default();
        flash_confirm(5, &mut grid, &mut waits);
        assert_eq!(waits.0, [30, 30, 30]);
        assert_eq!(grid.0[5], Color::OFF);
    }

    #[test]
    fn die_roll_changes_face_every_time_and_slows_down() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut grid = Grid::default();
        let mut waits = Waits::default();
        let face = roll_die(&mut rng, &mut grid, &mut waits);

        assert!((1..=6).contains(&face));
        assert_eq!(waits.0.len(), 20);
        assert_eq!(waits.0[0], 50);
        assert_eq!(waits.0[19], 240);

        let lit: Vec<u8> = keys::all()
            .filter(|k| grid.0[usize::from(*k)] == Color::WHITE)
            .collect();
        let mut pips = die_pips(face).to_vec();
        pips.sort_unstable();
        assert_eq!(lit, pips);
    }

    #[test]
    fn pips_never_touch_navigation_keys() {
        for face in 1..=6 {
            assert_eq!(die_pips(face).len(), usize::from(face));
            assert!(die_pips(face).iter().all(|k| !keys::is_nav_key(*k)));
        }
    }
}
