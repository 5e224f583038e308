use engine::{RenderSurface, Rgba, TextAlign, TextStyle, Texture};

use super::session::GameState;
use super::IntroTiming;

const BLACK: Rgba = [0x00, 0x00, 0x00, 0xFF];
const WHITE: Rgba = [0xFF, 0xFF, 0xFF, 0xFF];
const TEXTBOX_FILL: Rgba = [0x5A, 0x5A, 0x5A, 0xFF];
const TEXTBOX_OUTER_BORDER: Rgba = [0x4A, 0x4A, 0x4A, 0xFF];
const TEXTBOX_INNER_BORDER: Rgba = [0x3C, 0x3C, 0x3C, 0xFF];
const SKIP_HINT_COLOR: Rgba = [0x5A, 0x5A, 0x5A, 0xFF];

pub(crate) const SKIP_HINT: &str = "Press ENTER to skip";
pub(crate) const CONTINUE_PROMPT: &str = "press [ENTER] to continue";

const SKIP_HINT_INSET: i32 = 25;
const TEXTBOX_MESSAGE_OFFSET: (i32, i32) = (30, 30);
const TEXTBOX_PROMPT_Y: i32 = 60;

/// Logo opacity for a given intro frame: ramps up over `fade_frames` starting
/// after `fade_in_start`, holds, then ramps back down from `fade_out_start`.
pub(crate) fn intro_opacity(frame: u32, timing: &IntroTiming) -> f32 {
    let fade_frames = timing.fade_frames.max(1);
    let faded_in = frame.saturating_sub(timing.fade_in_start).min(fade_frames);
    let faded_out = frame.saturating_sub(timing.fade_out_start).min(fade_frames);
    ((faded_in as f32 - faded_out as f32) / fade_frames as f32).clamp(0.0, 1.0)
}

pub(crate) fn outcome_message(state: GameState) -> Option<&'static str> {
    match state {
        GameState::RoomCleared => Some("congratulations. pubie have collected an MOLECULE"),
        GameState::PlayerLost => Some("pubie have lose"),
        GameState::RivalStole => Some("lugie have stolen your molecule"),
        GameState::Escaped => Some("pubie got out , and wonned against lugie you win"),
        GameState::Intro | GameState::Play => None,
    }
}

pub(crate) fn draw_intro(surface: &mut dyn RenderSurface, logo: &Texture, opacity: f32) {
    let (width, height) = surface.size();
    surface.fill_rect(0, 0, width as i32, height as i32, BLACK);

    let logo_x = (width as f32 / 2.0 - logo.width() as f32 / 2.0).floor();
    let logo_y = (height as f32 / 2.0 - logo.height() as f32 / 2.0).floor();
    surface.draw_texture(logo, logo_x, logo_y, opacity);

    surface.draw_text(
        SKIP_HINT,
        SKIP_HINT_INSET,
        height as i32 - SKIP_HINT_INSET,
        TextStyle {
            color: SKIP_HINT_COLOR,
            ..TextStyle::default()
        },
    );
}

/// A box half the surface wide and an eighth of it tall, centred, holding
/// `message` and the continue prompt.
pub(crate) fn draw_textbox(surface: &mut dyn RenderSurface, message: &str) {
    let (width, height) = surface.size();
    let box_width = width as i32 / 2;
    let box_height = width as i32 / 8;
    let left = width as i32 / 2 - box_width / 2;
    let top = height as i32 / 2 - box_height / 2;

    surface.fill_rect(left, top, box_width, box_height, TEXTBOX_FILL);
    surface.stroke_rect(left, top, box_width, box_height, 4, TEXTBOX_OUTER_BORDER);
    surface.stroke_rect(left, top, box_width, box_height, 3, TEXTBOX_INNER_BORDER);

    let small = TextStyle {
        scale: 1,
        color: WHITE,
        align: TextAlign::Left,
    };
    surface.draw_text(
        message,
        left + TEXTBOX_MESSAGE_OFFSET.0,
        top + TEXTBOX_MESSAGE_OFFSET.1,
        small,
    );
    surface.draw_text(
        CONTINUE_PROMPT,
        left + box_width / 2,
        top + TEXTBOX_PROMPT_Y,
        TextStyle {
            align: TextAlign::Center,
            ..small
        },
    );
}

#[cfg(test)]
mod tests {
    use engine::Canvas;

    use super::*;

    #[test]
    fn intro_fades_in_holds_and_fades_out() {
        let timing = IntroTiming::default();
        assert_eq!(intro_opacity(0, &timing), 0.0);
        assert_eq!(intro_opacity(1, &timing), 0.0);
        assert!((intro_opacity(2, &timing) - 1.0 / 15.0).abs() < 1e-6);
        assert!((intro_opacity(8, &timing) - 7.0 / 15.0).abs() < 1e-6);
        assert_eq!(intro_opacity(16, &timing), 1.0);
        assert_eq!(intro_opacity(46, &timing), 1.0);
        assert!((intro_opacity(47, &timing) - 14.0 / 15.0).abs() < 1e-6);
        assert_eq!(intro_opacity(61, &timing), 0.0);
        assert_eq!(intro_opacity(75, &timing), 0.0);
    }

    #[test]
    fn intro_opacity_never_increases_after_hold() {
        let timing = IntroTiming::default();
        let mut previous = intro_opacity(16, &timing);
        for frame in 17..=80 {
            let current = intro_opacity(frame, &timing);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn only_outcome_states_have_messages() {
        assert!(outcome_message(GameState::Intro).is_none());
        assert!(outcome_message(GameState::Play).is_none());
        for state in [
            GameState::RoomCleared,
            GameState::PlayerLost,
            GameState::RivalStole,
            GameState::Escaped,
        ] {
            assert!(outcome_message(state).is_some());
        }
    }

    #[test]
    fn textbox_is_centred_with_two_tone_border() {
        let mut canvas = Canvas::new(640, 480, [0xC0, 0xC0, 0xC0, 0xFF]);
        draw_textbox(&mut canvas, "hi");

        // Box spans x 160..480, y 200..280.
        assert_eq!(canvas.pixel(159, 240), Some([0xC0, 0xC0, 0xC0, 0xFF]));
        assert_eq!(canvas.pixel(160, 240), Some(TEXTBOX_INNER_BORDER));
        assert_eq!(canvas.pixel(163, 240), Some(TEXTBOX_OUTER_BORDER));
        assert_eq!(canvas.pixel(170, 240), Some(TEXTBOX_FILL));
        assert_eq!(canvas.pixel(479, 279), Some(TEXTBOX_INNER_BORDER));
        assert_eq!(canvas.pixel(480, 280), Some([0xC0, 0xC0, 0xC0, 0xFF]));
    }

    #[test]
    fn intro_blacks_out_surface_and_draws_logo_at_centre() {
        let logo = Texture::solid("logo", 10, 10, [0xFF, 0x00, 0x00, 0xFF]);
        let mut canvas = Canvas::new(640, 480, [0xC0, 0xC0, 0xC0, 0xFF]);

        draw_intro(&mut canvas, &logo, 1.0);
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
        assert_eq!(canvas.pixel(315, 235), Some([0xFF, 0x00, 0x00, 0xFF]));
        assert_eq!(canvas.pixel(314, 235), Some(BLACK));

        let mut hidden = Canvas::new(640, 480, [0xC0, 0xC0, 0xC0, 0xFF]);
        draw_intro(&mut hidden, &logo, 0.0);
        assert_eq!(hidden.pixel(320, 240), Some(BLACK));
    }
}
