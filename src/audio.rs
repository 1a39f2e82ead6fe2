//! Audio using the page's `<audio id="bg-music">` element and Web Audio
//!
//! Background music starts on the first user gesture (browsers block
//! autoplay), pauses when a round ends and rewinds on restart. Sound effects
//! are generated procedurally.

use crate::session::GameKind;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Round left the start screen
    Start,
    /// Snake ate fresh food
    Eat,
    /// Enemy destroyed
    Explosion,
    GameOver,
}

impl SoundEffect {
    /// Effect for a game event, if any. Dodge scores every tick, so stays quiet.
    pub fn for_event(kind: GameKind, event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Started => Some(SoundEffect::Start),
            GameEvent::Scored { .. } => match kind {
                GameKind::Snake | GameKind::SnakeRivals => Some(SoundEffect::Eat),
                _ => None,
            },
            GameEvent::Explosion { .. } => Some(SoundEffect::Explosion),
            GameEvent::RoundOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::Restarted => None,
        }
    }
}

/// What a game event does to the background music
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Pause,
    /// Back to the start; the next gesture plays it again
    Rewind,
}

impl MusicCue {
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::RoundOver { .. } => Some(MusicCue::Pause),
            GameEvent::Restarted => Some(MusicCue::Rewind),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{MusicCue, SoundEffect};
    use crate::settings::Settings;

    pub struct AudioManager {
        ctx: Option<AudioContext>,
        music: Option<HtmlAudioElement>,
        music_started: bool,
        music_volume: f32,
        sfx_volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - sound effects disabled");
            }
            let music = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("bg-music"))
                .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
            if music.is_none() {
                log::info!("No #bg-music element, music disabled");
            }
            Self {
                ctx,
                music,
                music_started: false,
                music_volume: settings.effective_music_volume(),
                sfx_volume: settings.effective_sfx_volume(),
            }
        }

        /// Call from every user gesture; only the first one starts the music
        pub fn on_gesture(&mut self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
            if self.music_started {
                return;
            }
            self.music_started = true;
            let Some(music) = &self.music else { return };
            if self.music_volume <= 0.0 {
                return;
            }
            music.set_volume(self.music_volume as f64);
            match music.play() {
                Ok(_) => log::info!("Background music started"),
                Err(e) => log::warn!("Background music blocked: {e:?}"),
            }
        }

        pub fn cue(&mut self, cue: MusicCue) {
            let Some(music) = &self.music else { return };
            match cue {
                MusicCue::Pause => {
                    if let Err(e) = music.pause() {
                        log::warn!("Could not pause music: {e:?}");
                    }
                }
                MusicCue::Rewind => {
                    music.pause().ok();
                    music.set_current_time(0.0);
                    self.music_started = false;
                }
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            let vol = self.sfx_volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            match effect {
                SoundEffect::Start => self.play_start(ctx, vol),
                SoundEffect::Eat => self.play_eat(ctx, vol),
                SoundEffect::Explosion => self.play_explosion(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Rising blip
        fn play_start(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(900.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.16).ok();
        }

        fn play_eat(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 660.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(660.0, t).ok();
            osc.frequency().set_value_at_time(990.0, t + 0.04).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Low boom plus noisy crackle
        fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(40.0, t + 0.3)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.32).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.15, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.frequency().set_value_at_time(800.0, t).ok();
                osc.frequency().set_value_at_time(200.0, t + 0.03).ok();
                osc.frequency().set_value_at_time(600.0, t + 0.06).ok();
                osc.frequency().set_value_at_time(100.0, t + 0.09).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.14).ok();
            }
        }

        /// Descending tones
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (i, freq) in [440.0, 349.0, 262.0].into_iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                    continue;
                };
                let start = t + i as f64 * 0.18;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.35, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(start + 0.3).ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RoundEnd;

    #[test]
    fn test_music_follows_round() {
        let over = GameEvent::RoundOver {
            score: 4,
            reason: RoundEnd::Crushed,
        };
        assert_eq!(MusicCue::for_event(&over), Some(MusicCue::Pause));
        assert_eq!(MusicCue::for_event(&GameEvent::Restarted), Some(MusicCue::Rewind));
        assert_eq!(MusicCue::for_event(&GameEvent::Started), None);
        assert_eq!(MusicCue::for_event(&GameEvent::Scored { score: 1 }), None);
    }

    #[test]
    fn test_effects_per_game() {
        let scored = GameEvent::Scored { score: 2 };
        assert_eq!(
            SoundEffect::for_event(GameKind::SnakeRivals, &scored),
            Some(SoundEffect::Eat)
        );
        assert_eq!(SoundEffect::for_event(GameKind::Dodge, &scored), None);
        assert_eq!(SoundEffect::for_event(GameKind::Space, &GameEvent::Restarted), None);
    }
}
