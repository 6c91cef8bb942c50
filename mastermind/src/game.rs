//! The module for the game rounds and their feedback.

use crate::score::{Score, score};
use crate::screen::{Screen, guess_line, result_line};
use log::{debug, info};
use mastermind_gpio::GpioResult;
use mastermind_gpio::button::ButtonSampler;
use mastermind_gpio::delay::Clock;
use mastermind_gpio::led::Led;
use rand::Rng;
use std::time::Duration;

/// Longest sequence whose digits still fit on one display row.
pub const MAX_LENGTH: usize = 8;
/// Largest value range; every digit takes one column.
pub const MAX_RANGE: u32 = 9;

/// How long the result of a guess stays on screen.
const RESULT_HOLD: Duration = Duration::from_secs(3);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GameSettings {
    /// Number of digits in the secret.
    pub length: usize,
    /// Digits go from 1 to `num_range`.
    pub num_range: u32,
    /// Prints the secret on start.
    pub debug: bool,
}

/// The two feedback LEDs.
#[derive(Debug)]
pub struct Leds<'a> {
    /// Acknowledges steps of the game.
    pub led: Led<'a>,
    /// Blinks out numbers.
    pub red: Led<'a>,
}

/// A finished round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub guess: Vec<u32>,
    pub score: Score,
}

/// Generates a secret of `length` digits in `1..=num_range`.
pub fn generate_secret(rng: &mut impl Rng, length: usize, num_range: u32) -> Vec<u32> {
    (0..length).map(|_| rng.gen_range(1..=num_range)).collect()
}

/// The main game state.
pub struct Game<'a> {
    settings: GameSettings,
    secret: Vec<u32>,
    sampler: ButtonSampler<'a>,
    leds: Leds<'a>,
    screen: &'a mut dyn Screen,
    clock: &'a dyn Clock,
    tries: u32,
}

impl<'a> Game<'a> {
    /// Creates a game for `secret`, which has to be `settings.length` digits long.
    pub fn new(
        settings: GameSettings,
        secret: Vec<u32>,
        sampler: ButtonSampler<'a>,
        leds: Leds<'a>,
        screen: &'a mut dyn Screen,
        clock: &'a dyn Clock,
    ) -> Self {
        assert_eq!(secret.len(), settings.length, "secret does not match the game length");
        Game {
            settings,
            secret,
            sampler,
            leds,
            screen,
            clock,
            tries: 0,
        }
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Reads one guess from the button, scores it and shows the result.
    pub fn play_round(&mut self) -> GpioResult<Round> {
        self.screen.show("Starting", "")?;

        let mut guess = Vec::with_capacity(self.settings.length);
        for position in 0..self.settings.length {
            let digit = self.sampler.sample_guess(self.settings.num_range)?;
            debug!("Digit {} is {}.", position + 1, digit);

            self.leds.led.blink(1)?;
            self.leds.red.blink(digit)?;
            guess.push(digit);
        }
        self.leds.led.blink(2)?;

        self.tries += 1;
        let score = score(&self.secret, &guess);
        info!(
            "Guess {}: {:?}, {} exact, {} value-only.",
            self.tries, guess, score.exact_matches, score.value_matches
        );

        self.leds.red.blink(score.exact_matches as u32)?;
        self.leds.led.blink(1)?;
        self.leds.red.blink(score.value_matches as u32)?;

        self.screen.show(&result_line(self.tries, &score), &guess_line(&guess))?;
        self.clock.sleep(RESULT_HOLD);

        if score.won {
            self.screen.show("Success", &format!("Attempts = {}", self.tries))?;
            self.leds.led.set(true)?;
            self.leds.red.blink(3)?;
            self.leds.led.set(false)?;
        } else {
            self.leds.led.blink(3)?;
        }

        Ok(Round { guess, score })
    }

    /// Plays rounds until the secret is guessed. Returns the number of attempts.
    pub fn run(&mut self) -> GpioResult<u32> {
        if self.settings.debug {
            let secret: Vec<String> = self.secret.iter().map(|d| d.to_string()).collect();
            println!("Secret: {}", secret.join("\t"));
        }

        loop {
            let round = self.play_round()?;
            if round.score.won {
                info!("Secret guessed in {} attempt(s).", self.tries);
                return Ok(self.tries);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastermind_gpio::sim::SimGpio;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BUTTON: usize = 19;
    const LED: usize = 5;
    const LED_RED: usize = 13;

    #[derive(Debug, Default)]
    struct RecordingScreen {
        shown: Vec<(String, String)>,
    }

    impl Screen for RecordingScreen {
        fn show(&mut self, top: &str, bottom: &str) -> GpioResult<()> {
            self.shown.push((top.to_string(), bottom.to_string()));
            Ok(())
        }
    }

    fn game<'a>(
        sim: &'a SimGpio,
        screen: &'a mut RecordingScreen,
        secret: Vec<u32>,
        num_range: u32,
    ) -> Game<'a> {
        let settings = GameSettings { length: secret.len(), num_range, debug: false };
        let sampler = ButtonSampler::new(sim, sim, BUTTON).unwrap();
        let leds = Leds {
            led: Led::new(sim, sim, LED).unwrap(),
            red: Led::new(sim, sim, LED_RED).unwrap(),
        };
        Game::new(settings, secret, sampler, leds, screen, sim)
    }

    fn shown(screen: &RecordingScreen) -> Vec<(&str, &str)> {
        screen.shown.iter().map(|(t, b)| (t.as_str(), b.as_str())).collect()
    }

    #[test]
    fn idle_button_gives_an_empty_guess() {
        let sim = SimGpio::new();
        let mut screen = RecordingScreen::default();

        let round = game(&sim, &mut screen, vec![1, 2], 2).play_round().unwrap();

        assert_eq!(round.guess, vec![0, 0]);
        assert_eq!(round.score, Score { won: false, exact_matches: 0, value_matches: 0 });
        assert_eq!(shown(&screen), vec![("Starting", ""), ("Guess 1: 0 0", "0 0 ")]);
        assert!(!sim.level(LED));
        assert!(!sim.level(LED_RED));
    }

    #[test]
    fn guessing_the_secret_ends_the_game() {
        let sim = SimGpio::new();
        // Far more presses than the range allows, so every digit saturates
        sim.drive_input(BUTTON, |t| (t.as_millis() / 200) % 2 == 1);
        let mut screen = RecordingScreen::default();

        let attempts = game(&sim, &mut screen, vec![2, 2, 2], 2).run().unwrap();

        assert_eq!(attempts, 1);
        assert_eq!(
            shown(&screen),
            vec![
                ("Starting", ""),
                ("Guess 1: 3 0", "2 2 2 "),
                ("Success", "Attempts = 1"),
            ]
        );
    }

    #[test]
    fn tries_are_counted_across_rounds() {
        let sim = SimGpio::new();
        let mut screen = RecordingScreen::default();
        let mut game = game(&sim, &mut screen, vec![1], 1);

        game.play_round().unwrap();
        game.play_round().unwrap();

        assert_eq!(game.tries(), 2);
        drop(game);
        assert_eq!(screen.shown.last().map(|(t, _)| t.as_str()), Some("Guess 2: 0 0"));
    }

    #[test]
    fn secret_digits_are_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for num_range in 1..=MAX_RANGE {
            let secret = generate_secret(&mut rng, MAX_LENGTH, num_range);
            assert_eq!(secret.len(), MAX_LENGTH);
            assert!(secret.iter().all(|&d| (1..=num_range).contains(&d)));
        }
    }

    #[test]
    fn seeded_secrets_are_reproducible() {
        let a = generate_secret(&mut StdRng::seed_from_u64(7), 5, 6);
        let b = generate_secret(&mut StdRng::seed_from_u64(7), 5, 6);
        assert_eq!(a, b);
    }
}
