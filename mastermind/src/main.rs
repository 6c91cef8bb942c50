mod config;
mod game;
mod score;
mod screen;
mod utils;

use crate::config::Config;
use crate::game::{Game, GameSettings, Leds, MAX_LENGTH, MAX_RANGE, generate_secret};
use crate::screen::{ConsoleScreen, Screen};
use crate::utils::{WithinExt, prompt_number};
use clap::Parser;
use dotenv::dotenv;
use eyre::eyre;
use log::{debug, error, info};
use mastermind_gpio::button::ButtonSampler;
use mastermind_gpio::delay::SystemClock;
use mastermind_gpio::lcd::hd44780::{LCD_COLS, LCD_ROWS, Lcd};
use mastermind_gpio::led::Led;
use mastermind_gpio::raw::RawGpioPort;
use mastermind_gpio::GpioError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::ops::RangeInclusive;
use sysinfo::System;
use time::OffsetDateTime;

/// Mastermind on a 16x2 character LCD, played with a single button.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Print the secret sequence on start.
    #[arg(short, long)]
    debug: bool,

    /// Show the feedback on the console instead of the LCD.
    #[arg(long)]
    console: bool,

    /// Length of the secret sequence; asked for when missing.
    #[arg(long)]
    length: Option<usize>,

    /// Largest digit of the secret sequence; asked for when missing.
    #[arg(long)]
    range: Option<u32>,

    /// Seed for a reproducible secret.
    #[arg(long)]
    seed: Option<u64>,
}

fn log_system_info() {
    const UNKNOWN_STR: &str = "???";

    info!(
        "Running on {} ({}), kernel {}",
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR),
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!("Architecture {}", System::cpu_arch());
}

fn load_config() -> eyre::Result<Config> {
    let mut config = Config::load_or_create(&Config::path())?;
    config.apply_env()?;
    Ok(config)
}

/// Takes the value from the command line if given, otherwise asks for it.
fn setting<T>(given: Option<T>, prompt: &str, range: RangeInclusive<T>) -> eyre::Result<T>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    match given {
        Some(value) if value.within(range.clone()) => Ok(value),
        Some(value) => Err(eyre!(
            "{} is out of range, expected {} to {}",
            value,
            range.start(),
            range.end()
        )),
        None => prompt_number(&mut io::stdin().lock(), &mut io::stdout(), prompt, range),
    }
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();
    let args = Args::parse();

    info!("Mastermind starting...");
    log_system_info();

    let config = load_config()?;

    info!(
        "LCD @ RS: {}, E: {}, Data: {:?}",
        config.lcd.rs_pin, config.lcd.strobe_pin, config.lcd.data_pins
    );
    info!("Button @ {}, LEDs @ {}, {}", config.button_pin, config.led_pin, config.led_red_pin);

    debug!("Initializing GPIO port...");
    let port = RawGpioPort::open(&config.gpio_device, config.gpio_base).inspect_err(|e| {
        if *e == GpioError::Io(io::ErrorKind::PermissionDenied) {
            error!("Cannot open {}: must be root. (Did you forget sudo?)", config.gpio_device);
        }
    })?;
    let clock = SystemClock;
    debug!("{:?} initialized.", port);

    // Only 4-bit wiring can be driven, anything else stops here
    let mut lcd = if args.console {
        None
    } else {
        debug!("Initializing LCD driver...");
        let mut lcd = Lcd::initialize(&port, &clock, config.lcd.pins()?, LCD_ROWS, LCD_COLS)?;
        lcd.show("MasterMind", "")?;
        Some(lcd)
    };

    let sampler = ButtonSampler::new(&port, &clock, config.button_pin)?
        .with_poll_interval(config.poll_interval()?)?;
    let leds = Leds {
        led: Led::new(&port, &clock, config.led_pin)?,
        red: Led::new(&port, &clock, config.led_red_pin)?,
    };

    let length = setting(args.length, "Please enter the length", 1..=MAX_LENGTH)?;
    let num_range = setting(args.range, "Please enter the range", 1..=MAX_RANGE)?;
    let settings = GameSettings { length, num_range, debug: args.debug };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let secret = generate_secret(&mut rng, length, num_range);
    debug!("Secret is {:?}.", secret);

    let mut console = ConsoleScreen;
    let screen: &mut dyn Screen = match lcd.as_mut() {
        Some(lcd) => lcd,
        None => &mut console,
    };

    let started = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    info!("Game of {} digits from 1 to {} started at {}.", length, num_range, started);
    println!("Start pressing the button");

    let mut game = Game::new(settings, secret, sampler, leds, screen, &clock);
    let attempts = game.run()?;

    let duration = OffsetDateTime::now_utc() - started;
    println!("Game finished in {} attempts", attempts);
    info!("Game finished in {} attempts after {} s.", attempts, duration.whole_seconds());

    Ok(())
}
