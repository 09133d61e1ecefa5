//! Lane Hopper entry point
//!
//! Headless native runner. Levels, settings and saves live under `data/`.
//! Key names (`left`, `up`, `esc`, `enter`, ...) typed on stdin are fed to
//! the engine as taps; `quit` or end of input stops the loop.

use std::collections::BTreeSet;
use std::error::Error;
use std::io::BufRead;
use std::path::Path;

use lane_hopper::level::{LevelDir, LevelSource};
use lane_hopper::platform::{Key, KeyEvent, Keyboard};
use lane_hopper::renderer::{RecordingCanvas, SpriteBook, sprite_names};
use lane_hopper::{App, Settings};

/// Every sprite any level can ask for
fn sprite_book(levels: &LevelDir) -> SpriteBook {
    let mut names = BTreeSet::new();
    for level in 0..levels.level_count() {
        match levels.load_level(level) {
            Ok(parsed) => names.extend(sprite_names(&parsed.map)),
            Err(err) => log::warn!("Skipping sprites of level {level}: {err}"),
        }
    }
    SpriteBook::from_names(names)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lane Hopper (native) starting...");

    let settings = Settings::load(Path::new("data"));
    let levels = LevelDir::open(&settings.data_dir)?;
    let assets = sprite_book(&levels);
    let (keys, keyboard) = Keyboard::channel();
    let mut app = App::new(settings, Box::new(levels), keyboard, RecordingCanvas::new(), assets)?;

    let stop = app.stop_flag();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for word in line.split_whitespace() {
                if word.eq_ignore_ascii_case("quit") {
                    stop.stop();
                    return;
                }
                match Key::from_name(word) {
                    Some(key) => {
                        if keys.send(KeyEvent::Down(key)).is_err() || keys.send(KeyEvent::Up(key)).is_err() {
                            return;
                        }
                    }
                    None => log::warn!("Unknown key {word:?}"),
                }
            }
        }
        stop.stop();
    });

    app.run();
    Ok(())
}
