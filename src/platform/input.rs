//! Keyboard edge detection
//!
//! Raw key events arrive over an MPSC channel from whatever thread owns the
//! window or terminal. The engine thread drains the channel between ticks and
//! turns it into per-tick `pressed`/`released` edges.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::settings::KeyLayout;
use crate::sim::TickInput;

/// Logical keys the engine listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Enter,
    Escape,
}

impl Key {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            "w" => Some(Key::W),
            "a" => Some(Key::A),
            "s" => Some(Key::S),
            "d" => Some(Key::D),
            "enter" | "return" => Some(Key::Enter),
            "esc" | "escape" => Some(Key::Escape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// State of one key for the current tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Button {
    /// Went down this tick
    pub pressed: bool,
    /// Went up this tick
    pub released: bool,
    /// Currently down
    pub held: bool,
}

impl Button {
    pub fn holding(&self) -> bool {
        self.held
    }

    /// Up and untouched this tick
    pub fn idling(&self) -> bool {
        !self.held && !self.pressed && !self.released
    }

    fn apply(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Down(_) => {
                if !self.held {
                    self.pressed = true;
                }
                self.held = true;
            }
            KeyEvent::Up(_) => {
                if self.held {
                    self.released = true;
                }
                self.held = false;
            }
        }
    }
}

/// Receiving end of the key channel
#[derive(Debug)]
pub struct Keyboard {
    events: Receiver<KeyEvent>,
    buttons: BTreeMap<Key, Button>,
    /// Repeat tap held back for the next tick
    deferred: Option<KeyEvent>,
    connected: bool,
}

impl Keyboard {
    /// Create a keyboard plus the sender an input thread feeds
    pub fn channel() -> (Sender<KeyEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    pub fn new(events: Receiver<KeyEvent>) -> Self {
        Self {
            events,
            buttons: BTreeMap::new(),
            deferred: None,
            connected: true,
        }
    }

    /// Drain queued events into this tick's edges
    ///
    /// Edges from the previous tick are cleared first. A key released this
    /// tick and pressed again stops the drain, so every tap gets its own
    /// tick. Returns the number of events applied.
    pub fn poll(&mut self) -> usize {
        for button in self.buttons.values_mut() {
            button.pressed = false;
            button.released = false;
        }
        let mut applied = 0;
        if let Some(event) = self.deferred.take() {
            self.apply(event);
            applied += 1;
        }
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if matches!(event, KeyEvent::Down(key) if self.released(key)) {
                        self.deferred = Some(event);
                        break;
                    }
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        log::debug!("Input channel closed");
                        self.connected = false;
                    }
                    break;
                }
            }
        }
        applied
    }

    fn apply(&mut self, event: KeyEvent) {
        let key = match event {
            KeyEvent::Down(key) | KeyEvent::Up(key) => key,
        };
        self.buttons.entry(key).or_default().apply(event);
    }

    /// False once every sender is gone
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn button(&self, key: Key) -> Button {
        self.buttons.get(&key).copied().unwrap_or_default()
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.button(key).pressed
    }

    pub fn released(&self, key: Key) -> bool {
        self.button(key).released
    }

    pub fn holding(&self, key: Key) -> bool {
        self.button(key).holding()
    }

    pub fn idling(&self, key: Key) -> bool {
        self.button(key).idling()
    }

    /// Released edges mapped through the movement layout
    pub fn tick_input(&self, layout: KeyLayout) -> TickInput {
        let any = |keys: &[Key]| keys.iter().any(|key| self.released(*key));
        let [left, right, up, down] = layout.bindings();
        TickInput {
            left: any(left),
            right: any(right),
            up: any(up),
            down: any(down),
            enter: self.released(Key::Enter),
            escape: self.released(Key::Escape),
        }
    }
}
