//! Input handling and the viewer's per-frame state.

use std::collections::HashSet;
use std::time::Instant;

use glam::Vec2;
use lumen_core::{Camera, Movement};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

/// Something the render loop has to act on after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Quit,
    Resize(i32, i32),
    SetMouseGrab(bool),
}

const MOVEMENT_KEYS: [(Keycode, Movement); 4] = [
    (Keycode::W, Movement::Forward),
    (Keycode::S, Movement::Backward),
    (Keycode::A, Movement::Left),
    (Keycode::D, Movement::Right),
];

/// Everything the viewer tracks between frames.
pub struct ViewerState {
    pub camera: Camera,
    /// Keys currently held down.
    pub keys_down: HashSet<Keycode>,
    pub delta_time: f32,
    grabbed: bool,
    first_mouse: bool,
    last_frame: Option<Instant>,
}

impl ViewerState {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            keys_down: HashSet::new(),
            delta_time: 0.0,
            grabbed: true,
            first_mouse: true,
            last_frame: None,
        }
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Starts a frame at `now` and updates the frame time.
    pub fn begin_frame(&mut self, now: Instant) {
        self.delta_time = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
    }

    /// Applies one SDL event.
    pub fn handle_event(&mut self, event: &Event) -> Option<Request> {
        match *event {
            Event::Quit { .. } => Some(Request::Quit),
            Event::Window {
                win_event: WindowEvent::Resized(width, height),
                ..
            } => Some(Request::Resize(width, height)),
            Event::MouseMotion { xrel, yrel, .. } => {
                self.mouse_motion(Vec2::new(xrel as f32, yrel as f32));
                None
            }
            Event::MouseWheel { x, y, .. } => {
                self.mouse_wheel(Vec2::new(x as f32, y as f32));
                None
            }
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.key_down(keycode),
            Event::KeyUp {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => {
                self.key_up(keycode);
                None
            }
            _ => None,
        }
    }

    /// Turns the camera by a relative mouse motion.
    pub fn mouse_motion(&mut self, delta: Vec2) {
        self.look(delta.x, delta.y);
    }

    pub fn mouse_wheel(&mut self, scroll: Vec2) {
        self.camera.handle_mouse_scroll(scroll.y);
    }

    pub fn key_down(&mut self, keycode: Keycode) -> Option<Request> {
        self.keys_down.insert(keycode);
        self.key_pressed(keycode)
    }

    pub fn key_up(&mut self, keycode: Keycode) {
        self.keys_down.remove(&keycode);
    }

    fn key_pressed(&mut self, keycode: Keycode) -> Option<Request> {
        match keycode {
            Keycode::Escape => {
                self.grabbed = !self.grabbed;
                self.first_mouse = true;
                Some(Request::SetMouseGrab(self.grabbed))
            }
            Keycode::F => {
                let flying = !self.camera.is_flying();
                self.camera.set_flying(flying);
                log::info!("Flying {}", if flying { "on" } else { "off" });
                None
            }
            _ => None,
        }
    }

    /// Turns the camera by a relative mouse motion. Screen y grows downwards, so it is inverted.
    fn look(&mut self, xrel: f32, yrel: f32) {
        if !self.grabbed {
            return;
        }
        // The first motion after grabbing carries the jump to the window centre.
        if self.first_mouse {
            self.first_mouse = false;
            return;
        }
        self.camera.handle_mouse_movement(xrel, -yrel, true);
    }

    /// Moves the camera for every movement key held this frame.
    pub fn apply_movement(&mut self) {
        for (key, movement) in MOVEMENT_KEYS {
            if self.keys_down.contains(&key) {
                self.camera.handle_keyboard(movement, self.delta_time);
            }
        }
    }
}
