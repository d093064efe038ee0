use std::collections::HashMap;

use egui::{Pos2, Vec2};

use crate::input::{InputEvent, TouchPoint};

/// Converts raw egui input into the dispatcher's [`InputEvent`]s.
///
/// Keeps the last pointer position so pointer moves carry a movement delta,
/// and mirrors the live touch contacts so every touch event carries the full
/// contact list. Call [`process_input`](Self::process_input) once per frame
/// and feed the returned events to the dispatcher in order.
#[derive(Debug, Default)]
pub struct EguiInputAdapter {
    last_pointer_pos: Option<Pos2>,
    touches: HashMap<u64, Pos2>,
}

impl EguiInputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain this frame's raw input into dispatcher events
    pub fn process_input(&mut self, ctx: &egui::Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            for event in &input.events {
                match event {
                    egui::Event::Key {
                        key,
                        pressed,
                        modifiers,
                        ..
                    } => {
                        if *pressed {
                            events.push(InputEvent::KeyDown {
                                key: *key,
                                modifiers: *modifiers,
                            });
                        } else {
                            events.push(InputEvent::KeyUp { key: *key });
                        }
                    }
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed,
                        ..
                    } => {
                        if *pressed {
                            events.push(InputEvent::PointerDown {
                                position: *pos,
                                button: *button,
                            });
                        } else {
                            events.push(InputEvent::PointerUp {
                                position: *pos,
                                button: *button,
                            });
                        }
                    }
                    egui::Event::PointerMoved(pos) => {
                        let movement = self
                            .last_pointer_pos
                            .map(|last| *pos - last)
                            .unwrap_or(Vec2::ZERO);
                        self.last_pointer_pos = Some(*pos);
                        events.push(InputEvent::PointerMove {
                            position: *pos,
                            movement,
                        });
                    }
                    egui::Event::Touch { id, phase, pos, .. } => match phase {
                        egui::TouchPhase::Start => {
                            self.touches.insert(id.0, *pos);
                            events.push(InputEvent::TouchStart {
                                touches: self.touch_points(),
                            });
                        }
                        egui::TouchPhase::Move => {
                            self.touches.insert(id.0, *pos);
                            events.push(InputEvent::TouchMove {
                                touches: self.touch_points(),
                            });
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            self.touches.remove(&id.0);
                            events.push(InputEvent::TouchEnd {
                                touches: self.touch_points(),
                            });
                        }
                    },
                    _ => {}
                }
            }

            let scroll = input.raw_scroll_delta;
            if scroll != Vec2::ZERO {
                events.push(InputEvent::Wheel { delta: scroll });
            }
        });

        events
    }

    /// The live contacts, ordered by id for deterministic centroids
    fn touch_points(&self) -> Vec<TouchPoint> {
        let mut points: Vec<TouchPoint> = self
            .touches
            .iter()
            .map(|(id, pos)| TouchPoint {
                id: *id,
                position: *pos,
            })
            .collect();
        points.sort_by_key(|point| point.id);
        points
    }
}
