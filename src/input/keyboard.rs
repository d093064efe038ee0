use egui::{Key, Modifiers, Vec2};

/// Commands the keyboard surface can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// Move the active object one step in the given screen direction
    Move(MoveDirection),
    /// Remove every selected object
    DeleteSelection,
    /// Capture the unlocked selection into the clipboard
    Copy,
    /// Duplicate the clipboard contents into the scene
    Paste,
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDirection {
    /// Unit vector in screen coordinates (y grows downward)
    pub fn unit(self) -> Vec2 {
        match self {
            MoveDirection::Up => Vec2::new(0.0, -1.0),
            MoveDirection::Down => Vec2::new(0.0, 1.0),
            MoveDirection::Left => Vec2::new(-1.0, 0.0),
            MoveDirection::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// The static key binding table. `Modifiers::command` matches either
/// platform's primary modifier; letter keys are matched case-insensitively
/// by virtue of being key codes.
pub fn command_for(key: Key, modifiers: Modifiers) -> Option<EditorCommand> {
    match key {
        Key::ArrowUp => Some(EditorCommand::Move(MoveDirection::Up)),
        Key::ArrowDown => Some(EditorCommand::Move(MoveDirection::Down)),
        Key::ArrowLeft => Some(EditorCommand::Move(MoveDirection::Left)),
        Key::ArrowRight => Some(EditorCommand::Move(MoveDirection::Right)),
        Key::Delete | Key::Backspace => Some(EditorCommand::DeleteSelection),
        Key::C if modifiers.command => Some(EditorCommand::Copy),
        Key::V if modifiers.command => Some(EditorCommand::Paste),
        Key::Z if modifiers.command && modifiers.shift => Some(EditorCommand::Redo),
        Key::Z if modifiers.command => Some(EditorCommand::Undo),
        _ => None,
    }
}
