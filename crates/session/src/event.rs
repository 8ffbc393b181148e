/// Keys the document actor understands. Anything else is dropped by the
/// input layer before it gets here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    Key(Key),
    Resize { width: usize, height: usize },
}

impl From<Key> for EditorEvent {
    fn from(key: Key) -> Self {
        EditorEvent::Key(key)
    }
}
