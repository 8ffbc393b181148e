use std::collections::HashMap;

use editor_core::cursor::{Cursor, Shift};
use editor_core::enums::Mode;
use editor_core::piece_table::table::PieceTable;
use editor_state::view::View;

use crate::ClientId;
use crate::errors::{SessionError, SessionResult};
use crate::event::{EditorEvent, Key};

/// What an observer sees after an event has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub client_id: ClientId,
    pub content: String,
    pub cursor: Cursor,
    pub mode: Mode,
    pub status_line: String,
}

pub(crate) enum Command {
    Join {
        client_id: ClientId,
        width: usize,
        height: usize,
        updates: crossbeam_channel::Sender<Snapshot>,
    },
    Event {
        client_id: ClientId,
        event: EditorEvent,
    },
    Leave {
        client_id: ClientId,
        reply: crossbeam_channel::Sender<()>,
    },
    Save {
        reply: crossbeam_channel::Sender<SessionResult<()>>,
    },
}

/// Cheap handle to a running document actor.
#[derive(Clone, Debug)]
pub struct DocumentHandle {
    commands: crossbeam_channel::Sender<Command>,
    path: std::path::PathBuf,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Join { client_id, .. } => write!(f, "Join({client_id})"),
            Command::Event { client_id, event } => write!(f, "Event({client_id}, {event:?})"),
            Command::Leave { client_id, .. } => write!(f, "Leave({client_id})"),
            Command::Save { .. } => f.write_str("Save"),
        }
    }
}

impl DocumentHandle {
    /// Loads `path` and starts its actor thread.
    pub(crate) fn spawn(
        path: &std::path::Path,
        config: editor_core::config::Config,
        queue_bound: usize,
    ) -> SessionResult<Self> {
        let table = PieceTable::open_with_config(path, config)?;
        let (commands, receiver) = crossbeam_channel::bounded(queue_bound);
        let actor = DocumentActor::new(path.to_path_buf(), table);

        std::thread::Builder::new()
            .name(format!("doc:{}", actor.file_name))
            .spawn(move || actor.run(&receiver))
            .map_err(SessionError::Spawn)?;

        tracing::info!(path = %path.display(), "started document session");

        Ok(Self {
            commands,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Whether both handles reach the same actor.
    #[must_use]
    pub fn same_document(&self, other: &DocumentHandle) -> bool {
        self.commands.same_channel(&other.commands)
    }

    pub(crate) fn join(
        &self,
        client_id: ClientId,
        width: usize,
        height: usize,
    ) -> SessionResult<crossbeam_channel::Receiver<Snapshot>> {
        let (updates, receiver) = crossbeam_channel::unbounded();

        self.commands.send(Command::Join {
            client_id,
            width,
            height,
            updates,
        })?;

        Ok(receiver)
    }

    /// Queues `event` behind everything already sent to this document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Disconnected`] if the actor has exited.
    pub fn send(&self, client_id: ClientId, event: EditorEvent) -> SessionResult<()> {
        Ok(self.commands.send(Command::Event { client_id, event })?)
    }

    /// Returns once the actor has dropped the client.
    pub(crate) fn leave(&self, client_id: ClientId) -> SessionResult<()> {
        let (reply, response) = crossbeam_channel::bounded(1);

        self.commands.send(Command::Leave { client_id, reply })?;

        Ok(response.recv()?)
    }

    /// Writes the document to its path once all earlier events are applied.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Buffer`] if the write fails, or
    /// [`SessionError::Disconnected`] if the actor has exited.
    pub fn save(&self) -> SessionResult<()> {
        let (reply, response) = crossbeam_channel::bounded(1);

        self.commands.send(Command::Save { reply })?;

        response.recv()?
    }
}

struct Client {
    view: View,
    updates: crossbeam_channel::Sender<Snapshot>,
}

/// Whether the client that sent an event stays in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Stay { edited: bool },
    Leave,
}

/// Sole owner of one document's piece table.
struct DocumentActor {
    path: std::path::PathBuf,
    file_name: String,
    table: PieceTable,
    clients: HashMap<ClientId, Client>,
}

impl DocumentActor {
    fn new(path: std::path::PathBuf, table: PieceTable) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            file_name,
            table,
            clients: HashMap::new(),
        }
    }

    /// Runs until every handle to this document has been dropped.
    fn run(mut self, receiver: &crossbeam_channel::Receiver<Command>) {
        while let Ok(command) = receiver.recv() {
            tracing::debug!(path = %self.path.display(), ?command, "document command");

            match command {
                Command::Join {
                    client_id,
                    width,
                    height,
                    updates,
                } => {
                    self.clients.insert(
                        client_id,
                        Client {
                            view: View::new(width, height),
                            updates,
                        },
                    );
                    tracing::info!(client_id, path = %self.path.display(), "client subscribed");
                    self.broadcast();
                }
                Command::Event { client_id, event } => match self.apply(client_id, event) {
                    Some(Outcome::Stay { edited }) => {
                        if edited {
                            self.resync_others(client_id);
                        }
                        self.broadcast();
                    }
                    Some(Outcome::Leave) => {
                        self.clients.remove(&client_id);
                        tracing::info!(client_id, "client quit");
                    }
                    None => tracing::warn!(client_id, "event from unknown client"),
                },
                Command::Leave { client_id, reply } => {
                    self.clients.remove(&client_id);
                    tracing::info!(client_id, path = %self.path.display(), "client unsubscribed");
                    let _ = reply.send(());
                }
                Command::Save { reply } => {
                    let _ = reply.send(self.table.save(&self.path).map_err(SessionError::from));
                }
            }
        }

        tracing::info!(path = %self.path.display(), "document session closed");
    }

    /// Dispatches one event for `client_id`. `None` if the client is unknown.
    fn apply(&mut self, client_id: ClientId, event: EditorEvent) -> Option<Outcome> {
        let client = self.clients.get_mut(&client_id)?;
        let view = &mut client.view;
        let table = &mut self.table;

        let key = match event {
            EditorEvent::Resize { width, height } => {
                view.resize(width, height);

                return Some(Outcome::Stay { edited: false });
            }
            EditorEvent::Key(key) => key,
        };

        let result = match (view.mode, key) {
            (_, Key::Left) => Self::shift(view, table, Shift::by(0, -1)),
            (_, Key::Right) => Self::shift(view, table, Shift::by(0, 1)),
            (_, Key::Up) => Self::shift(view, table, Shift::by(-1, 0)),
            (_, Key::Down) => Self::shift(view, table, Shift::by(1, 0)),

            (Mode::Insert, Key::Escape) => {
                view.to_normal(table);
                Ok(false)
            }
            (Mode::Insert, Key::Enter) => view.insert_character(table, '\n').map(|()| true),
            (Mode::Insert, Key::Char(c)) => view.insert_character(table, c).map(|()| true),
            (Mode::Insert, Key::Backspace) => {
                let before = table.len();
                view.backspace(table).map(|()| table.len() != before)
            }

            (Mode::Normal, Key::Char('q')) => return Some(Outcome::Leave),
            (Mode::Normal, Key::Char('a')) => {
                view.to_insert(table, true);
                Ok(false)
            }
            (Mode::Normal, Key::Char('i')) => {
                view.to_insert(table, false);
                Ok(false)
            }
            (Mode::Normal, Key::Char('h')) => Self::shift(view, table, Shift::by(0, -1)),
            (Mode::Normal, Key::Char('j')) => Self::shift(view, table, Shift::by(1, 0)),
            (Mode::Normal, Key::Char('k')) => Self::shift(view, table, Shift::by(-1, 0)),
            (Mode::Normal, Key::Char('l')) => Self::shift(view, table, Shift::by(0, 1)),
            (Mode::Normal, Key::Char(_) | Key::Enter | Key::Escape | Key::Backspace) => Ok(false),
        };

        match result {
            Ok(edited) => Some(Outcome::Stay { edited }),
            Err(e) => {
                tracing::warn!(client_id, error = %e, "edit rejected");
                view.resync(table);

                Some(Outcome::Stay { edited: false })
            }
        }
    }

    fn shift(
        view: &mut View,
        table: &PieceTable,
        shift: Shift,
    ) -> editor_core::errors::PieceTableResult<bool> {
        view.shift_cursor(table, shift);

        Ok(false)
    }

    /// Other clients' cached rows/columns may be stale after an edit.
    fn resync_others(&mut self, editor_id: ClientId) {
        let content = self.table.materialize();

        for (id, client) in &mut self.clients {
            if *id != editor_id {
                client.view.cursor.resync(&content);
            }
        }
    }

    /// Sends every client its own snapshot. Clients whose receiver is gone
    /// are dropped.
    fn broadcast(&mut self) {
        let content = self.table.text();
        let mut gone = Vec::new();

        for (&client_id, client) in &self.clients {
            let snapshot = Snapshot {
                client_id,
                content: content.clone(),
                cursor: client.view.cursor,
                mode: client.view.mode,
                status_line: client.view.status_line(&self.file_name),
            };

            if client.updates.send(snapshot).is_err() {
                gone.push(client_id);
            }
        }

        for client_id in gone {
            tracing::warn!(client_id, "observer went away, dropping client");
            self.clients.remove(&client_id);
        }
    }
}

#[cfg(test)]
mod document_tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn actor_with(s: &str) -> (DocumentActor, crossbeam_channel::Receiver<Snapshot>) {
        let mut actor = DocumentActor::new(
            std::path::PathBuf::from("/tmp/doc.txt"),
            PieceTable::from_chars(s.chars().collect()),
        );
        let (updates, receiver) = crossbeam_channel::unbounded();

        actor.clients.insert(
            1,
            Client {
                view: View::new(80, 24),
                updates,
            },
        );

        (actor, receiver)
    }

    fn press(actor: &mut DocumentActor, keys: &[Key]) {
        for &key in keys {
            actor.apply(1, EditorEvent::Key(key)).unwrap();
        }
    }

    #[test]
    fn normal_mode_motions() {
        let (mut actor, _rx) = actor_with("ab\ncd");

        press(&mut actor, &[Key::Char('j'), Key::Char('l')]);
        assert_eq!(actor.clients[&1].view.cursor, Cursor::new(4, 1, 1));

        press(&mut actor, &[Key::Char('k'), Key::Char('h')]);
        assert_eq!(actor.clients[&1].view.cursor, Cursor::new(0, 0, 0));
    }

    #[test]
    fn normal_mode_ignores_text_keys() {
        let (mut actor, _rx) = actor_with("abc");

        press(&mut actor, &[Key::Char('x'), Key::Enter, Key::Backspace]);

        assert_eq!(actor.table.text(), "abc");
        assert_eq!(actor.clients[&1].view.mode, Mode::Normal);
    }

    #[test]
    fn insert_session_edits_text() {
        let (mut actor, _rx) = actor_with("world");

        press(&mut actor, &[Key::Char('i')]);
        for c in "hello".chars() {
            press(&mut actor, &[Key::Char(c)]);
        }
        press(&mut actor, &[Key::Enter, Key::Backspace, Key::Char(' ')]);
        press(&mut actor, &[Key::Escape]);

        assert_eq!(actor.table.text(), "hello world");
        assert_eq!(actor.clients[&1].view.mode, Mode::Normal);
        assert_eq!(actor.clients[&1].view.cursor, Cursor::new(5, 0, 5));
    }

    #[test]
    fn append_enters_insert_after_cursor() {
        let (mut actor, _rx) = actor_with("ac");

        press(&mut actor, &[Key::Char('a'), Key::Char('b')]);

        assert_eq!(actor.table.text(), "abc");
    }

    #[test]
    fn q_leaves_only_in_normal_mode() {
        let (mut actor, _rx) = actor_with("");

        press(&mut actor, &[Key::Char('i'), Key::Char('q')]);
        assert_eq!(actor.table.text(), "q");

        press(&mut actor, &[Key::Escape]);
        assert_eq!(
            actor.apply(1, EditorEvent::Key(Key::Char('q'))),
            Some(Outcome::Leave)
        );
    }

    #[test]
    fn resize_updates_view() {
        let (mut actor, _rx) = actor_with("");

        actor
            .apply(
                1,
                EditorEvent::Resize {
                    width: 10,
                    height: 3,
                },
            )
            .unwrap();

        assert_eq!(actor.clients[&1].view.width, 10);
        assert_eq!(actor.clients[&1].view.height, 3);
    }

    #[test]
    fn unknown_client_is_reported() {
        let (mut actor, _rx) = actor_with("");

        assert_eq!(actor.apply(7, EditorEvent::Key(Key::Left)), None);
    }

    #[test]
    fn broadcast_drops_closed_observers() {
        let (mut actor, rx) = actor_with("text");

        drop(rx);
        actor.broadcast();

        assert!(actor.clients.is_empty());
    }

    #[test]
    fn other_clients_resync_after_edit() {
        let (mut actor, _rx) = actor_with("abc\ndef");
        let (updates, _other_rx) = crossbeam_channel::unbounded();
        let mut other = View::new(80, 24);

        other.shift_cursor(&actor.table, Shift::by(1, 2));
        actor.clients.insert(2, Client { view: other, updates });

        // Client 1 deletes the first line.
        press(&mut actor, &[Key::Char('j'), Key::Char('i'), Key::Backspace]);
        actor.resync_others(1);

        assert_eq!(actor.table.text(), "abcdef");
        assert_eq!(actor.clients[&2].view.cursor, Cursor::new(6, 0, 6));
    }
}
