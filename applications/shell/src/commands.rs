//! Line commands typed into the interactive shell
//!
//! Positions are 1-based on the command line and converted to queue
//! indices here.

use crate::error::{Result, ShellError};
use encore_core::PlaylistId;
use encore_playback::Intent;
use std::str::FromStr;

/// A parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Applied to the player session as-is
    Player(Intent),

    /// Replace the queue with a playlist and start at `start`
    PlayPlaylist { playlist_id: PlaylistId, start: usize },

    /// Append a playlist's tracks to the queue
    Enqueue(PlaylistId),

    /// Append the current track to a playlist
    Keep(PlaylistId),

    Playlists,
    Refresh,
    Save(PlaylistId),
    Unsave(PlaylistId),
    Queue,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
playback:  play [playlist-id [n]] | pause | toggle | next | prev
           seek <secs> | seek <pct>% | vol <0-100> | mute
           shuffle | repeat
queue:     queue | jump <n> | remove <n> | move <from> <to> | clear
           enqueue <playlist-id>
library:   playlists | refresh | keep <playlist-id>
           save <playlist-id> | unsave <playlist-id>
other:     status | help | quit";

const COMMAND_NAMES: &[&str] = &[
    "play", "pause", "toggle", "t", "next", "n", "prev", "previous", "p", "seek", "vol",
    "volume", "mute", "shuffle", "repeat", "jump", "remove", "move", "clear", "enqueue", "keep",
    "playlists", "ls", "refresh", "save", "unsave", "queue", "q", "status", "s", "help", "?",
    "quit", "exit",
];

impl FromStr for Command {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ShellError::UnknownCommand(String::new()));
        };
        let name = name.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match (name.as_str(), args.as_slice()) {
            ("play", []) => Command::Player(Intent::Play),
            ("play", [id]) => Command::PlayPlaylist {
                playlist_id: PlaylistId::new(*id),
                start: 0,
            },
            ("play", [id, n]) => Command::PlayPlaylist {
                playlist_id: PlaylistId::new(*id),
                start: position(&name, n)?,
            },
            ("pause", []) => Command::Player(Intent::Pause),
            ("toggle" | "t", []) => Command::Player(Intent::TogglePlay),
            ("next" | "n", []) => Command::Player(Intent::Next),
            ("prev" | "previous" | "p", []) => Command::Player(Intent::Previous),
            ("seek", [target]) => seek(&name, target)?,
            ("vol" | "volume", [level]) => {
                let percent: f32 = number(&name, level)?;
                Command::Player(Intent::SetVolume {
                    level: percent / 100.0,
                })
            }
            ("mute", []) => Command::Player(Intent::ToggleMute),
            ("shuffle", []) => Command::Player(Intent::ToggleShuffle),
            ("repeat", []) => Command::Player(Intent::CycleRepeatMode),
            ("jump", [n]) => Command::Player(Intent::JumpTo {
                index: position(&name, n)?,
            }),
            ("remove", [n]) => Command::Player(Intent::RemoveFromQueue {
                index: position(&name, n)?,
            }),
            ("move", [from, to]) => Command::Player(Intent::ReorderQueue {
                from: position(&name, from)?,
                to: position(&name, to)?,
            }),
            ("clear", []) => Command::Player(Intent::ClearQueue),
            ("enqueue", [id]) => Command::Enqueue(PlaylistId::new(*id)),
            ("keep", [id]) => Command::Keep(PlaylistId::new(*id)),
            ("playlists" | "ls", []) => Command::Playlists,
            ("refresh", []) => Command::Refresh,
            ("save", [id]) => Command::Save(PlaylistId::new(*id)),
            ("unsave", [id]) => Command::Unsave(PlaylistId::new(*id)),
            ("queue" | "q", []) => Command::Queue,
            ("status" | "s", []) => Command::Status,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ if COMMAND_NAMES.contains(&name.as_str()) => {
                return Err(ShellError::invalid_argument(&name, "wrong number of arguments"));
            }
            _ => return Err(ShellError::UnknownCommand(name)),
        };

        Ok(command)
    }
}

fn number<T: FromStr>(command: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ShellError::invalid_argument(command, format!("not a number: {}", value)))
}

/// 1-based position to index
fn position(command: &str, value: &str) -> Result<usize> {
    let n: usize = number(command, value)?;
    n.checked_sub(1)
        .ok_or_else(|| ShellError::invalid_argument(command, "positions start at 1"))
}

fn seek(command: &str, target: &str) -> Result<Command> {
    if let Some(percent) = target.strip_suffix('%') {
        let percent: f64 = number(command, percent)?;
        return Ok(Command::Player(Intent::SeekToFraction {
            fraction: percent / 100.0,
        }));
    }

    Ok(Command::Player(Intent::SeekTo {
        secs: number(command, target)?,
    }))
}
