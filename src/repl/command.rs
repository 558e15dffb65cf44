//! Parsing of the one-line commands the terminal front-end accepts.

use std::fmt;

use crate::core::{Action, Session, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Like,
    Pass,
    Matches,
    Discover,
    /// 1-based position in the match list.
    Chat(usize),
    Say(String),
    Back,
    Dream,
    Describe(String),
    Create,
    Wait,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadNumber(String),
    NoSuchMatch(usize),
    /// The open chat's match has not answered the last message yet.
    StillTyping(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "Type a command, or `help`."),
            CommandError::Unknown(word) => write!(f, "Unknown command `{word}`. Try `help`."),
            CommandError::MissingArgument(usage) => write!(f, "Usage: {usage}"),
            CommandError::BadNumber(arg) => write!(f, "`{arg}` is not a match number."),
            CommandError::NoSuchMatch(n) => write!(f, "There is no match #{n}."),
            CommandError::StillTyping(name) => {
                write!(f, "{name} is still typing. Try `wait` first.")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  like | l            like the current profile
  pass | p            pass on the current profile
  matches | m         list your matches
  discover | d        back to the deck
  chat <n>            open the conversation with match #n
  say <text>          send a message in the open chat
  back                leave the chat
  dream               describe a dream match
  describe <text>     set the dream match description
  create              generate the dream match
  wait                wait for pending requests
  help | quit";

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Err(CommandError::Empty),
            "like" | "l" => Command::Like,
            "pass" | "p" => Command::Pass,
            "matches" | "m" => Command::Matches,
            "discover" | "d" => Command::Discover,
            "chat" | "c" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("chat <n>"));
                }
                let n: usize = rest
                    .parse()
                    .map_err(|_| CommandError::BadNumber(rest.to_string()))?;
                if n == 0 {
                    return Err(CommandError::BadNumber(rest.to_string()));
                }
                Command::Chat(n)
            }
            "say" | "s" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("say <text>"));
                }
                Command::Say(rest.to_string())
            }
            "back" | "b" => Command::Back,
            "dream" => Command::Dream,
            "describe" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("describe <text>"));
                }
                Command::Describe(rest.to_string())
            }
            "create" => Command::Create,
            "wait" | "w" => Command::Wait,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }

    /// Maps a command onto the session action it stands for.
    /// `Wait`, `Help` and `Quit` are handled by the loop and map to nothing.
    pub fn to_action(&self, session: &Session) -> Result<Option<Action>, CommandError> {
        let action = match self {
            Command::Like => Action::Like,
            Command::Pass => Action::Pass,
            Command::Matches => Action::SetView(View::Matches),
            Command::Discover => Action::SetView(View::Discover),
            Command::Chat(n) => {
                let profile = n
                    .checked_sub(1)
                    .and_then(|i| session.matches.get(i))
                    .ok_or(CommandError::NoSuchMatch(*n))?;
                Action::OpenChat(profile.id.clone())
            }
            Command::Say(text) => {
                if let Some(active) = session.active_match()
                    && session.pending_replies.contains(&active.id)
                {
                    return Err(CommandError::StillTyping(active.name.clone()));
                }
                Action::SendMessage(text.clone())
            }
            Command::Back => Action::BackToMatches,
            Command::Dream => Action::ToggleCreateMatch,
            Command::Describe(text) => Action::SetDreamPrompt(text.clone()),
            Command::Create => Action::CreateDreamMatch,
            Command::Wait | Command::Help | Command::Quit => return Ok(None),
        };
        Ok(Some(action))
    }
}
