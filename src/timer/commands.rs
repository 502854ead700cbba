use super::Intent;

/// A line typed at the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  s, start, pause   start or pause the timer
  r, reset          reset the current interval
  m, mode, switch   switch between focus and break
  p, play, music    play or pause music
  n, next, skip     skip to the next track
  ?, help           show this help
  q, quit, exit     leave";

pub fn parse_command(line: &str) -> Option<Command> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" | "pause" => Command::Intent(Intent::ToggleTimer),
        "r" | "reset" => Command::Intent(Intent::Reset),
        "m" | "mode" | "switch" => Command::Intent(Intent::SwitchMode),
        "p" | "play" | "music" => Command::Intent(Intent::TogglePlayback),
        "n" | "next" | "skip" => Command::Intent(Intent::SkipTrack),
        "?" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}
