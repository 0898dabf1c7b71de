use std::str::FromStr;

use cheerleader_controls::{ExitSender, PlaylistReceiver, VolumeReceiver, controls::Controls};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::format_duration;

const VOLUME_STEP: f32 = 0.1;

const HELP: &str = "\
p      play / pause
n      next track
b      previous track
s      stop
+ -    volume up / down
f r    jump forward / backward
l      list the playlist
j <N>  jump to track N
d <N>  remove track N
h      this help
q      quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    PlayPause,
    Next,
    Previous,
    Stop,
    VolumeUp,
    VolumeDown,
    JumpForward,
    JumpBackward,
    List,
    SkipTo(usize),
    Remove(usize),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(key) = words.next() else {
            return Err("Empty command".to_string());
        };

        let index = |words: &mut std::str::SplitWhitespace| {
            words
                .next()
                .and_then(|word| word.parse::<usize>().ok())
                .ok_or_else(|| format!("'{key}' needs a track number"))
        };

        let command = match key {
            "p" => Self::PlayPause,
            "n" => Self::Next,
            "b" => Self::Previous,
            "s" => Self::Stop,
            "+" => Self::VolumeUp,
            "-" => Self::VolumeDown,
            "f" => Self::JumpForward,
            "r" => Self::JumpBackward,
            "l" => Self::List,
            "j" => Self::SkipTo(index(&mut words)?),
            "d" => Self::Remove(index(&mut words)?),
            "h" | "?" => Self::Help,
            "q" => Self::Quit,
            other => return Err(format!("Unknown command '{other}', h for help")),
        };

        Ok(command)
    }
}

/// Reads commands from stdin until `q` or end of input, then asks every
/// task to exit.
pub(crate) async fn run(
    controls: Controls,
    playlist: PlaylistReceiver,
    volume: VolumeReceiver,
    exit_sender: ExitSender,
) {
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "unable to read console input");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => execute(command, &controls, &playlist, &volume),
            Err(message) => println!("{message}"),
        }
    }

    debug!("console closed");
    let _ = exit_sender.send(true);
}

fn execute(
    command: Command,
    controls: &Controls,
    playlist: &PlaylistReceiver,
    volume: &VolumeReceiver,
) {
    match command {
        Command::PlayPause => controls.play_pause(),
        Command::Next => controls.next(),
        Command::Previous => controls.previous(),
        Command::Stop => controls.stop(),
        Command::VolumeUp => controls.set_volume(*volume.borrow() + VOLUME_STEP),
        Command::VolumeDown => controls.set_volume(*volume.borrow() - VOLUME_STEP),
        Command::JumpForward => controls.jump_forward(),
        Command::JumpBackward => controls.jump_backward(),
        Command::SkipTo(index) => controls.skip_to(index),
        Command::Remove(index) => controls.remove_index(index),
        Command::List => {
            let playlist = playlist.borrow();
            if playlist.is_empty() {
                println!("Playlist is empty");
            }
            for (index, track) in playlist.tracks().iter().enumerate() {
                let marker = match playlist.current_index() == Some(index) {
                    true => ">",
                    false => " ",
                };
                println!(
                    "{marker}{index:>3}. {} - {} [{}]",
                    track.artist_name().unwrap_or("unknown"),
                    track.title,
                    format_duration(track.duration())
                );
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::Command;

    #[test]
    fn single_keys() {
        assert_eq!("p".parse(), Ok(Command::PlayPause));
        assert_eq!(" n ".parse(), Ok(Command::Next));
        assert_eq!("+".parse(), Ok(Command::VolumeUp));
        assert_eq!("q".parse(), Ok(Command::Quit));
    }

    #[test]
    fn commands_with_track_number() {
        assert_eq!("j 3".parse(), Ok(Command::SkipTo(3)));
        assert_eq!("d 0".parse(), Ok(Command::Remove(0)));
        assert!("j".parse::<Command>().is_err());
        assert!("d two".parse::<Command>().is_err());
    }

    #[test]
    fn unknown_command() {
        let err = "zz".parse::<Command>().unwrap_err();
        assert!(err.contains("zz"));
    }
}
