use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use merge1024_core::*;
use merge1024_store::{ChannelSink, UploadQueue};

/// Engine whose finished sessions are queued, never written in place.
pub type Engine = MergeEngine<RandomTileSpawner, ChannelSink>;

const HELP: &str = "\
commands:
  w/a/s/d, up/down/left/right   swipe
  n                             new game
  size N                        new game on an NxN board (3 to 7)
  target T                      new game with target T (power of two)
  save                          save the session for --resume
  q                             quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    NewGame,
    Resize(BoardSize),
    Target(Tile),
    Save,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        bail!("empty command");
    };
    let argument = words.next();

    let command = match (head.to_ascii_lowercase().as_str(), argument) {
        ("n" | "new", None) => Command::NewGame,
        ("size", Some(size)) => Command::Resize(size.parse().context("size must be a number")?),
        ("target", Some(target)) => {
            Command::Target(target.parse().context("target must be a number")?)
        }
        ("save", None) => Command::Save,
        ("h" | "help" | "?", None) => Command::Help,
        ("q" | "quit" | "exit", None) => Command::Quit,
        (direction, None) => Command::Move(
            direction
                .parse()
                .with_context(|| format!("unknown command {line:?}, try help"))?,
        ),
        _ => bail!("unknown command {line:?}, try help"),
    };
    Ok(command)
}

/// Interactive session over arbitrary input and output streams.
///
/// Stats queued by the engine are handed to `recorder` between commands.
pub struct Session<'a, K> {
    engine: Engine,
    uploads: UploadQueue,
    recorder: K,
    resume_path: Option<&'a Path>,
}

impl<'a, K: StatsSink> Session<'a, K> {
    pub fn new(
        engine: Engine,
        uploads: UploadQueue,
        recorder: K,
        resume_path: Option<&'a Path>,
    ) -> Self {
        Self {
            engine,
            uploads,
            recorder,
            resume_path,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn recorder(&self) -> &K {
        &self.recorder
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        self.render(&mut output)?;

        for line in input.lines() {
            let line = line.context("Could not read command")?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(err) => {
                    writeln!(output, "{err:#}")?;
                    continue;
                }
            };
            log::trace!("command: {:?}", command);

            if command == Command::Quit {
                break;
            }
            self.execute(command, &mut output)?;
            self.record_stats();
        }

        self.record_stats();
        self.save()?;
        Ok(())
    }

    fn record_stats(&mut self) {
        let recorded = self.uploads.drain_into(&mut self.recorder);
        if recorded > 0 {
            log::debug!("recorded {} finished game(s)", recorded);
        }
    }

    fn execute<W: Write>(&mut self, command: Command, output: &mut W) -> anyhow::Result<()> {
        match command {
            Command::Move(direction) => match self.engine.apply_move(direction) {
                MoveOutcome::NoChange if self.engine.is_finished() => {
                    writeln!(output, "The game is over, press n for a new one.")?;
                }
                MoveOutcome::NoChange => writeln!(output, "Nothing moved.")?,
                _ => self.render(output)?,
            },
            Command::NewGame => {
                self.engine.reset();
                self.render(output)?;
            }
            Command::Resize(size) => match self.engine.settings().with_board_size(size) {
                Ok(settings) => {
                    self.engine.resize(settings.board_size());
                    self.render(output)?;
                }
                Err(err) => writeln!(output, "{err}")?,
            },
            Command::Target(target) => match self.engine.settings().with_target_sum(target) {
                Ok(settings) => {
                    self.engine.apply_settings(settings);
                    self.render(output)?;
                }
                Err(err) => writeln!(output, "{err}")?,
            },
            Command::Save => match self.save()? {
                Some(path) => writeln!(output, "Saved to {}", path.display())?,
                None => writeln!(output, "Nowhere to save, start with --resume PATH")?,
            },
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn render<W: Write>(&self, output: &mut W) -> anyhow::Result<()> {
        let engine = &self.engine;
        writeln!(output)?;
        write!(output, "{}", engine.board())?;
        writeln!(
            output,
            "moves: {}  target: {}  time: {}",
            engine.move_count(),
            engine.settings().target_sum(),
            format_play_time(engine.elapsed_secs())
        )?;
        match engine.state() {
            GameState::Playing => {}
            GameState::Won => writeln!(output, "You won! Max tile {}.", engine.max_tile())?,
            GameState::Lost => writeln!(output, "No moves left. Max tile {}.", engine.max_tile())?,
        }
        Ok(())
    }

    fn save(&self) -> anyhow::Result<Option<PathBuf>> {
        let Some(path) = self.resume_path else {
            return Ok(None);
        };
        save_snapshot(path, &self.engine.snapshot())?;
        Ok(Some(path.to_path_buf()))
    }
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Option<SessionSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Could not read saved session {}", path.display()))?;
    let snapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Saved session {} is corrupt", path.display()))?;
    Ok(Some(snapshot))
}

pub fn save_snapshot(path: &Path, snapshot: &SessionSnapshot) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("Could not save session {}", path.display()))
}

/// `m:ss`, as shown next to each finished game.
pub fn format_play_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
