use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::{Instant, SystemTime, UNIX_EPOCH};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Serializable state of a session, enough to resume it later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub settings: GameSettings,
    pub board: Board,
    pub move_count: u32,
    pub state: GameState,
    pub play_time_seconds: u64,
}

/// Owns the grid of a single game and applies swipes to it.
///
/// The engine is synchronous and single-owner; share it behind a mutex if
/// several threads need it. Finished sessions are reported once through the
/// [`StatsSink`].
#[derive(Debug)]
pub struct MergeEngine<S = RandomTileSpawner, K = NullSink> {
    settings: GameSettings,
    board: Board,
    move_count: u32,
    state: GameState,
    started_at: Instant,
    player: Option<PlayerId>,
    last_stats: Option<GameStats>,
    finished_after: Option<u64>,
    spawner: S,
    sink: K,
}

impl MergeEngine {
    /// Engine with a clock-seeded spawner and no stats reporting.
    pub fn with_settings(settings: GameSettings) -> Self {
        Self::new(settings, RandomTileSpawner::from_time(), NullSink)
    }
}

impl<S: TileSpawner, K: StatsSink> MergeEngine<S, K> {
    /// Creates an engine and starts the first game.
    pub fn new(settings: GameSettings, spawner: S, sink: K) -> Self {
        let mut engine = Self {
            settings,
            board: Board::new(settings.board_size()),
            move_count: 0,
            state: GameState::Playing,
            started_at: Instant::now(),
            player: None,
            last_stats: None,
            finished_after: None,
            spawner,
            sink,
        };
        engine.reset();
        engine
    }

    /// Resumes a previously saved session.
    ///
    /// The state is taken from the board: a `Playing` snapshot whose board is
    /// already won or stuck comes back finished, without being reported. A
    /// finished snapshot stays finished and is not reported again, but must
    /// agree with its board.
    pub fn restore(snapshot: SessionSnapshot, spawner: S, sink: K) -> Result<Self> {
        let SessionSnapshot {
            settings,
            board,
            move_count,
            state,
            play_time_seconds,
        } = snapshot;

        if board.size() != settings.board_size() || !board.is_valid() {
            return Err(GameError::InvalidBoardShape);
        }

        let state = match (state, board_state(&board, settings)) {
            (saved, found) if saved == found => saved,
            (GameState::Playing, found) => {
                log::warn!("saved session was already {:?}, not reporting it", found);
                found
            }
            (saved, _) => return Err(GameError::StateMismatch(saved)),
        };

        let now = Instant::now();
        let started_at = now
            .checked_sub(Duration::from_secs(play_time_seconds))
            .unwrap_or(now);

        log::debug!(
            "restored {0}x{0} session at move {1} ({2:?})",
            settings.board_size(),
            move_count,
            state
        );
        Ok(Self {
            settings,
            board,
            move_count,
            state,
            started_at,
            player: None,
            last_stats: None,
            finished_after: state.is_finished().then_some(play_time_seconds),
            spawner,
            sink,
        })
    }

    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Sets who finished sessions are reported for. Without a player, records
    /// are still produced but not submitted.
    pub fn set_player(&mut self, player: Option<PlayerId>) {
        self.player = player;
    }

    pub fn player(&self) -> Option<&PlayerId> {
        self.player.as_ref()
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn max_tile(&self) -> Tile {
        self.board.max_tile()
    }

    /// Record produced when the current session ended, if it has.
    pub fn last_stats(&self) -> Option<&GameStats> {
        self.last_stats.as_ref()
    }

    /// Seconds played, frozen once the session has ended.
    pub fn elapsed_secs(&self) -> u64 {
        self.finished_after
            .unwrap_or_else(|| self.started_at.elapsed().as_secs())
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            settings: self.settings,
            board: self.board.clone(),
            move_count: self.move_count,
            state: self.state,
            play_time_seconds: self.elapsed_secs(),
        }
    }

    /// Starts a new game with the current settings.
    pub fn reset(&mut self) {
        self.board = Board::new(self.settings.board_size());
        self.move_count = 0;
        self.state = GameState::Playing;
        self.started_at = Instant::now();
        self.last_stats = None;
        self.finished_after = None;

        self.spawner.spawn(&mut self.board);
        self.spawner.spawn(&mut self.board);
        log::debug!(
            "new {0}x{0} game, target {1}",
            self.settings.board_size(),
            self.settings.target_sum()
        );
    }

    /// Switches to a `new_size × new_size` board and starts a new game.
    ///
    /// # Panics
    ///
    /// `new_size` must be within `3..=7`; validate it with
    /// [`GameSettings::with_board_size`] first.
    pub fn resize(&mut self, new_size: BoardSize) {
        assert!(
            is_valid_board_size(new_size),
            "board size {new_size} is out of range"
        );
        self.board = Board::new(new_size);
        self.settings = GameSettings::new(new_size, self.settings.target_sum())
            .unwrap_or(self.settings);
        self.reset();
    }

    /// Replaces the settings, starting a new game if anything changed.
    ///
    /// Returns whether a new game was started.
    pub fn apply_settings(&mut self, settings: GameSettings) -> bool {
        if !settings.changed_from(&self.settings) {
            return false;
        }
        self.settings = settings;
        self.reset();
        true
    }

    /// Swipes every tile toward `direction`.
    ///
    /// Swipes that leave the board untouched are not counted and do not spawn.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.state.is_finished() {
            log::trace!("ignoring {:?}, game already ended", direction);
            return MoveOutcome::NoChange;
        }

        if !self.board.slide(direction) {
            log::trace!("{:?} changed nothing", direction);
            return MoveOutcome::NoChange;
        }

        self.move_count += 1;
        log::trace!("move {}: {:?}", self.move_count, direction);
        self.spawner.spawn(&mut self.board);

        match self.evaluate_terminal_state() {
            GameState::Playing => MoveOutcome::Moved,
            GameState::Won => MoveOutcome::Won,
            GameState::Lost => MoveOutcome::Lost,
        }
    }

    /// Checks for a win or a loss and reports the session when it ends.
    ///
    /// Calling this on a finished game only returns the state.
    pub fn evaluate_terminal_state(&mut self) -> GameState {
        if self.state.is_finished() {
            return self.state;
        }

        match board_state(&self.board, self.settings) {
            GameState::Playing => {}
            GameState::Won => self.end_game(true),
            GameState::Lost => self.end_game(false),
        }
        self.state
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        let play_time_seconds = self.started_at.elapsed().as_secs();
        self.finished_after = Some(play_time_seconds);
        let stats = GameStats {
            steps: self.move_count,
            board_size: self.settings.board_size(),
            won,
            max_score: self.board.max_tile(),
            timestamp_ms: unix_millis(),
            play_time_seconds,
        };
        self.last_stats = Some(stats);
        log::info!(
            "game {} after {} moves, max tile {}",
            if won { "won" } else { "lost" },
            stats.steps,
            stats.max_score
        );

        match &self.player {
            Some(player) => self.sink.submit(StatsUpload {
                player: player.clone(),
                stats,
            }),
            None => log::debug!("no player signed in, stats not submitted"),
        }
    }
}

/// Win takes precedence over loss when the target tile sits on a stuck board.
fn board_state(board: &Board, settings: GameSettings) -> GameState {
    if board.max_tile() >= settings.target_sum() {
        GameState::Won
    } else if !board.can_move() {
        GameState::Lost
    } else {
        GameState::Playing
    }
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis().try_into().unwrap_or(i64::MAX))
        .unwrap_or_default()
}
