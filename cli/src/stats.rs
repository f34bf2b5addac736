use std::io::Write;

use chrono::{DateTime, Utc};
use merge1024_protocol::{GameStats, PlayerId, StatsOrder};
use merge1024_store::StatsStore;

use crate::play::format_play_time;

/// Prints the player's aggregates followed by their game history.
pub fn print_stats<W: Write>(
    store: &StatsStore,
    player: &PlayerId,
    order: StatsOrder,
    output: &mut W,
) -> anyhow::Result<()> {
    let Some(profile) = store.profile(player) else {
        writeln!(output, "No games played yet")?;
        return Ok(());
    };

    writeln!(output, "Player: {}", profile.player)?;
    writeln!(output, "Total games: {}", profile.total_games)?;
    writeln!(output, "Average steps: {:.1}", profile.average_steps)?;
    writeln!(output)?;

    for game in store.history(player, order) {
        writeln!(output, "{}", format_game(&game))?;
    }
    Ok(())
}

pub fn format_game(game: &GameStats) -> String {
    let outcome = if game.won { "Victory!" } else { "Game Over" };
    let when = DateTime::<Utc>::from_timestamp_millis(game.timestamp_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown date".to_owned());

    let mut line = format!(
        "{when}  {outcome:<9}  board {size}x{size}  steps {steps:>4}  max {max:>5}",
        size = game.board_size,
        steps = game.steps,
        max = game.max_score,
    );
    if game.play_time_seconds > 0 {
        line.push_str(&format!("  time {}", format_play_time(game.play_time_seconds)));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use merge1024_protocol::StatsUpload;

    fn game(steps: u32, won: bool, timestamp_ms: i64, play_time_seconds: u64) -> GameStats {
        GameStats {
            steps,
            board_size: 4,
            won,
            max_score: if won { 1024 } else { 256 },
            timestamp_ms,
            play_time_seconds,
        }
    }

    #[test]
    fn format_game_line() {
        let line = format_game(&game(120, true, 0, 125));

        assert_eq!(
            line,
            "1970-01-01 00:00  Victory!   board 4x4  steps  120  max  1024  time 2:05"
        );
    }

    #[test]
    fn zero_play_time_is_omitted() {
        assert!(!format_game(&game(3, false, 0, 0)).contains("time"));
    }

    #[test]
    fn prints_profile_and_sorted_history() {
        let ann = PlayerId::new("ann");
        let mut store = StatsStore::new();
        for (steps, timestamp_ms) in [(30, 1_000), (10, 2_000)] {
            store.record(StatsUpload {
                player: ann.clone(),
                stats: game(steps, false, timestamp_ms, 0),
            });
        }
        let mut output = Vec::new();

        print_stats(&store, &ann, StatsOrder::StepsAscending, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Total games: 2"));
        assert!(text.contains("Average steps: 20.0"));
        let ten = text.find("steps   10").unwrap();
        let thirty = text.find("steps   30").unwrap();
        assert!(ten < thirty);
    }

    #[test]
    fn unknown_player_has_no_games() {
        let mut output = Vec::new();

        print_stats(&StatsStore::new(), &PlayerId::new("x"), StatsOrder::Newest, &mut output)
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "No games played yet\n");
    }
}
