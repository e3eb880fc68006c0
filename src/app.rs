use std::io::{self, Write};

use tracing::{info, warn};

use crate::config::Pace;
use crate::game::{Game, MoveOutcome, Phase, QuitReason};
use crate::input::{InputSource, Key};
use crate::render;

/// Drives `game` from the welcome screen until it is won or quit.
/// Input failures end the game; only output errors are returned.
pub fn run<W: Write>(
    game: &mut Game,
    input: &mut (impl InputSource + ?Sized),
    out: &mut W,
    pace: &Pace,
) -> io::Result<Phase> {
    render::intro(out, pace)?;
    render::draw_welcome(out)?;
    while game.phase() == Phase::AwaitingStart {
        match input.read_key() {
            Ok(Key::Interrupt) => game.quit(QuitReason::Interrupted),
            Ok(_) => {
                game.start();
                // The rest of the line that started the game is not a move.
                input.discard_pending();
            }
            Err(err) => {
                warn!(%err, "input failed before start");
                game.quit(QuitReason::InputFailed);
            }
        }
    }

    while game.phase() == Phase::Playing {
        render::draw_frame(out, game, None)?;
        let key = match input.read_key() {
            Ok(key) => key,
            Err(err) => {
                warn!(%err, "input failed");
                game.quit(QuitReason::InputFailed);
                break;
            }
        };
        if let Some(MoveOutcome::Collected(letter)) = game.handle(key) {
            render::draw_frame(out, game, Some(letter))?;
            render::pause(out, pace.collect_pause)?;
        }
    }

    info!(phase = ?game.phase(), collected = game.collected().len(), "game over");
    Ok(game.phase())
}

/// Victory sequence or farewell, depending on how the game ended, then the
/// closing line.
pub fn finish<W: Write>(out: &mut W, phase: Phase, phrase: &str, pace: &Pace) -> io::Result<()> {
    match phase {
        Phase::Won => render::play_victory(out, phrase, pace)?,
        Phase::Quit(reason) => render::farewell(out, reason)?,
        Phase::AwaitingStart | Phase::Playing => return Ok(()),
    }
    render::sign_off(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{manual_lines, InterruptFlag, LineKeys, ScriptedKeys};
    use crate::maze::{Board, Grid, Pos};
    use std::collections::HashMap;
    use std::io::Cursor;

    fn small_game() -> Game {
        let grid = Grid::from_rows(&[
            "#####", //
            "#   #", //
            "# # #", //
            "#   #", //
            "#####",
        ]);
        let letters = HashMap::from([(Pos { x: 1, y: 3 }, 'A'), (Pos { x: 3, y: 1 }, 'B')]);
        Game::from_board(Board { grid, letters }, Pos { x: 1, y: 1 }).unwrap()
    }

    fn chars(keys: &str) -> Vec<Key> {
        keys.chars().map(Key::Char).collect()
    }

    fn text(buf: &[u8]) -> String {
        String::from_utf8_lossy(buf).into_owned()
    }

    #[test]
    fn plays_through_to_victory() {
        let mut game = small_game();
        let mut input = ScriptedKeys::new(chars(" sxswwdd"));
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Won);
        assert_eq!(game.collected(), ['A', 'B']);
        let screen = text(&out);
        assert!(screen.contains("Initializing MergeFund Word Quest..."));
        assert!(screen.contains("Press any key to start!"));
        assert!(screen.contains("Collected letter 'A'!"));
        assert!(screen.contains("Collected letter 'B'!"));

        let mut out: Vec<u8> = Vec::new();
        finish(&mut out, phase, "AB", &Pace::instant()).unwrap();
        let screen = text(&out);
        assert!(screen.contains("CONGRATULATIONS!"));
        assert!(screen.contains("Visit mergefund.org to learn more!"));
    }

    #[test]
    fn quit_straight_away() {
        let mut game = small_game();
        let mut input = ScriptedKeys::new(chars("sq"));
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Quit(QuitReason::Player));
        assert!(game.collected().is_empty());
        assert_eq!(game.player().pos, Pos { x: 1, y: 1 });
        assert!(text(&out).contains("Collected:  (0/2)"));

        let mut out: Vec<u8> = Vec::new();
        finish(&mut out, phase, "AB", &Pace::instant()).unwrap();
        let screen = text(&out);
        assert!(screen.contains("Thanks for playing!"));
        assert!(screen.contains("Visit mergefund.org to learn more!"));
    }

    #[test]
    fn broken_input_ends_gracefully() {
        let mut game = small_game();
        let mut input = ScriptedKeys::new(chars(" ss"));
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Quit(QuitReason::InputFailed));
        assert_eq!(game.collected(), ['A']);
    }

    #[test]
    fn interrupt_before_start() {
        let mut game = small_game();
        let mut input = ScriptedKeys::new([Key::Interrupt]);
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Quit(QuitReason::Interrupted));
    }

    #[test]
    fn line_input_until_end_of_stream() {
        let mut game = small_game();
        let mut input = LineKeys::spawn(Cursor::new("\nss\nzz\n"), InterruptFlag::default());
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Quit(QuitReason::Interrupted));
        assert_eq!(game.collected(), ['A']);
        assert_eq!(game.player().pos, Pos { x: 1, y: 3 });
    }

    #[test]
    fn signal_during_line_input_quits() {
        let interrupt = InterruptFlag::default();
        let (tx, mut input) = manual_lines(interrupt.clone());
        tx.send(Ok(Some("\n".to_string()))).unwrap();
        tx.send(Ok(Some("ss\n".to_string()))).unwrap();
        interrupt.raise();

        let mut game = small_game();
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Quit(QuitReason::Interrupted));
        assert_eq!(game.collected(), ['A']);
        drop(tx);

        let mut out: Vec<u8> = Vec::new();
        finish(&mut out, phase, "AB", &Pace::instant()).unwrap();
        assert!(text(&out).contains("Game interrupted"));
    }

    #[test]
    fn welcome_line_is_not_replayed_as_moves() {
        let mut game = small_game();
        let mut input = LineKeys::spawn(Cursor::new("sd\nd\n"), InterruptFlag::default());
        let mut out: Vec<u8> = Vec::new();
        let phase = run(&mut game, &mut input, &mut out, &Pace::instant()).unwrap();
        assert_eq!(phase, Phase::Quit(QuitReason::Interrupted));
        assert!(game.collected().is_empty());
        assert_eq!(game.player().pos, Pos { x: 2, y: 1 });
    }
}
