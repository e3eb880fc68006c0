use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::config::Pace;
use crate::game::{Game, QuitReason};
use crate::maze::Pos;

const TITLE: &str = "🎮 MERGEFUND WORD QUEST 🎮";
const FRAME_W: usize = 50;
const REVEAL_PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Letter(char),
    Wall,
    Empty,
}

fn glyph_for(game: &Game, pos: Pos) -> Glyph {
    if pos == game.player().pos {
        return Glyph::Player;
    }
    if let Some(letter) = game.letter_at(pos) {
        return Glyph::Letter(letter);
    }
    if game.grid().is_open(pos) {
        Glyph::Empty
    } else {
        Glyph::Wall
    }
}

fn draw_glyph(out: &mut impl Write, glyph: Glyph) -> io::Result<()> {
    let (ch, color) = match glyph {
        Glyph::Player => ('@', Color::Green),
        Glyph::Letter(letter) => (letter, Color::Red),
        Glyph::Wall => ('█', Color::White),
        Glyph::Empty => (' ', Color::Reset),
    };
    out.queue(SetForegroundColor(color))?;
    out.queue(Print(ch))?;
    Ok(())
}

/// Pads `text` to sit in the middle of `width` display columns.
pub fn center(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        return text.to_string();
    }
    let left = (width - w) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(width - w - left))
}

/// Writes whole lines top to bottom, one screen row each.
struct Painter<'a, W: Write> {
    out: &'a mut W,
    row: u16,
}

impl<'a, W: Write> Painter<'a, W> {
    fn clear(out: &'a mut W) -> io::Result<Self> {
        out.queue(Clear(ClearType::All))?;
        Ok(Self { out, row: 0 })
    }

    fn line(&mut self, color: Color, text: &str) -> io::Result<()> {
        self.out.queue(MoveTo(0, self.row))?;
        self.out.queue(SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        self.out.queue(ResetColor)?;
        self.row += 1;
        Ok(())
    }

    fn bold_line(&mut self, color: Color, text: &str) -> io::Result<()> {
        self.out.queue(SetAttribute(Attribute::Bold))?;
        self.line(color, text)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn blank(&mut self) {
        self.row += 1;
    }
}

pub fn intro(out: &mut impl Write, pace: &Pace) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    out.queue(Print("Initializing MergeFund Word Quest..."))?;
    pause(out, pace.intro)
}

pub fn draw_welcome(out: &mut impl Write) -> io::Result<()> {
    let mut painter = Painter::clear(out)?;
    painter.blank();
    painter.bold_line(Color::Cyan, "🎮 Welcome to MergeFund Word Quest! 🎮")?;
    painter.line(Color::Reset, "Collect all the letters scattered around the maze...")?;
    painter.line(
        Color::Reset,
        "Use WASD to move, Q to quit. Press any key to start!",
    )?;
    out.flush()
}

/// Full redraw of the playing screen. `collected` adds a notice under the legend.
pub fn draw_frame(out: &mut impl Write, game: &Game, collected: Option<char>) -> io::Result<()> {
    let mut painter = Painter::clear(out)?;
    painter.blank();
    painter.bold_line(Color::Cyan, &center(TITLE, FRAME_W))?;
    let letters: String = game.collected().iter().collect();
    let progress = format!(
        "Collected: {} ({}/{})",
        letters,
        game.collected().len(),
        game.total()
    );
    painter.bold_line(Color::Yellow, &center(&progress, FRAME_W))?;
    painter.line(Color::Reset, &"=".repeat(FRAME_W))?;

    let grid = game.grid();
    for y in 0..grid.height() {
        painter.out.queue(MoveTo(0, painter.row))?;
        for x in 0..grid.width() {
            draw_glyph(&mut *painter.out, glyph_for(game, Pos { x, y }))?;
        }
        painter.out.queue(ResetColor)?;
        painter.row += 1;
    }

    painter.line(Color::Reset, &"=".repeat(FRAME_W))?;
    painter.line(
        Color::Reset,
        "Controls: W(up) A(left) S(down) D(right) or arrows, Q(quit)",
    )?;
    painter.line(
        Color::Reset,
        &format!(
            "Collect all letters to reveal the secret message! ({} left)",
            game.remaining()
        ),
    )?;
    if let Some(letter) = collected {
        painter.blank();
        painter.bold_line(
            Color::Magenta,
            &format!("🎉 Collected letter '{}'! 🎉", letter),
        )?;
    }
    out.flush()
}

/// Flushes, then waits. Zero durations return immediately.
pub fn pause(out: &mut impl Write, delay: Duration) -> io::Result<()> {
    out.flush()?;
    if !delay.is_zero() {
        thread::sleep(delay);
    }
    Ok(())
}

pub fn play_victory(out: &mut impl Write, phrase: &str, pace: &Pace) -> io::Result<()> {
    let banner = [
        "🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉",
        "🎊         CONGRATULATIONS!        🎊",
        "🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉",
    ];
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    out.queue(SetAttribute(Attribute::Bold))?;
    for line in banner {
        out.queue(SetForegroundColor(Color::Yellow))?;
        out.queue(Print(format!("{}\n", center(line, 60))))?;
        pause(out, pace.banner_line)?;
    }
    out.queue(Print("\n"))?;

    for _ in 0..3 {
        out.queue(ResetColor)?;
        out.queue(Print(" ".repeat(20)))?;
        for (i, ch) in phrase.chars().enumerate() {
            out.queue(SetForegroundColor(REVEAL_PALETTE[i % REVEAL_PALETTE.len()]))?;
            out.queue(Print(ch))?;
            pause(out, pace.reveal_char)?;
        }
        out.queue(Print("\n\n"))?;
        pause(out, pace.reveal_pause)?;
    }

    let closing = [
        "🚀 You've successfully completed the MergeFund Quest! 🚀",
        "💰 Welcome to the MergeFund ecosystem! 💰",
        "🏆 Thanks for playing! 🏆",
    ];
    for line in closing {
        out.queue(SetForegroundColor(Color::Cyan))?;
        out.queue(Print(format!("{}\n", center(line, 70))))?;
        pause(out, pace.closing_line)?;
    }
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(ResetColor)?;
    out.flush()
}

pub fn farewell(out: &mut impl Write, reason: QuitReason) -> io::Result<()> {
    let msg = match reason {
        QuitReason::Player => "Thanks for playing! 👋",
        QuitReason::Interrupted => "Game interrupted. Thanks for playing! 👋",
        QuitReason::InputFailed => "Lost the keyboard. Thanks for playing! 👋",
    };
    out.queue(ResetColor)?;
    out.queue(Print(format!("\n{}\n", msg)))?;
    out.flush()
}

/// Last line after any ending.
pub fn sign_off(out: &mut impl Write) -> io::Result<()> {
    out.queue(SetForegroundColor(Color::Yellow))?;
    out.queue(Print("\n🌟 Visit mergefund.org to learn more! 🌟\n"))?;
    out.queue(ResetColor)?;
    out.flush()
}
