use std::io;

use anyhow::Context;
use letter_maze::config::GameConfig;
use letter_maze::game::Game;
use letter_maze::{app, input, logging};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = GameConfig::default();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(&config, &mut rng).context("failed to build the maze")?;

    let mut stdout = io::stdout();
    // Input owns the raw-mode guard; it is restored before the closing output.
    let phase = {
        let mut input = input::open();
        app::run(&mut game, input.as_mut(), &mut stdout, &config.pace)
            .context("failed to draw the game")?
    };
    app::finish(&mut stdout, phase, &config.phrase, &config.pace)
        .context("failed to draw the ending")?;
    Ok(())
}
