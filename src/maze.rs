use std::collections::{HashMap, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::{letters_of, GameConfig};
use crate::error::GenerateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// What to do about lattice cells the random carving left cut off from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Keep the carving as is. Some letters may be unreachable.
    AsCarved,
    /// Knock out separating walls until every open cell is reachable from the start.
    Repair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![cell; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    pub fn is_open(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Open)
    }

    fn set(&mut self, pos: Pos, cell: Cell) {
        self.cells[pos.y][pos.x] = cell;
    }

    /// The cell one step away in `dir`, if it lies inside the grid.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x.checked_add_signed(dx)?;
        let ny = pos.y.checked_add_signed(dy)?;
        if nx >= self.width || ny >= self.height {
            return None;
        }
        Some(Pos { x: nx, y: ny })
    }

    /// Open cells in row-major order.
    pub fn open_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[y][x] == Cell::Open {
                    cells.push(Pos { x, y });
                }
            }
        }
        cells
    }

    /// Builds a grid from text rows, `#` being wall and anything else open.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let cells: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| if c == '#' { Cell::Wall } else { Cell::Open })
                    .collect()
            })
            .collect();
        Self {
            width: cells.first().map_or(0, Vec::len),
            height: cells.len(),
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub grid: Grid,
    pub letters: HashMap<Pos, char>,
}

pub fn generate(config: &GameConfig, rng: &mut impl Rng) -> Result<Board, GenerateError> {
    config.validate()?;
    let mut grid = carve_lattice(config.width, config.height, config.open_chance, rng);
    if config.connectivity == Connectivity::Repair {
        ensure_connected(&mut grid, config.start);
    }
    let letters = place_letters(&grid, config.start, &letters_of(&config.phrase), rng)?;
    debug!(
        width = config.width,
        height = config.height,
        open = grid.open_cells().len(),
        letters = letters.len(),
        "generated maze"
    );
    Ok(Board { grid, letters })
}

/// Opens every odd cell inside the border, then opens the passage to the right
/// and the one below each of them with probability `open_chance`.
pub fn carve_lattice(width: usize, height: usize, open_chance: f64, rng: &mut impl Rng) -> Grid {
    let mut grid = Grid::filled(width, height, Cell::Wall);
    for y in (1..height.saturating_sub(1)).step_by(2) {
        for x in (1..width.saturating_sub(1)).step_by(2) {
            grid.set(Pos { x, y }, Cell::Open);
            if x + 1 < width - 1 && rng.gen_bool(open_chance) {
                grid.set(Pos { x: x + 1, y }, Cell::Open);
            }
            if y + 1 < height - 1 && rng.gen_bool(open_chance) {
                grid.set(Pos { x, y: y + 1 }, Cell::Open);
            }
        }
    }
    grid
}

/// Shuffles the free cells and hands them out to `letters` in order.
pub fn place_letters(
    grid: &Grid,
    start: Pos,
    letters: &[char],
    rng: &mut impl Rng,
) -> Result<HashMap<Pos, char>, GenerateError> {
    if !grid.is_open(start) {
        return Err(GenerateError::StartBlocked(start));
    }
    let mut candidates: Vec<Pos> = grid
        .open_cells()
        .into_iter()
        .filter(|&pos| pos != start)
        .collect();
    if candidates.len() < letters.len() {
        return Err(GenerateError::NotEnoughCells {
            needed: letters.len(),
            available: candidates.len(),
        });
    }
    candidates.shuffle(rng);
    Ok(candidates.into_iter().zip(letters.iter().copied()).collect())
}

pub fn ensure_connected(grid: &mut Grid, start: Pos) {
    if !grid.is_open(start) {
        return;
    }
    let mut reachable = flood(grid, start);
    let mut carved = 0;
    while has_unreachable(grid, &reachable) {
        let Some(pos) = find_bridge(grid, &reachable) else {
            break;
        };
        grid.set(pos, Cell::Open);
        carved += 1;
        reachable = flood(grid, start);
    }
    if carved > 0 {
        debug!(carved, "repaired maze connectivity");
    }
}

/// An interior wall with a reachable open cell on one side and an
/// unreachable one on another.
fn find_bridge(grid: &Grid, reachable: &[Vec<bool>]) -> Option<Pos> {
    for y in 1..grid.height - 1 {
        for x in 1..grid.width - 1 {
            let pos = Pos { x, y };
            if grid.is_open(pos) {
                continue;
            }
            let mut has_reach = false;
            let mut has_unreach = false;
            for dir in Dir::ALL {
                let Some(next) = grid.neighbor(pos, dir) else {
                    continue;
                };
                if !grid.is_open(next) {
                    continue;
                }
                if reachable[next.y][next.x] {
                    has_reach = true;
                } else {
                    has_unreach = true;
                }
            }
            if has_reach && has_unreach {
                return Some(pos);
            }
        }
    }
    None
}

pub fn flood(grid: &Grid, start: Pos) -> Vec<Vec<bool>> {
    let mut seen = vec![vec![false; grid.width]; grid.height];
    let mut q = VecDeque::new();
    seen[start.y][start.x] = true;
    q.push_back(start);
    while let Some(pos) = q.pop_front() {
        for dir in Dir::ALL {
            let Some(next) = grid.neighbor(pos, dir) else {
                continue;
            };
            if seen[next.y][next.x] || !grid.is_open(next) {
                continue;
            }
            seen[next.y][next.x] = true;
            q.push_back(next);
        }
    }
    seen
}

fn has_unreachable(grid: &Grid, reachable: &[Vec<bool>]) -> bool {
    grid.open_cells()
        .into_iter()
        .any(|pos| !reachable[pos.y][pos.x])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(width: usize, height: usize, phrase: &str) -> GameConfig {
        GameConfig {
            width,
            height,
            phrase: phrase.to_string(),
            ..GameConfig::default()
        }
    }

    #[test]
    fn border_stays_wall() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = carve_lattice(20, 15, 1.0, &mut rng);
        for x in 0..20 {
            assert_eq!(grid.get(Pos { x, y: 0 }), Some(Cell::Wall));
            assert_eq!(grid.get(Pos { x, y: 14 }), Some(Cell::Wall));
        }
        for y in 0..15 {
            assert_eq!(grid.get(Pos { x: 0, y }), Some(Cell::Wall));
            assert_eq!(grid.get(Pos { x: 19, y }), Some(Cell::Wall));
        }
    }

    #[test]
    fn zero_chance_leaves_isolated_lattice() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = carve_lattice(7, 7, 0.0, &mut rng);
        let open = grid.open_cells();
        assert_eq!(open.len(), 9);
        assert!(open.iter().all(|p| p.x % 2 == 1 && p.y % 2 == 1));
    }

    #[test]
    fn full_chance_opens_every_passage() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = carve_lattice(5, 5, 1.0, &mut rng);
        let expected = Grid::from_rows(&[
            "#####", //
            "#   #", //
            "# # #", //
            "#   #", //
            "#####",
        ]);
        assert_eq!(grid, expected);
    }

    #[test]
    fn neighbor_respects_bounds() {
        let grid = Grid::filled(3, 3, Cell::Open);
        assert_eq!(grid.neighbor(Pos { x: 0, y: 0 }, Dir::Up), None);
        assert_eq!(grid.neighbor(Pos { x: 0, y: 0 }, Dir::Left), None);
        assert_eq!(grid.neighbor(Pos { x: 2, y: 2 }, Dir::Right), None);
        assert_eq!(
            grid.neighbor(Pos { x: 1, y: 1 }, Dir::Down),
            Some(Pos { x: 1, y: 2 })
        );
    }

    #[test]
    fn repair_connects_isolated_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = carve_lattice(9, 7, 0.0, &mut rng);
        let start = Pos { x: 1, y: 1 };
        ensure_connected(&mut grid, start);
        let reach = flood(&grid, start);
        assert!(grid.open_cells().iter().all(|p| reach[p.y][p.x]));
    }

    #[test]
    fn as_carved_keeps_isolated_cells() {
        let cfg = GameConfig {
            width: 7,
            height: 7,
            phrase: "ABCDEFGH".to_string(),
            open_chance: 0.0,
            connectivity: Connectivity::AsCarved,
            ..GameConfig::default()
        };
        let board = generate(&cfg, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(board.grid.open_cells().len(), 9);
        assert_eq!(board.letters.len(), 8);
        let reach = flood(&board.grid, cfg.start);
        assert!(board.letters.keys().all(|p| !reach[p.y][p.x]));
    }

    #[test]
    fn same_seed_same_board() {
        let cfg = GameConfig::default();
        let a = generate(&cfg, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(&cfg, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn too_small_for_phrase() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate(&config(3, 3, "AB"), &mut rng).unwrap_err();
        assert_eq!(
            err,
            GenerateError::NotEnoughCells {
                needed: 2,
                available: 0
            }
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate(&config(20, 15, " "), &mut rng).unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
    }

    #[test]
    fn blocked_start_is_rejected() {
        let grid = Grid::from_rows(&["###", "# #", "###"]);
        let mut rng = StdRng::seed_from_u64(0);
        let err = place_letters(&grid, Pos { x: 0, y: 0 }, &['A'], &mut rng).unwrap_err();
        assert_eq!(err, GenerateError::StartBlocked(Pos { x: 0, y: 0 }));
    }

    proptest! {
        #[test]
        fn letters_land_on_free_open_cells(seed in any::<u64>()) {
            let cfg = GameConfig::default();
            let board = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(board.letters.len(), letters_of(&cfg.phrase).len());
            prop_assert!(!board.letters.contains_key(&cfg.start));
            for pos in board.letters.keys() {
                prop_assert!(board.grid.is_open(*pos));
            }
            let mut placed: Vec<char> = board.letters.values().copied().collect();
            let mut wanted = letters_of(&cfg.phrase);
            placed.sort_unstable();
            wanted.sort_unstable();
            prop_assert_eq!(placed, wanted);
        }

        #[test]
        fn repaired_maze_is_fully_reachable(seed in any::<u64>(), chance in 0.0f64..=1.0) {
            let cfg = GameConfig { open_chance: chance, ..GameConfig::default() };
            let board = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
            let reach = flood(&board.grid, cfg.start);
            for pos in board.grid.open_cells() {
                prop_assert!(reach[pos.y][pos.x], "unreachable {:?}", pos);
            }
        }
    }
}
