//! Random bingo grids

use crate::error::{CardError, Result};
use rand::seq::index;
use rand::Rng;
use std::fmt;

/// Largest number a card may show
pub const MAX_VALUE: i32 = 999;

/// Side length of a square grid, 3 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize(u8);

impl GridSize {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 5;

    pub fn new(side: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&side) {
            Ok(Self(side))
        } else {
            Err(CardError::InvalidGridSize(side))
        }
    }

    pub fn side(self) -> usize {
        self.0 as usize
    }

    pub fn cells(self) -> usize {
        self.side() * self.side()
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(5)
    }
}

/// Column headings for a grid of the given size
pub fn header(size: GridSize) -> &'static [&'static str] {
    match size.0 {
        3 => &["BY", "N", "GO"],
        4 => &["B", "Y", "N", "GO"],
        _ => &["B", "Y", "N", "G", "O"],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Square {
    Number(u16),
    Free,
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Square::Number(n) => write!(f, "{n}"),
            Square::Free => f.write_str("FREE"),
        }
    }
}

/// Row-major square of distinct numbers, optionally with one free space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    squares: Vec<Square>,
}

impl Grid {
    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Square]> {
        self.squares.chunks(self.size.side())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Square> {
        if row >= self.size.side() || col >= self.size.side() {
            return None;
        }
        self.squares.get(row * self.size.side() + col).copied()
    }

    /// Position of the free space, if the grid has one
    pub fn free_space(&self) -> Option<(usize, usize)> {
        let idx = self.squares.iter().position(|s| *s == Square::Free)?;
        Some((idx / self.size.side(), idx % self.size.side()))
    }

    pub fn numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.squares.iter().filter_map(|s| match s {
            Square::Number(n) => Some(*n),
            Square::Free => None,
        })
    }
}

/// Fill a grid with distinct values drawn uniformly from `min..=max`.
pub fn generate_grid<R: Rng + ?Sized>(
    rng: &mut R,
    min: i32,
    max: i32,
    size: GridSize,
) -> Result<Grid> {
    if min >= max {
        return Err(CardError::MinNotBelowMax { min, max });
    }
    if min < 0 {
        return Err(CardError::NegativeMin(min));
    }
    if max > MAX_VALUE {
        return Err(CardError::MaxTooLarge(max));
    }

    let needed = size.cells();
    let span = (max - min + 1) as usize;
    if span < needed {
        return Err(CardError::RangeTooSmall { min, max, needed });
    }

    let squares = index::sample(rng, span, needed)
        .into_iter()
        .map(|offset| Square::Number((min as usize + offset) as u16))
        .collect();

    Ok(Grid { size, squares })
}

/// Replace one central number with a free space.
///
/// Odd grids use the exact centre. Even grids have no centre, so one of the
/// four middle squares is picked at random.
pub fn add_free_space<R: Rng + ?Sized>(rng: &mut R, grid: &mut Grid) {
    let side = grid.size.side();
    let (row, col) = if side % 2 == 0 {
        let mid = side / 2;
        (rng.gen_range(mid - 1..=mid), rng.gen_range(mid - 1..=mid))
    } else {
        (side / 2, side / 2)
    };
    grid.squares[row * side + col] = Square::Free;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_grid_size_bounds() {
        assert!(GridSize::new(2).is_err());
        assert!(GridSize::new(6).is_err());
        assert_eq!(GridSize::new(4).unwrap().cells(), 16);
        assert_eq!(GridSize::default().cells(), 25);
    }

    #[test]
    fn test_header() {
        assert_eq!(header(GridSize::new(3).unwrap()), ["BY", "N", "GO"]);
        assert_eq!(header(GridSize::new(4).unwrap()), ["B", "Y", "N", "GO"]);
        assert_eq!(header(GridSize::new(5).unwrap()), ["B", "Y", "N", "G", "O"]);
    }

    #[test]
    fn test_generate_distinct_in_range() {
        let grid = generate_grid(&mut rng(), 1, 50, GridSize::default()).unwrap();
        let numbers: Vec<u16> = grid.numbers().collect();

        assert_eq!(numbers.len(), 25);
        assert!(numbers.iter().all(|n| (1..=50).contains(n)));
        assert_eq!(numbers.iter().collect::<HashSet<_>>().len(), 25);
        assert_eq!(grid.rows().count(), 5);
    }

    #[test]
    fn test_exact_range_uses_every_value() {
        let grid = generate_grid(&mut rng(), 10, 18, GridSize::new(3).unwrap()).unwrap();
        let mut numbers: Vec<u16> = grid.numbers().collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (10..=18).collect::<Vec<u16>>());
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = generate_grid(&mut rng(), 1, 99, GridSize::default()).unwrap();
        let b = generate_grid(&mut rng(), 1, 99, GridSize::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validation_order() {
        let size = GridSize::default();
        assert!(matches!(
            generate_grid(&mut rng(), 50, 50, size),
            Err(CardError::MinNotBelowMax { .. })
        ));
        assert!(matches!(
            generate_grid(&mut rng(), -5, 50, size),
            Err(CardError::NegativeMin(-5))
        ));
        assert!(matches!(
            generate_grid(&mut rng(), 1, 1000, size),
            Err(CardError::MaxTooLarge(1000))
        ));
        assert!(matches!(
            generate_grid(&mut rng(), 1, 20, size),
            Err(CardError::RangeTooSmall { needed: 25, .. })
        ));
    }

    #[test]
    fn test_free_space_odd_is_centre() {
        let mut grid = generate_grid(&mut rng(), 1, 50, GridSize::new(5).unwrap()).unwrap();
        add_free_space(&mut rng(), &mut grid);
        assert_eq!(grid.free_space(), Some((2, 2)));
        assert_eq!(grid.get(2, 2), Some(Square::Free));
        assert_eq!(grid.numbers().count(), 24);

        let mut small = generate_grid(&mut rng(), 1, 50, GridSize::new(3).unwrap()).unwrap();
        add_free_space(&mut rng(), &mut small);
        assert_eq!(small.free_space(), Some((1, 1)));
    }

    #[test]
    fn test_free_space_even_is_central() {
        let mut rng = rng();
        for _ in 0..50 {
            let mut grid = generate_grid(&mut rng, 1, 50, GridSize::new(4).unwrap()).unwrap();
            add_free_space(&mut rng, &mut grid);
            let (row, col) = grid.free_space().unwrap();
            assert!((1..=2).contains(&row));
            assert!((1..=2).contains(&col));
        }
    }
}
