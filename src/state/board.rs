//! Board geometry and the randomized color layout applied when a game starts.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of rows and columns of a board.
pub const BOARD_SIZE: u8 = 6;
/// Number of cells painted with each color on a generated board.
pub const CELLS_PER_COLOR: usize = 9;

/// Colors a cell can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    /// Red cell.
    Red,
    /// Blue cell.
    Blue,
    /// Green cell.
    Green,
    /// Yellow cell.
    Yellow,
}

impl CellColor {
    /// Every color, in declaration order.
    pub const ALL: [CellColor; 4] = [
        CellColor::Red,
        CellColor::Blue,
        CellColor::Green,
        CellColor::Yellow,
    ];
}

/// Position and color of a single generated cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    /// Row index, `0..BOARD_SIZE`.
    pub row: u8,
    /// Column index, `0..BOARD_SIZE`.
    pub column: u8,
    /// Color drawn for this coordinate.
    pub color: CellColor,
}

/// Shuffle the color multiset and deal it onto the grid in row-major order.
///
/// The result always contains every coordinate exactly once and
/// [`CELLS_PER_COLOR`] cells of each color.
pub fn generate_layout<R: Rng + ?Sized>(rng: &mut R) -> Vec<CellPlacement> {
    let mut colors: Vec<CellColor> = CellColor::ALL
        .iter()
        .flat_map(|color| std::iter::repeat_n(*color, CELLS_PER_COLOR))
        .collect();
    colors.shuffle(rng);

    let coordinates =
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |column| (row, column)));

    coordinates
        .zip(colors)
        .map(|((row, column), color)| CellPlacement { row, column, color })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn layout_covers_every_coordinate_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let layout = generate_layout(&mut rng);

        assert_eq!(layout.len(), 36);
        let coordinates: HashSet<(u8, u8)> =
            layout.iter().map(|cell| (cell.row, cell.column)).collect();
        assert_eq!(coordinates.len(), 36);
        assert!(layout.iter().all(|cell| cell.row < 6 && cell.column < 6));
    }

    #[test]
    fn layout_uses_nine_cells_per_color() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut counts: HashMap<CellColor, usize> = HashMap::new();
            for cell in generate_layout(&mut rng) {
                *counts.entry(cell.color).or_default() += 1;
            }

            assert_eq!(counts.len(), 4);
            assert!(counts.values().all(|count| *count == CELLS_PER_COLOR));
        }
    }

    #[test]
    fn layout_is_dealt_in_row_major_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let layout = generate_layout(&mut rng);

        assert_eq!((layout[0].row, layout[0].column), (0, 0));
        assert_eq!((layout[5].row, layout[5].column), (0, 5));
        assert_eq!((layout[6].row, layout[6].column), (1, 0));
        assert_eq!((layout[35].row, layout[35].column), (5, 5));
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let first = generate_layout(&mut StdRng::seed_from_u64(3));
        let second = generate_layout(&mut StdRng::seed_from_u64(3));
        assert_eq!(first, second);
    }

    #[test]
    fn colors_serialize_lowercase() {
        let json = serde_json::to_string(&CellColor::Yellow).unwrap();
        assert_eq!(json, "\"yellow\"");
    }
}
