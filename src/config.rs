use crate::ship::ShipClass;

pub const BOARD_SIZE: u8 = 10;
/// Number of cells on one board.
pub const CELL_COUNT: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipClass; NUM_SHIPS] = [
    ShipClass::new("Carrier", 5),
    ShipClass::new("Battleship", 4),
    ShipClass::new("Submarine", 3),
    ShipClass::new("Cruiser", 3),
    ShipClass::new("Destroyer", 2),
];

/// Total number of ship segments used in the standard configuration.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Row labels used by the `"C7"` key form.
pub const ROW_LETTERS: [char; BOARD_SIZE as usize] =
    ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Width of the ASCII length header that precedes every frame.
pub const FRAME_HEADER_LEN: usize = 10;

/// Port used by `host` and `join` when none is given.
pub const DEFAULT_PORT: u16 = 5555;

/// Largest frame body accepted or sent (1 MiB).
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Look up a ship class by its canonical name. Returns `None` if the name
/// does not match any class in [`SHIPS`].
pub fn ship_class(name: &str) -> Option<ShipClass> {
    SHIPS.iter().copied().find(|class| class.name() == name)
}
