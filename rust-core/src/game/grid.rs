use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 网格坐标，允许越界一格的候选位置，因此使用有符号整数。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// 行进方向。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];

    pub fn opposite(self) -> Self {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Heading::Up => "up",
            Heading::Down => "down",
            Heading::Left => "left",
            Heading::Right => "right",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Heading {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Heading::Up),
            "down" => Ok(Heading::Down),
            "left" => Ok(Heading::Left),
            "right" => Ok(Heading::Right),
            _ => Err(()),
        }
    }
}

/// 参赛方。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Player,
    Ai,
}

impl Owner {
    pub fn cell(self) -> Cell {
        match self {
            Owner::Player => Cell::Player,
            Owner::Ai => Cell::Ai,
        }
    }
}

/// 单元格归属标记。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Player,
    Ai,
}

impl Cell {
    /// 渲染端使用的数值标记：0 空、1 玩家、2 AI。
    pub fn marker(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Player => 1,
            Cell::Ai => 2,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// N×N 的占用网格。单元格一旦被占用便不会回退。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grid {
    size: u16,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: u16) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size as usize * size as usize],
        }
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        let n = self.size as i32;
        at.x >= 0 && at.x < n && at.y >= 0 && at.y < n
    }

    fn index(&self, at: Coord) -> Option<usize> {
        if self.in_bounds(at) {
            Some(at.y as usize * self.size as usize + at.x as usize)
        } else {
            None
        }
    }

    /// 越界坐标返回 `None`。
    pub fn owner(&self, at: Coord) -> Option<Cell> {
        self.index(at).map(|idx| self.cells[idx])
    }

    /// 越界坐标视为已占用。
    pub fn occupied(&self, at: Coord) -> bool {
        self.owner(at).map_or(true, |cell| !cell.is_empty())
    }

    /// 写入归属。越界或已被占用时不做任何修改并返回 `false`。
    pub fn mark(&mut self, at: Coord, owner: Owner) -> bool {
        let Some(idx) = self.index(at) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        if !cell.is_empty() {
            return false;
        }
        *cell = owner.cell();
        true
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    pub fn markers(&self) -> Vec<u8> {
        self.cells.iter().map(|cell| cell.marker()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for heading in Heading::ALL {
            assert_ne!(heading, heading.opposite());
            assert_eq!(heading, heading.opposite().opposite());
            let (dx, dy) = heading.offset();
            let (ox, oy) = heading.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn bounds_cover_zero_to_size_exclusive() {
        let grid = Grid::new(40);
        assert!(grid.in_bounds(Coord::new(0, 0)));
        assert!(grid.in_bounds(Coord::new(39, 39)));
        assert!(!grid.in_bounds(Coord::new(40, 20)));
        assert!(!grid.in_bounds(Coord::new(-1, 20)));
        assert!(!grid.in_bounds(Coord::new(20, -1)));
        assert!(grid.occupied(Coord::new(40, 0)), "out of range reads as occupied");
        assert_eq!(grid.owner(Coord::new(0, 40)), None);
    }

    #[test]
    fn mark_never_overwrites_an_owned_cell() {
        let mut grid = Grid::new(8);
        let at = Coord::new(3, 4);
        assert!(grid.mark(at, Owner::Player));
        assert!(!grid.mark(at, Owner::Ai));
        assert_eq!(grid.owner(at), Some(Cell::Player));
        assert!(!grid.mark(Coord::new(8, 0), Owner::Ai));
        assert_eq!(grid.empty_count(), 63);
    }

    #[test]
    fn markers_are_row_major() {
        let mut grid = Grid::new(4);
        grid.mark(Coord::new(1, 2), Owner::Ai);
        let markers = grid.markers();
        assert_eq!(markers.len(), 16);
        assert_eq!(markers[2 * 4 + 1], 2);
        assert_eq!(markers.iter().filter(|&&m| m != 0).count(), 1);
    }

    #[test]
    fn heading_parses_case_insensitively() {
        assert_eq!("UP".parse::<Heading>(), Ok(Heading::Up));
        assert_eq!("right".parse::<Heading>(), Ok(Heading::Right));
        assert!("north".parse::<Heading>().is_err());
    }
}
