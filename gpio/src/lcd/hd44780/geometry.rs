/// Physical size of the display, in characters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DisplayGeometry {
    /// 16 columns, 2 rows.
    #[default]
    W16xH02,
    /// 20 columns, 4 rows.
    W20xH04,
}

impl DisplayGeometry {
    pub fn width(&self) -> u8 {
        match self {
            DisplayGeometry::W16xH02 => 16,
            DisplayGeometry::W20xH04 => 20,
        }
    }

    pub fn height(&self) -> u8 {
        match self {
            DisplayGeometry::W16xH02 => 2,
            DisplayGeometry::W20xH04 => 4,
        }
    }

    /// DDRAM address of the first character of each row.
    ///
    /// The controller only knows two lines, starting at `0x00` and `0x40`. A 4-row display shows
    /// the second half of the first line as row 2 and the second half of the second line as row 3:
    ///
    /// - Row 0 => 0x00, 0x01, 0x02...
    /// - Row 1 => 0x40, 0x41, 0x42...
    /// - Row 2 => 0x00 + width...
    /// - Row 3 => 0x40 + width...
    pub fn row_offsets(&self) -> [u8; 4] {
        let width = self.width();
        [0x00, 0x40, 0x00 + width, 0x40 + width]
    }
}
