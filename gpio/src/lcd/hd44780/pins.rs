/// Pin number marking a data line as not connected.
pub const UNUSED_PIN: usize = 0;

/// Width of the parallel data bus.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusWidth {
    /// Only D4..D7 are wired, every byte is sent as two nibbles.
    FourBit,
    /// D0..D7 are wired.
    EightBit,
}

/// GPIO pin numbers wired to the controller.
///
/// The bus is 4 bits wide when `data0`..`data3` are all [UNUSED_PIN]. R/W is expected to be tied
/// to ground, the driver never reads from the controller.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PinAssignment {
    pub data0: usize,
    pub data1: usize,
    pub data2: usize,
    pub data3: usize,
    pub data4: usize,
    pub data5: usize,
    pub data6: usize,
    pub data7: usize,
    pub register_select: usize,
    pub enable: usize,
}

impl PinAssignment {
    /// Pins for a 4-bit bus, `data` being D4..D7.
    pub fn four_bit(register_select: usize, enable: usize, data: [usize; 4]) -> Self {
        let [data4, data5, data6, data7] = data;
        PinAssignment {
            data0: UNUSED_PIN,
            data1: UNUSED_PIN,
            data2: UNUSED_PIN,
            data3: UNUSED_PIN,
            data4,
            data5,
            data6,
            data7,
            register_select,
            enable,
        }
    }

    /// Pins for an 8-bit bus, `data` being D0..D7.
    pub fn eight_bit(register_select: usize, enable: usize, data: [usize; 8]) -> Self {
        let [data0, data1, data2, data3, data4, data5, data6, data7] = data;
        PinAssignment {
            data0,
            data1,
            data2,
            data3,
            data4,
            data5,
            data6,
            data7,
            register_select,
            enable,
        }
    }

    pub fn bus_width(&self) -> BusWidth {
        let low = [self.data0, self.data1, self.data2, self.data3];
        if low.iter().all(|&pin| pin == UNUSED_PIN) {
            BusWidth::FourBit
        } else {
            BusWidth::EightBit
        }
    }

    /// The data lines D0..D7 in bus order.
    pub(crate) fn data_lines(&self) -> [usize; 8] {
        [
            self.data0, self.data1, self.data2, self.data3,
            self.data4, self.data5, self.data6, self.data7,
        ]
    }

    /// The data lines actually wired for the bus width, LSb first: D4..D7 on a 4-bit bus.
    pub fn wired_data_lines(&self) -> Vec<usize> {
        let first = match self.bus_width() {
            BusWidth::FourBit => 4,
            BusWidth::EightBit => 0,
        };
        self.data_lines()[first..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_low_lines_select_the_4bit_bus() {
        let pins = PinAssignment::four_bit(17, 16, [21, 20, 19, 18]);
        assert_eq!(pins.bus_width(), BusWidth::FourBit);
        assert_eq!(pins.wired_data_lines(), vec![21, 20, 19, 18]);
    }

    #[test]
    fn any_wired_low_line_selects_the_8bit_bus() {
        let pins = PinAssignment::eight_bit(2, 3, [4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(pins.bus_width(), BusWidth::EightBit);
        assert_eq!(pins.wired_data_lines(), vec![4, 5, 6, 7, 8, 9, 10, 11]);

        let pins = PinAssignment {
            data2: 12,
            ..PinAssignment::four_bit(2, 3, [4, 5, 6, 7])
        };
        assert_eq!(pins.bus_width(), BusWidth::EightBit);
    }
}
