use bitfield::*;

/// Number of micro-step slots reserved for every opcode in the control ROM.
pub const STEPS_PER_OPCODE: u8 = 8;
/// Size of the control ROM in 16-bit words.
pub const ROM_WORDS: usize = 128;
/// Size of the control ROM image in bytes.
pub const ROM_BYTES: usize = ROM_WORDS * 2;

bitfield! {
    /// Control ROM address. The opcode selects a block of eight words, and the micro-step selects a
    /// word within the block.
    #[derive(Copy, Clone, PartialEq, Eq, Hash)]
    pub struct RomAddress(u16);
    impl Debug;
    u8;
    pub step, set_step: 2, 0;
    pub opcode, set_opcode: 10, 3;
}

impl RomAddress {
    pub fn new(opcode: u8, step: u8) -> RomAddress {
        debug_assert!(step < STEPS_PER_OPCODE, "Micro-step {} does not fit the address", step);
        let mut address = RomAddress(0);
        address.set_opcode(opcode);
        address.set_step(step);
        address
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// Word index into the ROM. Anything at or past `ROM_WORDS` is outside the authored image.
    pub fn word_index(self) -> usize {
        usize::from(self.0)
    }

    /// Index of the low byte of this word in the little-endian ROM image.
    pub fn byte_offset(self) -> usize {
        self.word_index() * 2
    }

    pub fn in_rom(self) -> bool {
        self.word_index() < ROM_WORDS
    }
}

impl From<RomAddress> for u16 {
    fn from(address: RomAddress) -> u16 {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_layout() {
        assert_eq!(RomAddress::new(0x00, 0).raw(), 0x000);
        assert_eq!(RomAddress::new(0x01, 0).raw(), 0x008);
        assert_eq!(RomAddress::new(0x06, 2).raw(), 0x032);
        assert_eq!(RomAddress::new(0x0F, 7).raw(), 0x07F);
        assert_eq!(RomAddress::new(0xFF, 7).raw(), 0x7FF);
    }

    #[test]
    fn test_fields_round_trip() {
        let address = RomAddress::new(0x0A, 5);
        assert_eq!(address.opcode(), 0x0A);
        assert_eq!(address.step(), 5);
    }

    #[test]
    fn test_rom_bounds() {
        assert!(RomAddress::new(0x0F, 7).in_rom());
        assert!(!RomAddress::new(0x10, 0).in_rom());
        assert_eq!(RomAddress::new(0x0F, 7).byte_offset(), ROM_BYTES - 2);
    }
}
