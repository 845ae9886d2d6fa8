use bitflags::bitflags;

bitflags! {
    #[derive(Default)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct Flags: u8 {
        const CARRY = 0b01;
        const ZERO = 0b10;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Op {
    Add,
    Sub,
}

impl Op {
    /// Selects the operation the way the adder's subtract line does.
    pub fn from_sub_line(sub: bool) -> Op {
        if sub {
            Op::Sub
        } else {
            Op::Add
        }
    }

    /// Returns the 8-bit result and the flags it would latch.
    pub fn execute(self, lhs: u8, rhs: u8) -> (u8, Flags) {
        match self {
            Op::Add => generic_8bit_math_op(lhs, rhs, |x, y| x + y),
            Op::Sub => generic_8bit_math_op(lhs, rhs, |x, y| x - y),
        }
    }
}

fn generic_8bit_math_op<F>(lhs: u8, rhs: u8, op: F) -> (u8, Flags)
where
    F: Fn(i32, i32) -> i32,
{
    let unmasked = op(i32::from(lhs), i32::from(rhs));
    let result = (unmasked & 0xFF) as u8;
    let mut flags = Flags::empty();
    flags.set(Flags::CARRY, !(0..=0xFF).contains(&unmasked));
    flags.set(Flags::ZERO, result == 0);
    (result, flags)
}
