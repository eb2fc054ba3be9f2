use rand::Rng;

/// Two six-sided dice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Roll {
    pub first: u8,
    pub second: u8,
}

impl Roll {

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            first: rng.gen_range(1..=6),
            second: rng.gen_range(1..=6),
        }
    }

    #[inline]
    pub fn total(self) -> usize {
        (self.first + self.second) as usize
    }

    #[inline]
    pub fn is_double(self) -> bool {
        self.first == self.second
    }

}
