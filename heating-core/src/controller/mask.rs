use core::fmt;
use core::ops::BitAnd;

use crate::channel::ChannelId;

/// One bit per channel; bit *i* mirrors the channel at position *i*.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ChannelMask(u32);

impl ChannelMask {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, id: ChannelId) -> bool {
        self.0 & id.bit() != 0
    }

    pub fn insert(&mut self, id: ChannelId) {
        self.0 |= id.bit();
    }

    /// Highest-indexed channel present in the mask.
    #[must_use]
    pub fn highest(self) -> Option<ChannelId> {
        if self.is_empty() {
            return None;
        }
        let index = 31 - self.0.leading_zeros();
        ChannelId::from_index(index as usize)
    }
}

impl BitAnd for ChannelMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelMask({:#b})", self.0)
    }
}
