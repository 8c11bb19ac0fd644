//! Ethernet hardware addresses.

use core::fmt::{self, Write};

/// Length of `aa:bb:cc:dd:ee:ff`.
pub const MAC_STRING_LEN: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }

    /// Group bit of the first octet.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Usable as a station address: unicast and not all zeros.
    pub fn is_valid_unicast(&self) -> bool {
        !self.is_zero() && !self.is_broadcast() && !self.is_multicast()
    }

    /// The address as U-Boot expects it in `ethaddr`.
    pub fn to_env_string(&self) -> heapless::String<MAC_STRING_LEN> {
        let mut s = heapless::String::new();
        let res = write!(s, "{self}");
        // Six two-digit octets and five colons always fit.
        debug_assert!(res.is_ok());
        s
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
