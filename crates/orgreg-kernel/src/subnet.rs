//! CIDR blocks and address membership.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

/// The overlay-network address space every node must live in.
pub const OVERLAY_SUBNET: &str = "fd79:7636:1f08:883d::/64";
const OVERLAY_NETWORK: Ipv6Addr = Ipv6Addr::new(0xfd79, 0x7636, 0x1f08, 0x883d, 0, 0, 0, 0);
const OVERLAY_PREFIX_LEN: u8 = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubnetParseError {
    #[error("subnet `{0}` is not in address/prefix-length form")]
    MissingPrefixLength(String),

    #[error("subnet `{0}` has an invalid network address")]
    InvalidAddress(String),

    #[error("subnet `{text}` has prefix length {len}, maximum is {max}")]
    PrefixLengthOutOfRange { text: String, len: String, max: u8 },
}

/// A network address plus prefix length, e.g. `fd79:7636:1f08:883d::/64`.
///
/// Host bits of the network address are cleared on construction, so
/// `10.1.2.3/8` and `10.0.0.0/8` are the same subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    network: IpAddr,
    prefix_len: u8,
}

impl Subnet {
    pub fn new(address: IpAddr, prefix_len: u8) -> Option<Self> {
        if prefix_len > max_prefix_len(address) {
            return None;
        }
        let network = match address {
            IpAddr::V4(v4) => IpAddr::V4((u32::from(v4) & v4_mask(prefix_len)).into()),
            IpAddr::V6(v6) => IpAddr::V6((u128::from(v6) & v6_mask(prefix_len)).into()),
        };
        Some(Self {
            network,
            prefix_len,
        })
    }

    /// The default overlay subnet ([`OVERLAY_SUBNET`]).
    pub fn overlay() -> Self {
        Self {
            network: IpAddr::V6(OVERLAY_NETWORK),
            prefix_len: OVERLAY_PREFIX_LEN,
        }
    }

    /// Whether `address` lies inside this subnet.
    ///
    /// Addresses of the other family are never members.
    pub fn contains(&self, address: IpAddr) -> bool {
        match (self.network, address) {
            (IpAddr::V4(network), IpAddr::V4(candidate)) => {
                u32::from(candidate) & v4_mask(self.prefix_len) == u32::from(network)
            }
            (IpAddr::V6(network), IpAddr::V6(candidate)) => {
                u128::from(candidate) & v6_mask(self.prefix_len) == u128::from(network)
            }
            _ => false,
        }
    }
}

fn max_prefix_len(address: IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    u32::MAX
        .checked_shl(32 - u32::from(prefix_len))
        .unwrap_or(0)
}

fn v6_mask(prefix_len: u8) -> u128 {
    u128::MAX
        .checked_shl(128 - u32::from(prefix_len))
        .unwrap_or(0)
}

impl FromStr for Subnet {
    type Err = SubnetParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let Some((address, len)) = text.split_once('/') else {
            return Err(SubnetParseError::MissingPrefixLength(text.to_string()));
        };
        let address: IpAddr = address
            .parse()
            .map_err(|_| SubnetParseError::InvalidAddress(text.to_string()))?;
        let max = max_prefix_len(address);
        let out_of_range = || SubnetParseError::PrefixLengthOutOfRange {
            text: text.to_string(),
            len: len.to_string(),
            max,
        };
        let prefix_len: u8 = len.parse().map_err(|_| out_of_range())?;
        Self::new(address, prefix_len).ok_or_else(out_of_range)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl Default for Subnet {
    fn default() -> Self {
        Self::overlay()
    }
}
