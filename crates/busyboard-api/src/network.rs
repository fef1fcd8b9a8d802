//! # Trusted Network Predicate
//!
//! Membership check of a source address against a fixed list of CIDR
//! ranges loaded once at startup. Submissions from outside the ranges
//! are rejected before any store traffic.
//!
//! The matcher is implemented over `std::net::IpAddr` directly (v4
//! masking over `u32`, v6 over `u128`); a range never matches an
//! address of the other family.

use std::net::IpAddr;

use thiserror::Error;

/// A CIDR range string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid CIDR range {range:?}: {reason}")]
pub struct InvalidCidr {
    pub range: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy)]
struct CidrRange {
    network: IpAddr,
    prefix: u8,
}

impl CidrRange {
    fn parse(s: &str) -> Result<Self, InvalidCidr> {
        let invalid = |reason: &str| InvalidCidr {
            range: s.to_string(),
            reason: reason.to_string(),
        };

        let (addr, prefix) = s.split_once('/').ok_or_else(|| invalid("missing `/`"))?;
        let addr: IpAddr = addr.parse().map_err(|_| invalid("bad address"))?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid("bad prefix"))?;

        let max = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix > max {
            return Err(invalid("prefix out of range"));
        }

        // Canonicalize: zero out host bits so `192.168.1.1/24` behaves
        // as `192.168.1.0/24`.
        let network = match addr {
            IpAddr::V4(v4) => IpAddr::V4((u32::from(v4) & v4_mask(prefix)).into()),
            IpAddr::V6(v6) => IpAddr::V6((u128::from(v6) & v6_mask(prefix)).into()),
        };
        Ok(Self { network, prefix })
    }

    fn contains(&self, addr: IpAddr) -> bool {
        match (self.network, addr) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                u32::from(ip) & v4_mask(self.prefix) == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                u128::from(ip) & v6_mask(self.prefix) == u128::from(net)
            }
            _ => false,
        }
    }
}

fn v4_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    }
}

fn v6_mask(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - prefix)
    }
}

/// Immutable set of trusted CIDR ranges.
#[derive(Debug, Clone, Default)]
pub struct TrustedNetworks {
    ranges: Vec<CidrRange>,
}

impl TrustedNetworks {
    /// Parse a list of CIDR strings into a network set.
    pub fn from_cidrs<S: AsRef<str>>(cidrs: &[S]) -> Result<Self, InvalidCidr> {
        let ranges = cidrs
            .iter()
            .map(|s| CidrRange::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Append loopback and private ranges for local testing.
    pub fn with_local_ranges(mut self) -> Self {
        for cidr in ["127.0.0.0/8", "192.168.0.0/24", "192.168.1.0/24", "::1/128"] {
            // Fixed literals; parsing cannot fail.
            self.ranges
                .push(CidrRange::parse(cidr).expect("local range literal is valid"));
        }
        self
    }

    /// Whether the identity string parses as an address inside any range.
    /// Unparseable identities are not trusted.
    pub fn contains(&self, identity: &str) -> bool {
        let Ok(addr) = identity.parse::<IpAddr>() else {
            return false;
        };
        self.ranges.iter().any(|range| range.contains(addr))
    }

    /// Number of configured ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether no ranges are configured.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
