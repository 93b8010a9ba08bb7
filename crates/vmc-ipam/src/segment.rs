//! Network segment registry and availability scanner
//!
//! Each segment is a /24 whose low addresses are handed out statically and
//! whose upper part belongs to DHCP. The first three addresses of every
//! segment are infrastructure (network, gateway, and one more), so the usable
//! static range is `[base + 3, dhcp_start)`.

use crate::ledger::ReservationLedger;
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;

/// Addresses at the start of every segment that are never handed out
pub const RESERVED_PREFIX_LEN: u32 = 3;

const DISCONNECTED_MARKER: &str = "-disconnected";

/// Public segments route to the internet; disconnected ones do not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Routes to the internet
    Public,
    /// Isolated from the internet
    Disconnected,
}

/// A statically configured network segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: &'static str,
    network: Ipv4Net,
    dhcp_start: Ipv4Addr,
}

impl Segment {
    /// Define a segment
    pub const fn new(name: &'static str, network: Ipv4Net, dhcp_start: Ipv4Addr) -> Self {
        Self {
            name,
            network,
            dhcp_start,
        }
    }

    /// Segment name, as used by vSphere
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// CIDR block
    pub fn network(&self) -> Ipv4Net {
        self.network
    }

    /// First address of the DHCP range
    pub fn dhcp_start(&self) -> Ipv4Addr {
        self.dhcp_start
    }

    /// Kind derived from the naming convention
    pub fn kind(&self) -> SegmentKind {
        if self.name.contains(DISCONNECTED_MARKER) {
            SegmentKind::Disconnected
        } else {
            SegmentKind::Public
        }
    }

    /// Whether `ip` lies inside this segment's CIDR block
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.network.contains(&ip)
    }

    /// Whether `ip` lies in the static range `[base + 3, dhcp_start)`
    pub fn is_static(&self, ip: Ipv4Addr) -> bool {
        let first = u32::from(self.network.network()).saturating_add(RESERVED_PREFIX_LEN);
        (first..u32::from(self.dhcp_start)).contains(&u32::from(ip))
    }

    /// Every address usable for static assignment, ascending
    ///
    /// Empty when the DHCP range starts within three addresses of the base.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + Clone {
        let first = u32::from(self.network.network()).saturating_add(RESERVED_PREFIX_LEN);
        let end = u32::from(self.dhcp_start);
        (first..end).map(Ipv4Addr::from)
    }

    /// Usable addresses with no record in the ledger, ascending
    pub fn available<'a>(&'a self, ledger: &'a ReservationLedger) -> impl Iterator<Item = Ipv4Addr> + 'a {
        self.hosts().filter(move |ip| !ledger.contains(*ip))
    }

    /// Usable addresses that are reserved, with the record name claiming each
    pub fn reserved<'a>(
        &'a self,
        ledger: &'a ReservationLedger,
    ) -> impl Iterator<Item = (Ipv4Addr, &'a str)> + 'a {
        self.hosts()
            .filter_map(move |ip| ledger.get(ip).map(|name| (ip, name)))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, DHCP from {})", self.name, self.network, self.dhcp_start)
    }
}

const fn lab_segment(name: &'static str, third_octet: u8, dhcp_start: u8) -> Segment {
    Segment::new(
        name,
        Ipv4Net::new_assert(Ipv4Addr::new(192, 168, third_octet, 0), 24),
        Ipv4Addr::new(192, 168, third_octet, dhcp_start),
    )
}

static SEGMENTS: [Segment; 14] = [
    lab_segment("devqe-segment-221", 221, 128),
    lab_segment("devqe-segment-222", 222, 50),
    lab_segment("devqe-segment-223", 223, 50),
    lab_segment("devqe-segment-224", 224, 50),
    lab_segment("devqe-segment-225", 225, 50),
    lab_segment("devqe-segment-226", 226, 50),
    lab_segment("devqe-segment-227", 227, 50),
    lab_segment("devqe-segment-228", 228, 50),
    lab_segment("devqe-segment-229-disconnected", 229, 128),
    lab_segment("devqe-segment-230-disconnected", 230, 128),
    lab_segment("devqe-segment-231-disconnected", 231, 128),
    lab_segment("devqe-segment-232-disconnected", 232, 128),
    lab_segment("devqe-segment-233-disconnected", 233, 128),
    lab_segment("devqe-segment-234-disconnected", 234, 128),
];

/// All registry segments, in table order
pub fn segments() -> &'static [Segment] {
    &SEGMENTS
}

/// Names of all registry segments, in table order
pub fn segment_names() -> impl Iterator<Item = &'static str> {
    SEGMENTS.iter().map(Segment::name)
}

/// Look up a segment by name
pub fn find_segment(name: &str) -> Option<&'static Segment> {
    SEGMENTS.iter().find(|segment| segment.name == name)
}

/// The registry segment whose CIDR block contains `ip`
pub fn segment_containing(ip: Ipv4Addr) -> Option<&'static Segment> {
    SEGMENTS.iter().find(|segment| segment.contains(ip))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment_221() -> &'static Segment {
        find_segment("devqe-segment-221").unwrap()
    }

    #[test]
    fn test_empty_ledger_yields_whole_usable_range() {
        let ledger = ReservationLedger::new();
        let available: Vec<Ipv4Addr> = segment_221().available(&ledger).collect();

        assert_eq!(available.len(), 125);
        assert_eq!(available.first(), Some(&Ipv4Addr::new(192, 168, 221, 3)));
        assert_eq!(available.last(), Some(&Ipv4Addr::new(192, 168, 221, 127)));
        assert!(available.windows(2).all(|w| u32::from(w[0]) + 1 == u32::from(w[1])));
    }

    #[test]
    fn test_reserved_address_is_skipped() {
        let mut ledger = ReservationLedger::new();
        ledger.insert(Ipv4Addr::new(192, 168, 221, 3), "x");

        let mut available = segment_221().available(&ledger);
        assert_eq!(available.next(), Some(Ipv4Addr::new(192, 168, 221, 4)));
        assert_eq!(segment_221().available(&ledger).count(), 124);
    }

    #[test]
    fn test_available_stays_in_usable_range() {
        let mut ledger = ReservationLedger::new();
        // Entries outside the usable range must not matter
        ledger.insert(Ipv4Addr::new(192, 168, 222, 1), "gateway");
        ledger.insert(Ipv4Addr::new(192, 168, 222, 60), "dhcp-lease");
        ledger.insert(Ipv4Addr::new(192, 168, 222, 10), "api.demo");

        for segment in segments() {
            let base = u32::from(segment.network().network());
            let dhcp = u32::from(segment.dhcp_start());
            for ip in segment.available(&ledger) {
                let value = u32::from(ip);
                assert!(value >= base + 3, "{ip} below usable range of {segment}");
                assert!(value < dhcp, "{ip} at or above DHCP start of {segment}");
                assert!(!ledger.contains(ip));
                assert!(segment.hosts().any(|h| h == ip));
                assert!(segment.is_static(ip));
            }
        }
    }

    #[test]
    fn test_available_is_restartable() {
        let mut ledger = ReservationLedger::new();
        ledger.insert(Ipv4Addr::new(192, 168, 223, 5), "a");
        ledger.insert(Ipv4Addr::new(192, 168, 223, 7), "b");

        let segment = find_segment("devqe-segment-223").unwrap();
        let first: Vec<_> = segment.available(&ledger).collect();
        let second: Vec<_> = segment.available(&ledger).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 45);
    }

    #[test]
    fn test_dhcp_start_too_close_to_base() {
        let tiny = Segment::new(
            "tiny",
            Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 24),
            Ipv4Addr::new(10, 0, 0, 2),
        );
        assert_eq!(tiny.hosts().count(), 0);
        assert_eq!(tiny.available(&ReservationLedger::new()).count(), 0);

        assert!(!tiny.is_static(Ipv4Addr::new(10, 0, 0, 1)));

        let edge = Segment::new(
            "edge",
            Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 24),
            Ipv4Addr::new(10, 0, 0, 3),
        );
        assert_eq!(edge.hosts().count(), 0);
    }

    #[test]
    fn test_reserved_lists_claims_in_order() {
        let mut ledger = ReservationLedger::new();
        ledger.insert(Ipv4Addr::new(192, 168, 221, 9), "*.apps.demo.example.com.");
        ledger.insert(Ipv4Addr::new(192, 168, 221, 8), "api.demo.example.com.");
        ledger.insert(Ipv4Addr::new(192, 168, 221, 200), "dhcp-range.example.com.");

        let reserved: Vec<_> = segment_221().reserved(&ledger).collect();
        assert_eq!(
            reserved,
            vec![
                (Ipv4Addr::new(192, 168, 221, 8), "api.demo.example.com."),
                (Ipv4Addr::new(192, 168, 221, 9), "*.apps.demo.example.com."),
            ]
        );
    }

    #[test]
    fn test_registry_is_consistent() {
        assert_eq!(segments().len(), 14);
        for segment in segments() {
            assert!(segment.contains(segment.dhcp_start()), "{segment}");
            assert!(segment.hosts().count() >= 2, "{segment}");
        }
        let disconnected = segments()
            .iter()
            .filter(|s| s.kind() == SegmentKind::Disconnected)
            .count();
        assert_eq!(disconnected, 6);
        assert_eq!(
            segment_containing(Ipv4Addr::new(192, 168, 230, 17)).map(Segment::name),
            Some("devqe-segment-230-disconnected")
        );
        assert!(segment_containing(Ipv4Addr::new(10, 0, 0, 1)).is_none());
        assert!(find_segment("devqe-segment-999").is_none());

        let s221 = segment_221();
        for (last, expected) in [(2, false), (3, true), (127, true), (128, false), (255, false)] {
            assert_eq!(s221.is_static(Ipv4Addr::new(192, 168, 221, last)), expected, ".{last}");
        }
        assert!(!s221.is_static(Ipv4Addr::new(192, 168, 222, 10)));
    }
}
