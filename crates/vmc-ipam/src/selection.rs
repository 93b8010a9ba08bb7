//! Choosing where a new cluster's VIPs come from

use crate::error::IpamError;
use crate::ledger::ReservationLedger;
use crate::mutator::VipPair;
use crate::segment::{self, Segment, SegmentKind};
use std::net::Ipv4Addr;
use tracing::debug;

/// Which segments a caller is willing to allocate from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SegmentChoice {
    /// Exactly this segment
    Named(String),
    /// Any disconnected segment
    Disconnected,
    /// Any public segment
    #[default]
    Public,
}

/// A segment plus the two addresses picked from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation<'a> {
    /// Segment the VIPs belong to
    pub segment: &'a Segment,
    /// The chosen API and ingress VIPs
    pub vips: VipPair,
}

/// Registry segments matching a choice, in table order
pub fn candidate_segments(choice: &SegmentChoice) -> Result<Vec<&'static Segment>, IpamError> {
    let kind = match choice {
        SegmentChoice::Named(name) => {
            return segment::find_segment(name)
                .map(|segment| vec![segment])
                .ok_or_else(|| IpamError::UnknownSegment(name.clone()));
        }
        SegmentChoice::Disconnected => SegmentKind::Disconnected,
        SegmentChoice::Public => SegmentKind::Public,
    };
    Ok(segment::segments()
        .iter()
        .filter(|segment| segment.kind() == kind)
        .collect())
}

/// First two free addresses of a segment, if it has two
pub fn first_free_pair(segment: &Segment, ledger: &ReservationLedger) -> Option<VipPair> {
    let mut available = segment.available(ledger);
    Some(VipPair::new(available.next()?, available.next()?))
}

/// First candidate with two free addresses
///
/// Segments with fewer than two free addresses are skipped. `None` means every
/// candidate is exhausted.
pub fn select_allocation<'a>(
    candidates: &[&'a Segment],
    ledger: &ReservationLedger,
) -> Option<Allocation<'a>> {
    candidates.iter().find_map(|&segment| match first_free_pair(segment, ledger) {
        Some(vips) => Some(Allocation { segment, vips }),
        None => {
            debug!("Skipping segment {}: it doesn't have two available IPs", segment.name());
            None
        }
    })
}

/// Allocation for operator-supplied VIPs
///
/// The segment is the one containing the API VIP. Both VIPs must be distinct
/// and inside that segment's static range.
pub fn allocation_for_vips(api: Ipv4Addr, ingress: Ipv4Addr) -> Result<Allocation<'static>, IpamError> {
    let vips = VipPair::try_from([api, ingress].as_slice())?;
    let segment = segment::segment_containing(api).ok_or(IpamError::UnknownAddress(api))?;
    if !segment.contains(ingress) {
        return Err(IpamError::SegmentMismatch { api, ingress });
    }
    if let Some(ip) = [api, ingress].into_iter().find(|ip| !segment.is_static(*ip)) {
        return Err(IpamError::OutsideStaticRange {
            ip,
            segment: segment.name().to_string(),
        });
    }
    Ok(Allocation { segment, vips })
}
