//! VMC IP segment allocator
//!
//! Bookkeeping for static API/ingress VIPs in the lab's vSphere network
//! segments. The Route53 hosted zone is the only durable state: an address is
//! reserved when some A record in the zone points at it.
//!
//! - [`segment`]: the static segment registry and the availability scanner
//! - [`ledger`]: point-in-time snapshot of reserved addresses
//! - [`mutator`]: reserve/release change batches
//! - [`selection`]: picking a segment with two free addresses
//! - [`install_config`]: rendering `install-config.yaml`
//! - [`preflight`]: ICMP probe of candidate VIPs
//!
//! Reads and writes are not coordinated. Two operators working the same
//! segment concurrently can be handed the same address; the later UPSERT wins.

pub mod error;
pub mod install_config;
pub mod ledger;
pub mod mutator;
pub mod preflight;
pub mod segment;
pub mod selection;

pub use error::IpamError;
pub use install_config::{InstallConfig, InstallSecrets};
pub use ledger::ReservationLedger;
pub use mutator::{Route, VipPair, ZoneMutator, record_name};
pub use preflight::{AddressProber, PingProber, ProbeOutcome, ensure_unused};
pub use segment::{Segment, SegmentKind, find_segment, segment_containing, segment_names, segments};
pub use selection::{Allocation, SegmentChoice, allocation_for_vips, candidate_segments, select_allocation};

/// Hosted zone holding the lab's cluster records
pub const DEFAULT_HOSTED_ZONE_ID: &str = "Z0355267XBPSF2ILEW5O";

/// DNS suffix of every cluster record
pub const DEFAULT_BASE_DOMAIN: &str = "vmc.devcluster.openshift.com";
