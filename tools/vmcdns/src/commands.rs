//! Subcommand handlers
//!
//! Handlers write results to `out` and human status notes to `notes`, so the
//! binary can point them at stdout and stderr and tests at buffers.

use crate::cli::{Commands, InstallConfigArgs};
use crate::config::Config;
use crate::error::CliError;
use route53_client::Route53ClientTrait;
use serde::Serialize;
use std::io::Write;
use std::net::Ipv4Addr;
use tracing::{debug, info};
use vmc_ipam::{
    AddressProber, InstallConfig, InstallSecrets, IpamError, ReservationLedger, Segment, SegmentChoice,
    ZoneMutator, allocation_for_vips, candidate_segments, ensure_unused, find_segment, segments,
    select_allocation,
};

const RESERVED_NOTE: &str = "Your IP addresses have been reserved in the AWS hosted zone!";
const NOT_RESERVED_NOTE: &str =
    "Your IPs are not reserved! You may wish to run this command again with '--reserve your-cluster-name'";

/// Everything a handler needs besides its own arguments
pub struct Context<'a, C: ?Sized> {
    pub client: &'a C,
    pub config: &'a Config,
    pub prober: &'a dyn AddressProber,
    pub secrets: InstallSecrets,
    pub json: bool,
}

impl<C: ?Sized> std::fmt::Debug for Context<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ReservedEntry<'a> {
    ip: Ipv4Addr,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SegmentReservations<'a> {
    segment: &'static str,
    reserved: Vec<ReservedEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ChangeSummary<'a> {
    id: &'a str,
    status: &'a str,
}

/// Run one subcommand
pub async fn dispatch<C>(
    ctx: &Context<'_, C>,
    command: Commands,
    out: &mut dyn Write,
    notes: &mut dyn Write,
) -> Result<(), CliError>
where
    C: Route53ClientTrait + ?Sized,
{
    match command {
        Commands::Available { network, count } => available(ctx, &network, count, out).await,
        Commands::Reserved { network } => reserved(ctx, network.as_deref(), out).await,
        Commands::InstallConfig(args) => install_config(ctx, &args, out, notes).await,
        Commands::Release {
            api_vip,
            ingress_vip,
            cluster_name,
        } => release(ctx, api_vip, ingress_vip, &cluster_name, out, notes).await,
    }
}

async fn load_ledger<C>(ctx: &Context<'_, C>) -> Result<ReservationLedger, CliError>
where
    C: Route53ClientTrait + ?Sized,
{
    Ok(ReservationLedger::load(ctx.client, &ctx.config.hosted_zone_id, ctx.config.page_size).await?)
}

fn lookup_segment(name: &str) -> Result<&'static Segment, CliError> {
    find_segment(name).ok_or_else(|| IpamError::UnknownSegment(name.to_string()).into())
}

/// Print the free addresses of one segment, lowest first
pub async fn available<C>(
    ctx: &Context<'_, C>,
    network: &str,
    count: Option<usize>,
    out: &mut dyn Write,
) -> Result<(), CliError>
where
    C: Route53ClientTrait + ?Sized,
{
    let segment = lookup_segment(network)?;
    let ledger = load_ledger(ctx).await?;
    let free: Vec<Ipv4Addr> = segment
        .available(&ledger)
        .take(count.unwrap_or(usize::MAX))
        .collect();

    if ctx.json {
        serde_json::to_writer_pretty(&mut *out, &free)?;
        writeln!(out)?;
    } else {
        for ip in free {
            writeln!(out, "{ip}")?;
        }
    }
    Ok(())
}

/// Print reserved addresses with their record names, for one or all segments
pub async fn reserved<C>(ctx: &Context<'_, C>, network: Option<&str>, out: &mut dyn Write) -> Result<(), CliError>
where
    C: Route53ClientTrait + ?Sized,
{
    let selected: Vec<&'static Segment> = match network {
        Some(name) => vec![lookup_segment(name)?],
        None => segments().iter().collect(),
    };
    let ledger = load_ledger(ctx).await?;

    if ctx.json {
        let report: Vec<SegmentReservations<'_>> = selected
            .iter()
            .map(|segment| SegmentReservations {
                segment: segment.name(),
                reserved: segment
                    .reserved(&ledger)
                    .map(|(ip, name)| ReservedEntry { ip, name })
                    .collect(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    let headed = network.is_none();
    for segment in selected {
        if headed {
            writeln!(out, "\n{}:", segment.name())?;
        }
        for (ip, name) in segment.reserved(&ledger) {
            writeln!(out, "{ip}\t{name}")?;
        }
    }
    Ok(())
}

/// Pick two VIPs, optionally reserve them, and render `install-config.yaml`
pub async fn install_config<C>(
    ctx: &Context<'_, C>,
    args: &InstallConfigArgs,
    out: &mut dyn Write,
    notes: &mut dyn Write,
) -> Result<(), CliError>
where
    C: Route53ClientTrait + ?Sized,
{
    let mut secrets = ctx.secrets.clone();
    if let Some(path) = &args.pull_secret {
        secrets.load_pull_secret(path)?;
    }
    if let Some(path) = &args.ssh_key {
        secrets.load_ssh_key(path)?;
    }

    let allocation = match (args.api_vip, args.ingress_vip) {
        (Some(api), Some(ingress)) => {
            let allocation = allocation_for_vips(api, ingress)?;
            ensure_unused(ctx.prober, &[api, ingress]).await?;
            allocation
        }
        _ => {
            let choice = match (&args.network, args.disconnected) {
                (Some(name), _) => SegmentChoice::Named(name.clone()),
                (None, true) => SegmentChoice::Disconnected,
                (None, false) => SegmentChoice::Public,
            };
            let candidates = candidate_segments(&choice)?;
            let ledger = load_ledger(ctx).await?;
            let allocation =
                select_allocation(&candidates, &ledger).ok_or(IpamError::NoNetworksAvailable)?;
            if args.ping {
                ensure_unused(ctx.prober, &[allocation.vips.api, allocation.vips.ingress]).await?;
            }
            allocation
        }
    };
    debug!(
        "Using segment {} with API VIP {} and ingress VIP {}",
        allocation.segment.name(),
        allocation.vips.api,
        allocation.vips.ingress
    );

    if let Some(cluster_name) = &args.reserve {
        ZoneMutator::new(ctx.client, &ctx.config.hosted_zone_id, &ctx.config.base_domain)
            .reserve(cluster_name, &[allocation.vips.api, allocation.vips.ingress])
            .await?;
    }

    let yaml = InstallConfig::new(&allocation, args.reserve.as_deref(), &ctx.config.base_domain, &secrets)
        .to_yaml()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &yaml)?;
            info!("Wrote {}", path.display());
        }
        None => out.write_all(yaml.as_bytes())?,
    }

    let note = if args.reserve.is_some() {
        RESERVED_NOTE
    } else {
        NOT_RESERVED_NOTE
    };
    writeln!(notes, "\n{note}")?;
    Ok(())
}

/// Delete a cluster's two records
pub async fn release<C>(
    ctx: &Context<'_, C>,
    api: Ipv4Addr,
    ingress: Ipv4Addr,
    cluster_name: &str,
    out: &mut dyn Write,
    notes: &mut dyn Write,
) -> Result<(), CliError>
where
    C: Route53ClientTrait + ?Sized,
{
    let change = ZoneMutator::new(ctx.client, &ctx.config.hosted_zone_id, &ctx.config.base_domain)
        .release(cluster_name, api, ingress)
        .await?;

    if ctx.json {
        serde_json::to_writer_pretty(
            &mut *out,
            &ChangeSummary {
                id: &change.id,
                status: &change.status,
            },
        )?;
        writeln!(out)?;
    } else {
        writeln!(notes, "Released IPs for cluster '{}' (change {}, {})", cluster_name, change.id, change.status)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;
