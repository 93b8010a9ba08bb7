//! Unit tests for the subcommand handlers

use super::*;
use async_trait::async_trait;
use route53_client::{ChangeAction, MockRoute53Client};
use std::collections::HashSet;
use vmc_ipam::{PingProber, ProbeOutcome, SegmentKind};

const ZONE: &str = "ZTEST";
const BASE: &str = "vmc.devcluster.openshift.com";

struct FixedProber {
    live: HashSet<Ipv4Addr>,
}

#[async_trait]
impl AddressProber for FixedProber {
    async fn probe(&self, ip: Ipv4Addr) -> Result<ProbeOutcome, IpamError> {
        Ok(if self.live.contains(&ip) {
            ProbeOutcome::Reply
        } else {
            ProbeOutcome::NoReply
        })
    }
}

fn silent() -> FixedProber {
    FixedProber { live: HashSet::new() }
}

fn config() -> Config {
    Config {
        hosted_zone_id: ZONE.to_string(),
        base_domain: BASE.to_string(),
        route53_endpoint: "http://mock-route53".to_string(),
        page_size: 100,
    }
}

fn zone() -> MockRoute53Client {
    MockRoute53Client::new("http://mock-route53").with_zone(ZONE)
}

fn context<'a>(
    client: &'a MockRoute53Client,
    config: &'a Config,
    prober: &'a dyn AddressProber,
    json: bool,
) -> Context<'a, MockRoute53Client> {
    Context {
        client,
        config,
        prober,
        secrets: InstallSecrets::default(),
        json,
    }
}

fn install_args() -> InstallConfigArgs {
    InstallConfigArgs {
        network: None,
        disconnected: false,
        reserve: None,
        api_vip: None,
        ingress_vip: None,
        ping: false,
        pull_secret: None,
        ssh_key: None,
        output: None,
    }
}

/// Claim every usable address of a segment except the last `keep` ones
fn fill_segment(mock: &MockRoute53Client, segment: &Segment, keep: usize) {
    let hosts: Vec<Ipv4Addr> = segment.hosts().collect();
    for ip in &hosts[..hosts.len() - keep] {
        mock.add_a_record(ZONE, &format!("host-{}.{}.", ip.to_string().replace('.', "-"), BASE), &ip.to_string());
    }
}

fn text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn test_available_lists_lowest_free_first() {
    let mock = zone();
    mock.add_a_record(ZONE, "api.a.vmc.devcluster.openshift.com.", "192.168.221.3");
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);

    let mut out = Vec::<u8>::new();
    available(&ctx, "devqe-segment-221", Some(3), &mut out).await.unwrap();
    assert_eq!(text(out), "192.168.221.4\n192.168.221.5\n192.168.221.6\n");

    let mut out = Vec::<u8>::new();
    available(&ctx, "devqe-segment-221", None, &mut out).await.unwrap();
    assert_eq!(text(out).lines().count(), 124);
}

#[tokio::test]
async fn test_available_json() {
    let mock = zone();
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, true);

    let mut out = Vec::<u8>::new();
    available(&ctx, "devqe-segment-229-disconnected", Some(2), &mut out)
        .await
        .unwrap();
    let ips: Vec<String> = serde_json::from_slice(&out).unwrap();
    assert_eq!(ips, vec!["192.168.229.3", "192.168.229.4"]);
}

#[tokio::test]
async fn test_reserved_output() {
    let mock = zone();
    mock.add_a_record(ZONE, "api.demo.vmc.devcluster.openshift.com.", "192.168.222.10");
    mock.add_a_record(ZONE, "*.apps.demo.vmc.devcluster.openshift.com.", "192.168.222.11");
    let config = config();
    let prober = silent();

    let ctx = context(&mock, &config, &prober, false);
    let mut out = Vec::<u8>::new();
    reserved(&ctx, Some("devqe-segment-222"), &mut out).await.unwrap();
    assert_eq!(
        text(out),
        "192.168.222.10\tapi.demo.vmc.devcluster.openshift.com.\n\
         192.168.222.11\t*.apps.demo.vmc.devcluster.openshift.com.\n"
    );

    let mut out = Vec::<u8>::new();
    reserved(&ctx, None, &mut out).await.unwrap();
    let all = text(out);
    assert!(all.starts_with("\ndevqe-segment-221:\n\ndevqe-segment-222:\n192.168.222.10\t"));
    assert!(all.contains("\ndevqe-segment-234-disconnected:\n"));

    let ctx = context(&mock, &config, &prober, true);
    let mut out = Vec::<u8>::new();
    reserved(&ctx, None, &mut out).await.unwrap();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report.as_array().unwrap().len(), 14);
    assert_eq!(report[1]["segment"], "devqe-segment-222");
    assert_eq!(report[1]["reserved"][1]["name"], "*.apps.demo.vmc.devcluster.openshift.com.");
}

#[tokio::test]
async fn test_install_config_fails_when_every_segment_has_one_free_address() {
    let mock = zone();
    for segment in segments().iter().filter(|s| s.kind() == SegmentKind::Public) {
        fill_segment(&mock, segment, 1);
    }
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    let err = install_config(&ctx, &install_args(), &mut out, &mut notes)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Could not find any networks with two available IPs!");
    assert!(out.is_empty());
    assert!(mock.submitted_batches().is_empty());
    // Several hundred records take more than one page
    assert!(mock.list_calls() > 1);
}

#[tokio::test]
async fn test_install_config_skips_exhausted_segment() {
    let mock = zone();
    fill_segment(&mock, find_segment("devqe-segment-221").unwrap(), 1);
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    install_config(&ctx, &install_args(), &mut out, &mut notes).await.unwrap();

    let doc: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
    assert_eq!(doc["platform"]["vsphere"]["network"], "devqe-segment-222");
    assert_eq!(doc["platform"]["vsphere"]["apiVIP"], "192.168.222.3");
    assert_eq!(doc["platform"]["vsphere"]["ingressVIP"], "192.168.222.4");
    assert_eq!(doc["metadata"]["name"], "YOUR_NAME_HERE");
    assert_eq!(text(notes).trim(), NOT_RESERVED_NOTE);
    assert!(mock.submitted_batches().is_empty());
}

#[tokio::test]
async fn test_install_config_reserve() {
    let mock = zone();
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);
    let args = InstallConfigArgs {
        disconnected: true,
        reserve: Some("demo".to_string()),
        ..install_args()
    };

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    install_config(&ctx, &args, &mut out, &mut notes).await.unwrap();

    let batches = mock.submitted_batches();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].changes.iter().all(|c| c.action == ChangeAction::Upsert));
    assert_eq!(
        batches[0].changes[0].resource_record_set.name,
        "api.demo.vmc.devcluster.openshift.com."
    );

    let doc: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
    assert_eq!(doc["metadata"]["name"], "demo");
    assert_eq!(doc["platform"]["vsphere"]["network"], "devqe-segment-229-disconnected");
    assert_eq!(text(notes).trim(), RESERVED_NOTE);

    // The reserved pair is no longer offered
    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    install_config(&ctx, &InstallConfigArgs { disconnected: true, ..install_args() }, &mut out, &mut notes)
        .await
        .unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
    assert_eq!(doc["platform"]["vsphere"]["apiVIP"], "192.168.229.5");
}

#[tokio::test]
async fn test_install_config_explicit_vips_are_probed() {
    let mock = zone();
    let config = config();
    let api = Ipv4Addr::new(192, 168, 225, 20);
    let ingress = Ipv4Addr::new(192, 168, 225, 21);
    let args = InstallConfigArgs {
        api_vip: Some(api),
        ingress_vip: Some(ingress),
        reserve: Some("pinned".to_string()),
        ..install_args()
    };

    let prober = FixedProber {
        live: HashSet::from([ingress]),
    };
    let ctx = context(&mock, &config, &prober, false);
    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    let err = install_config(&ctx, &args, &mut out, &mut notes).await.unwrap_err();
    assert_eq!(err.to_string(), "192.168.225.21 is already in use");
    assert!(mock.submitted_batches().is_empty());

    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);
    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    install_config(&ctx, &args, &mut out, &mut notes).await.unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
    assert_eq!(doc["platform"]["vsphere"]["network"], "devqe-segment-225");
    assert_eq!(doc["networking"]["machineNetwork"][0]["cidr"], "192.168.225.0/24");
    assert_eq!(mock.submitted_batches().len(), 1);
}

#[tokio::test]
async fn test_install_config_ping_only_when_asked() {
    let mock = zone();
    let config = config();
    let prober = FixedProber {
        live: HashSet::from([Ipv4Addr::new(192, 168, 221, 3)]),
    };
    let ctx = context(&mock, &config, &prober, false);

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    install_config(&ctx, &install_args(), &mut out, &mut notes).await.unwrap();

    let args = InstallConfigArgs {
        ping: true,
        ..install_args()
    };
    let err = install_config(&ctx, &args, &mut Vec::<u8>::new(), &mut Vec::<u8>::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Ipam(IpamError::AddressInUse(_))));
}

#[tokio::test]
async fn test_install_config_writes_output_file() {
    let mock = zone();
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);
    let path = std::env::temp_dir().join(format!("vmcdns-install-config-{}.yaml", std::process::id()));
    let args = InstallConfigArgs {
        output: Some(path.clone()),
        ..install_args()
    };

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    install_config(&ctx, &args, &mut out, &mut notes).await.unwrap();

    assert!(out.is_empty());
    let doc: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["baseDomain"], BASE);
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_release_submits_two_deletes() {
    let mock = zone();
    mock.add_a_record(ZONE, "api.foo.vmc.devcluster.openshift.com.", "10.0.0.1");
    mock.add_a_record(ZONE, "*.apps.foo.vmc.devcluster.openshift.com.", "10.0.0.2");
    let config = config();
    let prober = PingProber::default();
    let ctx = context(&mock, &config, &prober, false);

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    dispatch(
        &ctx,
        Commands::Release {
            api_vip: Ipv4Addr::new(10, 0, 0, 1),
            ingress_vip: Ipv4Addr::new(10, 0, 0, 2),
            cluster_name: "foo".to_string(),
        },
        &mut out,
        &mut notes,
    )
    .await
    .unwrap();

    let batches = mock.submitted_batches();
    assert_eq!(batches.len(), 1);
    let names: Vec<_> = batches[0]
        .changes
        .iter()
        .map(|c| {
            assert_eq!(c.action, ChangeAction::Delete);
            c.resource_record_set.name.clone()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "api.foo.vmc.devcluster.openshift.com.",
            "*.apps.foo.vmc.devcluster.openshift.com."
        ]
    );
    assert!(mock.record_sets(ZONE).is_empty());
    // Release never reads the zone
    assert_eq!(mock.list_calls(), 0);
    assert!(text(notes).contains("cluster 'foo'"));
}

#[tokio::test]
async fn test_access_denied_is_recognised() {
    let mock = zone();
    mock.deny_access(true);
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);

    let err = available(&ctx, "devqe-segment-221", None, &mut Vec::<u8>::new())
        .await
        .unwrap_err();
    assert!(err.is_access_denied());
}

#[tokio::test]
async fn test_install_config_named_network_with_one_free_address() {
    let mock = zone();
    fill_segment(&mock, find_segment("devqe-segment-222").unwrap(), 1);
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);
    let args = InstallConfigArgs {
        network: Some("devqe-segment-222".to_string()),
        reserve: Some("demo".to_string()),
        ..install_args()
    };

    let (mut out, mut notes) = (Vec::<u8>::new(), Vec::<u8>::new());
    let err = install_config(&ctx, &args, &mut out, &mut notes).await.unwrap_err();

    assert!(matches!(err, CliError::Ipam(IpamError::NoNetworksAvailable)));
    assert_eq!(err.to_string(), "Could not find any networks with two available IPs!");
    assert!(out.is_empty());
    assert!(notes.is_empty());
    assert!(mock.submitted_batches().is_empty());
}

#[tokio::test]
async fn test_install_config_rejects_unusable_explicit_vips() {
    let mock = zone();
    let config = config();
    let prober = silent();
    let ctx = context(&mock, &config, &prober, false);
    let explicit = |api: Ipv4Addr, ingress: Ipv4Addr| InstallConfigArgs {
        api_vip: Some(api),
        ingress_vip: Some(ingress),
        reserve: Some("demo".to_string()),
        ..install_args()
    };

    let same = Ipv4Addr::new(192, 168, 221, 10);
    let err = install_config(&ctx, &explicit(same, same), &mut Vec::<u8>::new(), &mut Vec::<u8>::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Ipam(IpamError::DuplicateVip(ip)) if ip == same));

    let gateway = Ipv4Addr::new(192, 168, 221, 1);
    let err = install_config(
        &ctx,
        &explicit(gateway, Ipv4Addr::new(192, 168, 221, 11)),
        &mut Vec::<u8>::new(),
        &mut Vec::<u8>::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Ipam(IpamError::OutsideStaticRange { ip, .. }) if ip == gateway));

    let dhcp = Ipv4Addr::new(192, 168, 221, 200);
    let err = install_config(
        &ctx,
        &explicit(Ipv4Addr::new(192, 168, 221, 10), dhcp),
        &mut Vec::<u8>::new(),
        &mut Vec::<u8>::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::Ipam(IpamError::OutsideStaticRange { ip, .. }) if ip == dhcp));

    assert!(mock.submitted_batches().is_empty());
    assert!(mock.record_sets(ZONE).is_empty());
}
