//! Command-line surface

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use vmc_ipam::segment_names;

#[derive(Debug, Parser)]
#[command(name = "vmcdns")]
#[command(about = "Find, reserve and release static VIPs in the VMC lab network segments")]
pub struct Cli {
    /// Print debug output
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
    /// Machine-readable output for listings
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List unreserved IPs in a segment
    Available {
        /// Network segment name
        #[arg(long, value_parser = PossibleValuesParser::new(segment_names()))]
        network: String,
        /// Limit the output to N results
        #[arg(long, value_name = "N")]
        count: Option<usize>,
    },
    /// List reserved IPs and the records claiming them
    Reserved {
        /// Only this segment (all segments by default)
        #[arg(long, value_parser = PossibleValuesParser::new(segment_names()))]
        network: Option<String>,
    },
    /// Print an install-config.yaml for the first segment with two free IPs
    InstallConfig(InstallConfigArgs),
    /// Delete a cluster's API and ingress records
    Release {
        /// The IP address for api
        #[arg(long)]
        api_vip: Ipv4Addr,
        /// The IP address for *.apps
        #[arg(long)]
        ingress_vip: Ipv4Addr,
        /// Base name of the cluster currently owning the IPs
        #[arg(long)]
        cluster_name: String,
    },
}

#[derive(Debug, Args)]
pub struct InstallConfigArgs {
    /// Use this network segment
    #[arg(
        long,
        value_parser = PossibleValuesParser::new(segment_names()),
        conflicts_with = "disconnected"
    )]
    pub network: Option<String>,
    /// Use a disconnected segment (a public segment is used by default)
    #[arg(long, default_value_t = false)]
    pub disconnected: bool,
    /// Reserve the chosen IPs for the named cluster
    #[arg(long, value_name = "CLUSTER_NAME")]
    pub reserve: Option<String>,
    /// Use this API VIP instead of picking one
    #[arg(long, requires = "ingress_vip", conflicts_with_all = ["network", "disconnected"])]
    pub api_vip: Option<Ipv4Addr>,
    /// Use this ingress VIP instead of picking one
    #[arg(long, requires = "api_vip")]
    pub ingress_vip: Option<Ipv4Addr>,
    /// Ping auto-selected IPs before using them
    #[arg(long, default_value_t = false)]
    pub ping: bool,
    /// File holding the pull secret
    #[arg(long, value_name = "FILE")]
    pub pull_secret: Option<PathBuf>,
    /// File holding the SSH public key
    #[arg(long, value_name = "FILE")]
    pub ssh_key: Option<PathBuf>,
    /// Write the config here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
