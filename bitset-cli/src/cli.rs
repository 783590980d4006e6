//! The flag surface, grounded on `cmd/raft_server/basalt.go`'s `flag.*`
//! declarations.

use clap::Parser;

/// A node in the compressed-bitmap set service.
#[derive(Parser, Debug)]
#[command(name = "bitset-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Listening address, recorded for a future wire frontend but not bound
    /// by this binary.
    #[arg(long, default_value = ":18972")]
    pub addr: String,

    /// Snapshot file path. Loaded at startup if present; saved on clean
    /// shutdown.
    #[arg(long, default_value = "bitmaps.bdb")]
    pub data: std::path::PathBuf,

    /// Run without a replicated log driver, applying writes directly.
    #[arg(long, default_value_t = true, conflicts_with = "peers")]
    pub single_node: bool,

    /// This node's numeric identity within a cluster.
    #[arg(long, default_value_t = 1)]
    pub id: u64,

    /// Comma-separated peer identities. Presence implies clustered mode.
    #[arg(long)]
    pub peers: Option<String>,

    /// Join an existing cluster rather than bootstrapping a new one.
    #[arg(long, default_value_t = false)]
    pub join: bool,

    /// Tracing filter, e.g. `info`, `debug`, `bitset_engine=trace`.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Peer identities, parsed from the comma-separated `--peers` flag.
    pub fn peer_list(&self) -> Vec<String> {
        match &self.peers {
            Some(peers) => peers.split(',').map(str::to_string).collect(),
            None => Vec::new(),
        }
    }

    /// `true` once a peer list is present, regardless of `--single-node`'s
    /// default.
    pub fn is_clustered(&self) -> bool {
        self.peers.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn no_peers_flag_parses_to_single_node_with_an_empty_peer_list() {
        let cli = Cli::parse_from(["bitset-cli"]);
        assert!(!cli.is_clustered());
        assert!(cli.peer_list().is_empty());
    }

    #[test]
    fn peers_flag_is_split_on_commas() {
        let cli = Cli::parse_from(["bitset-cli", "--peers", "node-a,node-b,node-c"]);
        assert!(cli.is_clustered());
        assert_eq!(cli.peer_list(), vec!["node-a", "node-b", "node-c"]);
    }

    #[test]
    fn data_and_addr_fall_back_to_their_defaults() {
        let cli = Cli::parse_from(["bitset-cli"]);
        assert_eq!(cli.data, std::path::PathBuf::from("bitmaps.bdb"));
        assert_eq!(cli.addr, ":18972");
    }
}
