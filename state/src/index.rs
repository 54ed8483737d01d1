// Copyright (c) 2024 Botho Foundation

//! Lookup indexes over a snapshot's primary record lists.
//!
//! Indexes hold positions into the snapshot's `Vec`s rather than references,
//! so the snapshot owns its records outright and the indexes stay valid for
//! as long as the lists are not mutated (they never are).

use std::collections::{BTreeSet, HashMap};

use netstate_types::{Address, MinipoolRecord, NodeRecord, ValidatorPubkey};

/// Position-based indexes over node and minipool lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateIndex {
    node_by_address: HashMap<Address, usize>,
    minipool_by_address: HashMap<Address, usize>,
    minipools_by_node: HashMap<Address, Vec<usize>>,
}

impl StateIndex {
    /// Index `nodes` and `minipools`. On duplicate addresses the later record
    /// wins the by-address lookup; every minipool still appears in its
    /// operator's group, in list order.
    pub fn build(nodes: &[NodeRecord], minipools: &[MinipoolRecord]) -> Self {
        let node_by_address = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.address, i))
            .collect();

        let mut minipool_by_address = HashMap::with_capacity(minipools.len());
        let mut minipools_by_node: HashMap<Address, Vec<usize>> = HashMap::new();
        for (i, mp) in minipools.iter().enumerate() {
            minipool_by_address.insert(mp.address, i);
            minipools_by_node.entry(mp.node_address).or_default().push(i);
        }

        Self {
            node_by_address,
            minipool_by_address,
            minipools_by_node,
        }
    }

    /// Position of the node with `address`.
    pub fn node_position(&self, address: &Address) -> Option<usize> {
        self.node_by_address.get(address).copied()
    }

    /// Position of the minipool with `address`.
    pub fn minipool_position(&self, address: &Address) -> Option<usize> {
        self.minipool_by_address.get(address).copied()
    }

    /// Positions of the minipools owned by `node`, in list order.
    pub fn minipool_positions_for_node(&self, node: &Address) -> &[usize] {
        self.minipools_by_node
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The distinct non-empty validator pubkeys referenced by `minipools`, sorted.
pub fn referenced_pubkeys(minipools: &[MinipoolRecord]) -> Vec<ValidatorPubkey> {
    minipools
        .iter()
        .map(|mp| mp.pubkey)
        .filter(|pubkey| !pubkey.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
