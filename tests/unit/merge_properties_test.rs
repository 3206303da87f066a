//! Property-based tests for the server-map merge.

use mcp_ferry::merge::MergeOutcome;
use mcp_ferry::{
    detect_conflicts, merge_servers, ConflictResolutions, ServerDefinition, ServerMap, Winner,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

/// Server maps over a small name and command alphabet so overlaps are common.
fn arb_server_map() -> impl Strategy<Value = ServerMap> {
    prop::collection::vec(("[a-f]", "[xyz]", any::<bool>()), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, command, remote)| {
                let definition = if remote {
                    json!({"url": format!("https://{command}.example.com")})
                } else {
                    json!({"command": command, "args": [name.clone()]})
                };
                (name, ServerDefinition::new(definition))
            })
            .collect()
    })
}

fn merge(source: &ServerMap, target: &ServerMap, resolutions: &ConflictResolutions) -> MergeOutcome {
    merge_servers(source, target, &detect_conflicts(source, target), resolutions)
}

proptest! {
    #[test]
    fn unresolved_conflicts_keep_target(source in arb_server_map(), target in arb_server_map()) {
        let outcome = merge(&source, &target, &ConflictResolutions::new());

        for (name, definition) in &target {
            prop_assert_eq!(outcome.servers.get(name), Some(definition));
        }
        prop_assert!(outcome.resolved.iter().all(|r| r.winner == Winner::Target));
    }

    #[test]
    fn no_server_is_lost(
        source in arb_server_map(),
        target in arb_server_map(),
        prefer_source in any::<bool>(),
    ) {
        let resolutions: ConflictResolutions =
            source.keys().map(|name| (name.clone(), prefer_source)).collect();
        let outcome = merge(&source, &target, &resolutions);

        let expected: HashSet<&String> = source.keys().chain(target.keys()).collect();
        let merged: HashSet<&String> = outcome.servers.keys().collect();
        prop_assert_eq!(merged, expected);

        let target_order: Vec<&String> = target.keys().collect();
        let merged_prefix: Vec<&String> = outcome.servers.keys().take(target.len()).collect();
        prop_assert_eq!(merged_prefix, target_order);
    }

    #[test]
    fn outcome_lists_partition_the_merged_map(source in arb_server_map(), target in arb_server_map()) {
        let outcome = merge(&source, &target, &ConflictResolutions::new());

        let mut seen = HashSet::new();
        let names = outcome
            .added
            .iter()
            .chain(&outcome.kept)
            .chain(outcome.resolved.iter().map(|r| &r.name));
        for name in names {
            prop_assert!(seen.insert(name.clone()), "{} reported twice", name);
        }
        prop_assert_eq!(seen.len(), outcome.servers.len());
    }

    #[test]
    fn merging_twice_is_a_no_op(source in arb_server_map(), target in arb_server_map()) {
        let resolutions: ConflictResolutions =
            source.keys().map(|name| (name.clone(), true)).collect();
        let first = merge(&source, &target, &resolutions);
        let second = merge(&source, &first.servers, &resolutions);

        prop_assert!(second.added.is_empty());
        prop_assert!(second.resolved.is_empty());
        prop_assert_eq!(second.servers, first.servers);
    }

    #[test]
    fn identical_maps_have_no_conflicts(map in arb_server_map()) {
        prop_assert!(detect_conflicts(&map, &map).is_empty());

        let outcome = merge(&map, &map, &ConflictResolutions::new());
        let kept: Vec<&String> = outcome.kept.iter().collect();
        let names: Vec<&String> = map.keys().collect();
        prop_assert_eq!(kept, names);
    }
}
