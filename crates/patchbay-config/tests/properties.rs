//! Property-based tests for pin state persistence.

use patchbay_config::{ConnectorState, RoutingPreset, validate_state};
use patchbay_core::{ChannelCount, Direction, PinConnector};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any connector reachable through pin edits survives capture, TOML and
    /// restore exactly.
    #[test]
    fn capture_restore_roundtrip(
        pairs in 1usize..4,
        inputs in 0usize..5,
        outputs in 0usize..5,
        toggles in prop::collection::vec((any::<bool>(), 0usize..8, 0usize..5), 0..30),
    ) {
        let tracks = pairs * 2;
        let mut pc = PinConnector::new(
            tracks,
            ChannelCount::Count(inputs),
            ChannelCount::Count(outputs),
        );
        for (is_output, track, plugin) in toggles {
            let direction = if is_output { Direction::Output } else { Direction::Input };
            if track < tracks && plugin < pc.matrix(direction).plugin_channels() {
                pc.toggle_pin(direction, track, plugin).unwrap();
            }
        }

        let state = ConnectorState::capture(&pc);
        prop_assert!(validate_state(&state).is_ok());

        let toml = RoutingPreset::new("p", state.clone()).to_toml().unwrap();
        let parsed = RoutingPreset::from_toml(&toml).unwrap();
        prop_assert_eq!(&parsed.state, &state);

        let restored = parsed.to_connector().unwrap();
        prop_assert_eq!(ConnectorState::capture(&restored), state);
        prop_assert_eq!(restored.routed_channels(), pc.routed_channels());
    }
}
