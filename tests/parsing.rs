// tests/parsing.rs

use std::time::Duration;

use chainprobe::config::parse_duration;
use chainprobe::errors::HarnessError;
use chainprobe::ibc::relayer::{ChannelEnds, channel_opened, parse_channel_ends};
use chainprobe::query::{NodeQuery, RestQueryClient, amount_of};
use chainprobe::tx::decode_tx_response;
use chainprobe::types::{Coin, ExecutorKind, VoteOption};
use proptest::prelude::*;

#[test]
fn coins_parse_plain_and_ibc_denoms() {
    assert_eq!("100photon".parse::<Coin>().unwrap(), Coin::new(100, "photon"));
    assert_eq!(
        "3300000000ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
            .parse::<Coin>()
            .unwrap()
            .denom,
        "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
    );
    assert_eq!(Coin::new(7, "uatom").to_string(), "7uatom");
}

#[test]
fn coins_reject_garbage() {
    for bad in ["", "photon", "100", "-5photon", "100 photon", "1.5photon", "10ab"] {
        assert!(bad.parse::<Coin>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn vote_options_render_for_the_node_cli() {
    assert_eq!("No_With_Veto".parse::<VoteOption>().unwrap(), VoteOption::NoWithVeto);
    assert_eq!(VoteOption::NoWithVeto.to_string(), "no_with_veto");
    assert!("maybe".parse::<VoteOption>().is_err());
}

#[test]
fn executor_kind_parses_case_insensitively() {
    assert_eq!("Docker".parse::<ExecutorKind>().unwrap(), ExecutorKind::Docker);
    assert_eq!(" local ".parse::<ExecutorKind>().unwrap(), ExecutorKind::Local);
    assert!("podman".parse::<ExecutorKind>().is_err());
    assert_eq!(ExecutorKind::default(), ExecutorKind::Docker);
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
    assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    assert_eq!(parse_duration(" 1h ").unwrap(), Duration::from_secs(3600));
    assert!(parse_duration("5").is_err());
    assert!(parse_duration("5d").is_err());
    assert!(parse_duration("").is_err());
    assert!(parse_duration("18446744073709551615h").is_err());
    assert!(parse_duration("307445734561825861m").is_err());
    assert_eq!(
        parse_duration("18446744073709551615s").unwrap(),
        Duration::from_secs(u64::MAX)
    );
}

#[test]
fn tx_response_decodes_node_output() {
    let resp = decode_tx_response(
        br#"  {"height":"0","txhash":"ABC","codespace":"sdk","code":13,"raw_log":"insufficient fee"}
"#,
    )
    .unwrap();
    assert_eq!(resp.txhash, "ABC");
    assert_eq!(resp.code, 13);
    assert!(!resp.is_accepted());

    // a missing code means success
    let ok = decode_tx_response(br#"{"txhash":"DEF"}"#).unwrap();
    assert!(ok.is_accepted());

    assert!(decode_tx_response(b"Error: key not found").is_err());
    assert!(decode_tx_response(br#"{"code":0}"#).is_err());
}

#[test]
fn relayer_output_is_interpreted() {
    let stderr = "2024-05-01T10:00:00Z  INFO ThreadId(01) successfully opened init channel channel-7\n";
    assert!(channel_opened(stderr));
    assert_eq!(parse_channel_ends(stderr).a.as_deref(), Some("channel-7"));
    assert_eq!(parse_channel_ends(stderr).b, None);
    assert!(!channel_opened("ERROR failed to open channel"));
    assert_eq!(parse_channel_ends("no ids here"), ChannelEnds::default());
}

#[test]
fn relayer_output_yields_both_channel_ends() {
    let labelled = "INFO opened channel_id: channel-3, counterparty_channel_id: channel-7\n";
    let ends = parse_channel_ends(labelled);
    assert_eq!(ends.a.as_deref(), Some("channel-3"));
    assert_eq!(ends.b.as_deref(), Some("channel-7"));

    let hermes = "SUCCESS Channel { a_side: ChannelSide { channel_id: channel-0 }, \
                  b_side: ChannelSide { channel_id: channel-1 } }\n";
    let ends = parse_channel_ends(hermes);
    assert_eq!(ends.a.as_deref(), Some("channel-0"));
    assert_eq!(ends.b.as_deref(), Some("channel-1"));
}

#[test]
fn balances_sum_by_denom() {
    let balances = vec![Coin::new(5, "uatom"), Coin::new(7, "photon"), Coin::new(1, "uatom")];
    assert_eq!(amount_of(&balances, "uatom"), 6);
    assert_eq!(amount_of(&balances, "stake"), 0);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_query_error() {
    let client = RestQueryClient::new().unwrap();

    let err = client.query_tx("http://127.0.0.1:1", "ABC").await.unwrap_err();

    assert!(matches!(err, HarnessError::Query { ref endpoint, .. } if endpoint == "http://127.0.0.1:1"));
}

proptest! {
    #[test]
    fn coin_display_round_trips_through_parse(amount in any::<u64>(), denom in "[a-z][a-z0-9]{2,15}") {
        let coin = Coin::new(u128::from(amount), denom);
        prop_assert_eq!(coin.to_string().parse::<Coin>().unwrap(), coin);
    }
}
