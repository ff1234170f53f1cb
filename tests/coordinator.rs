// tests/coordinator.rs

mod common;

use std::sync::Arc;
use std::time::Duration;

use chainprobe::errors::HarnessError;
use chainprobe::ibc::CHANNEL_OPEN_MARKER;
use chainprobe::poll::PollPolicy;
use chainprobe::types::Coin;

use common::*;

fn opened_stderr(channel: &str) -> String {
    format!("2024-01-01T00:00:00Z INFO {CHANNEL_OPEN_MARKER} {channel} on gaia-a\n")
}

#[tokio::test]
async fn link_parses_both_channel_ends_and_registers_pair() -> TestResult {
    init_tracing();
    let exec = ScriptedExecutor::with_script([Scripted::stderr(opened_stderr(
        "channel_id: channel-3, counterparty_channel_id: channel-7",
    ))]);
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();
    let (a, b) = (network.chain("gaia-a")?, network.chain("gaia-b")?);

    let link = coordinator.link_chains(&a, &b).await?;

    assert_eq!((link.chain_a.as_str(), link.channel_a.as_str()), ("gaia-a", "channel-3"));
    assert_eq!((link.chain_b.as_str(), link.channel_b.as_str()), ("gaia-b", "channel-7"));
    assert_eq!(link.channel_on("gaia-b"), Some("channel-7"));
    assert_eq!(link.channel_on("gaia-c"), None);
    // unordered pair
    assert_eq!(coordinator.link_between("gaia-b", "gaia-a"), Some(link));

    let calls = exec.invocations();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sandbox.as_str(), RELAYER_SANDBOX);
    assert_eq!(calls[0].program, "hermes");
    assert_eq!(
        calls[0].args,
        vec!["create", "channel", "gaia-a", "gaia-b", "--port-a=transfer", "--port-b=transfer"]
    );
    Ok(())
}

#[tokio::test]
async fn link_without_channel_id_defaults_to_first_channel() -> TestResult {
    let exec = ScriptedExecutor::with_script([Scripted::stderr(format!("{CHANNEL_OPEN_MARKER}\n"))]);
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();

    let link = coordinator
        .link_chains(&*network.chain("gaia-a")?, &*network.chain("gaia-b")?)
        .await?;

    assert_eq!(link.channel_a, "channel-0");
    assert_eq!(link.channel_b, "channel-0");
    Ok(())
}

#[tokio::test]
async fn clean_exit_without_marker_is_a_link_failure() -> TestResult {
    let exec = ScriptedExecutor::with_script([Scripted::exit(
        0,
        "SUCCESS",
        "ERROR channel handshake failed: client expired",
    )]);
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();

    let err = coordinator
        .link_chains(&*network.chain("gaia-a")?, &*network.chain("gaia-b")?)
        .await
        .unwrap_err();

    match err {
        HarnessError::LinkFailure { chain_a, chain_b, output } => {
            assert_eq!((chain_a.as_str(), chain_b.as_str()), ("gaia-a", "gaia-b"));
            assert!(output.stderr_lossy().contains("client expired"));
        }
        other => panic!("expected LinkFailure, got {other:?}"),
    }
    assert!(coordinator.link_between("gaia-a", "gaia-b").is_none());
    Ok(())
}

#[tokio::test]
async fn transfer_before_link_runs_nothing() -> TestResult {
    let exec = ScriptedExecutor::new();
    exec.set_fallback(Scripted::stdout("ok"));
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();

    let err = coordinator
        .transfer(
            &*network.chain("gaia-a")?,
            &*network.chain("gaia-b")?,
            "cosmos1recipient",
            &Coin::new(10, "uatom"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::NotLinked { ref src, ref dst } if src == "gaia-a" && dst == "gaia-b"));
    assert_eq!(exec.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn transfer_uses_the_source_chain_end_of_the_link() -> TestResult {
    let exec = ScriptedExecutor::with_script([
        Scripted::stderr(opened_stderr("channel_id: channel-3, counterparty_channel_id: channel-7")),
        Scripted::stdout("SUCCESS [IbcEvent SendPacket]"),
        Scripted::stdout("SUCCESS [IbcEvent SendPacket]"),
    ]);
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();
    let (a, b) = (network.chain("gaia-a")?, network.chain("gaia-b")?);

    coordinator.link_chains(&a, &b).await?;
    let out = coordinator
        .transfer(&b, &a, "cosmos1recipient", &Coin::new(3300000000, "uatom"))
        .await?;
    assert!(out.success());
    coordinator
        .transfer(&a, &b, "cosmos1recipient", &Coin::new(1, "uatom"))
        .await?;

    let calls = exec.invocations();
    assert_eq!(
        calls[1].args,
        vec![
            "tx",
            "raw",
            "ft-transfer",
            "gaia-a",
            "gaia-b",
            "transfer",
            "channel-7",
            "3300000000",
            "--denom=uatom",
            "--receiver=cosmos1recipient",
            "--timeout-height-offset=1000",
        ]
    );
    assert_eq!(calls[2].args[3..7], ["gaia-b", "gaia-a", "transfer", "channel-3"]);
    Ok(())
}

#[tokio::test]
async fn failed_dispatch_carries_relayer_output() -> TestResult {
    let exec = ScriptedExecutor::with_script([Scripted::exit(1, "", "ERROR insufficient funds")]);
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();
    coordinator.register_link("gaia-a", "channel-0", "gaia-b", "channel-0");

    let err = coordinator
        .transfer(
            &*network.chain("gaia-a")?,
            &*network.chain("gaia-b")?,
            "cosmos1recipient",
            &Coin::new(1, "uatom"),
        )
        .await
        .unwrap_err();

    match err {
        HarnessError::TransferDispatchFailure { output, reason, .. } => {
            assert!(reason.contains("Some(1)"));
            assert!(output.stderr_lossy().contains("insufficient funds"));
        }
        other => panic!("expected TransferDispatchFailure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn launch_failure_during_dispatch_is_a_dispatch_failure() -> TestResult {
    let exec = ScriptedExecutor::with_script([Scripted::LaunchFailure("relayer container stopped".into())]);
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();
    coordinator.register_link("gaia-a", "channel-0", "gaia-b", "channel-0");

    let err = coordinator
        .transfer(
            &*network.chain("gaia-a")?,
            &*network.chain("gaia-b")?,
            "cosmos1recipient",
            &Coin::new(1, "uatom"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::TransferDispatchFailure { ref reason, .. } if reason.contains("relayer container stopped")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn await_balance_polls_until_funds_arrive() -> TestResult {
    let exec = ScriptedExecutor::new();
    let ibc_denom = "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2";
    let query = Arc::new(FakeNodeQuery::new().balances_sequence(
        "cosmos1recipient",
        vec![
            vec![],
            vec![Coin::new(5, "uatom")],
            vec![Coin::new(5, "uatom"), Coin::new(3300, ibc_denom)],
        ],
    ));
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();

    let report = coordinator
        .await_balance(
            &*network.chain("gaia-b")?,
            0,
            "cosmos1recipient",
            ibc_denom,
            PollPolicy::new(Duration::from_secs(5), Duration::from_secs(60)),
            |amount| amount >= 3300,
        )
        .await?;

    assert_eq!(report.attempts, 3);
    assert_eq!(query.balance_query_count(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn await_balance_times_out_when_nothing_arrives() -> TestResult {
    let exec = ScriptedExecutor::new();
    let query = Arc::new(FakeNodeQuery::new());
    let coordinator = coordinator(dyn_exec(&exec), dyn_query(&query));
    let network = two_chain_network();

    let err = coordinator
        .await_balance(
            &*network.chain("gaia-b")?,
            0,
            "cosmos1recipient",
            "uatom",
            PollPolicy::new(Duration::from_secs(1), Duration::from_secs(3)),
            |amount| amount > 0,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::PollTimeout { attempts: 4, .. }));
    Ok(())
}
