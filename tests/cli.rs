// tests/cli.rs

use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;

use chainprobe::cli::{CliArgs, Command, KeysCommand};
use chainprobe::{key_provisioner, run};
use chainprobe::types::ExecutorKind;

#[test]
fn send_arguments_parse_with_defaults() {
    let args = CliArgs::try_parse_from([
        "chainprobe", "send", "--chain", "gaia-a", "--from", "alice", "--to", "bob", "--amount",
        "100photon", "--fees", "1000photon",
    ])
    .unwrap();

    assert_eq!(args.config, "Chainprobe.toml");
    assert!(args.executor.is_none());
    match args.command {
        Command::Send { chain, validator, amount, .. } => {
            assert_eq!(chain, "gaia-a");
            assert_eq!(validator, 0);
            assert_eq!(amount, "100photon");
        }
        other => panic!("expected Send, got {other:?}"),
    }
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let args = CliArgs::try_parse_from([
        "chainprobe", "link", "--chain-a", "gaia-a", "--chain-b", "gaia-b", "--executor", "local",
        "--config", "net.toml",
    ])
    .unwrap();

    assert_eq!(args.executor, Some(ExecutorKind::Local));
    assert_eq!(args.config, "net.toml");
}

#[test]
fn keys_new_prefix_is_optional() {
    let args = CliArgs::try_parse_from(["chainprobe", "keys", "new"]).unwrap();
    assert!(matches!(args.command, Command::Keys(KeysCommand::New { prefix: None })));
}

#[test]
fn keys_new_prefix_comes_from_the_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[harness]
address_prefix = "osmo"

[chain.osmo-a]
validators = [{{ sandbox = "osmo-a-val0", endpoint = "http://127.0.0.1:1317" }}]
"#
    )
    .unwrap();

    let from_config = key_provisioner(None, file.path()).unwrap();
    assert_eq!(from_config.address_prefix(), "osmo");
    let (_, credential) = from_config.new_credential().unwrap();
    assert!(credential.address().starts_with("osmo1"));

    let explicit = key_provisioner(Some("juno"), file.path()).unwrap();
    assert_eq!(explicit.address_prefix(), "juno");

    let no_config = key_provisioner(None, "/does/not/exist.toml").unwrap();
    assert_eq!(no_config.address_prefix(), "cosmos");
}

#[test]
fn keys_new_reports_an_invalid_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[harness]\naddress_prefix = \"osmo\"\n").unwrap();

    let err = key_provisioner(None, file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("loading config"));
}

#[test]
fn ibc_transfer_takes_a_channel_per_end() {
    let args = CliArgs::try_parse_from([
        "chainprobe", "ibc-transfer", "--src", "gaia-b", "--dst", "gaia-a", "--recipient",
        "cosmos1recipient", "--amount", "10uatom", "--channel", "channel-7",
        "--counterparty-channel", "channel-3",
    ])
    .unwrap();

    match args.command {
        Command::IbcTransfer { channel, counterparty_channel, .. } => {
            assert_eq!(channel.as_deref(), Some("channel-7"));
            assert_eq!(counterparty_channel, "channel-3");
        }
        other => panic!("expected IbcTransfer, got {other:?}"),
    }
}

#[test]
fn missing_required_flags_are_rejected() {
    assert!(CliArgs::try_parse_from(["chainprobe", "ibc-transfer", "--src", "gaia-a"]).is_err());
}

#[tokio::test]
async fn keys_new_runs_without_a_config_file() {
    let args = CliArgs::try_parse_from([
        "chainprobe", "--config", "/does/not/exist.toml", "keys", "new",
    ])
    .unwrap();

    run(args).await.unwrap();
}

#[tokio::test]
async fn check_validates_the_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[chain.gaia-a]
validators = [{{ sandbox = "gaia-a-val0", endpoint = "http://127.0.0.1:1317" }}]
"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from(["chainprobe", "--config", &path, "check"]).unwrap();
    run(args).await.unwrap();
}

#[tokio::test]
async fn link_without_relayer_fails() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[chain.gaia-a]
validators = [{{ sandbox = "gaia-a-val0", endpoint = "http://127.0.0.1:1317" }}]
"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from([
        "chainprobe", "--config", &path, "link", "--chain-a", "gaia-a", "--chain-b", "gaia-a",
    ])
    .unwrap();
    let err = run(args).await.unwrap_err();

    assert!(format!("{err:#}").contains("no [relayer] configured"));
}

#[tokio::test]
async fn bad_amount_is_reported_before_running_anything() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[chain.gaia-a]
validators = [{{ sandbox = "gaia-a-val0", endpoint = "http://127.0.0.1:1317" }}]
"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let args = CliArgs::try_parse_from([
        "chainprobe", "--config", &path, "--executor", "local", "send", "--chain", "gaia-a",
        "--from", "alice", "--to", "bob", "--amount", "lots", "--fees", "1photon",
    ])
    .unwrap();
    let err = run(args).await.unwrap_err();

    assert!(format!("{err:#}").contains("invalid coin 'lots'"));
}
