//! Integration tests for the `conch` binary entry point.

use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn missing_query_exits_with_usage_error() {
    let mut command = cargo_bin_cmd!("conch");
    command.assert().failure().stderr(contains("QUERY"));
}

#[test]
fn unreachable_console_reports_a_connection_error() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let mut command = cargo_bin_cmd!("conch");
    command.args([
        "--endpoint",
        &format!("tcp://127.0.0.1:{port}"),
        "sys",
        "ping",
    ]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to connect to console"));
}
