mod common;
use crate::common::*;
use predicates::prelude::*;

#[test]
fn version_cmd() -> Result<()> {
    mk_cmd()?
        .arg("--version")
        .assert()
        .success()
        .stderr("")
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}
