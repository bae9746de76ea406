mod common;
use crate::common::*;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn selector_is_required() -> Result<()> {
    mk_cmd()?
        .arg("13")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--observation-id"));
    Ok(())
}

#[test]
fn quiet_conflicts_with_no_download() -> Result<()> {
    mk_cmd()?
        .args(["13", "-o", "12345", "-q", "-n"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn station_must_be_a_number() -> Result<()> {
    mk_cmd()?.args(["boulder", "-o", "12345"]).assert().code(2);
    Ok(())
}

#[test]
fn malformed_date_range_fails_before_querying() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    // nothing listens here; a request would fail with exit code 1
    mk_cmd_in("http://127.0.0.1:9", tmp.path())?
        .args(["13", "-d", "2018-08-01_2018-08-31"])
        .assert()
        .code(255)
        .stderr(predicate::str::contains("Invalid format for date range"));
    Ok(())
}

#[tokio::test]
async fn fetch_single_observation() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/observations/12345/"))
        .and(query_param("ground_station", "13"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12345,
            "ground_station": 13,
            "station_name": "Boulder",
            "payload": format!("{}/x/data.bin", server.uri()),
            "archive_url": "",
            "waterfall": "",
            "demoddata": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/data.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x01\x02\x03".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    mk_cmd_in(&server.uri(), tmp.path())?
        .args(["13", "-o", "12345"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Observation ID:   12345"))
        .stdout(predicate::str::contains("Station Name:     Boulder"));

    assert_eq!(
        std::fs::read(tmp.path().join("12345").join("data.bin"))?,
        b"\x01\x02\x03"
    );
    Ok(())
}

#[tokio::test]
async fn observation_not_found() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/observations/12345/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    mk_cmd_in(&server.uri(), tmp.path())?
        .args(["13", "-o", "12345"])
        .assert()
        .code(255)
        .stderr(predicate::str::contains("There was an error in the query"));
    assert!(!tmp.path().join("12345").exists());
    Ok(())
}

#[tokio::test]
async fn date_range_as_json() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/observations/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/observations/"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Invalid page."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir()?;
    let assert = mk_cmd_in(&server.uri(), tmp.path())?
        .args(["-f", "json", "13", "-d", "2018-08-01/2018-08-31", "-n"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let ids = stdout
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).map(|v| v["id"].clone()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    assert_eq!(ids, [json!(1), json!(2)]);
    Ok(())
}
