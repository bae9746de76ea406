use super::observation;
use super::{Context, Outcome};
use crate::error::{EXIT_FAILURE, EXIT_QUERY_ERROR};
use crate::httpclient::data::{ApiError, ApiReply};
use crate::httpclient::Error as HttpError;
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "There was an error in the query ({}). Make sure the ground station id and observation id are valid.",
        kind
    ))]
    Query { kind: ApiError },

    #[snafu(display("Unexpected response from the api: {}", body))]
    Unexpected { body: String },

    #[snafu(display("An http error occurred: {}", source))]
    HttpClient { source: HttpError },

    #[snafu(display("{}", source))]
    Observation { source: observation::Error },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Query { .. } | Error::Unexpected { .. } => EXIT_QUERY_ERROR,
            Error::HttpClient { .. } | Error::Observation { .. } => EXIT_FAILURE,
        }
    }
}

/// Fetches one observation, prints it and downloads its files.
pub async fn exec(ctx: &Context, station_id: u32, observation_id: u64) -> Result<Outcome, Error> {
    let reply = ctx
        .client
        .fetch_by_id(station_id, observation_id, ctx.debug)
        .await
        .context(HttpClientSnafu)?;
    let obs = match reply {
        ApiReply::Data(obs) => obs,
        ApiReply::Known(kind) => return QuerySnafu { kind }.fail(),
        ApiReply::Unrecognized(body) => {
            return UnexpectedSnafu {
                body: body.to_string(),
            }
            .fail()
        }
    };
    let files = observation::handle(ctx, &obs)
        .await
        .context(ObservationSnafu)?;
    Ok(Outcome::Single { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::cmd::test_context;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_observation(server: &MockServer, body: serde_json::Value, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/observations/12345/"))
            .and(query_param("ground_station", "13"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn downloads_payload_of_observation() {
        let server = MockServer::start().await;
        let payload = format!("{}/x/data.bin", server.uri());
        mount_observation(
            &server,
            json!({
                "id": 12345,
                "ground_station": 13,
                "payload": payload,
                "archive_url": "",
                "waterfall": "",
                "demoddata": []
            }),
            200,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/x/data.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&server.uri(), tmp.path(), &["13", "-o", "12345"]);
        let outcome = exec(&ctx, 13, 12345).await.unwrap();

        assert_eq!(outcome, Outcome::Single { files: 1 });
        let file = tmp.path().join("12345").join("data.bin");
        assert_eq!(std::fs::read(file).unwrap(), b"audio");
    }

    #[tokio::test]
    async fn not_found_downloads_nothing() {
        let server = MockServer::start().await;
        mount_observation(&server, json!({"detail": "Not found."}), 404).await;

        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&server.uri(), tmp.path(), &["13", "-o", "12345"]);
        let err = exec(&ctx, 13, 12345).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Query {
                kind: ApiError::NotFound
            }
        ));
        assert_eq!(err.exit_code(), 255);
        assert!(!tmp.path().join("12345").exists());
    }

    #[tokio::test]
    async fn empty_and_invalid_page_are_errors() {
        for body in [json!([]), json!({"detail": "Invalid page."})] {
            let server = MockServer::start().await;
            mount_observation(&server, body, 200).await;

            let tmp = tempfile::tempdir().unwrap();
            let ctx = test_context(&server.uri(), tmp.path(), &["13", "-o", "12345"]);
            let err = exec(&ctx, 13, 12345).await.unwrap_err();
            assert_eq!(err.exit_code(), 255);
        }
    }

    #[tokio::test]
    async fn no_download_skips_files() {
        let server = MockServer::start().await;
        let waterfall = format!("{}/x/waterfall.png", server.uri());
        mount_observation(
            &server,
            json!({"id": 12345, "waterfall": waterfall, "demoddata": []}),
            200,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/x/waterfall.png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&server.uri(), tmp.path(), &["13", "-o", "12345", "-n"]);
        let outcome = exec(&ctx, 13, 12345).await.unwrap();
        assert_eq!(outcome, Outcome::Single { files: 0 });
        assert!(!tmp.path().join("12345").exists());
    }

    #[tokio::test]
    async fn downloads_archive_waterfall_and_demoddata() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount_observation(
            &server,
            json!({
                "id": 12345,
                "payload": "",
                "archive_url": format!("{}/archive/obs.ogg", uri),
                "waterfall": format!("{}/media/wf.png", uri),
                "demoddata": [
                    {"payload_demod": format!("{}/media/d1.png", uri)},
                    {"payload_demod": format!("{}/media/d2.png", uri)}
                ]
            }),
            200,
        )
        .await;
        for file in ["/archive/obs.ogg", "/media/wf.png", "/media/d1.png", "/media/d2.png"] {
            Mock::given(method("GET"))
                .and(path(file))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(file.as_bytes().to_vec()))
                .expect(1)
                .mount(&server)
                .await;
        }

        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(&uri, tmp.path(), &["13", "-o", "12345", "-q"]);
        let outcome = exec(&ctx, 13, 12345).await.unwrap();
        assert_eq!(outcome, Outcome::Single { files: 4 });
        let dir = tmp.path().join("12345");
        for name in ["obs.ogg", "wf.png", "d1.png", "d2.png"] {
            assert!(dir.join(name).is_file(), "missing {}", name);
        }
    }
}
