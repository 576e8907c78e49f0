//! Integration tests for seed page scraping against mock HTTP servers.

use sample_fetch::{AudioLink, PageScraper, ScrapeError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PAGE: &str = r#"<html>
<head><title>Flute</title></head>
<body>
  <p>Non-vibrato</p>
  <a href="sound%20files/MIS/Woodwinds/flute/Flute.nonvib.ff.stereo.aif">ff</a>
  <a href="../sound files/MIS/Woodwinds/flute/Flute.nonvib.pp.stereo.aif">pp</a>
  <a href="sound%20files/MIS/Woodwinds/flute/Flute.nonvib.ff.stereo.aif">ff again</a>
  <a href="MISflute.html">self</a>
  <a href="notes.txt">notes</a>
  <a href="LOUD.WAV">upper</a>
  <a href="../../x.aiff">two levels</a>
</body>
</html>"#;

async fn setup_page(path_str: &str, body: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;
    mock_server
}

/// Returns a loopback address with nothing listening on it.
fn closed_local_address() -> std::net::SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr")
}

fn authority(server: &MockServer) -> String {
    server.address().to_string()
}

#[tokio::test]
async fn test_scrape_extracts_resolves_and_dedupes() {
    let server = setup_page("/MISflute.html", INDEX_PAGE).await;
    let scraper = PageScraper::new(reqwest::Client::new());

    let links = scraper
        .scrape(&format!("{}/MISflute.html", server.uri()))
        .await
        .expect("scrape should succeed");

    let host = authority(&server);
    let expected = vec![
        format!("http://{host}/sound%20files/MIS/Woodwinds/flute/Flute.nonvib.ff.stereo.aif"),
        format!("http://{host}/sound%20files/MIS/Woodwinds/flute/Flute.nonvib.pp.stereo.aif"),
        format!("http://{host}/x.aiff"),
    ];
    let found: Vec<&str> = links.iter().map(AudioLink::as_str).collect();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn test_scrape_page_without_audio_links_is_empty() {
    let server = setup_page("/empty.html", "<html><body>nothing here</body></html>").await;
    let scraper = PageScraper::new(reqwest::Client::new());

    let links = scraper
        .scrape(&format!("{}/empty.html", server.uri()))
        .await
        .expect("scrape should succeed");
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_scrape_resolves_against_seed_host_after_redirect() {
    let target = setup_page("/moved.html", r#"<a href="a.wav">a</a>"#).await;
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old.html"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/moved.html", target.uri()).as_str()),
        )
        .mount(&origin)
        .await;

    let scraper = PageScraper::new(reqwest::Client::new());
    let links = scraper
        .scrape(&format!("{}/old.html", origin.uri()))
        .await
        .expect("redirected scrape should succeed");

    assert_eq!(
        links,
        vec![AudioLink::new(format!("http://{}/a.wav", authority(&origin)))]
    );
}

#[tokio::test]
async fn test_scrape_404_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scraper = PageScraper::new(reqwest::Client::new());
    let seed = format!("{}/missing.html", server.uri());
    let err = scraper.scrape(&seed).await.unwrap_err();

    match err {
        ScrapeError::HttpStatus { url, status } => {
            assert_eq!(status, 404);
            assert_eq!(url, seed);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_scrape_connection_refused_is_network_error() {
    let seed = format!("http://{}/gone.html", closed_local_address());

    let scraper = PageScraper::new(reqwest::Client::new());
    let err = scraper.scrape(&seed).await.unwrap_err();
    assert!(
        matches!(err, ScrapeError::Network { .. }),
        "expected Network, got {err:?}"
    );
    assert!(err.to_string().contains(&seed));
}

#[tokio::test]
async fn test_scrape_invalid_seed_url() {
    let scraper = PageScraper::new(reqwest::Client::new());
    let err = scraper.scrape("not a url").await.unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
}
