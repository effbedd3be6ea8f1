//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog site and run the full
//! crawl cycle end-to-end into a temporary output directory.

use catalog_harvest::config::Config;
use catalog_harvest::crawler::run_crawl;
use catalog_harvest::output::CSV_COLUMNS;
use catalog_harvest::HarvestError;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, outdir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = format!("{}/", base_url);
    config.http.delay_ms = 0;
    config.http.timeout_secs = 5;
    config.output.directory = outdir.to_string_lossy().into_owned();
    config
}

fn homepage() -> String {
    r#"<html><body>
    <div class="side_categories">
      <ul class="nav nav-list">
        <li><a href="catalogue/category/books_1/index.html">Books</a>
          <ul>
            <li><a href="catalogue/category/books/travel_2/index.html">
                    Travel
                </a></li>
            <li><a>Broken</a></li>
            <li><a href="catalogue/category/books/poetry_23/index.html">Poetry</a></li>
          </ul>
        </li>
      </ul>
    </div>
    </body></html>"#
        .to_string()
}

fn listing_page(product_hrefs: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><ol class=\"row\">");
    for href in product_hrefs {
        html.push_str(&format!(
            r#"<li><article class="product_pod"><h3><a href="{}" title="x">x</a></h3></article></li>"#,
            href
        ));
    }
    html.push_str("</ol><ul class=\"pager\">");
    if let Some(next) = next {
        html.push_str(&format!(r#"<li class="next"><a href="{}">next</a></li>"#, next));
    }
    html.push_str("</ul></body></html>");
    html
}

fn product_page(title: &str, upc: &str, rating: &str) -> String {
    format!(
        r#"<html><body>
        <div id="product_gallery"><img src="../../media/cache/{upc}.jpg" alt="{title}" /></div>
        <div class="product_main">
          <h1>{title}</h1>
          <p class="price_color">£10.00</p>
          <p class="instock availability"><i class="icon-ok"></i> In stock (3 available) </p>
          <p class="star-rating {rating}"><i class="icon-star"></i></p>
        </div>
        <table class="table table-striped">
          <tr><th>UPC</th><td>{upc}</td></tr>
          <tr><th>Product Type</th><td>Books</td></tr>
        </table>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, upc: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/media/cache/{}.jpg", upc)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(JPEG_BYTES.to_vec())
                .insert_header("content-type", "image/jpeg"),
        )
        .mount(server)
        .await;
}

/// Mounts the homepage plus the Travel (two pages) and Poetry (one page) categories
async fn mount_catalog(server: &MockServer) {
    mount_html(server, "/", homepage()).await;

    mount_html(
        server,
        "/catalogue/category/books/travel_2/index.html",
        listing_page(
            &[
                "../../../its-only-the-himalayas_981/index.html",
                "../../../see-america_732/index.html",
            ],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_html(
        server,
        "/catalogue/category/books/travel_2/page-2.html",
        listing_page(&["../../../full-moon-over-noahs-ark_811/index.html"], None),
    )
    .await;
    mount_html(
        server,
        "/catalogue/category/books/poetry_23/index.html",
        listing_page(&["../../../a-light-in-the-attic_1000/index.html"], None),
    )
    .await;

    mount_html(
        server,
        "/catalogue/its-only-the-himalayas_981/index.html",
        product_page("It's Only the Himalayas", "a22124811bfa8350", "Two"),
    )
    .await;
    mount_html(
        server,
        "/catalogue/see-america_732/index.html",
        product_page("See America", "f9705c362f070608", "Three"),
    )
    .await;
    mount_html(
        server,
        "/catalogue/full-moon-over-noahs-ark_811/index.html",
        product_page("Full Moon over Noah's Ark", "ce6396b0f23f6ecc", "Four"),
    )
    .await;
    mount_html(
        server,
        "/catalogue/a-light-in-the-attic_1000/index.html",
        product_page("A Light in the Attic", "a897fe39b1053632", "Three"),
    )
    .await;
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open CSV");

    reader
        .records()
        .map(|r| r.expect("Bad CSV row").iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_writes_csv_per_category() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), outdir.path());
    config.output.download_images = false;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.categories_found, 2);
    assert_eq!(stats.categories.len(), 2);
    assert_eq!(stats.categories[0].name, "Travel");
    assert_eq!(stats.categories[0].pages, 2);
    assert_eq!(stats.categories[0].products, 3);
    assert_eq!(stats.categories[1].name, "Poetry");
    assert_eq!(stats.total_products(), 4);

    let travel = read_csv(&outdir.path().join("csv/category_travel.csv"));
    assert_eq!(travel.len(), 4, "header plus three rows");
    assert_eq!(travel[0], CSV_COLUMNS.to_vec());

    let first = &travel[1];
    assert_eq!(first[0], "It's Only the Himalayas");
    assert_eq!(first[1], "£10.00");
    assert_eq!(first[2], "In stock (3 available)");
    assert_eq!(first[3], "2");
    assert_eq!(
        first[4],
        format!(
            "{}/catalogue/its-only-the-himalayas_981/index.html",
            mock_server.uri()
        )
    );
    assert_eq!(
        first[5],
        format!("{}/media/cache/a22124811bfa8350.jpg", mock_server.uri())
    );
    assert_eq!(first[6], "a22124811bfa8350");
    assert_eq!(first[7], "Travel");

    // Second listing page comes after the first
    assert_eq!(travel[3][0], "Full Moon over Noah's Ark");
    assert_eq!(travel[3][3], "4");

    let poetry = read_csv(&outdir.path().join("csv/category_poetry.csv"));
    assert_eq!(poetry.len(), 2);
    assert_eq!(poetry[1][0], "A Light in the Attic");
    assert_eq!(poetry[1][7], "Poetry");

    assert!(!outdir.path().join("images").exists());
}

#[tokio::test]
async fn test_images_are_downloaded_under_category_slug() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    for upc in [
        "a22124811bfa8350",
        "f9705c362f070608",
        "ce6396b0f23f6ecc",
        "a897fe39b1053632",
    ] {
        mount_image(&mock_server, upc).await;
    }

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), outdir.path());

    let stats = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(stats.total_images_saved(), 4);
    assert_eq!(stats.total_images_failed(), 0);

    let image = outdir
        .path()
        .join("images/travel/a22124811bfa8350_it-s-only-the-himalayas.jpg");
    assert_eq!(std::fs::read(&image).expect("Image missing"), JPEG_BYTES);
    assert!(outdir
        .path()
        .join("images/poetry/a897fe39b1053632_a-light-in-the-attic.jpg")
        .exists());
}

#[tokio::test]
async fn test_image_failure_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    // Only one image is served; the others return 404
    mount_image(&mock_server, "a897fe39b1053632").await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), outdir.path());

    let stats = run_crawl(config).await.expect("Crawl should survive image failures");

    assert_eq!(stats.total_products(), 4);
    assert_eq!(stats.total_images_saved(), 1);
    assert_eq!(stats.total_images_failed(), 3);

    let travel = read_csv(&outdir.path().join("csv/category_travel.csv"));
    assert_eq!(travel.len(), 4);
}

#[tokio::test]
async fn test_category_filter_is_case_insensitive() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), outdir.path());
    config.output.download_images = false;
    config.crawl.categories = vec!["poetry".to_string()];

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.categories_found, 2);
    assert_eq!(stats.categories.len(), 1);
    assert_eq!(stats.categories[0].name, "Poetry");
    assert!(outdir.path().join("csv/category_poetry.csv").exists());
    assert!(!outdir.path().join("csv/category_travel.csv").exists());
}

#[tokio::test]
async fn test_no_matching_category_ends_cleanly() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", homepage()).await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), outdir.path());
    config.crawl.categories = vec!["Cookbooks".to_string()];

    let stats = run_crawl(config).await.expect("Empty selection is not an error");

    assert!(stats.categories.is_empty());
    assert!(!outdir.path().join("csv").exists());
}

#[tokio::test]
async fn test_max_pages_limits_listing_walk() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), outdir.path());
    config.output.download_images = false;
    config.crawl.categories = vec!["Travel".to_string()];
    config.crawl.max_pages = Some(1);

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.categories[0].pages, 1);
    assert_eq!(stats.categories[0].products, 2);

    let requests = mock_server.received_requests().await.expect("Recording disabled");
    assert!(requests
        .iter()
        .all(|r| r.url.path() != "/catalogue/category/books/travel_2/page-2.html"));
}

#[tokio::test]
async fn test_product_fetch_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", homepage()).await;
    mount_html(
        &mock_server,
        "/catalogue/category/books/travel_2/index.html",
        listing_page(&["../../../gone_1/index.html"], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/gone_1/index.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), outdir.path());
    config.crawl.categories = vec!["Travel".to_string()];

    let err = run_crawl(config).await.unwrap_err();
    assert!(matches!(err, HarvestError::Status { status: 404, .. }));
    assert!(!outdir.path().join("csv/category_travel.csv").exists());
}

#[tokio::test]
async fn test_listing_fetch_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", homepage()).await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/index.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), outdir.path());

    let err = run_crawl(config).await.unwrap_err();
    assert!(matches!(err, HarvestError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_rerun_appends_rows_without_second_header() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/media/cache/a897fe39b1053632.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES.to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outdir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), outdir.path());
    config.crawl.categories = vec!["Poetry".to_string()];

    let first = run_crawl(config.clone()).await.expect("First run failed");
    assert_eq!(first.total_images_saved(), 1);

    let second = run_crawl(config).await.expect("Second run failed");
    assert_eq!(second.total_images_saved(), 0);
    assert_eq!(second.total_images_existing(), 1);

    let poetry = read_csv(&outdir.path().join("csv/category_poetry.csv"));
    assert_eq!(poetry.len(), 3, "one header, one row per run");
    assert_eq!(poetry[0], CSV_COLUMNS.to_vec());
    assert_eq!(poetry[1], poetry[2]);
}
