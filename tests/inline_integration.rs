use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use image::ImageEncoder;
use tiny_http::{Response, Server};
use url::Url;

use lovecard::{AssetInliner, Card, CardConfig};

static INIT: Once = Once::new();

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 120, 255, 255]));
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(img.as_raw(), 2, 2, image::ColorType::Rgba8)
        .unwrap();
    png
}

fn start_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18094").unwrap();
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                let response = if url.starts_with("/a.png") || url.starts_with("/b.png") {
                    Response::from_data(tiny_png()).with_header(
                        "Content-Type: image/png".parse::<tiny_http::Header>().unwrap(),
                    )
                } else {
                    Response::from_data(b"gone".to_vec()).with_status_code(404)
                };
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    "http://127.0.0.1:18094".to_string()
}

#[tokio::test]
async fn converts_every_external_image_and_keeps_inline_ones() {
    let base = start_server();
    let inliner = AssetInliner::new(&CardConfig::default()).unwrap();
    let mut card = Card::from_html(format!(
        r#"<div>
  <img src="{base}/a.png">
  <img src="data:image/gif;base64,R0lGOD=="><img src="{base}/b.png">
</div>"#
    ));

    inliner.inline(&mut card).await.unwrap();

    let sources = card.image_sources();
    assert_eq!(sources.len(), 3);
    assert!(sources[0].starts_with("data:image/png;base64,"));
    assert_eq!(sources[1], "data:image/gif;base64,R0lGOD==");
    assert!(sources[2].starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn failed_fetch_leaves_asset_external_and_converts_the_rest() {
    let base = start_server();
    let inliner = AssetInliner::new(&CardConfig::default()).unwrap();
    let missing = format!("{base}/missing.png");
    let mut card = Card::from_html(format!(
        r#"<div><img src="{missing}"><img src="{base}/a.png"></div>"#
    ));

    // Non-fatal: the pass resolves even though one conversion failed
    inliner.inline(&mut card).await.unwrap();

    let sources = card.image_sources();
    assert_eq!(sources[0], missing);
    assert!(sources[1].starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn entity_escaped_query_source_is_inlined() {
    let base = start_server();
    let inliner = AssetInliner::new(&CardConfig::default()).unwrap();
    // The markup spells the ampersand as an entity; the DOM value does not
    let mut card = Card::from_html(format!(
        r#"<div><img src="{base}/a.png?v=1&amp;w=2"></div>"#
    ));

    inliner.inline(&mut card).await.unwrap();

    assert!(card.image_sources()[0].starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn relative_sources_resolve_against_the_configured_base() {
    let base = start_server();
    let inliner = AssetInliner::new(&CardConfig::default())
        .unwrap()
        .with_base(Url::parse(&format!("{base}/")).unwrap());
    let mut card = Card::from_html(r#"<div><img src="a.png"></div>"#);

    inliner.inline(&mut card).await.unwrap();

    assert!(card.image_sources()[0].starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn card_without_images_makes_no_requests() {
    // Dedicated server so the hit counter is not shared with other tests
    let hits = Arc::new(AtomicUsize::new(0));
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let counter = hits.clone();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = request.respond(Response::from_data(tiny_png()));
        }
    });

    let inliner = AssetInliner::new(&CardConfig::default())
        .unwrap()
        .with_base(Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap());
    let mut card = Card::from_html("<div><p>Only text</p></div>");
    let html_before = card.html().to_string();

    inliner.inline(&mut card).await.unwrap();

    assert_eq!(card.html(), html_before);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
