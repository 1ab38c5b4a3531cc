//! Fixtures shared by the unit tests.

use crate::api::client::DEFAULT_TIMEOUT;
use crate::{translation, CatalogService, EntityCache, KitsuClient, Translator};
use httpmock::MockServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// One anime resource object as Kitsu would send it
pub fn anime_json(id: &str, title: &str, subtype: &str, synopsis: &str) -> Value {
    json!({
        "id": id,
        "type": "anime",
        "attributes": {
            "canonicalTitle": title,
            "synopsis": synopsis,
            "startDate": "2020-01-10",
            "endDate": null,
            "status": "finished",
            "subtype": subtype,
            "episodeCount": 12,
            "posterImage": { "large": format!("https://media.kitsu.io/{id}/large.jpg") },
            "coverImage": null,
            "averageRating": "75.5",
            "youtubeVideoId": null
        }
    })
}

/// A collection document holding `count` anime with ids starting at `first_id`
pub fn list_json(first_id: usize, count: usize, subtype: &str) -> Value {
    let data: Vec<Value> = (first_id..first_id + count)
        .map(|id| anime_json(&id.to_string(), &format!("Anime {id}"), subtype, ""))
        .collect();

    json!({
        "data": data,
        "meta": { "count": 1000 },
        "links": { "first": "first", "next": "next", "last": "last" }
    })
}

/// Translator pointed at the mock server's `/translate`
pub fn translator_for(server: &MockServer) -> Translator {
    Translator::new(
        server.url("/translate"),
        "en",
        "es",
        translation::DEFAULT_TIMEOUT,
    )
    .unwrap()
}

/// Catalog service talking to the mock server, translation disabled
pub fn service_for(server: &MockServer) -> CatalogService {
    let mut translator = translator_for(server);
    translator.set_enabled(false);
    service_with(server, translator)
}

/// Catalog service talking to the mock server with the given translator
pub fn service_with(server: &MockServer, translator: Translator) -> CatalogService {
    let client = KitsuClient::new(&server.base_url(), DEFAULT_TIMEOUT).unwrap();
    CatalogService::new(client, Arc::new(translator), Arc::new(EntityCache::new()))
}

/// Catalog service with a short request timeout, translation disabled
pub fn service_with_timeout(server: &MockServer, timeout: Duration) -> CatalogService {
    let mut translator = translator_for(server);
    translator.set_enabled(false);

    let client = KitsuClient::new(&server.base_url(), timeout).unwrap();
    CatalogService::new(client, Arc::new(translator), Arc::new(EntityCache::new()))
}
