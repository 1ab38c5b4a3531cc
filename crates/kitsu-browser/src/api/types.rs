//! Kitsu API response types.
//!
//! These types mirror the JSON:API documents returned by `/anime` and
//! `/anime/{id}`. Every attribute is optional on the wire; conversion into
//! [`CatalogEntity`] fills in the gaps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{AiringStatus, AnimeAttributes, CatalogEntity, ImageSet, Subtype, ANIME_KIND};

/// Collection document returned by `/anime`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeListResponse {
    pub data: Vec<AnimeResource>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
    #[serde(default)]
    pub links: Option<ListLinks>,
}

/// Single-resource document returned by `/anime/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeDetailResponse {
    pub data: Option<AnimeResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMeta {
    pub count: Option<u64>,
}

/// Pagination links
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListLinks {
    pub first: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

/// One anime resource object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeResource {
    pub id: String,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub attributes: AnimeResourceAttributes,
}

/// Anime attributes as sent by Kitsu
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimeResourceAttributes {
    pub canonical_title: Option<String>,
    pub synopsis: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub subtype: Option<String>,
    pub episode_count: Option<u32>,
    pub poster_image: Option<ImageSet>,
    pub cover_image: Option<ImageSet>,
    pub average_rating: Option<String>,
    pub youtube_video_id: Option<String>,
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

impl From<AnimeResource> for CatalogEntity {
    fn from(resource: AnimeResource) -> Self {
        let attrs = resource.attributes;

        CatalogEntity {
            id: resource.id,
            kind: ANIME_KIND.to_string(),
            attributes: AnimeAttributes {
                title: attrs.canonical_title.unwrap_or_default(),
                synopsis: attrs.synopsis.unwrap_or_default(),
                synopsis_translated: false,
                start_date: parse_date(attrs.start_date.as_deref()),
                end_date: parse_date(attrs.end_date.as_deref()),
                status: attrs.status.as_deref().and_then(AiringStatus::from_api),
                subtype: attrs.subtype.as_deref().and_then(Subtype::from_api),
                episode_count: attrs.episode_count,
                poster_image: attrs.poster_image.unwrap_or_default(),
                cover_image: attrs.cover_image,
                youtube_video_id: attrs.youtube_video_id.filter(|v| !v.is_empty()),
                average_rating: attrs.average_rating,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_conversion() {
        let resource: AnimeResource = serde_json::from_value(json!({
            "id": "1",
            "type": "anime",
            "attributes": {
                "canonicalTitle": "Cowboy Bebop",
                "synopsis": "In the year 2071...",
                "startDate": "1998-04-03",
                "endDate": "1999-04-24",
                "status": "finished",
                "subtype": "TV",
                "episodeCount": 26,
                "posterImage": {
                    "tiny": "tiny.jpg",
                    "large": "large.jpg",
                    "original": "original.jpg",
                    "meta": { "dimensions": {} }
                },
                "coverImage": null,
                "averageRating": "82.79",
                "youtubeVideoId": "qig4KOK2R2g"
            }
        }))
        .unwrap();

        let entity = CatalogEntity::from(resource);
        assert_eq!(entity.id, "1");
        assert_eq!(entity.kind, "anime");
        assert_eq!(entity.attributes.title, "Cowboy Bebop");
        assert_eq!(entity.attributes.start_date, NaiveDate::from_ymd_opt(1998, 4, 3));
        assert_eq!(entity.attributes.status, Some(AiringStatus::Finished));
        assert_eq!(entity.attributes.subtype, Some(Subtype::Tv));
        assert_eq!(entity.attributes.episode_count, Some(26));
        assert_eq!(entity.poster_url(), Some("large.jpg"));
        assert_eq!(entity.cover_url(), None);
        assert!(!entity.attributes.synopsis_translated);
    }

    #[test]
    fn test_sparse_resource_conversion() {
        let resource: AnimeResource = serde_json::from_value(json!({
            "id": "42",
            "attributes": {
                "canonicalTitle": "Untitled",
                "startDate": "TBA",
                "endDate": null,
                "subtype": "music",
                "episodeCount": null,
                "youtubeVideoId": ""
            }
        }))
        .unwrap();

        let entity = CatalogEntity::from(resource);
        assert_eq!(entity.attributes.synopsis, "");
        assert_eq!(entity.attributes.start_date, None);
        assert_eq!(entity.attributes.end_date, None);
        assert_eq!(entity.attributes.subtype, None);
        assert_eq!(entity.attributes.episode_count, None);
        assert_eq!(entity.attributes.youtube_video_id, None);
        assert_eq!(entity.poster_url(), None);
    }

    #[test]
    fn test_list_response_links_and_meta() {
        let response: AnimeListResponse = serde_json::from_value(json!({
            "data": [],
            "meta": { "count": 18342 },
            "links": {
                "first": "https://kitsu.io/api/edge/anime?page%5Blimit%5D=20&page%5Boffset%5D=0",
                "next": "https://kitsu.io/api/edge/anime?page%5Blimit%5D=20&page%5Boffset%5D=20",
                "last": "https://kitsu.io/api/edge/anime?page%5Blimit%5D=20&page%5Boffset%5D=18322"
            }
        }))
        .unwrap();

        assert_eq!(response.meta.and_then(|m| m.count), Some(18342));
        assert!(response.links.unwrap().next.is_some());
    }
}
