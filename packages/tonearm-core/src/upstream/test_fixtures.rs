//! Shared test fixtures for catalog payloads.
//!
//! Trimmed copies of real responses; only the fields the adapter reads are kept.

/// App shell with two `ytcfg.set` blocks; the first value of each key wins.
pub const APP_SHELL_HTML: &str = r#"<!DOCTYPE html><html><head>
<script>ytcfg.set({"INNERTUBE_API_KEY":"AIzaTestKey","INNERTUBE_CLIENT_VERSION":"1.20250101.01.00","VISITOR_DATA":"CgtWaXNpdG9y"});</script>
<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaOtherKey", "VISITOR_DATA": ""});</script>
</head><body></body></html>"#;

/// Search response: an unknown shelf, a top-result card, then a two-song shelf.
pub const SEARCH_RESPONSE: &str = r#"{
  "contents": {
    "tabbedSearchResultsRenderer": {
      "tabs": [{
        "tabRenderer": {
          "content": {
            "sectionListRenderer": {
              "contents": [
                { "itemSectionRenderer": { "contents": [{ "didYouMeanRenderer": {} }] } },
                {
                  "musicCardShelfRenderer": {
                    "header": { "musicCardShelfHeaderBasicRenderer": { "title": { "runs": [{ "text": "Top result" }] } } },
                    "title": { "runs": [{ "text": "Card Song", "navigationEndpoint": { "watchEndpoint": { "videoId": "card1" } } }] },
                    "subtitle": { "runs": [
                      { "text": "Song" },
                      { "text": " • " },
                      { "text": "Card Artist", "navigationEndpoint": { "browseEndpoint": { "browseId": "UCcard",
                        "browseEndpointContextSupportedConfigs": { "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ARTIST" } } } } },
                      { "text": " • " },
                      { "text": "4:01" }
                    ] },
                    "thumbnail": { "musicThumbnailRenderer": { "thumbnail": { "thumbnails": [
                      { "url": "https://lh3.example/card-small", "width": 60, "height": 60 },
                      { "url": "https://lh3.example/card-large", "width": 544, "height": 544 }
                    ] } } }
                  }
                },
                {
                  "musicShelfRenderer": {
                    "title": { "runs": [{ "text": "Songs" }] },
                    "contents": [
                      {
                        "musicResponsiveListItemRenderer": {
                          "playlistItemData": { "videoId": "song1" },
                          "flexColumns": [
                            { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [{ "text": "First Song" }] } } },
                            { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [
                              { "text": "First Artist", "navigationEndpoint": { "browseEndpoint": { "browseId": "UC1",
                                "browseEndpointContextSupportedConfigs": { "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ARTIST" } } } } },
                              { "text": " & " },
                              { "text": "Second Artist", "navigationEndpoint": { "browseEndpoint": { "browseId": "UC2",
                                "browseEndpointContextSupportedConfigs": { "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_USER_CHANNEL" } } } } },
                              { "text": " • " },
                              { "text": "The Album", "navigationEndpoint": { "browseEndpoint": { "browseId": "MPRE1",
                                "browseEndpointContextSupportedConfigs": { "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ALBUM" } } } } },
                              { "text": " • " },
                              { "text": "3:45" }
                            ] } } }
                          ],
                          "thumbnail": { "musicThumbnailRenderer": { "thumbnail": { "thumbnails": [
                            { "url": "https://lh3.example/song1", "width": 120, "height": 120 }
                          ] } } }
                        }
                      },
                      {
                        "musicResponsiveListItemRenderer": {
                          "playlistItemData": { "videoId": "song2" },
                          "flexColumns": [
                            { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [{ "text": "Second Song" }] } } },
                            { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [
                              { "text": "First Artist", "navigationEndpoint": { "browseEndpoint": { "browseId": "UC1",
                                "browseEndpointContextSupportedConfigs": { "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ARTIST" } } } } },
                              { "text": " • " },
                              { "text": "2:10" }
                            ] } } }
                          ]
                        }
                      }
                    ]
                  }
                }
              ]
            }
          }
        }
      }]
    }
  }
}"#;

/// Player response for media that requires sign-in.
pub const PLAYER_LOGIN_REQUIRED: &str = r#"{
  "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age" },
  "videoDetails": { "videoId": "locked", "title": "Locked Song" }
}"#;

/// Playable media: adaptive video, opus audio, cipher-only audio, one muxed format.
pub const PLAYER_OK: &str = r#"{
  "playabilityStatus": { "status": "OK" },
  "videoDetails": { "videoId": "song1", "title": "Playable Song", "author": "First Artist" },
  "streamingData": {
    "adaptiveFormats": [
      { "mimeType": "video/mp4; codecs=\"avc1.4d401f\"", "bitrate": 1500000, "width": 1280, "height": 720, "url": "https://rr.example/video" },
      { "mimeType": "audio/webm; codecs=\"opus\"", "bitrate": 150000, "averageBitrate": 135000, "contentLength": "3456789", "url": "https://rr.example/opus" },
      { "mimeType": "audio/mp4; codecs=\"mp4a.40.2\"", "bitrate": 260000, "contentLength": "4000000", "signatureCipher": "s=abc&url=https%3A%2F%2Frr.example%2Fcipher" }
    ],
    "formats": [
      { "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"", "bitrate": 500000, "width": 640, "height": 360, "url": "https://rr.example/muxed" }
    ]
  }
}"#;
