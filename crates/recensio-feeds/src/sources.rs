//! Built-in research domain feeds.
//!
//! One ACM search feed per research domain, sorted by recency on the
//! server side. The list is static configuration; `recensio.toml` can
//! replace it wholesale.

use recensio_common::FeedSource;

const ACM_FEED_URL: &str = "https://dl.acm.org/action/showFeed?ui=0&mi=19n0l1t&type=search&feed=rss&query=%2526AllField%253D{term}%2526content%253Dstandard%2526target%253Ddefault%2526sortBy%253Drecency";

const DOMAINS: &[(&str, &str)] = &[
    ("Gameplay Research", "Gameplay"),
    ("HCI Research", "Human%20Computer%20Interaction"),
    ("Virtual Reality", "Virtual%20Reality"),
    ("Augmented Reality", "Augmented%20Reality"),
    ("AI in Games", "Artificial%20Intelligence%20Games"),
    ("Player Experience", "Player%20Experience"),
    ("Game Analytics", "Game%20Analytics"),
    ("Serious Games", "Serious%20Games"),
    ("Game Accessibility", "Game%20Accessibility"),
    ("Game Design", "Game%20Design"),
];

/// The default ten-domain feed list.
pub fn default_feeds() -> Vec<FeedSource> {
    DOMAINS
        .iter()
        .map(|(name, term)| FeedSource {
            name: name.to_string(),
            url: ACM_FEED_URL.replace("{term}", term),
        })
        .collect()
}
