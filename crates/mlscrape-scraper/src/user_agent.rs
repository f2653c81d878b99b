//! Randomized desktop browser identities.
//!
//! Every fetch attempt presents a different Windows desktop browser so that
//! retries through the proxy do not look like the same client hammering the
//! site.

use rand::seq::IndexedRandom;
use rand::Rng;

const WINDOWS_PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Windows NT 6.1; Win64; x64",
];

#[derive(Debug, Clone, Copy)]
enum Browser {
    Chrome,
    Edge,
    Firefox,
}

const BROWSERS: &[Browser] = &[Browser::Chrome, Browser::Chrome, Browser::Edge, Browser::Firefox];

/// Returns a freshly randomized Windows desktop `User-Agent` string.
#[must_use]
pub fn random_user_agent() -> String {
    let mut rng = rand::rng();
    let platform = WINDOWS_PLATFORMS
        .choose(&mut rng)
        .copied()
        .unwrap_or(WINDOWS_PLATFORMS[0]);
    let browser = BROWSERS.choose(&mut rng).copied().unwrap_or(Browser::Chrome);

    match browser {
        Browser::Chrome => {
            let major: u32 = rng.random_range(120..=131);
            let build: u32 = rng.random_range(6000..=6800);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/{major}.0.{build}.0 Safari/537.36"
            )
        }
        Browser::Edge => {
            let major: u32 = rng.random_range(120..=131);
            let build: u32 = rng.random_range(2000..=2900);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.{build}.0"
            )
        }
        Browser::Firefox => {
            let major: u32 = rng.random_range(115..=133);
            format!("Mozilla/5.0 ({platform}; rv:{major}.0) Gecko/20100101 Firefox/{major}.0")
        }
    }
}
