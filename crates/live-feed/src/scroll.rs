//! End-proximity test for scrollable list containers

/// Distance from the bottom, in pixels, at which the next page is requested
pub const LOAD_AHEAD_PX: i32 = 100;

/// Geometry of a scrollable container, as read from the DOM element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: i32,
    pub scroll_height: i32,
    pub client_height: i32,
}

impl ScrollMetrics {
    /// True when the visible bottom edge is within [`LOAD_AHEAD_PX`] of the
    /// end of the content.
    pub fn near_end(&self) -> bool {
        self.scroll_height - (self.scroll_top + LOAD_AHEAD_PX) < self.client_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_end_within_threshold() {
        let metrics = ScrollMetrics {
            scroll_top: 501,
            scroll_height: 1000,
            client_height: 400,
        };
        assert!(metrics.near_end());
    }

    #[test]
    fn test_not_near_end_at_exact_threshold() {
        // 1000 - (500 + 100) == 400, not strictly closer than a viewport
        let metrics = ScrollMetrics {
            scroll_top: 500,
            scroll_height: 1000,
            client_height: 400,
        };
        assert!(!metrics.near_end());
    }

    #[test]
    fn test_not_near_end_at_top() {
        let metrics = ScrollMetrics {
            scroll_top: 0,
            scroll_height: 1000,
            client_height: 400,
        };
        assert!(!metrics.near_end());
    }

    #[test]
    fn test_short_content_is_always_near_end() {
        let metrics = ScrollMetrics {
            scroll_top: 0,
            scroll_height: 300,
            client_height: 400,
        };
        assert!(metrics.near_end());
    }
}
