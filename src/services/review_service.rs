//! 评价服务：为首页轮播提供评价列表

use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::models::review::Review;

/// 远端不可用时展示的精选评价
pub fn featured_reviews() -> Vec<Review> {
    vec![
        Review::new(
            "Osama Mansouri",
            "The limousine was top-notch. Highly recommend!",
            5.0,
        ),
        Review::new("Hamza Al Ali", "Amazing service and super comfortable rides.", 4.5),
        Review::new("Emad Mansouri", "Professional drivers and clean vehicles.", 4.0),
        Review::new("Yahia Sonbaty", "Professional drivers and clean vehicles.", 4.0),
        Review::new("Saef Wezri", "Professional drivers and clean vehicles.", 4.0),
    ]
}

pub struct ReviewService {
    api: Arc<dyn ApiClient>,
}

impl ReviewService {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }

    /// 拉取评价；失败或为空时回退到精选评价
    pub async fn load(&self) -> Vec<Review> {
        match self.api.list_reviews().await {
            Ok(reviews) if !reviews.is_empty() => {
                debug!(count = reviews.len(), "Reviews loaded");
                reviews
            }
            Ok(_) => featured_reviews(),
            Err(e) => {
                warn!(error = %e, "Failed to load reviews, using featured reviews");
                featured_reviews()
            }
        }
    }
}

/// 轮播：从 `start` 开始循环取 `count` 条
pub fn carousel_window(reviews: &[Review], start: usize, count: usize) -> Vec<&Review> {
    if reviews.is_empty() {
        return Vec::new();
    }
    (0..count.min(reviews.len()))
        .map(|i| &reviews[(start + i) % reviews.len()])
        .collect()
}
