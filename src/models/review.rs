//! Customer review models

use serde::{Deserialize, Serialize};

/// 最高评分
pub const MAX_RATING: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub name: String,
    pub comment: String,
    pub rating: f32,
}

/// 星级展示：整星数量 + 是否有半星
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    pub full: u8,
    pub half: bool,
}

impl Review {
    pub fn new(name: &str, comment: &str, rating: f32) -> Self {
        Self {
            name: name.to_string(),
            comment: comment.to_string(),
            rating,
        }
    }

    /// 评分裁剪到 [0, 5] 后拆分成整星和半星
    pub fn stars(&self) -> StarRating {
        let rating = if self.rating.is_finite() {
            self.rating.clamp(0.0, MAX_RATING)
        } else {
            0.0
        };
        let full = rating.floor();
        StarRating {
            full: full as u8,
            half: rating > full,
        }
    }
}

impl StarRating {
    /// 终端展示用的星星字符串
    pub fn render(&self) -> String {
        let mut out = "★".repeat(self.full as usize);
        if self.half {
            out.push('½');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_rating() {
        let stars = Review::new("Emad", "Clean vehicles.", 4.0).stars();
        assert_eq!(stars, StarRating { full: 4, half: false });
        assert_eq!(stars.render(), "★★★★");
    }

    #[test]
    fn test_half_rating() {
        let stars = Review::new("Hamza", "Super comfortable.", 4.5).stars();
        assert_eq!(stars, StarRating { full: 4, half: true });
        assert_eq!(stars.render(), "★★★★½");
    }

    #[test]
    fn test_out_of_range_rating_is_clamped() {
        assert_eq!(Review::new("x", "y", 9.0).stars().full, 5);
        assert_eq!(Review::new("x", "y", -1.0).stars().full, 0);
        assert_eq!(Review::new("x", "y", f32::NAN).stars().full, 0);
    }
}
