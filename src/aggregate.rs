use crate::review::Review;

/// Mean star rating rounded to one decimal place, `0.0` for no reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(sum) / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(rating: u8) -> Review {
        Review {
            name: "x".into(),
            text: String::new(),
            rating,
            city: None,
            service: None,
        }
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        let reviews: Vec<_> = [5, 5, 4].into_iter().map(rated).collect();
        assert_eq!(average_rating(&reviews), 4.7);
    }

    #[test]
    fn exact_means_unchanged() {
        let reviews: Vec<_> = [5, 3].into_iter().map(rated).collect();
        assert_eq!(average_rating(&reviews), 4.0);
        assert_eq!(average_rating(&[rated(1)]), 1.0);
    }

    #[test]
    fn rounds_down_below_half() {
        // 13 / 3 = 4.333...
        let reviews: Vec<_> = [5, 4, 4].into_iter().map(rated).collect();
        assert_eq!(average_rating(&reviews), 4.3);
    }
}
