//! Size string parsing

use crate::error::{VidtaskError, VidtaskResult};

/// Parser for human size strings such as `500M` or `1.5GB`
pub struct SizeParser;

impl SizeParser {
    /// Parse a size in bytes. Units are 1024-based; a bare number is bytes.
    pub fn parse_size(size_str: &str) -> VidtaskResult<u64> {
        let trimmed = size_str.trim();
        let invalid = || VidtaskError::InvalidSize {
            size: size_str.to_string(),
        };

        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }

        let multiplier: f64 = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1.0,
            "K" | "KB" => 1024.0,
            "M" | "MB" => 1024.0 * 1024.0,
            "G" | "GB" => 1024.0 * 1024.0 * 1024.0,
            _ => return Err(invalid()),
        };

        Ok((value * multiplier).round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(SizeParser::parse_size("1024").unwrap(), 1024);
        assert_eq!(SizeParser::parse_size("10B").unwrap(), 10);
        assert_eq!(SizeParser::parse_size("2K").unwrap(), 2048);
        assert_eq!(SizeParser::parse_size("1kb").unwrap(), 1024);
        assert_eq!(SizeParser::parse_size("500M").unwrap(), 500 * 1024 * 1024);
        assert_eq!(SizeParser::parse_size("1.5GB").unwrap(), 1_610_612_736);
        assert_eq!(SizeParser::parse_size(" 3 MB ").unwrap(), 3 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert!(SizeParser::parse_size("").is_err());
        assert!(SizeParser::parse_size("MB").is_err());
        assert!(SizeParser::parse_size("10TB").is_err());
        assert!(SizeParser::parse_size("-5M").is_err());
        assert!(SizeParser::parse_size("ten").is_err());
    }
}
