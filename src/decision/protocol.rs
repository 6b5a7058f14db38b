//! Prompt construction and defensive parsing for decision service responses.
//!
//! The service returns free text. Bids are recovered by scanning for the
//! first numeric token; continuation answers by yes/no containment. Every
//! parse failure maps to [`QueryError::Unparseable`] so the owning bidder
//! can apply its deterministic fallback.

use crate::error::QueryError;

/// Shading factor applied when a bid query fails.
pub const FALLBACK_SHADE: f64 = 0.8;

pub(crate) const BID_SYSTEM_PROMPT: &str =
    "You are a strategic bidder in a sealed-bid auction. \
     Return a single number: the bid you would submit.";

pub(crate) const CONTINUE_SYSTEM_PROMPT: &str =
    "You're a bidder in an ascending auction. \
     Decide whether to continue bidding given the current price.";

pub(crate) fn bid_query(private_value: f64, context: &str) -> String {
    format!("My private value is {private_value}. {context}")
}

pub(crate) fn continue_query(private_value: f64, current_price: f64, context: &str) -> String {
    format!(
        "My private value is {private_value}. The current bid is {current_price}. \
         {context} Respond 'yes' to continue, 'no' to drop out."
    )
}

/// Deterministic stand-in bid when the decision service is unavailable.
pub fn fallback_bid(private_value: f64) -> f64 {
    private_value * FALLBACK_SHADE
}

/// Extract a bid from untrusted response text.
///
/// Accepts a bare number or the first numeric token embedded in prose
/// ("I would bid $72.50"). Negative and non-finite amounts are rejected.
pub fn parse_bid(payload: &str) -> std::result::Result<f64, QueryError> {
    let trimmed = payload.trim();
    if let Ok(bid) = trimmed.parse::<f64>() {
        return validate_bid(bid, payload);
    }

    for token in trimmed.split_whitespace() {
        let cleaned = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-');
        if cleaned.is_empty() {
            continue;
        }
        if let Ok(bid) = cleaned.parse::<f64>() {
            return validate_bid(bid, payload);
        }
    }

    Err(QueryError::Unparseable {
        payload: payload.to_string(),
    })
}

fn validate_bid(bid: f64, payload: &str) -> std::result::Result<f64, QueryError> {
    if bid.is_finite() && bid >= 0.0 {
        Ok(bid)
    } else {
        Err(QueryError::Unparseable {
            payload: payload.to_string(),
        })
    }
}

/// Interpret a continuation answer. "yes" anywhere wins, then "no".
pub fn parse_continue(payload: &str) -> std::result::Result<bool, QueryError> {
    let lowered = payload.to_lowercase();
    if lowered.contains("yes") {
        Ok(true)
    } else if lowered.contains("no") {
        Ok(false)
    } else {
        Err(QueryError::Unparseable {
            payload: payload.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bid_bare_number() {
        assert_eq!(parse_bid("72.5").unwrap(), 72.5);
        assert_eq!(parse_bid("  80 ").unwrap(), 80.0);
    }

    #[test]
    fn test_parse_bid_embedded_in_prose() {
        assert_eq!(parse_bid("I would bid 64.").unwrap(), 64.0);
        assert_eq!(parse_bid("My bid: $72.50, final answer").unwrap(), 72.5);
    }

    #[test]
    fn test_parse_bid_rejects_garbage() {
        assert!(parse_bid("no number here").is_err());
        assert!(parse_bid("").is_err());
        assert!(parse_bid("NaN").is_err());
    }

    #[test]
    fn test_parse_bid_rejects_negative() {
        assert!(matches!(
            parse_bid("-10"),
            Err(QueryError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_parse_continue_yes_no() {
        assert!(parse_continue("Yes, I'll keep going").unwrap());
        assert!(!parse_continue("No.").unwrap());
        // yes takes priority, matching the containment check order
        assert!(parse_continue("yes, but the odds are not great").unwrap());
        assert!(parse_continue("maybe").is_err());
    }

    #[test]
    fn test_fallback_bid_is_shaded_value() {
        assert_eq!(fallback_bid(100.0), 80.0);
        assert_eq!(fallback_bid(0.0), 0.0);
    }

    #[test]
    fn test_query_text_mentions_value_and_price() {
        let q = continue_query(90.0, 42.0, "This is an English auction.");
        assert!(q.contains("90"));
        assert!(q.contains("42"));
        assert!(q.contains("English"));
    }
}
