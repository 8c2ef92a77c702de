//! Heuristic outcome signals scraped from the screen
//!
//! The app reports validation problems only as rendered text, so these
//! helpers read text attributes and match on keywords.

use crate::device::{Device, Locator};

use super::locate::{find_element_safe, Wait};
use super::screens;

/// Lowercase keywords that mark a TextView as a validation message
pub const ERROR_KEYWORDS: [&str; 4] = ["error", "invalid", "please", "required"];

/// Text shown when the name field holds a single word
pub const NAME_SURNAME_HINT: &str = "name and surname";

/// Whether rendered text reads like a validation message
pub fn looks_like_error(text: &str) -> bool {
    let lower = text.to_lowercase();
    ERROR_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Find a visible validation message, if any
///
/// Checks every TextView first, then the snackbar. A failed scan is logged
/// and reported as no error.
pub async fn error_displayed<D: Device + ?Sized>(device: &mut D, wait: Wait) -> Option<String> {
    match first_text_matching(device, looks_like_error).await {
        Ok(Some(text)) => {
            tracing::info!("Found error message: {}", text);
            return Some(text);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Error checking for error messages: {}", e);
            return None;
        }
    }

    let snackbar = find_element_safe(device, &Locator::xpath(screens::SNACKBAR), wait).await?;
    match device.attribute(&snackbar, "text").await {
        Ok(text) => {
            let text = text.unwrap_or_default();
            tracing::info!("Found snackbar message: {}", text);
            Some(text)
        }
        Err(e) => {
            tracing::warn!("Could not read snackbar text: {}", e);
            None
        }
    }
}

/// The "name and surname" validation text, if shown
pub async fn name_surname_error<D: Device + ?Sized>(device: &mut D) -> Option<String> {
    let found = first_text_matching(device, |text| {
        text.to_lowercase().contains(NAME_SURNAME_HINT)
    })
    .await;
    match found {
        Ok(Some(text)) => {
            tracing::info!("Found name validation error: {}", text);
            Some(text)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::debug!("Name validation scan failed: {}", e);
            None
        }
    }
}

async fn first_text_matching<D, F>(device: &mut D, matches: F) -> crate::Result<Option<String>>
where
    D: Device + ?Sized,
    F: Fn(&str) -> bool,
{
    let views = device.find_elements(&Locator::xpath(screens::TEXT_VIEW)).await?;
    for view in views {
        if let Some(text) = device.attribute(&view, "text").await? {
            if !text.is_empty() && matches(&text) {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_keywords_case_insensitive() {
        assert!(looks_like_error("Please enter your city"));
        assert!(looks_like_error("INVALID DATE"));
        assert!(looks_like_error("This field is required"));
        assert!(looks_like_error("Network error"));
        assert!(!looks_like_error("AI Survey"));
        assert!(!looks_like_error(""));
    }
}
