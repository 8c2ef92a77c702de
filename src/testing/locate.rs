//! Element lookup with waiting and fallbacks
//!
//! Absence is an answer here, not an error: lookups return `None` and the
//! caller decides whether a missing element fails the scenario.

use std::time::{Duration, Instant};

use crate::common::config::Timeouts;
use crate::device::{Device, ElementId, Locator};

/// How long to poll for an element and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub poll: Duration,
}

impl Wait {
    /// Wait used for survey form controls
    pub fn element(timeouts: &Timeouts) -> Self {
        Self {
            timeout: timeouts.element_wait(),
            poll: timeouts.poll_interval(),
        }
    }

    /// Wait used for login screen controls
    pub fn login(timeouts: &Timeouts) -> Self {
        Self {
            timeout: timeouts.login_wait(),
            poll: timeouts.poll_interval(),
        }
    }

    /// A single lookup attempt
    pub const fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll: Duration::ZERO,
        }
    }
}

/// Poll until the locator matches or the wait runs out
///
/// Lookup errors are logged and retried like an empty result.
pub async fn find_element_safe<D: Device + ?Sized>(
    device: &mut D,
    locator: &Locator,
    wait: Wait,
) -> Option<ElementId> {
    let started = Instant::now();
    loop {
        match device.find_elements(locator).await {
            Ok(mut found) if !found.is_empty() => return Some(found.swap_remove(0)),
            Ok(_) => {}
            Err(e) => tracing::debug!("Lookup of {} failed: {}", locator, e),
        }

        let elapsed = started.elapsed();
        if elapsed >= wait.timeout {
            tracing::debug!("Gave up on {} after {:?}", locator, elapsed);
            return None;
        }
        let remaining = wait.timeout - elapsed;
        tokio::time::sleep(wait.poll.min(remaining)).await;
    }
}

/// Try each locator in order; the first that matches wins
pub async fn find_first<D: Device + ?Sized>(
    device: &mut D,
    chain: &[Locator],
    wait: Wait,
) -> Option<ElementId> {
    for locator in chain {
        if let Some(element) = find_element_safe(device, locator, wait).await {
            return Some(element);
        }
    }
    None
}

/// First element whose attribute contains `needle`
///
/// Used as a last resort when positional XPaths have shifted.
pub async fn find_by_attribute<D: Device + ?Sized>(
    device: &mut D,
    locator: &Locator,
    attribute: &str,
    needle: &str,
) -> crate::Result<Option<ElementId>> {
    for element in device.find_elements(locator).await? {
        let value = device.attribute(&element, attribute).await?;
        if value.map(|v| v.contains(needle)).unwrap_or(false) {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

/// Whether the locator matches within the wait
pub async fn is_present<D: Device + ?Sized>(device: &mut D, locator: &Locator, wait: Wait) -> bool {
    find_element_safe(device, locator, wait).await.is_some()
}

/// Click, clear, then type into a field
pub async fn fill<D: Device + ?Sized>(
    device: &mut D,
    element: &ElementId,
    text: &str,
    settle_ms: u64,
) -> crate::Result<()> {
    device.click(element).await?;
    crate::common::config::pause(settle_ms).await;
    device.clear(element).await?;
    device.send_keys(element, text).await
}
