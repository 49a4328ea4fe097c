use crate::scrapers::traits::RenderingClient;
use crate::scrapers::types::RenderTimings;
use tracing::{debug, warn};

const PAGE_HEIGHT_SCRIPT: &str = "return document.body.scrollHeight";

/// Render settle step: scroll to the bottom in fixed increments so that
/// lazily loaded content materialises.
///
/// The page height is read once up front. Script failures are logged and
/// end the pass early; whatever has rendered by then is what gets parsed.
pub async fn scroll_to_bottom<C: RenderingClient + ?Sized>(client: &mut C, timings: &RenderTimings) {
    let height = match client.execute_script(PAGE_HEIGHT_SCRIPT).await {
        Ok(value) => value.as_f64(),
        Err(e) => {
            warn!("Could not read page height, skipping scroll: {}", e);
            return;
        }
    };
    let Some(height) = height else {
        warn!("Page height is not a number, skipping scroll");
        return;
    };

    let steps = timings.scroll_steps.max(1);
    let pause = timings.scroll_pause();
    debug!("Scrolling {}px in {} steps", height, steps);

    for step in 1..=steps {
        let offset = height * step as f64 / steps as f64;
        if let Err(e) = client
            .execute_script(&format!("window.scrollTo(0, {});", offset))
            .await
        {
            warn!("Scroll step {}/{} failed: {}", step, steps, e);
            return;
        }
        client.wait(pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::ScriptedBrowser;
    use crate::scrapers::RenderingClient;

    #[tokio::test]
    async fn test_scrolls_in_equal_steps() {
        let mut browser = ScriptedBrowser::new().with_page("https://x/", "<html></html>");
        browser.scroll_height = 1000.0;
        browser.navigate("https://x/").await.unwrap();

        let timings = RenderTimings {
            scroll_steps: 4,
            scroll_duration_secs: 2.0,
            ..RenderTimings::default()
        };
        scroll_to_bottom(&mut browser, &timings).await;

        assert_eq!(
            browser.scripts,
            vec![
                PAGE_HEIGHT_SCRIPT.to_string(),
                "window.scrollTo(0, 250);".to_string(),
                "window.scrollTo(0, 500);".to_string(),
                "window.scrollTo(0, 750);".to_string(),
                "window.scrollTo(0, 1000);".to_string(),
            ]
        );
        assert_eq!(browser.waits.len(), 4);
        assert!(browser.waits.iter().all(|w| w.as_millis() == 500));
    }
}
