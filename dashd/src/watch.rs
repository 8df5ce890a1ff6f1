//! Terminal rendition of the dashboard front-end: one poller per configured
//! widget, each printing its re-rendered tile whenever the payload changes.

use crate::config::Config;
use serde_json::Value;
use widget::{Poller, SingleValueWidget, Template, WidgetError, WidgetHandler};

/// Logs the re-rendered tile after every accepted payload.
struct TileLogger {
    name: String,
    inner: SingleValueWidget,
}

impl WidgetHandler for TileLogger {
    fn handle_response(&mut self, payload: &Value) -> Result<(), WidgetError> {
        self.inner.handle_response(payload)?;
        tracing::info!(
            widget = %self.name,
            classes = ?self.inner.state_classes(),
            "{}",
            self.inner.rendered()
        );
        Ok(())
    }
}

/// Spawns a poller per widget (optionally filtered to one) against the
/// configured listener and runs until interrupted.
pub async fn run(config: Config, only: Option<String>) {
    let url_base = format!(
        "http://{}:{}/widgets",
        config.listener.host, config.listener.port
    );
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for (name, widget_config) in config.widgets {
        if let Some(filter) = &only
            && filter != &name
        {
            continue;
        }

        let handler = TileLogger {
            name: name.clone(),
            inner: SingleValueWidget::new(
                widget_config.value_field.clone(),
                widget_config.tile.clone(),
                Template::new(widget_config.template()),
            ),
        };

        let poller = Poller::new(
            client.clone(),
            url_base.clone(),
            name.clone(),
            "watch",
            widget_config.tile.clone(),
            handler,
        );

        tracing::info!(widget = %name, "starting poller");
        tasks.push(tokio::spawn(poller.run()));
    }

    if tasks.is_empty() {
        tracing::warn!("no widgets configured, nothing to watch");
        return;
    }

    for task in tasks {
        let _ = task.await;
    }
}
