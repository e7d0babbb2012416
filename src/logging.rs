use tracing_subscriber::EnvFilter;

/// Initialise logging. Defaults to `info`; `debug` can be enabled through
/// `CanvasSettings::debug_logging`, in which case `RUST_LOG` may override it.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(debug: bool) {
    // Without debug logging the level is forced so a stray `RUST_LOG` in the
    // environment cannot make stroke handling noisy.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Initialises logging from the persisted canvas settings.
pub fn init_from_settings(settings: &crate::draw::settings::CanvasSettings) {
    init(settings.debug_logging);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init(false);
        init_from_settings(&crate::draw::settings::CanvasSettings {
            debug_logging: true,
            ..Default::default()
        });
        tracing::debug!("still logging after a second init");
    }
}
