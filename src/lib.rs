pub mod audit;
pub mod config;
pub mod error;
pub mod process;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    pub fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,crimeseries=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
