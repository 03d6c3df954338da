use subscriber_api::configuration::get_configuration;
use subscriber_api::startup::Application;
use subscriber_api::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("subscriber_api".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    //Panic if we can't read configuration
    let configuration = get_configuration().expect("Failed to read configuration");
    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Serving the subscriber API");
    application.run_until_stopped().await?;

    Ok(())
}
