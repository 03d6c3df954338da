use crate::configuration::{DatabaseSettings, Settings};
use crate::routes;
use crate::store::PgStore;
use actix_web::{dev::Server, web, App, HttpServer};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, std::io::Error> {
        let connection_pool = get_connection_pool(&configuration.database);

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );

        let listener = TcpListener::bind(&address)?;
        //Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();
        let server = run(listener, connection_pool)?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the
    /// application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, db_pool: PgPool) -> Result<Server, std::io::Error> {
    // Handlers get the store through the application state, never through a global.
    let store = web::Data::new(PgStore::new(db_pool));
    let server = HttpServer::new(move || {
        App::new()
            // Every request gets its own span, with a request id attached.
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(routes::health_check))
            .service(
                web::resource("/subscribers")
                    .route(web::post().to(routes::create_subscribers))
                    .route(web::get().to(routes::list_subscribers)),
            )
            .route(
                "/subscribers/{id}",
                web::delete().to(routes::delete_subscriber),
            )
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
