use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, middleware, web};
use deckgen::compose::ledger::{CsvStore, Ledger};
use deckgen::config::Config;
use deckgen::web::AppState;
use parking_lot::Mutex;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    config.bootstrap_dirs()?;

    let ledger = Ledger::new(
        Box::new(CsvStore::new(&config.ledger_path)),
        config.id_prefix.clone(),
    );

    log::info!("slide library: {}", config.slides_dir.display());
    log::info!("output dir: {}", config.output_dir.display());
    log::info!("starting server at http://{}", config.addr);

    let addr = config.addr.clone();
    let state = web::Data::new(AppState {
        config,
        ledger: Mutex::new(ledger),
    });

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            // photo uploads comfortably exceed the 2 MiB multipart default
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(50 * 1024 * 1024)
                    .memory_limit(50 * 1024 * 1024),
            )
            .configure(deckgen::web::routes)
    })
    .bind(&addr)?
    .run()
    .await
}
