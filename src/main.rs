use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use sipub_backend::{controllers, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting up...");

    let pool = match db::establish_connection().await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Gagal inisialisasi pool database: {:?}", e);
            std::process::exit(1);
        }
    };

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            //ketpub
            .service(controllers::ketpub_controller::get_ketpub_list)
            .service(controllers::ketpub_controller::create_ketpub)
            .service(controllers::ketpub_controller::download_ketpub)
            .service(controllers::ketpub_controller::get_ketpub_by_id)
            .service(controllers::ketpub_controller::update_ketpub)
            .service(controllers::ketpub_controller::delete_ketpub)
            //tenaga pembantu
            .service(controllers::tenaga_pembantu_controller::create_tenaga_pembantu)
            .service(controllers::tenaga_pembantu_controller::get_tenaga_pembantu_list)
            .service(controllers::tenaga_pembantu_controller::delete_tenaga_pembantu)
    })
    .bind(("127.0.0.1", 8000))?
    .run()
    .await
}
