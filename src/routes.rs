use crate::{
    api::{availability, constraints, export, session},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build a per-peer limiter
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("rate limit is non-zero")
    }

    let session_limiter = build_limiter(config.rate_session_per_min);
    let api_limiter = build_limiter(config.rate_api_per_min);

    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(Governor::new(&api_limiter))
            .service(
                web::scope("/sessions")
                    // /sessions
                    .service(
                        web::resource("")
                            .wrap(Governor::new(&session_limiter))
                            .route(web::post().to(session::create_session)),
                    )
                    // /sessions/{session_id}
                    .service(
                        web::resource("/{session_id}")
                            .route(web::put().to(session::initialize_session))
                            .route(web::get().to(session::get_session))
                            .route(web::delete().to(session::discard_session)),
                    )
                    // /sessions/{session_id}/availability
                    .service(
                        web::resource("/{session_id}/availability")
                            .route(web::get().to(availability::get_snapshot)),
                    )
                    .service(
                        web::resource("/{session_id}/availability/toggle")
                            .route(web::post().to(availability::toggle_cell)),
                    )
                    .service(
                        web::resource("/{session_id}/availability/grid")
                            .route(web::get().to(availability::get_grid))
                            .route(web::put().to(availability::replace_grid)),
                    )
                    .service(
                        web::resource("/{session_id}/availability/board/{employee}")
                            .route(web::get().to(availability::get_board)),
                    )
                    // /sessions/{session_id}/constraints
                    .service(
                        web::resource("/{session_id}/constraints")
                            .route(web::get().to(constraints::get_constraints))
                            .route(web::put().to(constraints::update_constraints)),
                    )
                    // /sessions/{session_id}/export
                    .service(
                        web::resource("/{session_id}/export")
                            .route(web::get().to(export::preview_export))
                            .route(web::post().to(export::write_export)),
                    ),
            ),
    );
}

// SESSION
//  ├─ PUT /sessions/{id}          get-or-create, never resets
//  ├─ POST .../availability/toggle one cell
//  ├─ PUT .../availability/grid    whole grid, all or nothing
//  └─ POST .../export              atomic JSON write
