use crate::{
    api::{employee, report, settings, users},
    config::Config,
};
use actix_governor::{Governor, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::web;

fn per_millisecond(requests_per_min: u32) -> u64 {
    if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let api_conf = GovernorConfigBuilder::default()
        .per_millisecond(per_millisecond(config.rate_api_per_min))
        .burst_size(config.rate_api_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();
    // Tighter limit for the destructive endpoints (bulk upload, seed).
    let bulk_conf = GovernorConfigBuilder::default()
        .per_millisecond(per_millisecond(config.rate_bulk_per_min))
        .burst_size(config.rate_bulk_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();

    cfg.service(
        web::scope("/employees")
            // fixed paths before /{id}
            .service(
                web::resource("/bulk-upload")
                    .wrap(Governor::new(&bulk_conf))
                    .route(web::post().to(employee::bulk_upload)),
            )
            .service(
                web::resource("/seed")
                    .wrap(Governor::new(&bulk_conf))
                    .route(web::post().to(employee::seed)),
            )
            .service(
                web::resource("")
                    .wrap(Governor::new(&api_conf))
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(Governor::new(&api_conf))
                    .route(web::get().to(employee::get_employee))
                    .route(web::put().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    );

    cfg.service(
        web::scope("/admin")
            .wrap(Governor::new(&api_conf))
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::get().to(users::list_users))
                            .route(web::post().to(users::create_user)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(users::update_user))
                            .route(web::delete().to(users::delete_user)),
                    ),
            )
            .service(
                web::scope("/settings")
                    .service(web::resource("").route(web::get().to(settings::list_settings)))
                    .service(
                        web::resource("/{key}")
                            .route(web::get().to(settings::get_setting))
                            .route(web::put().to(settings::update_setting)),
                    ),
            ),
    );

    cfg.service(
        web::scope("/reports")
            .wrap(Governor::new(&api_conf))
            .service(web::resource("/attendance").route(web::post().to(report::attendance_report)))
            .service(web::resource("/leave").route(web::post().to(report::leave_report)))
            .service(web::resource("/invoice").route(web::post().to(report::invoice_report))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_divides_by_zero() {
        assert_eq!(per_millisecond(0), 1);
        assert_eq!(per_millisecond(600), 100);
        assert_eq!(per_millisecond(60), 1_000);
    }
}
