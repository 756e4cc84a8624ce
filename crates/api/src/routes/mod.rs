pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /activities                          list, create
/// /activities/{id}                     get, update, delete
/// /activities/{id}/templates           list, create
/// /activities/{id}/slots               list available, create manual
/// /activities/{id}/subscription-types  list types sold for the activity
///
/// /templates                           list all
/// /templates/{id}                      get, update, delete
///
/// /slots/{id}                          get, update, delete (cascade)
///
/// /schedule/extend                     materialize template slots (POST)
///
/// /subscription-types                  list, create
/// /subscription-types/{id}             get, update, delete
///
/// /subscriptions                       list, create
/// /subscriptions/{id}                  get, delete
///
/// /records                             paginated list
/// /records/{id}                        get, cancel
///
/// /errors                              admin error log, paginated
/// /errors/{id}                         delete one entry
///
/// /users                               create
/// /users/{id}                          get
///
/// /client/me                           requesting client's profile
/// /client/kids                         list, create
/// /client/kids/{id}                    update, delete
/// /client/records                      list own, book
/// /client/records/{id}                 cancel own
/// ```
///
/// The `/client/*` routes resolve the requester from the verified
/// `X-Client-Phone` header; everything else is operator-facing.
pub fn api_routes() -> Router<AppState> {
    let activity_routes = Router::new()
        .route(
            "/",
            get(handlers::activity::list).post(handlers::activity::create),
        )
        .route(
            "/{id}",
            get(handlers::activity::get_by_id)
                .put(handlers::activity::update)
                .delete(handlers::activity::delete),
        )
        .route(
            "/{id}/templates",
            get(handlers::template::list_by_activity).post(handlers::template::create),
        )
        .route(
            "/{id}/slots",
            get(handlers::slot::list_available).post(handlers::slot::create),
        )
        .route(
            "/{id}/subscription-types",
            get(handlers::subscription_type::list_by_activity),
        );

    let template_routes = Router::new()
        .route("/", get(handlers::template::list))
        .route(
            "/{id}",
            get(handlers::template::get_by_id)
                .put(handlers::template::update)
                .delete(handlers::template::delete),
        );

    let slot_routes = Router::new().route(
        "/{id}",
        get(handlers::slot::get_by_id)
            .put(handlers::slot::update)
            .delete(handlers::slot::delete),
    );

    let subscription_type_routes = Router::new()
        .route(
            "/",
            get(handlers::subscription_type::list).post(handlers::subscription_type::create),
        )
        .route(
            "/{id}",
            get(handlers::subscription_type::get_by_id)
                .put(handlers::subscription_type::update)
                .delete(handlers::subscription_type::delete),
        );

    let subscription_routes = Router::new()
        .route(
            "/",
            get(handlers::subscription::list).post(handlers::subscription::create),
        )
        .route(
            "/{id}",
            get(handlers::subscription::get_by_id).delete(handlers::subscription::delete),
        );

    let record_routes = Router::new()
        .route("/", get(handlers::record::list))
        .route(
            "/{id}",
            get(handlers::record::get_by_id).delete(handlers::record::delete),
        );

    let error_routes = Router::new()
        .route("/", get(handlers::studio_error::list))
        .route("/{id}", axum::routing::delete(handlers::studio_error::delete));

    let user_routes = Router::new()
        .route("/", post(handlers::user::create))
        .route("/{id}", get(handlers::user::get_by_id));

    let client_routes = Router::new()
        .route("/me", get(handlers::user::me))
        .route(
            "/kids",
            get(handlers::kid::list).post(handlers::kid::create),
        )
        .route(
            "/kids/{id}",
            axum::routing::put(handlers::kid::update).delete(handlers::kid::delete),
        )
        .route(
            "/records",
            get(handlers::record::list_mine).post(handlers::record::book),
        )
        .route(
            "/records/{id}",
            axum::routing::delete(handlers::record::cancel_mine),
        );

    Router::new()
        .nest("/activities", activity_routes)
        .nest("/templates", template_routes)
        .nest("/slots", slot_routes)
        .route("/schedule/extend", post(handlers::schedule::extend))
        .nest("/subscription-types", subscription_type_routes)
        .nest("/subscriptions", subscription_routes)
        .nest("/records", record_routes)
        .nest("/errors", error_routes)
        .nest("/users", user_routes)
        .nest("/client", client_routes)
}
