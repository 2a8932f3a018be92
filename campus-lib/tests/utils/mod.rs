use std::sync::Arc;

use campus_repo::course_repo::CourseRepo;
use campus_repo::transaction_repo::TransactionRepo;
use campus_repo::user_repo::UserRepo;
use rstest::*;
use tracing::info;
use tracing::Level;

macro_rules! build_course_app {
    ($course_repo:ident) => {{
        let app = App::new()
            .app_data(Data::new($course_repo))
            .app_data(campus_lib::error::json_config())
            .wrap(campus_lib::tracing::create_middleware())
            .service(campus_lib::course::course_service());
        tracing::info!("Built course app");
        app
    }};
}

macro_rules! build_payment_app {
    ($user_repo:ident, $transaction_repo:ident) => {{
        let app = App::new()
            .app_data(Data::new($user_repo))
            .app_data(Data::new($transaction_repo))
            .app_data(campus_lib::error::json_config())
            .wrap(campus_lib::tracing::create_middleware())
            .service(campus_lib::payment::payment_service());
        tracing::info!("Built payment app");
        app
    }};
}

/// Sends a request and returns the status together with the JSON body.
macro_rules! call_json {
    (&$service:ident, $request:expr) => {{
        let response = test::call_service(&$service, $request.to_request()).await;
        let status = response.status();
        let body: serde_json::Value = test::read_body_json(response).await;
        (status, body)
    }};
}

macro_rules! post_json {
    (&$service:ident, $uri:expr, $body:expr) => {{
        call_json!(&$service, TestRequest::post().uri($uri).set_json($body))
    }};
}

macro_rules! get_json {
    (&$service:ident, $uri:expr) => {{
        call_json!(&$service, TestRequest::get().uri($uri))
    }};
}

macro_rules! delete_json {
    (&$service:ident, $uri:expr) => {{
        call_json!(&$service, TestRequest::delete().uri($uri))
    }};
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .try_init();
    info!("tracing initialized");
}

#[fixture]
pub fn course_repo() -> Arc<dyn CourseRepo> {
    campus_repo::mem_repo::create_course_repos().0
}

#[fixture]
pub fn payment_repos() -> (Arc<dyn UserRepo>, Arc<dyn TransactionRepo>) {
    let (user_repo, transaction_repo, _health_check) =
        campus_repo::mem_repo::create_payment_repos();
    (user_repo, transaction_repo)
}
